use serde::{Deserialize, Serialize};

use crate::normalize::normalize_list;
use crate::wire::FieldList;

/// A recipe as the views see it, after the backend response has been normalized.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub document_id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub time: i64,
    pub difficulty: String,
    pub category: String,
    pub rating: f64,
    pub is_favorite: bool,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

/// The writable fields of a recipe. Anything left as `None` is sent as its empty default.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time: Option<i64>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub rating: Option<f64>,
    pub is_favorite: Option<bool>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    /// Media id returned by an earlier upload.
    pub image: Option<i64>,
}

impl RecipeDraft {
    /// Encode the draft as `data[<field>]` form fields.
    ///
    /// Every scalar field is always present, falling back to `""`, `0` or `false`.
    /// Lists are sent as JSON arrays inside the field value.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let list = |items: &Option<Vec<String>>| {
            serde_json::to_string(items.as_deref().unwrap_or_default())
                .unwrap_or_else(|_| "[]".to_string())
        };
        let mut fields = vec![
            ("title", self.title.clone().unwrap_or_default()),
            ("description", self.description.clone().unwrap_or_default()),
            ("time", self.time.unwrap_or(0).to_string()),
            ("difficulty", self.difficulty.clone().unwrap_or_default()),
            ("category", self.category.clone().unwrap_or_default()),
            ("rating", self.rating.unwrap_or(0.0).to_string()),
            ("isFavorite", self.is_favorite.unwrap_or(false).to_string()),
            ("ingredients", list(&self.ingredients)),
            ("instructions", list(&self.instructions)),
        ];
        if let Some(image) = self.image {
            fields.push(("image", image.to_string()));
        }
        fields
            .into_iter()
            .map(|(name, value)| (format!("data[{name}]"), value))
            .collect()
    }

    /// Rebuild a draft from `data[<field>]` form fields.
    ///
    /// Unknown fields are ignored, and unparseable numbers are treated as absent.
    pub fn from_form_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut draft = Self::default();
        for (name, value) in fields {
            let Some(field) = name
                .as_ref()
                .strip_prefix("data[")
                .and_then(|rest| rest.strip_suffix(']'))
            else {
                continue;
            };
            let value: String = value.into();
            match field {
                "title" => draft.title = Some(value),
                "description" => draft.description = Some(value),
                "time" => draft.time = value.trim().parse().ok(),
                "difficulty" => draft.difficulty = Some(value),
                "category" => draft.category = Some(value),
                "rating" => draft.rating = value.trim().parse().ok(),
                "isFavorite" => draft.is_favorite = value.trim().parse().ok(),
                "ingredients" => draft.ingredients = Some(parse_list_field(value)),
                "instructions" => draft.instructions = Some(parse_list_field(value)),
                "image" => draft.image = value.trim().parse().ok(),
                other => tracing::debug!("Ignoring unknown form field {}", other),
            }
        }
        draft
    }
}

/// Form list fields are JSON arrays, but older clients send a comma separated string.
fn parse_list_field(value: String) -> Vec<String> {
    let list = match serde_json::from_str::<Vec<String>>(&value) {
        Ok(items) => FieldList::Sequence(items),
        Err(_) => FieldList::Delimited(value),
    };
    normalize_list(Some(list))
}

/// An image file on its way to the upload endpoint.
#[derive(Deserialize, Serialize, Clone)]
pub struct ImageForUpload {
    pub file_name: String,
    pub content_bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageForUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageForUpload")
            .field("file_name", &self.file_name)
            .field("content_bytes", &self.content_bytes.len())
            .finish()
    }
}

impl ImageForUpload {
    /// Guess a content type from the file extension.
    pub fn mime_type(&self) -> &'static str {
        match self
            .file_name
            .rsplit('.')
            .next()
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("svg") => "image/svg+xml",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
    }
}
