//! Turn backend entries into the client-facing [`Recipe`] shape.
//!
//! Missing or malformed fields never fail the mapping. They degrade to an
//! empty value, or to [`DEFAULT_IMAGE`] for pictures.

use itertools::Itertools;

use crate::basic_models::Recipe;
use crate::wire::{BackendRecipe, Block, Description, FieldList, MediaField};

/// Shown for recipes that have no picture of their own.
pub const DEFAULT_IMAGE: &str =
    "https://images.unsplash.com/photo-1495521821757-a1efb6729352?q=80&w=1000&auto=format&fit=crop";

/// Normalize either list encoding into trimmed, non-empty items in their original order.
pub fn normalize_list(list: Option<FieldList>) -> Vec<String> {
    match list {
        Some(FieldList::Sequence(items)) => items
            .iter()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect(),
        Some(FieldList::Delimited(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect(),
        None => vec![],
    }
}

/// Flatten rich-text blocks to plain text, one line per top-level block.
pub fn flatten_description(description: Option<Description>) -> String {
    match description {
        Some(Description::Text(text)) => text,
        Some(Description::Blocks(blocks)) => blocks.iter().map(block_text).join("\n"),
        None => String::new(),
    }
}

fn block_text(block: &Block) -> String {
    let own = block.text.clone().unwrap_or_default();
    own + &block.children.iter().map(block_text).join("")
}

/// Take the first media entry and make its URL absolute. Later entries are never consulted.
pub fn resolve_image(image: Option<&MediaField>, base_url: &str) -> String {
    let url = match image {
        Some(MediaField::Many(media)) => media.first().and_then(|m| m.url.as_deref()),
        Some(MediaField::One(media)) => media.url.as_deref(),
        None => None,
    };
    match url.map(str::trim) {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => url.to_string(),
        Some(url) if !url.is_empty() => format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        ),
        _ => DEFAULT_IMAGE.to_string(),
    }
}

impl Recipe {
    /// Map a backend entry into a client recipe. `base_url` is the backend origin used for relative media URLs.
    pub fn from_backend(item: BackendRecipe, base_url: &str) -> Self {
        let image = resolve_image(item.image.as_ref(), base_url);
        Self {
            id: item.id.to_string(),
            document_id: item.document_id,
            title: item.title.unwrap_or_default(),
            description: flatten_description(item.description),
            image,
            time: item.time.unwrap_or_default(),
            difficulty: item.difficulty.unwrap_or_default(),
            category: item.category.unwrap_or_default(),
            rating: item.rating.unwrap_or_default(),
            is_favorite: item.is_favorite.unwrap_or_default(),
            ingredients: normalize_list(item.ingredients),
            instructions: normalize_list(item.instructions),
        }
    }
}
