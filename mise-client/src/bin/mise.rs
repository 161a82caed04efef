use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mise::{ImageForUpload, Recipe, RecipeDraft};
use mise_client::config::Config;
use mise_client::{HttpBackend, RecipeBackend, RecipeStore, StoreError};
use tracing_subscriber::EnvFilter;

/// Browse and edit the recipe collection from the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// YAML configuration file
    #[arg(long)]
    config: Option<String>,
    /// URL of the content backend, overriding the configuration
    #[arg(long)]
    server: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every recipe
    List {
        /// Only show favorites
        #[arg(short, long)]
        favorites: bool,
    },
    /// Show one recipe, read fresh from the backend
    Show { document_id: String },
    /// Create a recipe
    Create {
        #[command(flatten)]
        fields: DraftArgs,
    },
    /// Replace a recipe's fields. Fields left out are cleared.
    Edit {
        document_id: String,
        #[command(flatten)]
        fields: DraftArgs,
    },
    /// Mark or unmark a recipe as favorite
    Favorite {
        document_id: String,
        /// Remove the favorite mark instead
        #[arg(long)]
        off: bool,
    },
    /// Flip a recipe's favorite mark
    Toggle { document_id: String },
    /// Delete a recipe
    Delete { document_id: String },
    /// Upload a picture and print its media id
    Upload { path: std::path::PathBuf },
}

#[derive(clap::Args, Debug)]
struct DraftArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Preparation time in minutes
    #[arg(long)]
    time: Option<i64>,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    rating: Option<f64>,
    #[arg(long)]
    favorite: Option<bool>,
    /// Repeat for each ingredient
    #[arg(long = "ingredient")]
    ingredients: Vec<String>,
    /// Repeat for each step
    #[arg(long = "step")]
    instructions: Vec<String>,
    /// Media id from `upload`
    #[arg(long)]
    image: Option<i64>,
}

impl From<DraftArgs> for RecipeDraft {
    fn from(args: DraftArgs) -> Self {
        let list = |items: Vec<String>| (!items.is_empty()).then_some(items);
        RecipeDraft {
            title: args.title,
            description: args.description,
            time: args.time,
            difficulty: args.difficulty,
            category: args.category,
            rating: args.rating,
            is_favorite: args.favorite,
            ingredients: list(args.ingredients),
            instructions: list(args.instructions),
            image: args.image,
        }
    }
}

fn print_summary(recipe: &Recipe) {
    println!(
        "{mark} {title}  [{document_id}]  {time} min, {difficulty}, {category}, rated {rating}",
        mark = if recipe.is_favorite { "★" } else { " " },
        title = recipe.title,
        document_id = recipe.document_id,
        time = recipe.time,
        difficulty = recipe.difficulty,
        category = recipe.category,
        rating = recipe.rating,
    );
}

fn print_full(recipe: &Recipe) {
    print_summary(recipe);
    println!("{}", recipe.image);
    if !recipe.description.is_empty() {
        println!("\n{}", recipe.description);
    }
    println!("\nIngredients:");
    for ingredient in &recipe.ingredients {
        println!("  - {}", ingredient);
    }
    println!("\nInstructions:");
    for (step, instruction) in recipe.instructions.iter().enumerate() {
        println!("  {}. {}", step + 1, instruction);
    }
}

async fn run(store: &RecipeStore<HttpBackend>, command: Command) -> mise_client::StoreResult<()> {
    match command {
        Command::List { favorites } => {
            store.fetch_recipes().await?;
            for recipe in store.recipes().await {
                if !favorites || recipe.is_favorite {
                    print_summary(&recipe);
                }
            }
        }
        Command::Show { document_id } => {
            let backend = store.backend();
            let item = backend.get_recipe(&document_id).await?;
            print_full(&Recipe::from_backend(item, backend.base_url()));
        }
        Command::Create { fields } => {
            let recipe = store.create_recipe(&fields.into()).await?;
            println!("Created recipe {}", recipe.document_id);
        }
        Command::Edit {
            document_id,
            fields,
        } => {
            store.update_recipe(&document_id, &fields.into()).await?;
            println!("Updated recipe {}", document_id);
        }
        Command::Favorite { document_id, off } => {
            store.set_favorite(&document_id, !off).await?;
            println!("Recipe {} favorite: {}", document_id, !off);
        }
        Command::Toggle { document_id } => {
            // Toggling reads the flag from the cached list, so load it first
            store.fetch_recipes().await?;
            let now = store.toggle_favorite(&document_id).await?;
            println!("Recipe {} favorite: {}", document_id, now);
        }
        Command::Delete { document_id } => {
            store.delete_recipe(&document_id).await?;
            println!("Deleted recipe {}", document_id);
        }
        Command::Upload { path } => {
            let content_bytes = tokio::fs::read(&path)
                .await
                .map_err(mise::upload::UploadError::from)?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let media = store
                .upload_image(ImageForUpload {
                    file_name,
                    content_bytes,
                })
                .await?;
            println!(
                "Uploaded {} as media {}",
                media.url.unwrap_or_default(),
                media.id.map(|id| id.to_string()).unwrap_or_default()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("Loading {}", path))?,
        None => Config::default(),
    }
    .with_env_overrides();
    if let Some(server) = args.server {
        config.backend.base_url = server;
    }

    let store = RecipeStore::with_upload_config(HttpBackend::new(&config.backend), config.upload);
    if let Err(err) = run(&store, args.command).await {
        let message = match &err {
            StoreError::Transport(_) | StoreError::Decode(_) | StoreError::Backend { .. } => {
                format!("{} ({})", err.user_message(), err)
            }
            _ => err.user_message(),
        };
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
    Ok(())
}
