pub mod backend;
pub mod config;
pub mod errors;
pub mod store;

pub use backend::{HttpBackend, RecipeBackend};
pub use errors::{StoreError, StoreResult};
pub use store::{RecipeStore, StoreState};
