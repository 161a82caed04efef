pub mod basic_models;
pub mod normalize;
pub mod upload;
pub mod wire;

pub use basic_models::{ImageForUpload, Recipe, RecipeDraft};
pub use normalize::DEFAULT_IMAGE;
