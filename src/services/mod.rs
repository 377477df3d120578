pub mod demo; // Canned collaborators for ANALYZER_MODE=demo
pub mod nutrition; // Spoonacular ingredient lookup
pub mod vision; // Google Cloud Vision label detection

pub use demo::{DemoLabelIdentifier, DemoNutritionLookup};
pub use nutrition::{NutritionLookup, SpoonacularClient};
pub use vision::{GoogleVisionClient, LabelIdentifier, MAX_LABELS};
