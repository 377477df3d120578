use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

/// Picture submitted by the user, alive for a single request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl UploadedImage {
    pub fn new(bytes: Vec<u8>, mime_type: Option<String>) -> Self {
        Self { bytes, mime_type }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_or_default(&self) -> &str {
        self.mime_type.as_deref().unwrap_or("application/octet-stream")
    }

    /// True when the declared type is acceptable for label detection.
    /// Untyped uploads are let through; the label service decides.
    pub fn has_image_type(&self) -> bool {
        match self.mime_type.as_deref() {
            None => true,
            Some(mime) => {
                let mime = mime.trim().to_ascii_lowercase();
                mime.starts_with("image/") || mime == "application/octet-stream"
            }
        }
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:` URL suitable for an `<img src>` preview.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_or_default(), self.to_base64())
    }
}

/// One ranked description returned by the label identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLabel {
    pub description: String,
    #[serde(default)]
    pub score: f64,
}

impl CandidateLabel {
    pub fn new(description: impl Into<String>, score: f64) -> Self {
        Self {
            description: description.into(),
            score,
        }
    }

    /// Trimmed description, or `None` when it is blank.
    pub fn query(&self) -> Option<&str> {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// Search hit from the nutrition service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodMatch {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Nutrient {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: None,
        }
    }
}

/// Nutrient amounts for one food, per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub name: String,
    pub nutrients: Vec<Nutrient>,
}

impl NutrientProfile {
    pub const REFERENCE_GRAMS: u32 = 100;

    /// Exact, case-sensitive lookup. The first entry with a matching name wins.
    pub fn amount_of(&self, name: &str) -> Option<f64> {
        self.nutrients
            .iter()
            .find(|n| n.name == name)
            .map(|n| n.amount)
    }
}

/// What the client gets back on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub food_name: String,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl AnalysisResult {
    /// Normalizes a resolved profile: calories rounded, macros untouched,
    /// missing nutrients read as zero.
    pub fn from_profile(profile: &NutrientProfile) -> Self {
        let calories = profile.amount_of("Calories").unwrap_or(0.0);

        Self {
            food_name: display_name(&profile.name),
            calories: calories.round() as i64,
            protein: profile.amount_of("Protein").unwrap_or(0.0),
            carbs: profile.amount_of("Carbohydrates").unwrap_or(0.0),
            fat: profile.amount_of("Fat").unwrap_or(0.0),
        }
    }
}

/// Upper-cases the first character and leaves the rest alone.
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
