use anyhow::Result;
use std::time::Duration;

use super::{LabelIdentifier, NutritionLookup};
use crate::models::{CandidateLabel, Nutrient, NutrientProfile, UploadedImage};

/// Simulated round-trip so the UI's loading state is visible in demos.
pub const DEMO_DELAY: Duration = Duration::from_millis(1500);

/// Labels every image as a banana.
pub struct DemoLabelIdentifier {
    delay: Duration,
}

impl DemoLabelIdentifier {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl LabelIdentifier for DemoLabelIdentifier {
    async fn identify(&self, image: &UploadedImage, max_results: u32) -> Result<Vec<CandidateLabel>> {
        log::info!("🧪 Demo label identifier called with {} bytes", image.bytes.len());
        tokio::time::sleep(self.delay).await;

        let mut labels = vec![
            CandidateLabel::new("banana", 0.98),
            CandidateLabel::new("fruit", 0.8),
        ];
        labels.truncate(max_results as usize);
        Ok(labels)
    }
}

/// Knows exactly one food.
pub struct DemoNutritionLookup;

#[async_trait::async_trait]
impl NutritionLookup for DemoNutritionLookup {
    async fn resolve(&self, query: &str) -> Result<Option<NutrientProfile>> {
        if !query.eq_ignore_ascii_case("banana") {
            return Ok(None);
        }

        Ok(Some(NutrientProfile {
            name: "banana (demo)".to_string(),
            nutrients: vec![
                Nutrient::new("Calories", 89.0),
                Nutrient::new("Protein", 1.1),
                Nutrient::new("Carbohydrates", 23.0),
                Nutrient::new("Fat", 0.3),
            ],
        }))
    }
}
