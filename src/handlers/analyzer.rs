use anyhow::Result;
use std::sync::Arc;

use crate::config::{AnalyzerMode, Config};
use crate::error::AnalysisError;
use crate::models::{AnalysisResult, CandidateLabel, NutrientProfile, UploadedImage};
use crate::services::{
    DemoLabelIdentifier, DemoNutritionLookup, GoogleVisionClient, LabelIdentifier,
    NutritionLookup, SpoonacularClient, MAX_LABELS,
};

const LABEL_SERVICE_FAILED: &str = "Image recognition service failed. Please try again later.";
const NUTRITION_SERVICE_FAILED: &str = "Nutrition service failed. Please try again later.";

/// Chains label detection and nutrition lookup for one image.
pub struct Analyzer {
    labels: Arc<dyn LabelIdentifier>,
    nutrition: Arc<dyn NutritionLookup>,
}

impl Analyzer {
    pub fn new(labels: Arc<dyn LabelIdentifier>, nutrition: Arc<dyn NutritionLookup>) -> Self {
        Self { labels, nutrition }
    }

    pub async fn analyze(&self, image: Option<UploadedImage>) -> Result<AnalysisResult, AnalysisError> {
        let image = match image {
            Some(image) if !image.is_empty() => image,
            _ => {
                return Err(AnalysisError::InvalidInput(
                    "No image was provided.".to_string(),
                ))
            }
        };

        if !image.has_image_type() {
            return Err(AnalysisError::InvalidInput(format!(
                "Uploaded file is not an image ({}).",
                image.mime_or_default()
            )));
        }

        log::info!(
            "📸 Analyzing image: {} bytes ({})",
            image.bytes.len(),
            image.mime_or_default()
        );

        let candidates = self.labels.identify(&image, MAX_LABELS).await.map_err(|e| {
            log::error!("Label identifier failure: {:#}", e);
            AnalysisError::UpstreamError(LABEL_SERVICE_FAILED.to_string())
        })?;

        let first = candidates
            .first()
            .and_then(CandidateLabel::query)
            .ok_or_else(|| {
                AnalysisError::RecognitionFailed(
                    "Could not recognize any food in the image.".to_string(),
                )
            })?;
        let second = candidates.get(1).and_then(CandidateLabel::query);

        let profile = match self.lookup(first).await? {
            Some(profile) => profile,
            None => match second {
                Some(second) => {
                    log::warn!("↪️ No match for '{}', falling back to '{}'", first, second);
                    self.lookup(second)
                        .await?
                        .ok_or_else(|| AnalysisError::nutrition_not_found(first, Some(second)))?
                }
                None => return Err(AnalysisError::nutrition_not_found(first, None)),
            },
        };

        let result = AnalysisResult::from_profile(&profile);
        log::info!(
            "✅ Analysis complete: {} ({} kcal per {} g)",
            result.food_name,
            result.calories,
            NutrientProfile::REFERENCE_GRAMS
        );

        Ok(result)
    }

    async fn lookup(&self, query: &str) -> Result<Option<NutrientProfile>, AnalysisError> {
        self.nutrition.resolve(query).await.map_err(|e| {
            log::error!("Nutrition lookup failure for '{}': {:#}", query, e);
            AnalysisError::UpstreamError(NUTRITION_SERVICE_FAILED.to_string())
        })
    }
}

/// What the server holds: a working analyzer, or the credentials it lacks.
pub enum Backend {
    Ready(Arc<Analyzer>),
    Unconfigured(Vec<&'static str>),
}

impl Backend {
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.mode == AnalyzerMode::Demo {
            log::info!("🧪 Running with demo collaborators");
            let analyzer = Analyzer::new(
                Arc::new(DemoLabelIdentifier::new(crate::services::demo::DEMO_DELAY)),
                Arc::new(DemoNutritionLookup),
            );
            return Ok(Backend::Ready(Arc::new(analyzer)));
        }

        let (vision_key, spoonacular_key) =
            match (&config.vision_api_key, &config.spoonacular_api_key) {
                (Some(v), Some(s)) => (v.clone(), s.clone()),
                _ => {
                    let missing = config.missing_credentials();
                    log::warn!("⚠️ Missing credentials: {}", missing.join(", "));
                    return Ok(Backend::Unconfigured(missing));
                }
            };

        let labels = GoogleVisionClient::new(
            vision_key,
            config.vision_api_url.clone(),
            config.http_timeout,
        )?;
        let nutrition = SpoonacularClient::new(
            spoonacular_key,
            config.spoonacular_api_url.clone(),
            config.http_timeout,
        )?;

        Ok(Backend::Ready(Arc::new(Analyzer::new(
            Arc::new(labels),
            Arc::new(nutrition),
        ))))
    }

    pub async fn analyze(&self, image: Option<UploadedImage>) -> Result<AnalysisResult, AnalysisError> {
        match self {
            Backend::Ready(analyzer) => analyzer.analyze(image).await,
            Backend::Unconfigured(missing) => Err(AnalysisError::ConfigurationMissing(format!(
                "Server is missing configuration: {}",
                missing.join(", ")
            ))),
        }
    }
}
