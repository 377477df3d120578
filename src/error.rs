use thiserror::Error;

/// Terminal outcome of a failed analysis. The message is safe to show to the
/// client; upstream details are logged, never carried here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    RecognitionFailed(String),
    #[error("{0}")]
    NutritionNotFound(String),
    #[error("{0}")]
    ConfigurationMissing(String),
    #[error("{0}")]
    UpstreamError(String),
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) => "invalid_input",
            AnalysisError::RecognitionFailed(_) => "recognition_failed",
            AnalysisError::NutritionNotFound(_) => "nutrition_not_found",
            AnalysisError::ConfigurationMissing(_) => "configuration_missing",
            AnalysisError::UpstreamError(_) => "upstream_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::InvalidInput(_) | AnalysisError::RecognitionFailed(_) => 400,
            AnalysisError::NutritionNotFound(_) => 404,
            AnalysisError::ConfigurationMissing(_) | AnalysisError::UpstreamError(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AnalysisError::InvalidInput(m)
            | AnalysisError::RecognitionFailed(m)
            | AnalysisError::NutritionNotFound(m)
            | AnalysisError::ConfigurationMissing(m)
            | AnalysisError::UpstreamError(m) => m,
        }
    }

    pub fn nutrition_not_found(first: &str, second: Option<&str>) -> Self {
        let message = match second {
            Some(second) => format!(
                "No nutrition data found for \"{}\" or \"{}\"",
                first, second
            ),
            None => format!("No nutrition data found for \"{}\"", first),
        };
        AnalysisError::NutritionNotFound(message)
    }
}

#[cfg(feature = "web-server")]
mod response {
    use super::AnalysisError;
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use serde_json::json;

    impl IntoResponse for AnalysisError {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

            log::warn!("❌ Analysis failed ({}): {}", self.kind(), self.message());

            (status, Json(json!({ "error": self.message() }))).into_response()
        }
    }
}
