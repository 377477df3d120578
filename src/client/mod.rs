pub mod api; // HTTP side of the upload client
pub mod session; // Idle / Loading / Result / Error state machine

pub use api::{read_image_file, ApiClient};
pub use session::{UploadSession, ViewState};

use anyhow::Result;
use std::path::Path;

/// Terminal rendering of one screen state.
pub fn render(state: &ViewState) -> String {
    match state {
        ViewState::Idle => "📷 Analyze a photo: pick an image to get started.".to_string(),
        ViewState::Loading { preview } => format!(
            "⏳ Analyzing...\n   preview: {} ({} bytes)",
            preview.mime_type, preview.size_bytes
        ),
        ViewState::Result { result, preview } => format!(
            "🍽️  {}\n   preview: {} ({} bytes)\n\n   Calories  {} kcal\n   Protein   {}g\n   Carbs     {}g\n   Fat       {}g\n\n   (per 100 g)",
            result.food_name,
            preview.mime_type,
            preview.size_bytes,
            result.calories,
            result.protein,
            result.carbs,
            result.fat
        ),
        ViewState::Error { message } => format!("❌ Error\n   {}", message),
    }
}

/// Drives one upload through the session, printing each state.
/// Returns the settled state.
pub async fn analyze_file(server: &str, path: &Path) -> Result<ViewState> {
    let api = ApiClient::new(server);
    let mut session = UploadSession::new();
    println!("{}\n", render(session.state()));

    let image = read_image_file(path)?;
    let ticket = session
        .select(&image)
        .ok_or_else(|| anyhow::anyhow!("upload session is not accepting files"))?;
    println!("{}\n", render(session.state()));

    let outcome = api.submit(&image).await.map_err(|e| e.to_string());
    session.settle(ticket, outcome);
    println!("{}", render(session.state()));

    Ok(session.state().clone())
}
