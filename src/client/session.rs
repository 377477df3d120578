use crate::models::{AnalysisResult, UploadedImage};

/// Displayable form of the picked image, built before any network call.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub mime_type: String,
    pub size_bytes: usize,
    pub data_url: String,
}

impl Preview {
    pub fn of(image: &UploadedImage) -> Self {
        Self {
            mime_type: image.mime_or_default().to_string(),
            size_bytes: image.bytes.len(),
            data_url: image.data_url(),
        }
    }
}

/// Everything the upload screen can show. Exactly one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading { preview: Preview },
    Result { result: AnalysisResult, preview: Preview },
    Error { message: String },
}

impl ViewState {
    pub fn is_settled(&self) -> bool {
        matches!(self, ViewState::Result { .. } | ViewState::Error { .. })
    }
}

/// Identifies one submission; settlements for older tickets are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Upload screen state machine.
///
/// A new selection while a request is in flight supersedes it: the preview
/// switches immediately and the older response is ignored when it lands.
#[derive(Debug)]
pub struct UploadSession {
    state: ViewState,
    latest: u64,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSession {
    pub fn new() -> Self {
        Self {
            state: ViewState::Idle,
            latest: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Idle/Loading → Loading. Returns `None` once settled; call `reset` first.
    pub fn select(&mut self, image: &UploadedImage) -> Option<Ticket> {
        if self.state.is_settled() {
            log::debug!("Ignoring file selection while a result is displayed");
            return None;
        }

        self.latest += 1;
        self.state = ViewState::Loading {
            preview: Preview::of(image),
        };
        Some(Ticket(self.latest))
    }

    /// Loading → Result/Error. Returns false if the ticket is stale or
    /// nothing is loading.
    pub fn settle(&mut self, ticket: Ticket, outcome: Result<AnalysisResult, String>) -> bool {
        if ticket.0 != self.latest {
            log::debug!("Dropping stale response for ticket {}", ticket.0);
            return false;
        }

        let preview = match &self.state {
            ViewState::Loading { preview } => preview.clone(),
            _ => return false,
        };

        self.state = match outcome {
            Ok(result) => ViewState::Result { result, preview },
            Err(message) => ViewState::Error { message },
        };
        true
    }

    /// Back to Idle, dropping result, error and preview.
    pub fn reset(&mut self) {
        self.state = ViewState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(bytes: &[u8]) -> UploadedImage {
        UploadedImage::new(bytes.to_vec(), Some("image/jpeg".to_string()))
    }

    fn banana() -> AnalysisResult {
        AnalysisResult {
            food_name: "Banana".to_string(),
            calories: 89,
            protein: 1.1,
            carbs: 22.8,
            fat: 0.29,
        }
    }

    #[test]
    fn test_happy_path() {
        let mut session = UploadSession::new();
        assert_eq!(session.state(), &ViewState::Idle);

        let ticket = session.select(&photo(b"abc")).unwrap();
        match session.state() {
            ViewState::Loading { preview } => {
                assert_eq!(preview.data_url, "data:image/jpeg;base64,YWJj");
                assert_eq!(preview.size_bytes, 3);
            }
            other => panic!("expected loading, got {:?}", other),
        }

        assert!(session.settle(ticket, Ok(banana())));
        assert!(matches!(session.state(), ViewState::Result { result, .. } if result.calories == 89));

        session.reset();
        assert_eq!(session.state(), &ViewState::Idle);
    }

    #[test]
    fn test_error_then_retry() {
        let mut session = UploadSession::new();
        let ticket = session.select(&photo(b"x")).unwrap();

        assert!(session.settle(ticket, Err("No nutrition data found for \"plate\"".to_string())));
        assert_eq!(
            session.state(),
            &ViewState::Error {
                message: "No nutrition data found for \"plate\"".to_string()
            }
        );

        assert!(session.select(&photo(b"y")).is_none());
        session.reset();
        assert!(session.select(&photo(b"y")).is_some());
    }

    #[test]
    fn test_newest_selection_wins() {
        let mut session = UploadSession::new();
        let first = session.select(&photo(b"first")).unwrap();
        let second = session.select(&photo(b"second")).unwrap();

        assert!(!session.settle(first, Ok(banana())));
        assert!(matches!(session.state(), ViewState::Loading { preview } if preview.size_bytes == 6));

        assert!(session.settle(second, Err("boom".to_string())));
        assert!(matches!(session.state(), ViewState::Error { .. }));
    }

    #[test]
    fn test_settle_after_reset_is_ignored() {
        let mut session = UploadSession::new();
        let ticket = session.select(&photo(b"a")).unwrap();
        session.settle(ticket, Ok(banana()));
        session.reset();

        assert!(!session.settle(ticket, Ok(banana())));
        assert_eq!(session.state(), &ViewState::Idle);
    }
}
