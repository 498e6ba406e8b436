use super::ErrorMode;

/// Where the API lives when nobody says otherwise.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

/// Everything needed to construct an `ApiClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// The root every endpoint is resolved against.
    pub base_url: String,
    pub error_mode: ErrorMode,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            error_mode: ErrorMode::default(),
        }
    }

    pub fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
