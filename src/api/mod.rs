mod client;
mod config;
mod error;
mod types;

pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, ErrorMode};
pub use types::{Credentials, UserProfile, UserSession};
