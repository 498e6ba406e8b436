//! A client for the campus API: log in for an access token, then ask who you are.

pub mod api;
pub mod session;

pub use api::{
    ApiClient, ApiError, ClientConfig, Credentials, ErrorMode, UserProfile, UserSession,
};
