//! Typed client for the Telegram bot admin API.
//!
//! - `ApiClient`: HTTP wrapper that attaches the session token and turns a
//!   401 into `ApiError::Unauthorized` after clearing the token store
//! - Domain endpoints as `impl ApiClient` blocks: auth, bots,
//!   advertisements, analytics, media, users
//! - `Session`: auth context with an observable state machine
//! - `TokenStore`: durable token persistence

pub mod advertisements;
pub mod analytics;
pub mod auth;
pub mod bots;
pub mod client;
pub mod error;
pub mod media;
pub mod session;
pub mod token_store;
pub mod users;

pub use advertisements::NewAdvertisement;
pub use analytics::{DEFAULT_BOT_ANALYTICS_DAYS, DEFAULT_EXPORT_DAYS};
pub use auth::{Credentials, LoginResponse, RegisterResponse};
pub use client::{Ack, ApiClient, ApiConfig};
pub use error::{ApiError, ApiResult};
pub use media::{guess_mime, UploadedMedia};
pub use session::{Session, SessionState};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use users::DEFAULT_ACTIVITY_PER_PAGE;
