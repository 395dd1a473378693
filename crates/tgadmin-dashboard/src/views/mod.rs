//! Page view-models.
//!
//! Each view owns its load state behind a lock that is never held across an
//! await, so a pending indicator can be observed while a request is in
//! flight. Views are cheap to clone; clones share state.

pub mod ad_form;
pub mod advertising;
pub mod analytics;
pub mod bots;
pub mod dashboard;
pub mod media;
pub mod profile;

pub use ad_form::{AdFormInput, AdvertisementForm};
pub use advertising::AdvertisingView;
pub use analytics::{AnalyticsView, BotPerformance};
pub use bots::{BotAction, BotManagementView};
pub use dashboard::{DashboardSummary, DashboardView};
pub use media::{MediaFile, MediaUpload};
pub use profile::{PasswordChange, ProfileView};
