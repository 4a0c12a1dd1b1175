//! REST client for the UrbanSentinel monitoring API.
//!
//! [`ApiClient`](http::ApiClient) is the single shared HTTP client; the
//! service modules are thin typed wrappers that forward requests through
//! it, one per API resource.

pub mod auth;
pub mod clips;
pub mod connections;
pub mod control;
pub mod events;
pub mod http;
pub mod messages;
pub mod notifications;
pub mod offices;

pub use auth::AuthService;
pub use clips::ClipService;
pub use connections::ConnectionService;
pub use control::CameraControlService;
pub use events::EventService;
pub use http::{ApiClient, ApiError};
pub use messages::MessageService;
pub use notifications::NotificationService;
pub use offices::OfficeService;
