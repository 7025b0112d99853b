/// Video Social Service Library
///
/// In-memory backend for a small video-sharing service: accounts and
/// sessions, uploads, whole-word title search, comments with one level of
/// replies, likes, follows, and upload notifications for followers.
///
/// ## Modules
///
/// - `config`: Service configuration
/// - `domain`: Users, videos, comments, likes, notifications
/// - `error`: Error types
/// - `notifications`: Live callback registry and fan-out
/// - `repository`: Identity, content and session stores
/// - `services`: Service contract, backend orchestration, search, dispatch proxy
pub mod config;
pub mod domain;
pub mod error;
pub mod notifications;
pub mod repository;
pub mod services;

// Re-export commonly used types
pub use config::{Config, DeliveryPolicy};
pub use error::{DeliveryError, Result, ServiceError};
pub use notifications::{CallbackHandle, ChannelCallback, FnCallback, NotificationCallback};
pub use services::{BackendService, DispatchProxy, ServiceContext, VideoBackend};
