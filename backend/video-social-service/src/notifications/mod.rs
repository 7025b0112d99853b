/// Real-time upload notifications
///
/// Architecture:
/// 1. NotificationHub: per-user registry of live callbacks, held weakly
/// 2. Fan-out: one upload notification dispatched to every follower
/// 3. Callback adapters: closures and per-connection channels
pub mod callback;
pub mod hub;

pub use callback::{ChannelCallback, FnCallback, NotificationCallback, NotificationSender};
pub use hub::{deliver_isolated, CallbackHandle, DeliveryOutcome, DeliveryReport, NotificationHub};
