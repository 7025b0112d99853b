/// Live delivery callbacks
use crate::domain::Notification;
use crate::error::DeliveryError;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Receives notifications pushed while a client connection is alive.
///
/// Invoked synchronously from inside the uploader's call, so implementations
/// should hand the notification off rather than do slow work inline.
pub trait NotificationCallback: Send + Sync {
    fn deliver(&self, notification: &Arc<Notification>) -> Result<(), DeliveryError>;
}

/// Adapts a closure into a callback
pub struct FnCallback<F>(F);

impl<F> FnCallback<F>
where
    F: Fn(&Arc<Notification>) -> Result<(), DeliveryError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> NotificationCallback for FnCallback<F>
where
    F: Fn(&Arc<Notification>) -> Result<(), DeliveryError> + Send + Sync,
{
    fn deliver(&self, notification: &Arc<Notification>) -> Result<(), DeliveryError> {
        (self.0)(notification)
    }
}

/// Type alias for the per-connection notification sender
pub type NotificationSender = mpsc::UnboundedSender<Arc<Notification>>;

/// Forwards notifications into a per-connection channel.
///
/// Dropping the receiver makes the next delivery report `Disconnected`, after
/// which the hub prunes the registration.
pub struct ChannelCallback {
    sender: NotificationSender,
}

impl ChannelCallback {
    pub fn new(sender: NotificationSender) -> Self {
        Self { sender }
    }

    /// Create a callback together with the receiving end of its channel
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<Arc<Notification>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self::new(tx)), rx)
    }
}

impl NotificationCallback for ChannelCallback {
    fn deliver(&self, notification: &Arc<Notification>) -> Result<(), DeliveryError> {
        self.sender
            .send(Arc::clone(notification))
            .map_err(|_| DeliveryError::Disconnected)
    }
}
