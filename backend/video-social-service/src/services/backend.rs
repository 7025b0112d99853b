use super::context::ServiceContext;
use super::search;
use crate::config::DeliveryPolicy;
use crate::domain::{Notification, UserProfile, Video};
use crate::error::{Result, ServiceError};
use crate::notifications::{deliver_isolated, CallbackHandle, NotificationCallback};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Service contract consumed by clients.
///
/// Every operation that mutates state or reads user-scoped state takes a
/// session token and fails with `NotAuthorized` when it does not resolve.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    /// Log in; returns a fresh session token.
    async fn auth(&self, name: &str, password: &str) -> Result<String>;

    async fn register_user(&self, name: &str, password: &str) -> Result<()>;

    /// Upload a video and notify the uploader's followers; returns the video id.
    async fn add_video(&self, token: &str, title: &str, content: &str) -> Result<String>;

    async fn search_videos(&self, terms: &[String]) -> Vec<Video>;

    async fn search_users(&self, terms: &[String]) -> Vec<UserProfile>;

    async fn get_video(&self, id: &str) -> Result<Video>;

    async fn download_video(&self, id: &str) -> Result<String>;

    async fn leave_comment(&self, token: &str, video_id: &str, text: &str) -> Result<()>;

    /// Reply to the top-level comment at `reply_to_index`.
    async fn leave_reply(
        &self,
        token: &str,
        video_id: &str,
        text: &str,
        reply_to_index: usize,
    ) -> Result<()>;

    async fn leave_like(&self, token: &str, video_id: &str) -> Result<()>;

    /// Like the top-level comment at `comment_index`.
    async fn leave_comment_like(
        &self,
        token: &str,
        video_id: &str,
        comment_index: usize,
    ) -> Result<()>;

    /// Register a live callback and replay the pending queue to it.
    ///
    /// The callback is held weakly: it stays registered only while the caller
    /// keeps its own `Arc` alive.
    async fn set_client_callback(
        &self,
        token: &str,
        callback: Arc<dyn NotificationCallback>,
    ) -> Result<CallbackHandle>;

    /// Drop a registration made by the same user; returns false if already gone.
    async fn remove_client_callback(&self, token: &str, handle: &CallbackHandle) -> Result<bool>;

    async fn subscribe_for(&self, token: &str, user_name: &str) -> Result<()>;

    async fn pending_notifications(&self, token: &str) -> Result<Vec<Arc<Notification>>>;

    async fn release_pending_notifications(&self, token: &str) -> Result<()>;
}

/// Orchestrates the stores; the only authorization boundary.
#[derive(Clone)]
pub struct BackendService {
    ctx: Arc<ServiceContext>,
}

impl BackendService {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<ServiceContext> {
        &self.ctx
    }

    async fn check_credentials(&self, token: &str) -> Result<String> {
        self.ctx.sessions.resolve(token).await.map_err(|e| {
            debug!("rejected request with unknown token");
            e
        })
    }

    /// Push `notification` to every follower of `uploader`, live and queued.
    ///
    /// Each follower is handled independently; a failure for one never stops
    /// the others and never undoes the upload.
    async fn fan_out(&self, uploader: &str, notification: Arc<Notification>) {
        let followers = match self.ctx.identity.followers(uploader).await {
            Ok(followers) => followers,
            Err(e) => {
                warn!(uploader = %uploader, error = %e, "could not load followers for fan-out");
                return;
            }
        };

        for follower in &followers {
            let report = self.ctx.hub.notify(follower, &notification).await;

            let queue = match self.ctx.delivery {
                DeliveryPolicy::AlwaysQueue => true,
                DeliveryPolicy::QueueWhenOffline => report.delivered == 0,
            };
            if queue {
                if let Err(e) = self
                    .ctx
                    .identity
                    .defer_notification(follower, Arc::clone(&notification))
                    .await
                {
                    warn!(follower = %follower, error = %e, "failed to queue notification");
                }
            }

            debug!(
                follower = %follower,
                delivered = report.delivered,
                failed = report.failed,
                queued = queue,
                "notification dispatched"
            );
        }

        info!(
            uploader = %uploader,
            video_id = %notification.video_id,
            followers = followers.len(),
            "upload fan-out complete"
        );
    }
}

#[async_trait]
impl VideoBackend for BackendService {
    async fn auth(&self, name: &str, password: &str) -> Result<String> {
        let user = self.ctx.identity.authenticate(name, password).await?;
        let token = self.ctx.sessions.issue_token(&user.name, &self.ctx.ids).await?;
        info!(user = %user.name, "user authenticated");
        Ok(token)
    }

    async fn register_user(&self, name: &str, password: &str) -> Result<()> {
        self.ctx.identity.register(name, password).await?;
        info!(user = %name, "user registered");
        Ok(())
    }

    async fn add_video(&self, token: &str, title: &str, content: &str) -> Result<String> {
        let user = self.check_credentials(token).await?;
        let video = self
            .ctx
            .content
            .create_video(&user, title, content, &self.ctx.ids)
            .await?;
        self.ctx.identity.add_owned_video(&user, &video.id).await?;
        info!(user = %user, video_id = %video.id, title = %video.title, "video uploaded");

        self.fan_out(&user, Arc::new(Notification::for_upload(&video)))
            .await;
        Ok(video.id)
    }

    async fn search_videos(&self, terms: &[String]) -> Vec<Video> {
        let videos = self.ctx.content.videos_in_order().await;
        search::search(videos, terms)
    }

    async fn search_users(&self, terms: &[String]) -> Vec<UserProfile> {
        let profiles = self.ctx.identity.profiles().await;
        search::search(profiles, terms)
    }

    async fn get_video(&self, id: &str) -> Result<Video> {
        self.ctx.content.get_video(id).await
    }

    async fn download_video(&self, id: &str) -> Result<String> {
        self.ctx.content.get_content(id).await
    }

    async fn leave_comment(&self, token: &str, video_id: &str, text: &str) -> Result<()> {
        let user = self.check_credentials(token).await?;
        self.ctx.content.add_comment(video_id, &user, text).await?;
        debug!(user = %user, video_id = %video_id, "comment added");
        Ok(())
    }

    async fn leave_reply(
        &self,
        token: &str,
        video_id: &str,
        text: &str,
        reply_to_index: usize,
    ) -> Result<()> {
        let user = self.check_credentials(token).await?;
        self.ctx
            .content
            .add_reply(video_id, reply_to_index, &user, text)
            .await?;
        debug!(user = %user, video_id = %video_id, reply_to_index, "reply added");
        Ok(())
    }

    async fn leave_like(&self, token: &str, video_id: &str) -> Result<()> {
        let user = self.check_credentials(token).await?;
        let new_like = self.ctx.content.like_video(video_id, &user).await?;
        debug!(user = %user, video_id = %video_id, new_like, "video liked");
        Ok(())
    }

    async fn leave_comment_like(
        &self,
        token: &str,
        video_id: &str,
        comment_index: usize,
    ) -> Result<()> {
        let user = self.check_credentials(token).await?;
        let new_like = self
            .ctx
            .content
            .like_comment(video_id, comment_index, &user)
            .await?;
        debug!(user = %user, video_id = %video_id, comment_index, new_like, "comment liked");
        Ok(())
    }

    async fn set_client_callback(
        &self,
        token: &str,
        callback: Arc<dyn NotificationCallback>,
    ) -> Result<CallbackHandle> {
        let user = self.check_credentials(token).await?;

        // Snapshot before registering so an upload racing this call reaches
        // the callback once, live. Replay does not clear the queue.
        let pending = self.ctx.identity.pending_notifications(&user).await?;
        let handle = self.ctx.hub.register(&user, &callback).await;
        for notification in &pending {
            deliver_isolated(&user, &*callback, notification);
        }

        info!(user = %user, callback_id = handle.id, replayed = pending.len(), "client callback set");
        Ok(handle)
    }

    async fn remove_client_callback(&self, token: &str, handle: &CallbackHandle) -> Result<bool> {
        let user = self.check_credentials(token).await?;
        if handle.user_name != user {
            return Err(ServiceError::NotAuthorized);
        }
        Ok(self.ctx.hub.unregister(handle).await)
    }

    async fn subscribe_for(&self, token: &str, user_name: &str) -> Result<()> {
        let user = self.check_credentials(token).await?;
        let created = self.ctx.identity.follow(&user, user_name).await?;
        info!(follower = %user, target = %user_name, created, "subscription");
        Ok(())
    }

    async fn pending_notifications(&self, token: &str) -> Result<Vec<Arc<Notification>>> {
        let user = self.check_credentials(token).await?;
        self.ctx.identity.pending_notifications(&user).await
    }

    async fn release_pending_notifications(&self, token: &str) -> Result<()> {
        let user = self.check_credentials(token).await?;
        let released = self.ctx.identity.release_pending_notifications(&user).await?;
        debug!(user = %user, released, "pending notifications released");
        Ok(())
    }
}
