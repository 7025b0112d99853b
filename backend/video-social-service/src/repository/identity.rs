use crate::domain::{Notification, User, UserProfile};
use crate::error::{Result, ServiceError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// User registry and follow graph.
///
/// One write guard covers every check-then-insert, so registration and the
/// two-sided follow edge are atomic.
#[derive(Default)]
pub struct IdentityStore {
    users: RwLock<HashMap<String, User>>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, name: &str, password: &str) -> Result<UserProfile> {
        let mut users = self.users.write().await;
        if users.contains_key(name) {
            return Err(ServiceError::UserAlreadyExists);
        }
        let user = User::new(name, password);
        let profile = user.profile();
        users.insert(name.to_string(), user);
        Ok(profile)
    }

    pub async fn authenticate(&self, name: &str, password: &str) -> Result<UserProfile> {
        let users = self.users.read().await;
        let user = users.get(name).ok_or(ServiceError::NoSuchUser)?;
        if !user.check_password(password) {
            return Err(ServiceError::WrongPassword);
        }
        Ok(user.profile())
    }

    pub async fn exists(&self, name: &str) -> bool {
        self.users.read().await.contains_key(name)
    }

    pub async fn profile(&self, name: &str) -> Result<UserProfile> {
        let users = self.users.read().await;
        users
            .get(name)
            .map(User::profile)
            .ok_or(ServiceError::NoSuchUser)
    }

    /// Profiles of all users, ordered by name
    pub async fn profiles(&self) -> Vec<UserProfile> {
        let users = self.users.read().await;
        let mut profiles: Vec<UserProfile> = users.values().map(User::profile).collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }

    /// Idempotent follow; returns true if a new edge was created.
    pub async fn follow(&self, follower: &str, target: &str) -> Result<bool> {
        let mut users = self.users.write().await;
        if !users.contains_key(follower) {
            return Err(ServiceError::NoSuchUser);
        }
        let target_user = users.get_mut(target).ok_or(ServiceError::NoSuchUser)?;
        let inserted = target_user.add_follower(follower);

        if let Some(follower_user) = users.get_mut(follower) {
            follower_user.add_subscription(target);
        }
        Ok(inserted)
    }

    pub async fn followers(&self, name: &str) -> Result<Vec<String>> {
        let users = self.users.read().await;
        let user = users.get(name).ok_or(ServiceError::NoSuchUser)?;
        let mut followers: Vec<String> = user.followers().iter().cloned().collect();
        followers.sort();
        Ok(followers)
    }

    pub async fn subscriptions(&self, name: &str) -> Result<Vec<String>> {
        let users = self.users.read().await;
        let user = users.get(name).ok_or(ServiceError::NoSuchUser)?;
        let mut subscriptions: Vec<String> = user.subscriptions().iter().cloned().collect();
        subscriptions.sort();
        Ok(subscriptions)
    }

    pub async fn add_owned_video(&self, owner: &str, video_id: &str) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(owner).ok_or(ServiceError::NoSuchUser)?;
        user.add_video(video_id);
        Ok(())
    }

    pub async fn defer_notification(
        &self,
        name: &str,
        notification: Arc<Notification>,
    ) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(name).ok_or(ServiceError::NoSuchUser)?;
        user.defer_notification(notification);
        Ok(())
    }

    pub async fn pending_notifications(&self, name: &str) -> Result<Vec<Arc<Notification>>> {
        let users = self.users.read().await;
        let user = users.get(name).ok_or(ServiceError::NoSuchUser)?;
        Ok(user.pending_notifications().to_vec())
    }

    /// Clear the pending queue; returns how many notifications were dropped.
    pub async fn release_pending_notifications(&self, name: &str) -> Result<usize> {
        let mut users = self.users.write().await;
        let user = users.get_mut(name).ok_or(ServiceError::NoSuchUser)?;
        Ok(user.release_pending_notifications())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Video;

    #[tokio::test]
    async fn test_register_twice_fails() {
        let store = IdentityStore::new();
        store.register("alice", "pw").await.unwrap();
        assert_eq!(
            store.register("alice", "other").await.unwrap_err(),
            ServiceError::UserAlreadyExists
        );
    }

    #[tokio::test]
    async fn test_authenticate() {
        let store = IdentityStore::new();
        store.register("alice", "pw").await.unwrap();

        assert_eq!(store.authenticate("alice", "pw").await.unwrap().name, "alice");
        assert_eq!(
            store.authenticate("alice", "PW").await.unwrap_err(),
            ServiceError::WrongPassword
        );
        assert_eq!(
            store.authenticate("bob", "pw").await.unwrap_err(),
            ServiceError::NoSuchUser
        );
    }

    #[tokio::test]
    async fn test_follow_is_two_sided_and_idempotent() {
        let store = IdentityStore::new();
        store.register("alice", "pw").await.unwrap();
        store.register("bob", "pw").await.unwrap();

        assert!(store.follow("alice", "bob").await.unwrap());
        assert!(!store.follow("alice", "bob").await.unwrap());

        assert_eq!(store.followers("bob").await.unwrap(), vec!["alice"]);
        assert_eq!(store.subscriptions("alice").await.unwrap(), vec!["bob"]);
        assert!(store.followers("alice").await.unwrap().is_empty());
        assert_eq!(store.profile("bob").await.unwrap().follower_count, 1);
    }

    #[tokio::test]
    async fn test_follow_unknown_target() {
        let store = IdentityStore::new();
        store.register("alice", "pw").await.unwrap();
        assert_eq!(
            store.follow("alice", "ghost").await.unwrap_err(),
            ServiceError::NoSuchUser
        );
        assert!(store.subscriptions("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_queue_lifecycle() {
        let store = IdentityStore::new();
        store.register("alice", "pw").await.unwrap();
        let video = Video::new("abcde", "Hello", "bob");

        store
            .defer_notification("alice", Arc::new(Notification::for_upload(&video)))
            .await
            .unwrap();

        let pending = store.pending_notifications("alice").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].video_id, "abcde");

        assert_eq!(store.release_pending_notifications("alice").await.unwrap(), 1);
        assert!(store.pending_notifications("alice").await.unwrap().is_empty());
    }
}
