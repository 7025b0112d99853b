use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Set of user names that liked a video or comment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeSet {
    users: HashSet<String>,
}

impl LikeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert; returns true if the user had not liked yet.
    pub fn insert(&mut self, user_name: &str) -> bool {
        if self.users.contains(user_name) {
            return false;
        }
        self.users.insert(user_name.to_string())
    }

    pub fn contains(&self, user_name: &str) -> bool {
        self.users.contains(user_name)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Shared like behaviour of videos and comments
pub trait Likeable {
    fn like_set(&self) -> &LikeSet;

    fn like_set_mut(&mut self) -> &mut LikeSet;

    fn like(&mut self, user_name: &str) -> bool {
        self.like_set_mut().insert(user_name)
    }

    fn like_count(&self) -> usize {
        self.like_set().len()
    }

    fn liked_by(&self, user_name: &str) -> bool {
        self.like_set().contains(user_name)
    }
}

/// Comment entity - a top-level comment on a video or a reply to one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub content: String,
    pub replies: Vec<Comment>,
    likes: LikeSet,
}

impl Comment {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            replies: Vec::new(),
            likes: LikeSet::new(),
        }
    }

    pub fn add_reply(&mut self, reply: Comment) {
        self.replies.push(reply);
    }
}

impl Likeable for Comment {
    fn like_set(&self) -> &LikeSet {
        &self.likes
    }

    fn like_set_mut(&mut self) -> &mut LikeSet {
        &mut self.likes
    }
}

/// Video entity
///
/// The raw content blob lives in the content store keyed by `id`; this struct
/// only carries metadata and the social state that grows over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub owner: String,
    pub comments: Vec<Comment>,
    likes: LikeSet,
    pub created_at: DateTime<Utc>,
}

impl Video {
    pub fn new(id: impl Into<String>, title: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            owner: owner.into(),
            comments: Vec::new(),
            likes: LikeSet::new(),
            created_at: Utc::now(),
        }
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    pub fn comment_mut(&mut self, index: usize) -> Option<&mut Comment> {
        self.comments.get_mut(index)
    }
}

impl Likeable for Video {
    fn like_set(&self) -> &LikeSet {
        &self.likes
    }

    fn like_set_mut(&mut self) -> &mut LikeSet {
        &mut self.likes
    }
}

/// Upload notification handed to every follower of the uploader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub video_id: String,
    pub video_title: String,
    pub uploader: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn for_upload(video: &Video) -> Self {
        Self {
            id: Uuid::new_v4(),
            video_id: video.id.clone(),
            video_title: video.title.clone(),
            uploader: video.owner.clone(),
            created_at: Utc::now(),
        }
    }
}

/// User entity: credentials plus the follow graph and pending queue
#[derive(Debug, Clone)]
pub struct User {
    pub name: String,
    password: String,
    subscriptions: HashSet<String>,
    followers: HashSet<String>,
    videos: Vec<String>,
    pending_notifications: Vec<Arc<Notification>>,
}

impl User {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            subscriptions: HashSet::new(),
            followers: HashSet::new(),
            videos: Vec::new(),
            pending_notifications: Vec::new(),
        }
    }

    /// Plain equality check; secrets are stored as given.
    pub fn check_password(&self, password: &str) -> bool {
        self.password == password
    }

    pub fn add_subscription(&mut self, target: &str) -> bool {
        self.subscriptions.insert(target.to_string())
    }

    pub fn add_follower(&mut self, follower: &str) -> bool {
        self.followers.insert(follower.to_string())
    }

    pub fn add_video(&mut self, video_id: &str) {
        self.videos.push(video_id.to_string());
    }

    pub fn defer_notification(&mut self, notification: Arc<Notification>) {
        self.pending_notifications.push(notification);
    }

    pub fn release_pending_notifications(&mut self) -> usize {
        let released = self.pending_notifications.len();
        self.pending_notifications.clear();
        released
    }

    pub fn pending_notifications(&self) -> &[Arc<Notification>] {
        &self.pending_notifications
    }

    pub fn subscriptions(&self) -> &HashSet<String> {
        &self.subscriptions
    }

    pub fn followers(&self) -> &HashSet<String> {
        &self.followers
    }

    pub fn videos(&self) -> &[String] {
        &self.videos
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            name: self.name.clone(),
            follower_count: self.followers.len(),
            subscription_count: self.subscriptions.len(),
            videos: self.videos.clone(),
        }
    }
}

/// Public view of a user, without the secret or the pending queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub follower_count: usize,
    pub subscription_count: usize,
    pub videos: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_is_idempotent() {
        let mut video = Video::new("abcde", "My Cat Video", "alice");
        assert!(video.like("bob"));
        assert!(!video.like("bob"));
        assert_eq!(video.like_count(), 1);
        assert!(video.liked_by("bob"));
        assert!(!video.liked_by("carol"));
    }

    #[test]
    fn test_comment_likes_are_separate_from_video_likes() {
        let mut video = Video::new("abcde", "title", "alice");
        video.add_comment(Comment::new("bob", "nice"));
        video.comment_mut(0).unwrap().like("carol");

        assert_eq!(video.like_count(), 0);
        assert_eq!(video.comments[0].like_count(), 1);
    }

    #[test]
    fn test_user_password_check() {
        let user = User::new("alice", "secret");
        assert!(user.check_password("secret"));
        assert!(!user.check_password("Secret"));
    }

    #[test]
    fn test_release_pending_notifications() {
        let mut user = User::new("alice", "pw");
        let video = Video::new("abcde", "Hello", "bob");
        user.defer_notification(Arc::new(Notification::for_upload(&video)));
        user.defer_notification(Arc::new(Notification::for_upload(&video)));

        assert_eq!(user.pending_notifications().len(), 2);
        assert_eq!(user.release_pending_notifications(), 2);
        assert!(user.pending_notifications().is_empty());
    }

    #[test]
    fn test_notification_for_upload() {
        let video = Video::new("abcde", "Hello", "bob");
        let notification = Notification::for_upload(&video);
        assert_eq!(notification.video_id, "abcde");
        assert_eq!(notification.video_title, "Hello");
        assert_eq!(notification.uploader, "bob");
    }

    #[test]
    fn test_profile_hides_secret() {
        let mut user = User::new("alice", "pw");
        user.add_follower("bob");
        user.add_subscription("carol");
        user.add_video("abcde");

        let profile = user.profile();
        assert_eq!(profile.follower_count, 1);
        assert_eq!(profile.subscription_count, 1);
        assert_eq!(profile.videos, vec!["abcde".to_string()]);
    }
}
