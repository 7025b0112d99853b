use super::IdGenerator;
use crate::domain::{Comment, Likeable, Video};
use crate::error::{Result, ServiceError};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct ContentInner {
    /// Creation order, used by search
    order: Vec<String>,
    videos: HashMap<String, Video>,
    blobs: HashMap<String, String>,
}

/// Videos, their content blobs and the comment/like tree.
///
/// Reads hand out snapshots; mutations happen under a single write guard.
pub struct ContentStore {
    inner: RwLock<ContentInner>,
    video_id_length: usize,
}

impl ContentStore {
    pub fn new(video_id_length: usize) -> Self {
        Self {
            inner: RwLock::new(ContentInner::default()),
            video_id_length,
        }
    }

    pub async fn create_video(
        &self,
        owner: &str,
        title: &str,
        content: &str,
        ids: &IdGenerator,
    ) -> Result<Video> {
        let mut inner = self.inner.write().await;
        let id = ids.next_unique(self.video_id_length, |candidate| {
            inner.videos.contains_key(candidate)
        })?;

        let video = Video::new(id.clone(), title, owner);
        inner.blobs.insert(id.clone(), content.to_string());
        inner.videos.insert(id.clone(), video.clone());
        inner.order.push(id);
        Ok(video)
    }

    pub async fn get_video(&self, id: &str) -> Result<Video> {
        let inner = self.inner.read().await;
        inner.videos.get(id).cloned().ok_or(ServiceError::NoSuchVideo)
    }

    pub async fn get_content(&self, id: &str) -> Result<String> {
        let inner = self.inner.read().await;
        inner.blobs.get(id).cloned().ok_or(ServiceError::NoSuchVideo)
    }

    /// Snapshot of every video in creation order
    pub async fn videos_in_order(&self) -> Vec<Video> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.videos.get(id).cloned())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn add_comment(&self, video_id: &str, author: &str, text: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let video = inner
            .videos
            .get_mut(video_id)
            .ok_or(ServiceError::NoSuchVideo)?;
        video.add_comment(Comment::new(author, text));
        Ok(())
    }

    pub async fn add_reply(
        &self,
        video_id: &str,
        reply_to_index: usize,
        author: &str,
        text: &str,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let video = inner
            .videos
            .get_mut(video_id)
            .ok_or(ServiceError::NoSuchVideo)?;
        let comment = video
            .comment_mut(reply_to_index)
            .ok_or(ServiceError::NoSuchComment)?;
        comment.add_reply(Comment::new(author, text));
        Ok(())
    }

    /// Idempotent; returns true if the like was new.
    pub async fn like_video(&self, video_id: &str, user_name: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let video = inner
            .videos
            .get_mut(video_id)
            .ok_or(ServiceError::NoSuchVideo)?;
        Ok(video.like(user_name))
    }

    /// Idempotent; returns true if the like was new.
    pub async fn like_comment(
        &self,
        video_id: &str,
        comment_index: usize,
        user_name: &str,
    ) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let video = inner
            .videos
            .get_mut(video_id)
            .ok_or(ServiceError::NoSuchVideo)?;
        let comment = video
            .comment_mut(comment_index)
            .ok_or(ServiceError::NoSuchComment)?;
        Ok(comment.like(user_name))
    }
}
