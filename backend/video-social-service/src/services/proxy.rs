/// Round-robin dispatch across backend instances
///
/// Stateless with respect to data: every backend behind the proxy must share
/// one `ServiceContext`, which the proxy does not check.
use super::backend::VideoBackend;
use crate::domain::{Notification, UserProfile, Video};
use crate::error::{Result, ServiceError};
use crate::notifications::{CallbackHandle, NotificationCallback};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct DispatchProxy {
    backends: Vec<Arc<dyn VideoBackend>>,
    cursor: AtomicUsize,
}

impl DispatchProxy {
    pub fn new(backends: Vec<Arc<dyn VideoBackend>>) -> Result<Self> {
        if backends.is_empty() {
            return Err(ServiceError::Internal(
                "dispatch proxy needs at least one backend".to_string(),
            ));
        }
        Ok(Self {
            backends,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Index of the backend the next call will use.
    ///
    /// The cursor is advanced before it is read, so a fresh proxy sends its
    /// first call to index `1 % len`.
    pub fn peek_index(&self) -> usize {
        (self.cursor.load(Ordering::SeqCst) + 1) % self.backends.len()
    }

    pub fn size(&self) -> usize {
        self.backends.len()
    }

    fn next_backend(&self) -> &Arc<dyn VideoBackend> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst).wrapping_add(1);
        &self.backends[index % self.backends.len()]
    }
}

#[async_trait]
impl VideoBackend for DispatchProxy {
    async fn auth(&self, name: &str, password: &str) -> Result<String> {
        self.next_backend().auth(name, password).await
    }

    async fn register_user(&self, name: &str, password: &str) -> Result<()> {
        self.next_backend().register_user(name, password).await
    }

    async fn add_video(&self, token: &str, title: &str, content: &str) -> Result<String> {
        self.next_backend().add_video(token, title, content).await
    }

    async fn search_videos(&self, terms: &[String]) -> Vec<Video> {
        self.next_backend().search_videos(terms).await
    }

    async fn search_users(&self, terms: &[String]) -> Vec<UserProfile> {
        self.next_backend().search_users(terms).await
    }

    async fn get_video(&self, id: &str) -> Result<Video> {
        self.next_backend().get_video(id).await
    }

    async fn download_video(&self, id: &str) -> Result<String> {
        self.next_backend().download_video(id).await
    }

    async fn leave_comment(&self, token: &str, video_id: &str, text: &str) -> Result<()> {
        self.next_backend().leave_comment(token, video_id, text).await
    }

    async fn leave_reply(
        &self,
        token: &str,
        video_id: &str,
        text: &str,
        reply_to_index: usize,
    ) -> Result<()> {
        self.next_backend()
            .leave_reply(token, video_id, text, reply_to_index)
            .await
    }

    async fn leave_like(&self, token: &str, video_id: &str) -> Result<()> {
        self.next_backend().leave_like(token, video_id).await
    }

    async fn leave_comment_like(
        &self,
        token: &str,
        video_id: &str,
        comment_index: usize,
    ) -> Result<()> {
        self.next_backend()
            .leave_comment_like(token, video_id, comment_index)
            .await
    }

    async fn set_client_callback(
        &self,
        token: &str,
        callback: Arc<dyn NotificationCallback>,
    ) -> Result<CallbackHandle> {
        self.next_backend().set_client_callback(token, callback).await
    }

    async fn remove_client_callback(&self, token: &str, handle: &CallbackHandle) -> Result<bool> {
        self.next_backend().remove_client_callback(token, handle).await
    }

    async fn subscribe_for(&self, token: &str, user_name: &str) -> Result<()> {
        self.next_backend().subscribe_for(token, user_name).await
    }

    async fn pending_notifications(&self, token: &str) -> Result<Vec<Arc<Notification>>> {
        self.next_backend().pending_notifications(token).await
    }

    async fn release_pending_notifications(&self, token: &str) -> Result<()> {
        self.next_backend().release_pending_notifications(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{BackendService, ServiceContext};

    fn isolated_backends(n: usize) -> (Vec<Arc<ServiceContext>>, DispatchProxy) {
        let contexts: Vec<_> = (0..n).map(|_| Arc::new(ServiceContext::default())).collect();
        let backends = contexts
            .iter()
            .map(|ctx| Arc::new(BackendService::new(ctx.clone())) as Arc<dyn VideoBackend>)
            .collect();
        (contexts, DispatchProxy::new(backends).unwrap())
    }

    #[test]
    fn test_empty_proxy_rejected() {
        assert!(DispatchProxy::new(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_first_call_lands_on_index_one() {
        let (contexts, proxy) = isolated_backends(3);
        assert_eq!(proxy.peek_index(), 1);

        proxy.register_user("alice", "pw").await.unwrap();

        assert!(!contexts[0].identity.exists("alice").await);
        assert!(contexts[1].identity.exists("alice").await);
        assert!(!contexts[2].identity.exists("alice").await);
    }

    #[tokio::test]
    async fn test_cyclic_order() {
        let (contexts, proxy) = isolated_backends(3);
        let names = ["u0", "u1", "u2", "u3", "u4", "u5"];
        for name in names {
            proxy.register_user(name, "pw").await.unwrap();
        }

        // calls 1..=6 visit backends 1, 2, 0, 1, 2, 0
        let expected = [1, 2, 0, 1, 2, 0];
        for (name, backend) in names.iter().zip(expected) {
            assert!(contexts[backend].identity.exists(name).await, "{name} on {backend}");
        }
    }

    #[tokio::test]
    async fn test_single_backend() {
        let (contexts, proxy) = isolated_backends(1);
        proxy.register_user("alice", "pw").await.unwrap();
        assert!(contexts[0].identity.exists("alice").await);
        assert_eq!(proxy.peek_index(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_spread_evenly() {
        let (contexts, proxy) = isolated_backends(3);
        let proxy = Arc::new(proxy);

        let mut handles = vec![];
        for i in 0..300 {
            let proxy = Arc::clone(&proxy);
            handles.push(tokio::spawn(async move {
                proxy.register_user(&format!("user-{i}"), "pw").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for ctx in &contexts {
            assert_eq!(ctx.identity.profiles().await.len(), 100);
        }
        assert_eq!(proxy.peek_index(), 1);
    }
}
