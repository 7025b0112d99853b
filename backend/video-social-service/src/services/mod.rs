pub mod backend;
pub mod context;
pub mod proxy;
pub mod search;

pub use backend::{BackendService, VideoBackend};
pub use context::ServiceContext;
pub use proxy::DispatchProxy;
pub use search::{matches_word, Searchable};
