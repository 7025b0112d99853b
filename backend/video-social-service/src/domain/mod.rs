pub mod models;

pub use models::{Comment, LikeSet, Likeable, Notification, User, UserProfile, Video};
