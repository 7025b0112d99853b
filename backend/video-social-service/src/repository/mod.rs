pub mod content;
pub mod id_generator;
pub mod identity;
pub mod sessions;

pub use content::ContentStore;
pub use id_generator::IdGenerator;
pub use identity::IdentityStore;
pub use sessions::SessionRegistry;
