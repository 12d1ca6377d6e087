pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{ApiConfig, CacheConfig, Config, SyncConfig};
pub use credentials::{CredentialStore, Session};
pub use paths::{PathManager, container_base_path};
