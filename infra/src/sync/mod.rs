//! External sync backend implementations

pub mod http_backend;

pub use http_backend::HttpSyncBackend;
