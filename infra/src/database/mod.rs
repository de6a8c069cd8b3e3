//! Durable-store (MySQL) implementations

pub mod connection;
pub mod mysql;

pub use connection::DatabasePool;
