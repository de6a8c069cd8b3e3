//! # API Layer
//!
//! actix-web HTTP surface for the SMS Bridge backend: request DTOs, the
//! domain-error-to-HTTP mapping, one route module per endpoint, CORS, the
//! application factory, and the three background tasks (hot-path sync
//! worker, cold-path audit worker, fast-store health probe).

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod workers;
