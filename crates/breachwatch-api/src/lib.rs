// breachwatch-api: Async Rust client for the breach-monitoring backend

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::BreachClient;
pub use error::Error;
pub use models::{BreachRecord, SearchParams, SearchResponse, StatisticsResponse};
pub use transport::{TlsMode, TransportConfig};
