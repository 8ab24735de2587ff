//! Core business logic abstractions

pub mod config;
pub mod log;
pub mod models;
pub mod repository;
pub mod sync;
pub mod table;
pub mod views;

// Re-export main types for cleaner imports
pub use models::{ExchangeRate, FundInfo, FundNav, TargetCurrency};
pub use repository::Repository;
pub use sync::{SyncController, SyncJob, SyncTrigger};
pub use table::{Query, TableStore, Update};
