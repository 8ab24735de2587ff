pub mod postgrest;
pub mod sync_api;
