pub mod currencies;
pub mod dashboard;
pub mod funds;
pub mod rates;
pub mod setup;
pub mod sync;
pub mod ui;
