pub mod client;
pub mod config;
pub mod eth;
pub mod ingest;
pub mod marketplace;
pub mod parse;
pub mod registry;
pub mod report;
pub mod store;
pub mod types;
