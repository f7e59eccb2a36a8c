pub mod binder;
pub mod client;
pub mod comparison;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod output;
pub mod report;
pub mod server;
pub mod types;
