pub mod api;
pub mod config;
pub mod export;
pub mod output;
pub mod records;
pub mod report;
pub mod session;
