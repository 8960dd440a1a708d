pub mod analytics;
pub mod config;
pub mod models;
pub mod processor;
pub mod source;
pub mod storage;
