pub mod auth;
pub mod checks;
pub mod clock;
pub mod config;
pub mod directory;
pub mod directory_cache;
pub mod error;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod service;
pub mod storage;
pub mod submission;
pub mod version;
