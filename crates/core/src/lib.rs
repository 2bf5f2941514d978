pub mod config;
pub mod csrf;
pub mod fingerprint;
pub mod sanitize;
pub mod store;
pub mod types;
