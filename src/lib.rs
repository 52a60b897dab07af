pub mod config;
pub mod content;
pub mod domain;
pub mod paths;
pub mod srs;
pub mod store;
pub mod tracker;
