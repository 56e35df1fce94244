pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod pricing;
pub mod reaper;
pub mod session;
pub mod store;
