pub mod affiliation;
pub mod cli;
pub mod config;
pub mod directory;
pub mod engine;
pub mod entitlement;
pub mod logging;
pub mod policy;
