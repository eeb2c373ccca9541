pub mod composer;
pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod parser;
pub mod resolver;
pub mod services;
pub mod skill;
pub mod types;
