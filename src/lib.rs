pub mod cli;
pub mod collector;
pub mod config;
pub mod hub;
pub mod server;
