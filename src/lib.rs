//! Frontdesk - Help request relay with supervisor escalation and learned answers.

pub mod client;
pub mod config;
pub mod desk;
pub mod display;
pub mod persist;
pub mod server;
