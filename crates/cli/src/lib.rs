//! `sentinel`: command-line client for the UrbanSentinel monitoring
//! backend.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
