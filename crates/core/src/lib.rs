//! Domain records and pure logic for the UrbanSentinel monitoring client.
//!
//! Everything here is transport-agnostic: the HTTP services in
//! `sentinel-client` and the WebSocket channels in `sentinel-stream`
//! build on these types.

pub mod access;
pub mod auth;
pub mod clip;
pub mod connection;
pub mod control;
pub mod error;
pub mod event;
pub mod message;
pub mod notification;
pub mod office;
pub mod reports;
pub mod roles;
pub mod session;
pub mod types;
