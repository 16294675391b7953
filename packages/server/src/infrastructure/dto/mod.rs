//! Data Transfer Objects (DTOs) for the messaging hub.
//!
//! DTOs are organized by protocol:
//! - `websocket`: wire frames and outbound events (frame codec)
//! - `http`: HTTP API request / response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
