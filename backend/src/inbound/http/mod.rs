//! HTTP inbound adapter exposing REST endpoints.

pub mod client_ip;
pub mod error;
pub mod health;
pub mod state;
pub mod submissions;
pub mod submissions_dto;
pub mod validation;

pub use error::ApiResult;
