//! # OCR Gateway Shared
//!
//! Wire types shared between the gateway and its clients.
//! Kept free of domain dependencies so clients can compile it standalone.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, MetricsBody, OcrResponse};
