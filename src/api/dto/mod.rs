//! Data Transfer Objects for response serialization.

pub mod envelope_dto;

pub use envelope_dto::*;
