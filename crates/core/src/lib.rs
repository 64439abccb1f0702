//! Core business logic for shelf.

pub mod services;

pub use services::*;
