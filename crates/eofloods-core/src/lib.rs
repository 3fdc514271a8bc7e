//! EO-Floods Core - Domain models, dataset registry, and configuration
//!
//! This crate contains the domain types and the imagery platform port shared by
//! the flood map providers.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod registry;

pub use error::{FloodError, Result};
