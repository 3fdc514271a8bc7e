//! EO-Floods GFM - Provider for the hosted Global Flood Monitor
//!
//! GFM publishes ready-made flood extents. This crate logs in, registers the
//! area of interest, lists and selects products, and retrieves download links.

pub mod api;
pub mod auth;
pub mod memory;
pub mod provider;
pub mod wms;

pub use api::{GfmApi, HttpGfmApi, Product};
pub use auth::{authenticate, CredentialPrompt, CredentialSource, Credentials, UserSession};
pub use memory::MemoryGfmApi;
pub use provider::{DownloadLink, GfmProvider, GfmState};
