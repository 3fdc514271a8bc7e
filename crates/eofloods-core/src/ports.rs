//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

pub mod platform;

pub use platform::ImageryPlatform;
