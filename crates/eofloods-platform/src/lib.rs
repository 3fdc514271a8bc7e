//! Adapters for the [`ImageryPlatform`] port.

pub mod memory;
pub mod remote;
pub mod session;

pub use memory::{MemoryPlatform, Revisit, Scene};
pub use remote::RemotePlatform;
pub use session::PlatformSession;

use eofloods_core::config::{LayeredConfig, PlatformKind};
use eofloods_core::ports::ImageryPlatform;
use eofloods_core::Result;
use std::sync::Arc;

/// Connect to the platform selected in the configuration
///
/// The remote adapter needs a [`PlatformSession`], discovered from the
/// environment and the cached credentials file.
pub fn connect(config: &LayeredConfig) -> Result<Arc<dyn ImageryPlatform>> {
    match config.platform.value {
        PlatformKind::Memory => Ok(Arc::new(MemoryPlatform::synthetic())),
        PlatformKind::Remote => {
            let session = PlatformSession::from_env()?;
            Ok(Arc::new(RemotePlatform::new(&config.platform_url.value, session)?))
        }
    }
}
