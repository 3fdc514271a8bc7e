//! Remote access shared by the providers of a flood map session.

use eofloods_core::config::{LayeredConfig, PlatformKind};
use eofloods_core::ports::ImageryPlatform;
use eofloods_core::Result;
use eofloods_gfm::{CredentialSource, GfmApi, HttpGfmApi, MemoryGfmApi};
use std::sync::Arc;

/// Configuration, platform connection and GFM client of one session
///
/// Created once at startup and handed to [`crate::FloodMap`]. The imagery
/// platform is connected on first use so GFM-only sessions need no platform
/// credentials.
pub struct SessionContext {
    config: LayeredConfig,
    platform: Option<Arc<dyn ImageryPlatform>>,
    gfm: Arc<dyn GfmApi>,
    credentials: CredentialSource,
}

impl SessionContext {
    /// Context with explicit adapters
    pub fn new(
        config: LayeredConfig,
        platform: Arc<dyn ImageryPlatform>,
        gfm: Arc<dyn GfmApi>,
        credentials: CredentialSource,
    ) -> Self {
        Self { config, platform: Some(platform), gfm, credentials }
    }

    /// Context whose adapters follow the configured platform kind
    pub fn from_config(config: LayeredConfig, credentials: CredentialSource) -> Result<Self> {
        let gfm: Arc<dyn GfmApi> = match config.platform.value {
            PlatformKind::Memory => Arc::new(MemoryGfmApi::synthetic()),
            PlatformKind::Remote => Arc::new(HttpGfmApi::new(&config.gfm_api_url.value)?),
        };
        Ok(Self { config, platform: None, gfm, credentials })
    }

    pub fn config(&self) -> &LayeredConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialSource {
        &self.credentials
    }

    pub fn gfm(&self) -> Arc<dyn GfmApi> {
        Arc::clone(&self.gfm)
    }

    /// Imagery platform, connecting it if needed
    pub fn platform(&mut self) -> Result<Arc<dyn ImageryPlatform>> {
        if let Some(platform) = &self.platform {
            return Ok(Arc::clone(platform));
        }
        let platform = eofloods_platform::connect(&self.config)?;
        self.platform = Some(Arc::clone(&platform));
        Ok(platform)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("platform", &self.platform.as_ref().map(|p| p.name().to_string()))
            .field("credentials", &self.credentials)
            .finish()
    }
}
