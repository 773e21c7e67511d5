//! Merge rules: defaults, override order, conflict handling.

use crate::config::{DEFAULT_IMAGE_URL, DEFAULT_STORE_PATH};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("storage.store_path", DEFAULT_STORE_PATH)?
        .set_default("defaults.image_url", DEFAULT_IMAGE_URL)
}
