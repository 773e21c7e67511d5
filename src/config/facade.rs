//! Entry points for loading configuration.

use crate::config::merge::merge_policy;
use crate::config::sources::{global_file, workspace_file};
use crate::config::ExamwiseConfig;
use config::{Config, ConfigError, File};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the global file, then workspace files.
    pub fn load(workspace_root: &Path) -> Result<ExamwiseConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        builder.build()?.try_deserialize()
    }

    /// Load a single file, skipping the layered sources.
    pub fn load_from_file(path: &Path) -> Result<ExamwiseConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    /// Where `init` writes the starter configuration.
    pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
        workspace_root.join("config").join("config.toml")
    }

    /// Defaults rendered as TOML.
    pub fn starter_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&ExamwiseConfig::default())
    }
}
