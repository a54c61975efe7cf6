//! MergeService: stacks the sources and deserializes to [`NamespaceConfig`].

use super::paths::default_config_path;
use super::sources;
use super::NamespaceConfig;
use crate::error::NamespaceError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, NamespaceError> {
    Ok(Config::builder()
        .set_default("partitioning.random_partitioning_max_level", 1i64)?
        .set_default("root.owner", "hdfs")?
        .set_default("root.mode", 0o755i64)?)
}

pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> config file -> environment (highest).
    ///
    /// An explicit `path` must exist; otherwise the platform config file is
    /// used when present.
    pub fn load(path: Option<&Path>) -> Result<NamespaceConfig, NamespaceError> {
        Self::load_with_env(path, None)
    }

    /// Like [`MergeService::load`] with the environment replaced by `vars`
    pub fn load_with_env(
        path: Option<&Path>,
        vars: Option<HashMap<String, String>>,
    ) -> Result<NamespaceConfig, NamespaceError> {
        let builder = builder_with_defaults()?;
        let builder = match path {
            Some(p) => sources::add_file(builder, p, true)?,
            None => match default_config_path() {
                Ok(p) => sources::add_file(builder, &p, false)?,
                Err(e) => {
                    debug!(error = %e, "No platform config file");
                    builder
                }
            },
        };
        let builder = sources::add_environment(builder, vars);

        let config: NamespaceConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
