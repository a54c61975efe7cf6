//! Structured logging for the namespace tools.
//!
//! The `[logging]` config section picks the level, format and sink. Each of
//! them can be overridden from the environment with `NSMETA_LOG`,
//! `NSMETA_LOG_MODULES`, `NSMETA_LOG_FORMAT`, `NSMETA_LOG_OUTPUT` and
//! `NSMETA_LOG_FILE`. Level `off` silences everything.

use crate::config::paths::default_log_file_path;
use crate::error::NamespaceError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// `[logging]` section of the namespace config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error or off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// text or json
    #[serde(default = "default_format")]
    pub format: String,

    /// stdout, stderr, file, file+stderr or both
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file for the file outputs; the platform state dir when unset
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Per-target levels, e.g. `"nsmeta::mutations" = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            modules: HashMap::new(),
        }
    }
}

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogOutput {
    Stdout,
    Stderr,
    File,
    FileAndStderr,
    StdoutAndStderr,
}

impl FromStr for LogOutput {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "file" => Ok(Self::File),
            "file+stderr" => Ok(Self::FileAndStderr),
            "both" => Ok(Self::StdoutAndStderr),
            other => Err(NamespaceError::ConfigError(format!(
                "Unknown log output '{}'; expected stdout, stderr, file, file+stderr or both",
                other
            ))),
        }
    }
}

impl LogOutput {
    fn uses_file(self) -> bool {
        matches!(self, Self::File | Self::FileAndStderr)
    }
}

/// Pick the log file: explicit path, then `NSMETA_LOG_FILE`, then the state dir
pub fn resolve_log_file_path(explicit: Option<&Path>) -> Result<PathBuf, NamespaceError> {
    if let Some(p) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(p.to_path_buf());
    }
    match std::env::var("NSMETA_LOG_FILE") {
        Ok(p) if !p.is_empty() => Ok(PathBuf::from(p)),
        _ => default_log_file_path(),
    }
}

/// Install the global subscriber described by `config` and the environment
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), NamespaceError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    let filter = env_filter(config)?;
    let json = log_format(config)? == "json";
    let output = log_output(config)?;
    let writer = make_writer(output, config.file.as_deref())?;

    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);
    let registry = Registry::default().with(filter);
    let installed = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer.with_ansi(!output.uses_file())).try_init()
    };
    installed.map_err(|e| NamespaceError::ConfigError(format!("Failed to install logger: {}", e)))
}

fn make_writer(output: LogOutput, file: Option<&Path>) -> Result<BoxMakeWriter, NamespaceError> {
    Ok(match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::StdoutAndStderr => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
        LogOutput::File => BoxMakeWriter::new(open_log_file(&resolve_log_file_path(file)?)?),
        LogOutput::FileAndStderr => BoxMakeWriter::new(
            open_log_file(&resolve_log_file_path(file)?)?.and(std::io::stderr),
        ),
    })
}

fn open_log_file(path: &Path) -> Result<std::fs::File, NamespaceError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| {
            NamespaceError::ConfigError(format!("Cannot create log directory {:?}: {}", dir, e))
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| NamespaceError::ConfigError(format!("Cannot open log file {:?}: {}", path, e)))
}

fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, NamespaceError> {
    if let Ok(filter) = EnvFilter::try_from_env("NSMETA_LOG") {
        return Ok(filter);
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let env_modules = std::env::var("NSMETA_LOG_MODULES").unwrap_or_default();
    let env_pairs = env_modules
        .split(',')
        .filter_map(|spec| spec.split_once('='));
    let config_pairs = config.modules.iter().map(|(m, l)| (m.as_str(), l.as_str()));

    config_pairs
        .chain(env_pairs)
        .try_fold(EnvFilter::new(&config.level), |filter, (module, level)| {
            Ok(filter.add_directive(module_directive(module, level)?))
        })
}

fn module_directive(module: &str, level: &str) -> Result<Directive, NamespaceError> {
    format!("{}={}", module.trim(), level.trim())
        .parse()
        .map_err(|e| NamespaceError::ConfigError(format!("Bad log directive for {}: {}", module, e)))
}

fn log_format(config: &LoggingConfig) -> Result<String, NamespaceError> {
    if let Ok(format) = std::env::var("NSMETA_LOG_FORMAT") {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }
    match config.format.as_str() {
        "json" | "text" => Ok(config.format.clone()),
        other => Err(NamespaceError::ConfigError(format!(
            "Unknown log format '{}'; expected json or text",
            other
        ))),
    }
}

fn log_output(config: &LoggingConfig) -> Result<LogOutput, NamespaceError> {
    match std::env::var("NSMETA_LOG_OUTPUT") {
        Ok(output) => output.parse(),
        Err(_) => config.output.parse(),
    }
}
