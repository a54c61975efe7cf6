//! CLI Tooling
//!
//! Command-line interface over a persistent namespace. Every command runs in
//! a single store transaction that commits only when the command succeeds.

use crate::config::{ConfigLoader, NamespaceConfig};
use crate::error::NamespaceError;
use crate::events::TracingSink;
use crate::logging::LoggingConfig;
use crate::store::{MetadataStore, SledBackend};
use crate::tree::path::path_to_string;
use crate::tree::{
    get_path_components, Block, BlockCollector, ContentSummary, FileStatus, INode, NamespaceTree,
    PermissionStatus,
};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

/// First generation stamp handed to new blocks
const FIRST_GENERATION_STAMP: u64 = 1001;
const DEFAULT_BLOCK_SIZE: u64 = 128 * 1024 * 1024;
const MAX_BLOCKS_PER_FILE: u64 = 1 << 16;

/// nsmeta - partitioned namespace metadata
#[derive(Parser)]
#[command(name = "nsmeta")]
#[command(about = "Inspect and edit a partitioned file-system namespace")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Store directory (overrides storage.path)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold the logging flags over the configured logging section
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the root directory of an empty store
    Format,
    /// Create a directory
    Mkdir {
        path: String,
        /// Create missing parents; an existing directory is not an error
        #[arg(short, long)]
        parents: bool,
    },
    /// Create a file with blocks covering `size` bytes
    Touch {
        path: String,
        #[arg(long, default_value = "0")]
        size: u64,
        #[arg(long, default_value = "3")]
        replication: u16,
        #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: u64,
    },
    /// Create a symbolic link at `path` pointing to `target`
    Ln { target: String, path: String },
    /// Delete a path and everything under it
    Rm { path: String },
    /// Show the status of a path without following a final symlink
    Stat {
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
        /// Only list entries sorting after this name
        #[arg(long, default_value = "")]
        start_after: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Summarize length, counts and space usage under a path
    Du {
        #[arg(default_value = "/")]
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the subtree under a path
    Tree {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print the effective configuration as TOML
    Config,
}

/// CLI context for one open store
pub struct CliContext {
    config: NamespaceConfig,
    store: MetadataStore<SledBackend>,
    store_path: PathBuf,
    sink: TracingSink,
}

impl CliContext {
    /// Open the store named by `store_override` or the configuration
    pub fn open(
        config: NamespaceConfig,
        store_override: Option<PathBuf>,
    ) -> Result<Self, NamespaceError> {
        let store_path = config.storage.resolve_path(store_override)?;
        let backend = SledBackend::open(&store_path)?;
        info!(path = %store_path.display(), "Opened namespace store");
        Ok(Self {
            config,
            store: MetadataStore::new(backend),
            store_path,
            sink: TracingSink,
        })
    }

    pub fn config(&self) -> &NamespaceConfig {
        &self.config
    }

    pub fn store_path(&self) -> &PathBuf {
        &self.store_path
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, NamespaceError> {
        match command {
            Commands::Format => self.handle_format(),
            Commands::Mkdir { path, parents } => self.handle_mkdir(path, *parents),
            Commands::Touch {
                path,
                size,
                replication,
                block_size,
            } => self.handle_touch(path, *size, *replication, *block_size),
            Commands::Ln { target, path } => self.handle_ln(target, path),
            Commands::Rm { path } => self.handle_rm(path),
            Commands::Stat { path, format } => self.handle_stat(path, format),
            Commands::Ls {
                path,
                start_after,
                format,
            } => self.handle_ls(path, start_after, format),
            Commands::Du { path, format } => self.handle_du(path, format),
            Commands::Tree { path } => self.handle_tree(path),
            Commands::Config => ConfigLoader::to_toml(&self.config),
        }
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Permission for a new entry; the group is inherited from the parent
    fn permission(&self, mode: u16) -> PermissionStatus {
        PermissionStatus::new(self.config.root.owner.clone(), None, mode)
    }

    fn handle_format(&self) -> Result<String, NamespaceError> {
        let root = self.store.transaction(|txn| {
            NamespaceTree::new(txn, self.config.partitioning, &self.sink)
                .format(self.config.root.permission(), Self::now())
        })?;
        Ok(format!(
            "Namespace formatted at {} (root {})",
            self.store_path.display(),
            root.object_string()
        ))
    }

    fn handle_mkdir(&self, path: &str, parents: bool) -> Result<String, NamespaceError> {
        let created = self.store.transaction(|txn| {
            let mut tree = NamespaceTree::new(txn, self.config.partitioning, &self.sink);
            let root = tree.root()?;
            let components = get_path_components(path)?;
            let targets: Vec<String> = if parents {
                (2..=components.len())
                    .map(|end| path_to_string(&components[..end]))
                    .collect()
            } else {
                vec![path.to_string()]
            };

            let mut created = 0;
            for target in &targets {
                if parents {
                    if let Some(existing) = tree.get_node(&root, target, false)? {
                        if !existing.is_directory() {
                            return Err(NamespaceError::NotADirectory(target.clone()));
                        }
                        continue;
                    }
                }
                let dir = INode::directory(
                    self.store.allocate_id()?,
                    b"",
                    self.permission(0o755),
                    Self::now(),
                );
                if !tree.add_by_path(&root, target, dir)? {
                    return Err(NamespaceError::InvalidArgument(format!(
                        "File exists: {}",
                        target
                    )));
                }
                created += 1;
            }
            Ok(created)
        })?;
        let noun = if created == 1 { "directory" } else { "directories" };
        Ok(format!("Created {} {}", created, noun))
    }

    fn handle_touch(
        &self,
        path: &str,
        size: u64,
        replication: u16,
        block_size: u64,
    ) -> Result<String, NamespaceError> {
        if block_size == 0 {
            return Err(NamespaceError::InvalidArgument(
                "Block size must be positive".to_string(),
            ));
        }
        let num_blocks = size.div_ceil(block_size);
        if num_blocks > MAX_BLOCKS_PER_FILE {
            return Err(NamespaceError::InvalidArgument(format!(
                "{} bytes needs {} blocks of {} bytes, the limit is {}",
                size, num_blocks, block_size, MAX_BLOCKS_PER_FILE
            )));
        }
        let file = self.store.transaction(|txn| {
            let mut tree = NamespaceTree::new(txn, self.config.partitioning, &self.sink);
            let root = tree.root()?;
            let mut file = INode::file(
                self.store.allocate_id()?,
                b"",
                self.permission(0o644),
                Self::now(),
                replication,
                block_size,
            );
            let mut remaining = size;
            while remaining > 0 {
                let num_bytes = remaining.min(block_size);
                if let Some(attrs) = file.file_attrs_mut() {
                    attrs.blocks.push(Block {
                        block_id: self.store.allocate_id()?,
                        num_bytes,
                        generation_stamp: FIRST_GENERATION_STAMP,
                    });
                }
                remaining -= num_bytes;
            }
            if !tree.add_by_path(&root, path, file.clone())? {
                return Err(NamespaceError::InvalidArgument(format!(
                    "File exists: {}",
                    path
                )));
            }
            Ok(file)
        })?;
        Ok(format!(
            "Created {} ({} bytes in {} blocks)",
            path,
            size,
            file.file_attrs().map(|f| f.blocks.len()).unwrap_or(0)
        ))
    }

    fn handle_ln(&self, target: &str, path: &str) -> Result<String, NamespaceError> {
        self.store.transaction(|txn| {
            let mut tree = NamespaceTree::new(txn, self.config.partitioning, &self.sink);
            let root = tree.root()?;
            let link = INode::symlink(
                self.store.allocate_id()?,
                b"",
                target,
                self.permission(0o777),
                Self::now(),
            );
            if !tree.add_by_path(&root, path, link)? {
                return Err(NamespaceError::InvalidArgument(format!(
                    "File exists: {}",
                    path
                )));
            }
            Ok(())
        })?;
        Ok(format!("{} -> {}", path, target))
    }

    fn handle_rm(&self, path: &str) -> Result<String, NamespaceError> {
        let (removed, blocks) = self.store.transaction(|txn| {
            let mut tree = NamespaceTree::new(txn, self.config.partitioning, &self.sink);
            let root = tree.root()?;
            let mut collector = BlockCollector::new();
            let removed = tree.delete(&root, path, &mut collector)?;
            if removed == 0 {
                return Err(NamespaceError::NotFound(format!(
                    "File does not exist: {}",
                    path
                )));
            }
            Ok((removed, collector.into_blocks()))
        })?;
        let bytes: u64 = blocks.iter().map(|b| b.num_bytes).sum();
        Ok(format!(
            "Deleted {} inodes, released {} blocks ({} bytes)",
            removed,
            blocks.len(),
            bytes
        ))
    }

    fn handle_stat(&self, path: &str, format: &str) -> Result<String, NamespaceError> {
        let status = self.store.transaction(|txn| {
            let tree = NamespaceTree::new(txn, self.config.partitioning, &self.sink);
            let root = tree.root()?;
            tree.file_status(&root, path)
        })?;
        let status = status
            .ok_or_else(|| NamespaceError::NotFound(format!("File does not exist: {}", path)))?;
        if format == "json" {
            return to_json(&status);
        }
        let mut out = String::new();
        out.push_str(&format!("Path:        {}\n", status.path));
        out.push_str(&format!("Type:        {}\n", type_name(&status)));
        out.push_str(&format!("Id:          {}\n", status.file_id));
        out.push_str(&format!(
            "Partition:   {}\n",
            hex::encode(status.partition_key.to_be_bytes())
        ));
        out.push_str(&format!("Length:      {}\n", status.length));
        out.push_str(&format!("Replication: {}\n", status.replication));
        out.push_str(&format!("Permission:  {}\n", mode_string(&status)));
        out.push_str(&format!(
            "Owner:       {}:{}\n",
            status.owner,
            status.group.as_deref().unwrap_or("-")
        ));
        out.push_str(&format!("Modified:    {}\n", format_time(status.modification_time)));
        if let Some(target) = &status.symlink {
            out.push_str(&format!("Target:      {}\n", target));
        }
        if status.is_dir {
            out.push_str(&format!("Children:    {}\n", status.children_num));
        }
        Ok(out)
    }

    fn handle_ls(&self, path: &str, start_after: &str, format: &str) -> Result<String, NamespaceError> {
        let listing = self.store.transaction(|txn| {
            let tree = NamespaceTree::new(txn, self.config.partitioning, &self.sink);
            let root = tree.root()?;
            tree.list_status(&root, path, start_after.as_bytes())
        })?;
        if format == "json" {
            return to_json(&listing);
        }
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec![
            "Permission",
            "Owner",
            "Group",
            "Size",
            "Modified",
            "Name",
            "Id",
            "Partition",
        ]);
        for status in &listing {
            let name = match &status.symlink {
                Some(target) => format!("{} -> {}", status.path, target),
                None => status.path.clone(),
            };
            table.add_row(vec![
                mode_string(status),
                status.owner.clone(),
                status.group.clone().unwrap_or_else(|| "-".to_string()),
                status.length.to_string(),
                format_time(status.modification_time),
                name,
                status.file_id.to_string(),
                hex::encode(status.partition_key.to_be_bytes()),
            ]);
        }
        Ok(table.to_string())
    }

    fn handle_du(&self, path: &str, format: &str) -> Result<String, NamespaceError> {
        let summary = self.store.transaction(|txn| {
            let tree = NamespaceTree::new(txn, self.config.partitioning, &self.sink);
            let root = tree.root()?;
            let node = tree
                .get_node(&root, path, true)?
                .ok_or_else(|| NamespaceError::NotFound(format!("File does not exist: {}", path)))?;
            tree.compute_content_summary(&node, ContentSummary::default())
        })?;
        if format == "json" {
            return to_json(&json!({
                "path": path,
                "length": summary.length,
                "file_count": summary.file_count,
                "directory_count": summary.directory_count,
                "space_consumed": summary.space_consumed,
            }));
        }
        Ok(format!(
            "{}\n  length: {}\n  files: {}\n  directories: {}\n  space consumed: {}",
            path, summary.length, summary.file_count, summary.directory_count, summary.space_consumed
        ))
    }

    fn handle_tree(&self, path: &str) -> Result<String, NamespaceError> {
        self.store.transaction(|txn| {
            let tree = NamespaceTree::new(txn, self.config.partitioning, &self.sink);
            let root = tree.root()?;
            let node = tree
                .get_node(&root, path, true)?
                .ok_or_else(|| NamespaceError::NotFound(format!("File does not exist: {}", path)))?;
            tree.dump_tree_recursively(&node)
        })
    }
}

fn to_json<S: serde::Serialize>(value: &S) -> Result<String, NamespaceError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| NamespaceError::InvalidArgument(format!("Failed to render JSON: {}", e)))
}

fn type_name(status: &FileStatus) -> &'static str {
    if status.is_dir {
        "directory"
    } else if status.is_symlink() {
        "symlink"
    } else {
        "file"
    }
}

/// `ls -l` style mode, e.g. `drwxr-xr-x`
fn mode_string(status: &FileStatus) -> String {
    let mut out = String::with_capacity(10);
    out.push(if status.is_dir {
        'd'
    } else if status.is_symlink() {
        'l'
    } else {
        '-'
    });
    for shift in [6u16, 3, 0] {
        let bits = (status.permission >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

fn format_time(millis: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
