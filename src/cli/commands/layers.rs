//! Layers command - list contributed layers

use crate::cli::args::{LayersArgs, OutputFormat};
use crate::config::Config;
use crate::dependency::Version;
use crate::error::{StrataError, StrataResult};
use crate::launch::LAUNCH_MANIFEST_FILE;
use crate::layer::{KeyPolicy, LayerMetadata, DEPENDENCY_METADATA_FILE};
use console::style;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// A layer found on disk together with its metadata record
#[derive(Debug, Clone, Serialize)]
pub struct LayerEntry {
    pub kind: &'static str,
    pub id: String,
    pub version: String,
    pub sha256: String,
    pub uri: String,
    pub path: PathBuf,
    pub contributed_at: Option<String>,
}

impl LayerEntry {
    fn new(policy: KeyPolicy, record: LayerMetadata, path: PathBuf) -> Self {
        Self {
            kind: match policy {
                KeyPolicy::ContentHash => "cache",
                KeyPolicy::Identity => "launch",
            },
            id: record.id,
            version: record.version,
            sha256: record.sha256,
            uri: record.uri,
            path,
            contributed_at: record.contributed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Execute the layers command
pub async fn execute(args: LayersArgs, config: &Config) -> StrataResult<()> {
    let entries = list_layers(&config.layers.cache_root(), &config.layers.launch_root()).await?;

    if entries.is_empty() {
        println!("No layers found.");
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_layer_table(&entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}", entry.path.display());
            }
        }
    }

    Ok(())
}

fn print_layer_table(entries: &[LayerEntry]) {
    println!(
        "{:<8} {:<20} {:<14} {:<14} {:<20}",
        "KIND", "ID", "VERSION", "SHA256", "CONTRIBUTED"
    );
    println!("{}", "-".repeat(80));

    for entry in entries {
        let kind = match entry.kind {
            "cache" => style(format!("{:<8}", entry.kind)).dim().to_string(),
            _ => style(format!("{:<8}", entry.kind)).cyan().to_string(),
        };
        let short_hash: String = entry.sha256.chars().take(12).collect();
        let contributed = entry.contributed_at.as_deref().unwrap_or("-");

        println!(
            "{} {:<20} {:<14} {:<14} {:<20}",
            kind, entry.id, entry.version, short_hash, contributed
        );
    }

    println!();
    println!("Total: {} layer(s)", entries.len());
}

/// Collect every layer with a readable record under both roots
///
/// Unreadable records are skipped with a warning; listing never fails on a
/// single bad layer.
pub async fn list_layers(cache_root: &Path, launch_root: &Path) -> StrataResult<Vec<LayerEntry>> {
    let mut entries = Vec::new();

    for dir in read_dir_paths(cache_root).await? {
        let record_path = dir.join(DEPENDENCY_METADATA_FILE);
        if !dir.is_dir() || !record_path.is_file() {
            continue;
        }
        if let Some(record) = read_record(&record_path).await {
            entries.push(LayerEntry::new(KeyPolicy::ContentHash, record, dir));
        }
    }

    for path in read_dir_paths(launch_root).await? {
        let is_record = path.extension().is_some_and(|ext| ext == "toml")
            && path.file_name().is_some_and(|name| name != LAUNCH_MANIFEST_FILE)
            && path.is_file();
        if !is_record {
            continue;
        }
        if let Some(record) = read_record(&path).await {
            let layer_dir = path.with_extension("");
            entries.push(LayerEntry::new(KeyPolicy::Identity, record, layer_dir));
        }
    }

    entries.sort_by(|a, b| {
        a.kind
            .cmp(b.kind)
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| Version::new(a.version.as_str()).cmp(&Version::new(b.version.as_str())))
    });

    Ok(entries)
}

async fn read_dir_paths(dir: &Path) -> StrataResult<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} does not exist", dir.display());
            return Ok(vec![]);
        }
        Err(e) => return Err(StrataError::io(format!("reading {}", dir.display()), e)),
    };

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StrataError::io(format!("reading {}", dir.display()), e))?
    {
        paths.push(entry.path());
    }
    Ok(paths)
}

async fn read_record(path: &Path) -> Option<LayerMetadata> {
    let content = fs::read_to_string(path).await.ok()?;
    match LayerMetadata::parse(&content, path) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Skipping layer: {}", e);
            None
        }
    }
}
