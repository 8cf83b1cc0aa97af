//! Manifest command (`gerrit-view manifest`)

use crate::ManifestFormat;
use anyhow::{Context, Result};
use gerrit_view_core::manifest::PackageDescriptor;
use std::path::Path;

/// Assemble the package manifest under `root` and print it.
pub fn manifest(root: &Path, format: ManifestFormat) -> Result<()> {
    let manifest = PackageDescriptor::new(root)
        .assemble()
        .with_context(|| format!("Failed to assemble manifest in {}", root.display()))?;

    let rendered = match format {
        ManifestFormat::Json => serde_json::to_string_pretty(&manifest)?,
        ManifestFormat::Toml => toml::to_string_pretty(&manifest)?,
    };
    println!("{rendered}");
    Ok(())
}
