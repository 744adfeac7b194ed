//! Asset discovery and stylesheet links

use std::io;
use std::path::Path;

use tracing::debug;

/// List the entry names of the assets directory, sorted
///
/// A missing or unreadable directory is an `Err`; the caller decides whether
/// that is worth a warning.
pub async fn list_assets(dir: &Path) -> io::Result<Vec<String>> {
    debug!(?dir, "list_assets: called");
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    debug!(count = names.len(), "list_assets: done");
    Ok(names)
}

/// One `<link rel="stylesheet">` line per asset, in the given order
///
/// `assets_dir` is the directory name as served from the site root.
pub fn stylesheet_links(assets_dir: &str, assets: &[String]) -> String {
    let base = escape_attribute(assets_dir.trim_matches('/'));
    assets
        .iter()
        .map(|name| {
            format!(
                "<link rel=\"stylesheet\" href=\"/{}/{}\" />\n",
                base,
                escape_attribute(name)
            )
        })
        .collect()
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
