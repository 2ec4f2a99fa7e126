use anyhow::Result;
use ignore::WalkBuilder;
use log::{debug, trace};
use std::path::{Path, PathBuf};

use crate::constants::PAGE_EXTENSIONS;

/// Directories that never contain app-router pages.
const SKIP_DIRS: &[&str] = &["node_modules", ".next", ".vercel", ".git"];

/// Walk the project tree and collect app-router page files: any file
/// named `page` with a component extension. Honors .gitignore, skips
/// vendor/build/hidden directories. Results are canonicalized and
/// sorted so repeated runs visit pages in the same order.
pub fn collect_pages(root: &Path) -> Result<Vec<PathBuf>> {
    debug!("Collecting page files under {}", root.display());
    let mut pages: Vec<PathBuf> = Vec::new();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(true)
        .git_ignore(true)
        .filter_entry(|entry| {
            // The root itself may be hidden (e.g. a dot-prefixed
            // checkout dir); only filter below it
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIP_DIRS.contains(&name.as_ref())
        })
        .build();

    for res in walker {
        let dent = res?;
        let p = dent.path();
        if !p.is_file() {
            continue;
        }

        let is_page = p.file_stem().and_then(|s| s.to_str()) == Some("page");
        let has_page_ext = p
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| PAGE_EXTENSIONS.contains(&ext));

        if is_page && has_page_ext {
            trace!("Found page file: {}", p.display());
            pages.push(p.canonicalize().unwrap_or_else(|_| p.to_path_buf()));
        }
    }

    pages.sort();
    debug!("Collected {} page files", pages.len());
    Ok(pages)
}
