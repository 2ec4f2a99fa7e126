use log::trace;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// The slice of a package manifest the crawler cares about.
#[derive(Debug, Clone, Deserialize)]
struct Manifest {
    name: Option<String>,
}

/// The package that owns a file, found via its nearest manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageInfo {
    pub name: String,
    pub dir: PathBuf,
}

/// Walk upward from `dir` to the nearest ancestor containing a
/// `package.json` (nearest ancestor wins). The package name comes from
/// the manifest's `name` field, falling back to the directory name
/// when the manifest is unreadable or unnamed.
pub fn find_owning_package(dir: &Path) -> Option<PackageInfo> {
    let mut current = dir;

    loop {
        let manifest_path = current.join("package.json");
        if manifest_path.is_file() {
            trace!("Found owning manifest at {}", manifest_path.display());
            let name = manifest_name(&manifest_path)
                .or_else(|| current.file_name().map(|n| n.to_string_lossy().to_string()))?;
            return Some(PackageInfo { name, dir: current.to_path_buf() });
        }

        current = current.parent()?;
    }
}

fn manifest_name(manifest_path: &Path) -> Option<String> {
    let txt = fs::read_to_string(manifest_path).ok()?;
    let manifest: Manifest = serde_json::from_str(&txt).ok()?;
    manifest.name
}
