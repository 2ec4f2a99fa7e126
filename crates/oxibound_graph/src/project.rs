use anyhow::Result;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use oxibound_core::collect_pages;

use crate::cache::SourceFileCache;
use crate::graph::DependencyGraph;
use crate::module_resolver::ModuleResolver;

/// One page's analysis: where it lives, the route it serves (none for
/// pages outside the router root), and whether anything in its
/// dependency closure crosses the client boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    pub page: PathBuf,
    pub route: Option<String>,
    pub uses_client_side_rendering: bool,
}

#[derive(Debug, Clone)]
pub struct AnalyzeResult {
    pub reports: Vec<PageReport>,
    pub files_analyzed: usize,
}

/// A Next.js project under analysis: a root directory and the
/// tsconfig that drives module resolution.
pub struct Project {
    root: PathBuf,
    tsconfig_path: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, tsconfig_path: Option<PathBuf>) -> Self {
        let root = root.into();
        let tsconfig_path = tsconfig_path.unwrap_or_else(|| root.join("tsconfig.json"));
        Self { root, tsconfig_path }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tsconfig_path(&self) -> &Path {
        &self.tsconfig_path
    }

    pub fn find_pages(&self) -> Result<Vec<PathBuf>> {
        collect_pages(&self.root)
    }

    /// Crawl every page's dependency closure, one graph per page over
    /// a shared cache, and report per-route client-boundary usage.
    pub fn analyze(
        &self,
        cache: &SourceFileCache,
        resolver: &dyn ModuleResolver,
    ) -> Result<AnalyzeResult> {
        info!("Analyzing project at {}", self.root.display());

        let pages = self.find_pages()?;
        if pages.is_empty() {
            warn!("No page files found under {}", self.root.display());
        } else {
            info!("Found {} pages", pages.len());
        }

        let mut reports = Vec::with_capacity(pages.len());
        for page in pages {
            let route = infer_route(&page);
            debug!("Building graph for page {} (route: {:?})", page.display(), route);

            let outcome = DependencyGraph::new(&page).build(cache, resolver)?;
            reports.push(PageReport {
                page,
                route,
                uses_client_side_rendering: outcome.uses_client_side_rendering,
            });
        }

        info!("Analyzed {} files across {} pages", cache.len(), reports.len());
        Ok(AnalyzeResult { reports, files_analyzed: cache.len() })
    }
}

/// Derive the route a page serves from its location under the `app`
/// router root: everything after the `app` segment with the file name
/// stripped. `.../app/page.tsx` collapses to `/`. Pages with no `app`
/// segment serve no route.
pub fn infer_route(page: &Path) -> Option<String> {
    let components: Vec<_> = page.iter().collect();
    let app_idx = components.iter().position(|c| *c == "app")?;

    // Between the router root and the file name
    let rest = &components[app_idx + 1..];
    let segments: Vec<String> = rest[..rest.len().saturating_sub(1)]
        .iter()
        .map(|c| c.to_string_lossy().to_string())
        .collect();

    if segments.is_empty() { Some("/".to_string()) } else { Some(format!("/{}", segments.join("/"))) }
}
