use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use oxibound_core::find_git_root;

#[derive(Debug, Clone, Parser)]
#[command(name = "analyze")]
#[command(about = "Crawl a Next.js project and map its client boundaries")]
pub struct Config {
    /// Root directory of the project (defaults to git root)
    #[arg(long, short = 'p')]
    pub root: Option<PathBuf>,

    /// Do not restore cached analysis from disk before crawling
    #[arg(long)]
    pub skip_cache: bool,

    /// Directory the analysis cache is stored in, relative to the project root
    #[arg(long, default_value = ".oxibound")]
    pub cache_dir: PathBuf,

    /// tsconfig used for module resolution (defaults to <root>/tsconfig.json)
    #[arg(long)]
    pub tsconfig: Option<PathBuf>,
}

impl Config {
    /// The project root to crawl: the `--root` option when given,
    /// otherwise the enclosing git repository.
    pub fn resolved_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(r) => Ok(r.canonicalize().unwrap_or_else(|_| r.clone())),
            None => find_git_root(),
        }
    }
}
