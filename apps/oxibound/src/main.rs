use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use oxibound_graph::{
    Config, OxcResolver, Project, SourceFileCache, print_no_pages_message, print_route_report,
};
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oxibound")]
#[command(about = "Map the client/server boundaries of a Next.js project", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl the project and report which routes cross the client boundary
    Analyze(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Analyze(cfg) => {
            let root = cfg.resolved_root()?;
            info!("Using root directory: {}", root.display());

            let project = Project::new(&root, cfg.tsconfig.clone());
            let cache = SourceFileCache::new(root.join(&cfg.cache_dir));

            if cfg.skip_cache {
                debug!("Cache restore skipped");
            } else {
                cache.restore_from_file()?;
            }

            let resolver = OxcResolver::new(project.root(), project.tsconfig_path());
            let result = project.analyze(&cache, &resolver)?;

            if result.reports.is_empty() {
                print_no_pages_message(&mut stdout)?;
            } else {
                print_route_report(&mut stdout, &result, &root)?;
            }

            cache.write_to_file()?;

            let elapsed_ms = start.elapsed().as_millis();
            writeln!(
                stdout,
                "\n{} Finished in {}ms on {} files.",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan(),
                result.files_analyzed.to_string().cyan()
            )?;
            stdout.flush()?;

            Ok(())
        }
    }
}
