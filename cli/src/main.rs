use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use usc_core::engine::Engine;

#[derive(Debug, Parser)]
#[command(
    name = "usc",
    author,
    version,
    about = "UnrealScript symbol engine",
    long_about = None
)]
struct CliArgs {
    /// Workspace root: the directory holding `Development/Src`, or any
    /// directory of .uc sources
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover the workspace's classes and write the class cache
    Index,
    /// List every known class and its parent
    Classes,
    /// Completion entries at a cursor position
    Complete {
        file: PathBuf,
        /// 1-based line number
        #[arg(long)]
        line: usize,
        /// 1-based column
        #[arg(long)]
        col: usize,
    },
    /// Declaration site of the symbol at a cursor position
    Def {
        file: PathBuf,
        /// 1-based line number
        #[arg(long)]
        line: usize,
        /// 1-based column
        #[arg(long)]
        col: usize,
    },
    /// Hover markdown for the symbol at a cursor position
    Hover {
        file: PathBuf,
        /// 1-based line number
        #[arg(long)]
        line: usize,
        /// 1-based column
        #[arg(long)]
        col: usize,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();
    let engine = Engine::activate(&args.root).await?;

    match args.command {
        Commands::Index => {
            let classes = engine.class_overview().await;
            println!(
                "indexed {} classes (cache at {})",
                classes.len(),
                engine.source_root().join(usc_core::cache::CACHE_FILE).display()
            );
        }
        Commands::Classes => {
            let mut classes = engine.class_overview().await;
            classes.sort();
            for (name, parent) in classes {
                if parent.is_empty() {
                    println!("{name}");
                } else {
                    println!("{name} extends {parent}");
                }
            }
        }
        Commands::Complete { file, line, col } => {
            for entry in engine.autocomplete(&file, line, col.saturating_sub(1)).await? {
                println!("{entry}");
            }
        }
        Commands::Def { file, line, col } => {
            match engine.definition_at(&file, line, col.saturating_sub(1)).await? {
                Some(target) => println!("{}:{}", target.file.display(), target.line),
                None => bail!("no definition found at {}:{line}:{col}", file.display()),
            }
        }
        Commands::Hover { file, line, col } => {
            match engine.hover_at(&file, line, col.saturating_sub(1)).await? {
                Some(text) => println!("{text}"),
                None => bail!("nothing to show at {}:{line}:{col}", file.display()),
            }
        }
    }
    Ok(())
}
