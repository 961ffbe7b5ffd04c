mod app;
mod config;
mod fs_scan;
mod hierarchy;
mod listing;
mod reader;
mod types;
mod writer;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use types::ROOT_MARKER;
use writer::StringStyle;

#[derive(Parser, Debug)]
#[command(author, version, about = "Snapshot a directory tree into a window[\"name\"] = [...] script")]
struct Cli {
    /// YAML config; defaults to dir_snapshot.yaml next to the executable
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Emit JSON-escaped strings instead of raw quoted names
    #[arg(long, global = true)]
    escape: bool,

    /// Record symlinks as links instead of following them
    #[arg(long, global = true)]
    no_follow_links: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory (default: current dir) and write <output-dir>/<name>.js
    Snapshot {
        #[arg(long)]
        root: Option<PathBuf>,
        /// Dataset / variable name; defaults to the root's base name
        #[arg(long)]
        name: Option<String>,
    },
    /// List generated datasets and print their directories
    Show {
        /// .js files or directories holding them; defaults to --output-dir
        files: Vec<PathBuf>,
        /// dataset/a/b: only the chain of directories down to b
        #[arg(long)]
        path: Option<String>,
    },
}

fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.join("dir_snapshot.yaml")))
        .unwrap_or_else(|| PathBuf::from("dir_snapshot.yaml"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "dir_snapshot=debug" } else { "dir_snapshot=info" };
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.parse()?),
        )
        .init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let yaml = config::load_yaml(&config_path)?.unwrap_or_default();
    tracing::debug!(config = %config_path.display(), ?yaml, "config loaded");

    let escape = cli.escape || yaml.escape_strings.unwrap_or(false);
    let cfg = app::AppConfig {
        output_dir: cli
            .output_dir
            .or(yaml.output_dir)
            .unwrap_or_else(config::default_output_dir),
        root_marker: yaml.root_marker.unwrap_or_else(|| ROOT_MARKER.to_string()),
        follow_links: !cli.no_follow_links && yaml.follow_links.unwrap_or(true),
        style: if escape { StringStyle::Escaped } else { StringStyle::Raw },
    };

    match cli.cmd {
        None => {
            let root = std::env::current_dir()?;
            app::snapshot(&cfg, &root, None)?;
        }
        Some(Commands::Snapshot { root, name }) => {
            let root = match root {
                Some(r) => r,
                None => std::env::current_dir()?,
            };
            app::snapshot(&cfg, &root, name.as_deref())?;
        }
        Some(Commands::Show { files, path }) => app::show(&cfg, &files, path.as_deref())?,
    }

    Ok(())
}
