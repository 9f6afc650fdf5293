//! apidecl: collect, merge, filter and emit versioned API declarations.
//!
//! ```text
//! apidecl collect --version 10.2.7 -o snapshots/10.2.7.json Blizzard_APIDocumentation/
//! apidecl merge -o merged.json snapshots/10.2.7.json snapshots/11.0.0.json
//! apidecl emit --version 11.0.0 -f lua -o annotations merged.json
//! ```

use anyhow::{Context, Result};
use apidecl::model::{ApiBuilder, ApiCollection};
use apidecl::{parser, render, store};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "apidecl",
    about = "Merge per-release API declarations into one version-aware collection"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse sources of one release into a JSON snapshot
    Collect {
        /// Release the sources describe
        #[arg(long = "version", value_name = "X.Y.Z")]
        release: semver::Version,

        /// Snapshot file to write
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Input files, directories or glob patterns (.lua, .html)
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Merge snapshots, oldest first, into one collection
    Merge {
        /// Merged collection to write
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Snapshot files in merge order
        #[arg(required = true)]
        snapshots: Vec<PathBuf>,
    },

    /// Keep only the entities valid at a release
    Filter {
        #[arg(long = "version", value_name = "X.Y.Z")]
        release: semver::Version,

        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Merged collection to read
        input: PathBuf,
    },

    /// Render the entities valid at a release, one file per partition
    Emit {
        #[arg(long = "version", value_name = "X.Y.Z")]
        release: semver::Version,

        /// Output format: lua (default), markdown, json
        #[arg(short = 'f', long, default_value = "lua")]
        format: String,

        /// Output directory
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Header template prepended to every file.
        /// Supports ${name} and ${version} substitution.
        #[arg(long)]
        header: Option<PathBuf>,

        /// Merged collection to read
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Collect {
            release,
            output,
            inputs,
        } => collect(&release, &output, &inputs),
        Command::Merge { output, snapshots } => merge(&output, &snapshots),
        Command::Filter {
            release,
            output,
            input,
        } => {
            let filtered = store::load(&input)?.filter_for_version(&release);
            store::save(&output, &filtered)?;
            Ok(())
        }
        Command::Emit {
            release,
            format,
            output,
            header,
            input,
        } => emit(&release, &format, &output, header.as_deref(), &input),
    }
}

/// `RUST_LOG` when set, otherwise a level picked by `-v` count. Logs go to stderr.
fn init_tracing(verbose: u8) {
    let base_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
        .to_string()
    });
    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 2)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Parse every input of one release and append them into a single snapshot.
fn collect(release: &semver::Version, output: &Path, inputs: &[String]) -> Result<()> {
    let mut snapshot = ApiCollection::new();
    for path in expand_globs(inputs)? {
        if !parser::is_supported(&path) {
            warn!(path = %path.display(), "skipping unsupported file");
            continue;
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let parsed = parser::parse_file(&path, &content, release)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        info!(path = %path.display(), entities = parsed.len(), "parsed");
        snapshot.append(parsed);
    }
    if snapshot.is_empty() {
        warn!(%release, "snapshot is empty");
    }
    store::save(output, &snapshot)?;
    Ok(())
}

fn merge(output: &Path, snapshots: &[PathBuf]) -> Result<()> {
    let mut builder = ApiBuilder::new();
    for path in snapshots {
        builder.add(store::load(path)?);
    }
    let merged = builder.merge()?;
    store::save(output, &merged)?;
    Ok(())
}

fn emit(
    release: &semver::Version,
    format: &str,
    output_dir: &Path,
    header: Option<&Path>,
    input: &Path,
) -> Result<()> {
    let renderer = render::create_renderer(format)?;
    let header_template = header
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read header file: {}", path.display()))
        })
        .transpose()?;

    let collection = store::load(input)?.filter_for_version(release);
    let parts = render::partition::partition(&collection);
    if parts.is_empty() {
        warn!(%release, "no entities valid at this version");
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    let version = release.to_string();
    for (name, part) in &parts {
        let out_path = output_dir.join(format!("{}.{}", name, renderer.file_extension()));

        let mut out = String::new();
        if let Some(tpl) = &header_template {
            out.push_str(&substitute(tpl, name, &version));
            out.push('\n');
        }
        out.push_str(&renderer.render(name, part)?);

        fs::write(&out_path, &out)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        info!(path = %out_path.display(), entities = part.len(), "emitted");
    }
    Ok(())
}

/// Fill `${name}` and `${version}` in a header template.
fn substitute(template: &str, name: &str, version: &str) -> String {
    template.replace("${name}", name).replace("${version}", version)
}

/// Expand glob patterns into a list of real file paths.
/// Bare directories are scanned (non-recursively) for supported sources.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && parser::is_supported(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!(pattern = %pattern, "no files matched");
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}
