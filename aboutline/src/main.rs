//! aboutline - an outline of `// # ` marker comments, kept in sync as you browse

use aboutline_core::{Config, Document, OutlineStore, TextDocument};
use aboutline_tui::App;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Show the marker-comment outline of source files
#[derive(Parser, Debug)]
#[command(name = "aboutline")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files to open; the first one starts active
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Print each file's outline and exit instead of starting the TUI
    #[arg(long)]
    print: bool,

    /// Literal marker introducing a heading (default "// # ")
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    marker: Option<String>,

    /// Raw regular expression for headings; group 1 is the label
    #[arg(long, value_name = "REGEX", conflicts_with = "marker")]
    pattern: Option<String>,

    /// Do not watch files for external changes
    #[arg(long)]
    no_watch: bool,

    /// Write log output to this file (RUST_LOG selects the level)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let mut config = Config::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);

    let docs = args
        .files
        .iter()
        .map(|path| {
            Document::load(path)
                .with_context(|| format!("Failed to load document: {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    log::info!("Loaded {} document(s)", docs.len());

    if args.print {
        return print_outlines(&config, &docs, &mut std::io::stdout().lock());
    }

    let app = App::new(config, docs)?;
    aboutline_tui::run(app).context("TUI application error")?;

    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);

    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    } else if !args.print {
        // The TUI owns the terminal, stderr output would garble it
        return Ok(());
    }

    builder.init();
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(marker) = &args.marker {
        config.outline.marker = marker.clone();
        config.outline.pattern = None;
    }
    if let Some(pattern) = &args.pattern {
        config.outline.pattern = Some(pattern.clone());
    }
    #[cfg(feature = "watch")]
    if args.no_watch {
        config.watch.enabled = false;
    }
}

/// Print `path:line: label` for every heading, one file after another
fn print_outlines(config: &Config, docs: &[Document], out: &mut impl Write) -> Result<()> {
    let store = OutlineStore::new(config.outline.heading_pattern()?);

    for doc in docs {
        store.recompute(Some(doc as &dyn TextDocument));
        for heading in store.children().iter() {
            writeln!(
                out,
                "{}:{}: {}",
                doc.path.display(),
                heading.location.start.line + 1,
                heading.text
            )?;
        }
    }

    Ok(())
}
