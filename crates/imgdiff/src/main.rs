//! imgdiff: diff two images, or pair document addresses the way an editor
//! host would.
//!
//! # Usage
//!
//! ```text
//! imgdiff diff old.png new.png --anchor bottom-center --output diff.png
//! imgdiff pair --workspace /home/user/repo \
//!     file:///home/user/repo/img.png 'git:/home/user/repo/img.png?{"ref":"HEAD"}'
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod settings;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use imgdiff_engine::{Anchor, DiffError, DiffResult, diff_encoded, encode_png};
use imgdiff_link::{
    Address, AddressError, ByteSource, Document, PairingRegistry, Panel, Scheme, WorkspaceRoots,
    diff_documents,
};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Image diffing and document pairing.
#[derive(Parser)]
#[command(name = "imgdiff", version)]
struct Cli {
    /// JSON settings file (`default_alignment`, `diff`, `linker`).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level regardless of `RUST_LOG`.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Diff two image files, padding them to a common size if needed.
    Diff {
        /// The origin side.
        base: PathBuf,

        /// The live/changed side.
        changed: PathBuf,

        /// Alignment of the smaller image, e.g. `top-left` or
        /// `bottom-center`.
        #[arg(long)]
        anchor: Option<Anchor>,

        /// Where to write the diff image.
        #[arg(short, long, default_value = "diff.png")]
        output: PathBuf,

        /// Where to write the padded changed image when sizes differ.
        #[arg(long)]
        aligned: Option<PathBuf>,
    },

    /// Open every URI as a document, in order, and report the pairs found.
    ///
    /// `file:` and `vscode-userdata:` documents are read from disk; `git:`
    /// and `vscode-vfs:` content lives in the host, so pairs involving them
    /// are reported without a diff.
    Pair {
        /// Workspace root used for repo-relative paths (repeatable).
        #[arg(long = "workspace", value_name = "ROOT")]
        workspaces: Vec<String>,

        /// Alignment used when diffing resolved pairs.
        #[arg(long)]
        anchor: Option<Anchor>,

        /// Document URIs (`file:`, `git:`, `vscode-userdata:`,
        /// `vscode-vfs:`).
        #[arg(required = true)]
        uris: Vec<String>,
    },
}

/// Errors reported by the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Image(#[from] DiffError),

    #[error("failed to start runtime: {0}")]
    Runtime(std::io::Error),

    #[error("failed to write output: {0}")]
    Output(std::io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load(cli.config.as_deref())?;
    match cli.command {
        Command::Diff {
            base,
            changed,
            anchor,
            output,
            aligned,
        } => run_diff(
            &settings,
            &base,
            &changed,
            anchor.unwrap_or(settings.default_alignment),
            &output,
            aligned.as_deref(),
        ),
        Command::Pair {
            workspaces,
            anchor,
            uris,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .map_err(CliError::Runtime)?;
            let anchor = anchor.unwrap_or(settings.default_alignment);
            let mut stdout = std::io::stdout().lock();
            runtime.block_on(run_pair(&settings, workspaces, anchor, &uris, &mut stdout))
        }
    }
}

fn run_diff(
    settings: &Settings,
    base: &Path,
    changed: &Path,
    anchor: Anchor,
    output: &Path,
    aligned: Option<&Path>,
) -> Result<(), CliError> {
    let base_bytes = read(base)?;
    let changed_bytes = read(changed)?;

    let result = match diff_encoded(&base_bytes, &changed_bytes, anchor, &settings.diff) {
        Ok(result) => result,
        Err(err @ (DiffError::EmptyInput | DiffError::ImageDecode(_))) => {
            println!("no diff: {err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    write(output, &encode_png(&result.diff_image)?)?;
    if let (Some(path), Some(image)) = (aligned, &result.aligned_image) {
        write(path, &encode_png(image)?)?;
    }
    println!("{}", summary(&result));
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn run_pair(
    settings: &Settings,
    workspaces: Vec<String>,
    anchor: Anchor,
    uris: &[String],
    out: &mut impl Write,
) -> Result<(), CliError> {
    let registry = PairingRegistry::new(&settings.linker, Rc::new(WorkspaceRoots::new(workspaces)));

    // Held open for the whole run; dropping a document unlinks it.
    let mut opened = Vec::with_capacity(uris.len());
    for uri in uris {
        let address = Address::parse(uri)?;
        let source = match address.scheme() {
            Scheme::LocalFile | Scheme::RemoteTempCache => {
                ByteSource::File(PathBuf::from(address.path()))
            }
            // Only the host can read these.
            Scheme::VcsObject | Scheme::VirtualFs => ByteSource::Inline(Vec::new()),
        };
        let document = Document::new(address, source);
        let panel = Panel::new(uri.as_str());
        registry.observe_open(&document, &panel);

        match registry.find_link(&document).await {
            Some(link) => {
                writeln!(out, "{uri} -> {}", link.document.address()).map_err(CliError::Output)?;
                if let Some(result) =
                    diff_documents(&link.document, &document, anchor, &settings.diff).await
                {
                    writeln!(out, "{}", summary(&result)).map_err(CliError::Output)?;
                }
            }
            None => writeln!(out, "{uri} -> (no link)").map_err(CliError::Output)?,
        }
        opened.push((document, panel));
    }
    tracing::debug!(documents = opened.len(), "pairing finished");
    Ok(())
}

fn summary(result: &DiffResult) -> String {
    let dims = result.dimensions();
    format!(
        "{} differing pixels ({}x{}{})",
        result.diff_pixel_count,
        dims.width,
        dims.height,
        if result.aligned_image.is_some() {
            ", aligned"
        } else {
            ""
        },
    )
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, bytes).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}
