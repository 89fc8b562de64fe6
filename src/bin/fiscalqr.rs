use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fiscalqr::source::{self, FrameSource, StillImageSource};
use fiscalqr::{FrameOutcome, KeyStore, ScanSession, Scanner};

#[derive(Parser)]
#[command(name = "fiscalqr", version, about = "Fiscal receipt QR scanner")]
struct Cli {
    /// Path of the access key store
    #[arg(long, global = true, default_value = "chaves.csv")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan images for access keys and record new ones
    Scan {
        /// Image files, processed in order
        images: Vec<PathBuf>,
        /// Stop after the first saved or duplicate key
        #[arg(long)]
        stop_on_success: bool,
        /// Prefer the live camera, falling back to the image list
        #[arg(long)]
        live: bool,
    },
    /// List stored access keys
    Keys,
    /// Write a copy of the persisted store (text marker retained)
    Export {
        /// Destination file
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let store = KeyStore::new(&cli.store);

    match cli.command {
        Command::Scan {
            images,
            stop_on_success,
            live,
        } => scan_cmd(&store, images, stop_on_success, live),
        Command::Keys => keys_cmd(&store),
        Command::Export { output } => export_cmd(&store, &output),
    }
}

fn scan_cmd(
    store: &KeyStore,
    images: Vec<PathBuf>,
    stop_on_success: bool,
    live: bool,
) -> ExitCode {
    let labels: Vec<String> = images
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    let mut frames: Box<dyn FrameSource> = if live {
        match source::open_camera() {
            Ok(camera) => camera,
            Err(err) => {
                warn!("{err}; falling back to still images");
                Box::new(StillImageSource::new(images))
            }
        }
    } else {
        Box::new(StillImageSource::new(images))
    };

    let scanner = Scanner::new();
    let mut session = ScanSession::new();
    let mut frame_index = 0usize;

    loop {
        let label = labels
            .get(frame_index)
            .cloned()
            .unwrap_or_else(|| format!("frame {}", frame_index + 1));
        let frame = match frames.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(err) => {
                eprintln!("{label}: {err}");
                frame_index += 1;
                continue;
            }
        };
        frame_index += 1;

        let outcome = match scanner.scan_frame(store, &mut session, &frame) {
            Ok(outcome) => outcome,
            Err(err) => {
                eprintln!("{label}: {err}");
                return ExitCode::FAILURE;
            }
        };

        match outcome {
            FrameOutcome::Locked => {
                println!("{label}: skipped (scanning locked after success)");
            }
            FrameOutcome::NoSymbol { attempts } => {
                println!("{label}: no QR code detected ({attempts} attempts)");
            }
            FrameOutcome::KeyMissing {
                text,
                technique,
                attempt,
                ..
            } => {
                println!(
                    "{label}: QR code decoded via {technique} (attempt {attempt}), \
                     but no 44-digit access key in payload"
                );
                println!("  payload: {text}");
            }
            FrameOutcome::Saved {
                key,
                technique,
                attempt,
                ..
            } => {
                println!("{label}: key {key} saved ({technique}, attempt {attempt})");
            }
            FrameOutcome::Duplicate {
                key,
                technique,
                attempt,
                ..
            } => {
                println!(
                    "{label}: key {key} already on record ({technique}, attempt {attempt})"
                );
            }
        }

        if session.is_locked() {
            if stop_on_success {
                break;
            }
            session.reset();
        }
    }

    ExitCode::SUCCESS
}

fn keys_cmd(store: &KeyStore) -> ExitCode {
    match store.load_all() {
        Ok(keys) if keys.is_empty() => {
            println!("No keys saved yet.");
            ExitCode::SUCCESS
        }
        Ok(keys) => {
            println!("Saved keys ({}):", keys.len());
            for key in keys {
                println!("  {key}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Failed to read key store {}: {err}", store.path().display());
            ExitCode::FAILURE
        }
    }
}

fn export_cmd(store: &KeyStore, output: &Path) -> ExitCode {
    let contents = match store.export() {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("Failed to read key store {}: {err}", store.path().display());
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = fs::write(output, contents) {
        eprintln!("Failed to write {}: {err}", output.display());
        return ExitCode::FAILURE;
    }
    println!("Exported key store to {}", output.display());
    ExitCode::SUCCESS
}
