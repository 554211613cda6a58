//! Wavecut - headless waveform editor
//!
//! Usage:
//!   wavecut info <file>                              - Format, length and level summary
//!   wavecut delete <in> <out> --start S --end E      - Remove a time range
//!   wavecut insert <in> <clip> <out> --at T          - Insert another file at a time
//!   wavecut envelope <file> [--json]                 - Dump the waveform envelope

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wavecut_audio::NullOutput;
use wavecut_core::{format_mmss, TimeRange};
use wavecut_edit::{EditEngine, EditorConfig, MemoryClipboard};
use wavecut_media::{AudioDecoder, EncodeSettings, SampleEncoding, WavDecoder, WavEncoder};

#[derive(Parser)]
#[command(name = "wavecut", version, about = "Sample-accurate WAV editing")]
struct Cli {
    /// Editor configuration (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show format, duration and level summary
    Info { file: PathBuf },
    /// Remove [start, end) seconds and write the result
    Delete {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        start: f64,
        #[arg(long)]
        end: f64,
        /// Write 16-bit integer samples instead of 32-bit float
        #[arg(long)]
        int16: bool,
    },
    /// Insert CLIP into INPUT at the given time and write the result
    Insert {
        input: PathBuf,
        clip: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        at: f64,
        /// Write 16-bit integer samples instead of 32-bit float
        #[arg(long)]
        int16: bool,
    },
    /// Print the waveform envelope
    Envelope {
        file: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Commands::Info { file } => show_info(config, &file),
        Commands::Delete {
            input,
            output,
            start,
            end,
            int16,
        } => delete_range(config, &input, &output, start, end, int16),
        Commands::Insert {
            input,
            clip,
            output,
            at,
            int16,
        } => insert_clip(config, &input, &clip, &output, at, int16),
        Commands::Envelope { file, json } => dump_envelope(config, &file, json),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn open_engine(config: EditorConfig, path: &Path) -> Result<EditEngine> {
    let mut engine = EditEngine::new(
        config,
        Box::new(NullOutput),
        Box::new(MemoryClipboard::new()),
    )?;
    engine
        .open(&WavDecoder, path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(engine)
}

fn settings(int16: bool) -> EncodeSettings {
    EncodeSettings {
        encoding: if int16 {
            SampleEncoding::Int16
        } else {
            SampleEncoding::Float32
        },
    }
}

fn show_info(config: EditorConfig, file: &Path) -> Result<()> {
    let decoded = WavDecoder
        .decode(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let source = decoded.source;
    let mut engine = EditEngine::new(
        config,
        Box::new(NullOutput),
        Box::new(MemoryClipboard::new()),
    )?;
    engine.load(decoded.buffer);

    let Some(doc) = engine.document() else {
        println!("{}: empty", file.display());
        return Ok(());
    };
    println!("{}", file.display());
    println!("  {}", doc.status_line());
    println!(
        "  {} frames, {}-bit {}",
        doc.buffer.len_frames(),
        source.bits_per_sample,
        if source.is_float { "float" } else { "integer" }
    );
    println!(
        "  envelope: {} points at {:.2}/s, peak {:.3}, rms {:.3}",
        doc.envelope.len(),
        doc.envelope.sample_rate,
        doc.envelope.peak(),
        doc.envelope.rms_between(TimeRange::full(doc.duration()))
    );
    Ok(())
}

fn delete_range(
    config: EditorConfig,
    input: &Path,
    output: &Path,
    start: f64,
    end: f64,
    int16: bool,
) -> Result<()> {
    let mut engine = open_engine(config, input)?;
    let before = engine.duration();
    engine.delete(TimeRange::new(start, end)?)?;

    if engine.document().is_none() {
        bail!("Deleting [{start}, {end}) would leave no audio to write");
    }
    engine.save(&WavEncoder, output, &settings(int16))?;
    info!(
        before = %format_mmss(before),
        after = %format_mmss(engine.duration()),
        "Wrote {}",
        output.display()
    );
    Ok(())
}

fn insert_clip(
    config: EditorConfig,
    input: &Path,
    clip: &Path,
    output: &Path,
    at: f64,
    int16: bool,
) -> Result<()> {
    let mut engine = open_engine(config, input)?;
    let clip = WavDecoder
        .decode(clip)
        .with_context(|| format!("Failed to open {}", clip.display()))?;
    engine.paste(clip.buffer, at)?;
    engine.save(&WavEncoder, output, &settings(int16))?;
    if let Some(status) = engine.status() {
        info!(status = %status, "Wrote {}", output.display());
    }
    Ok(())
}

fn dump_envelope(config: EditorConfig, file: &Path, json: bool) -> Result<()> {
    let engine = open_engine(config, file)?;
    let Some(doc) = engine.document() else {
        bail!("{} contains no audio", file.display());
    };
    let envelope = &doc.envelope;

    if json {
        println!("{}", serde_json::to_string_pretty(envelope)?);
        return Ok(());
    }
    for (index, amplitude) in envelope.amplitudes.iter().enumerate() {
        let time = index as f64 / envelope.sample_rate;
        println!(
            "{time:.3}\t{amplitude:.6}\t{:.3}",
            envelope.power_at(time)
        );
    }
    Ok(())
}
