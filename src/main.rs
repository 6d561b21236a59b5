//! Bitcloak - keyed LSB steganography for lossless image and audio carriers.
//!
//! A CLI for embedding a payload file into the low-order bits of a PNG, BMP
//! or WAV cover, and extracting it again with the same key and parameters.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use bitcloak::{CodecOptions, DerivedKey, MediaCarrier, SequenceMode};

/// Bitcloak - hide files in the low-order bits of images and audio
///
/// The key determines where every payload bit lands; decoding requires the
/// same key, bit depth, start location and mode that were used for encoding.
/// Covers must be lossless (PNG, BMP, 16-bit PCM WAV).
#[derive(Parser)]
#[command(name = "bitcloak")]
#[command(version)]
#[command(about = "Keyed LSB steganography for lossless image and audio carriers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a payload file into a cover file
    Encode {
        /// Path to the cover file (png, bmp or wav)
        #[arg(short, long)]
        cover: PathBuf,

        /// Path to the payload file to hide
        #[arg(short, long)]
        payload: PathBuf,

        /// Key selecting the embedding positions (numeric or any string)
        #[arg(short, long)]
        key: String,

        /// Low-order bits to use per carrier slot (1-8)
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=8))]
        bits: u8,

        /// Start location: "x,y" or pixel index for images, sample offset
        /// or seconds ("1.5s") for audio. Defaults to a key-derived offset.
        #[arg(short, long)]
        start: Option<String>,

        /// Position sequencing mode: strided (whole carrier, wraparound)
        /// or scattered (shuffled suffix, no wraparound)
        #[arg(short, long, default_value = "strided")]
        mode: String,

        /// Output path for the stego file (default: stego_<cover> next to the cover)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the embed report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Verbose output (shows capacity and slot usage)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Extract a hidden payload from a stego file
    Decode {
        /// Path to the stego file
        #[arg(long)]
        stego: PathBuf,

        /// Key used during encoding
        #[arg(short, long)]
        key: String,

        /// Low-order bits per carrier slot used during encoding (1-8)
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=8))]
        bits: u8,

        /// Start location used during encoding (defaults to the key-derived offset)
        #[arg(short, long)]
        start: Option<String>,

        /// Position sequencing mode used during encoding
        #[arg(short, long, default_value = "strided")]
        mode: String,

        /// Output path for the recovered payload
        /// (default: the embedded name, next to the stego file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the extraction report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report how many payload bytes a cover can hold
    Capacity {
        /// Path to the cover file (png, bmp or wav)
        #[arg(short, long)]
        cover: PathBuf,

        /// Low-order bits per carrier slot (1-8)
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=8))]
        bits: u8,

        /// Start location to measure the scattered-mode suffix from
        #[arg(short, long)]
        start: Option<String>,

        /// Print the capacity report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            cover,
            payload,
            key,
            bits,
            start,
            mode,
            output,
            json,
            verbose,
        } => encode_cmd(
            &cover,
            &payload,
            &key,
            bits,
            start.as_deref(),
            &mode,
            output.as_deref(),
            json,
            verbose,
        ),

        Commands::Decode {
            stego,
            key,
            bits,
            start,
            mode,
            output,
            json,
            verbose,
        } => decode_cmd(
            &stego,
            &key,
            bits,
            start.as_deref(),
            &mode,
            output.as_deref(),
            json,
            verbose,
        ),

        Commands::Capacity {
            cover,
            bits,
            start,
            json,
        } => capacity_cmd(&cover, bits, start.as_deref(), json),
    }
}

/// Parses the sequencing mode argument.
fn parse_mode(mode: &str) -> Result<SequenceMode> {
    match mode.to_lowercase().as_str() {
        "strided" => Ok(SequenceMode::Strided),
        "scattered" => Ok(SequenceMode::Scattered),
        other => anyhow::bail!("Unknown mode: {}. Use: strided or scattered", other),
    }
}

/// Resolves the start option: explicit carrier-specific location, or the
/// key-derived default that encode and decode both reproduce.
fn resolve_start(carrier: &MediaCarrier, start: Option<&str>, key: &str) -> Result<usize> {
    match start {
        Some(s) => Ok(carrier
            .parse_start(s)
            .with_context(|| format!("Failed to parse start location '{}'", s))?),
        None => {
            let derived = DerivedKey::derive(key).context("Failed to derive key")?;
            Ok(derived.starting_position(carrier.slot_count()))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn encode_cmd(
    cover_path: &Path,
    payload_path: &Path,
    key: &str,
    bits: u8,
    start: Option<&str>,
    mode: &str,
    output: Option<&Path>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let mut carrier = MediaCarrier::from_file(cover_path)
        .with_context(|| format!("Failed to load cover from {}", cover_path.display()))?;

    if verbose {
        eprintln!(
            "Loaded cover: {} slots, {} bytes capacity at k={}",
            carrier.slot_count(),
            carrier.capacity_bytes(bits),
            bits
        );
    }

    let payload = std::fs::read(payload_path)
        .with_context(|| format!("Failed to read payload from {}", payload_path.display()))?;
    let name = payload_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("payload.bin");

    let opts = CodecOptions {
        bit_depth: bits,
        start: resolve_start(&carrier, start, key)?,
        mode: parse_mode(mode)?,
    };

    if verbose && start.is_none() {
        eprintln!("Using key-derived start offset {}", opts.start);
    }

    let report = carrier
        .encode_payload(&payload, name, key, &opts)
        .context("Failed to embed payload")?;

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => default_stego_path(cover_path, carrier.output_extension()),
    };
    carrier
        .save(&output_path)
        .with_context(|| format!("Failed to save stego file to {}", output_path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Stego file written: {}", output_path.display());
        println!(
            "  Embedded {} bytes (capacity {} bytes at k={})",
            report.embedded_bytes, report.capacity_bytes, bits
        );
    }
    if verbose {
        eprintln!(
            "Wrote {} slots starting at offset {}",
            report.slots_used, report.start
        );
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn decode_cmd(
    stego_path: &Path,
    key: &str,
    bits: u8,
    start: Option<&str>,
    mode: &str,
    output: Option<&Path>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let carrier = MediaCarrier::from_file(stego_path)
        .with_context(|| format!("Failed to load stego file from {}", stego_path.display()))?;

    let opts = CodecOptions {
        bit_depth: bits,
        start: resolve_start(&carrier, start, key)?,
        mode: parse_mode(mode)?,
    };

    if verbose && start.is_none() {
        eprintln!("Using key-derived start offset {}", opts.start);
    }

    let decoded = carrier
        .decode_payload(key, &opts)
        .context("Failed to extract payload (check key, bits, start and mode)")?;

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => stego_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&decoded.name),
    };
    std::fs::write(&output_path, &decoded.payload)
        .with_context(|| format!("Failed to write payload to {}", output_path.display()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&decoded.report(opts.start))?
        );
    } else {
        println!(
            "Recovered '{}' ({} bytes) to {}",
            decoded.name,
            decoded.payload.len(),
            output_path.display()
        );
    }

    Ok(())
}

fn capacity_cmd(cover_path: &Path, bits: u8, start: Option<&str>, json: bool) -> Result<()> {
    let carrier = MediaCarrier::from_file(cover_path)
        .with_context(|| format!("Failed to load cover from {}", cover_path.display()))?;

    let start_slot = match start {
        Some(s) => carrier
            .parse_start(s)
            .with_context(|| format!("Failed to parse start location '{}'", s))?,
        None => 0,
    };

    let total = carrier.slot_count();
    let capacity = carrier.capacity_bytes(bits);
    let suffix_bytes = total.saturating_sub(start_slot) * bits as usize / 8;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "slot_count": total,
                "bits": bits,
                "capacity_bytes": capacity,
                "start": start_slot,
                "scattered_capacity_bytes": suffix_bytes,
            }))?
        );
    } else {
        println!("Carrier slots: {}", total);
        println!("Capacity at k={}: {} bytes (strided mode)", bits, capacity);
        println!(
            "Capacity from slot {}: {} bytes (scattered mode)",
            start_slot, suffix_bytes
        );
    }

    Ok(())
}

/// Default stego output path: `stego_<cover stem>.<ext>` next to the cover.
fn default_stego_path(cover_path: &Path, extension: &str) -> PathBuf {
    let stem = cover_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cover");
    cover_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("stego_{}.{}", stem, extension))
}
