mod util;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use rkhash::header::HEADER_LEN;
use rkhash::{
    check_equivalence, par_compute_hashes, seeded_bytes, sensitivity, spot_check, ConfigError,
    HashWord, Header, RollingHasher,
};

#[derive(Parser)]
#[command(name = "rkhash", about = "Rolling hash calculator and self-checker")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Width {
    #[value(name = "32")]
    W32,
    #[value(name = "64")]
    W64,
    #[value(name = "128")]
    W128,
}

#[derive(Args, Clone, Debug)]
struct HasherArgs {
    /// Window length in bytes
    #[arg(long, short, env = "RKHASH_WINDOW", default_value_t = 4, allow_negative_numbers = true)]
    window: i64,

    /// Hash width in bits
    #[arg(long, value_enum, default_value_t = Width::W64)]
    width: Width,

    /// Base multiplier, decimal or 0x-prefixed hex (default: built-in odd constant)
    #[arg(long, value_parser = util::parse_u128)]
    base: Option<u128>,
}

impl HasherArgs {
    fn build<W: HashWord>(&self) -> Result<RollingHasher<W>> {
        let hasher = match self.base {
            None => RollingHasher::new(self.window)?,
            Some(base) => {
                let narrowed = W::from_u128(base).ok_or(ConfigError::BaseOutOfRange {
                    base,
                    bits: W::BITS,
                })?;
                RollingHasher::with_base(self.window, narrowed)?
            }
        };
        Ok(hasher)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Hash every window position of one or more files
    Hash {
        #[command(flatten)]
        hasher: HasherArgs,
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Print every window hash instead of a per-file summary
        #[arg(long)]
        all: bool,
        /// Window positions per parallel segment
        #[arg(long, env = "RKHASH_SEGMENT", default_value_t = 1 << 20)]
        segment: usize,
    },
    /// Check rolling hashes against direct hashes
    Verify {
        #[command(flatten)]
        hasher: HasherArgs,
        /// Files to check (default: a seeded pseudo-random buffer)
        files: Vec<PathBuf>,
        /// Length of the seeded buffer
        #[arg(long, default_value_t = 4095)]
        len: usize,
        /// Seed for the buffer, sampling and sensitivity probe
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Check only this many sampled positions per input
        #[arg(long)]
        samples: Option<usize>,
        /// Single-byte substitution trials for the sensitivity probe
        #[arg(long, default_value_t = 1000)]
        trials: usize,
    },
    /// Decode the 13-byte LZMA header at the start of a file
    Header {
        /// Path to the .lzma file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().as_str()));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match cli.command {
        Commands::Hash {
            hasher,
            files,
            all,
            segment,
        } => {
            let start = Instant::now();
            match hasher.width {
                Width::W32 => hash_files(&hasher.build::<u32>()?, &files, all, segment)?,
                Width::W64 => hash_files(&hasher.build::<u64>()?, &files, all, segment)?,
                Width::W128 => hash_files(&hasher.build::<u128>()?, &files, all, segment)?,
            }
            info!("Hashed {} file(s) in {:.3}s", files.len(), start.elapsed().as_secs_f64());
        }
        Commands::Verify {
            hasher,
            files,
            len,
            seed,
            samples,
            trials,
        } => {
            let opts = VerifyOptions {
                len,
                seed,
                samples,
                trials,
            };
            match hasher.width {
                Width::W32 => verify_inputs(&hasher.build::<u32>()?, &files, &opts)?,
                Width::W64 => verify_inputs(&hasher.build::<u64>()?, &files, &opts)?,
                Width::W128 => verify_inputs(&hasher.build::<u128>()?, &files, &opts)?,
            }
        }
        Commands::Header { file } => show_header(&file)?,
    }

    Ok(())
}

struct FileSummary<W> {
    path: PathBuf,
    windows: usize,
    first: Option<W>,
    last: Option<W>,
    distinct: usize,
}

fn hash_files<W: HashWord>(
    hasher: &RollingHasher<W>,
    files: &[PathBuf],
    all: bool,
    segment: usize,
) -> Result<()> {
    let digits = (W::BITS / 4) as usize;

    if all {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for path in files {
            let data = util::mmap_file(path)?;
            writeln!(out, "# {}", path.display())?;
            for (offset, hash) in par_compute_hashes(hasher, &data, segment).iter().enumerate() {
                writeln!(out, "{}\t{:0digits$x}", offset, hash, digits = digits)?;
            }
        }
        out.flush()?;
        return Ok(());
    }

    let summaries = files
        .par_iter()
        .map(|path| -> Result<FileSummary<W>> {
            let data = util::mmap_file(path)?;
            let hashes = par_compute_hashes(hasher, &data, segment);
            let distinct = hashes.iter().collect::<HashSet<_>>().len();
            Ok(FileSummary {
                path: path.clone(),
                windows: hashes.len(),
                first: hashes.first().copied(),
                last: hashes.last().copied(),
                distinct,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for summary in &summaries {
        match (summary.first, summary.last) {
            (Some(first), Some(last)) => println!(
                "{}: {} windows, first {:0digits$x}, last {:0digits$x}, {} distinct",
                summary.path.display(),
                summary.windows,
                first,
                last,
                summary.distinct,
                digits = digits
            ),
            _ => println!(
                "{}: 0 windows (shorter than the {}-byte window)",
                summary.path.display(),
                hasher.window_len()
            ),
        }
    }
    Ok(())
}

struct VerifyOptions {
    len: usize,
    seed: u64,
    samples: Option<usize>,
    trials: usize,
}

/// Returns false if a mismatch was found.
fn verify_one<W: HashWord>(
    hasher: &RollingHasher<W>,
    name: &str,
    data: &[u8],
    opts: &VerifyOptions,
) -> bool {
    let outcome = match opts.samples {
        Some(samples) => spot_check(hasher, data, samples, opts.seed),
        None => check_equivalence(hasher, data),
    };
    match outcome {
        Ok(checked) => {
            println!("{}: {} windows OK", name, checked);
            true
        }
        Err(mismatch) => {
            println!("{}: FAILED, {}", name, mismatch);
            false
        }
    }
}

fn verify_inputs<W: HashWord>(
    hasher: &RollingHasher<W>,
    files: &[PathBuf],
    opts: &VerifyOptions,
) -> Result<()> {
    let mut failures = 0;

    if files.is_empty() {
        let data = seeded_bytes(opts.len, opts.seed);
        let name = format!("seeded buffer ({} bytes, seed {})", opts.len, opts.seed);
        if !verify_one(hasher, &name, &data, opts) {
            failures += 1;
        }
    }
    for path in files {
        let data = util::mmap_file(path)?;
        if !verify_one(hasher, &path.display().to_string(), &data, opts) {
            failures += 1;
        }
    }

    match sensitivity(hasher, opts.trials, opts.seed) {
        Ok(report) => {
            println!(
                "Sensitivity: {} of {} single-byte substitutions left the hash unchanged",
                report.unchanged, report.trials
            );
            if report.unchanged > 0 {
                warn!("Base {:#x} does not detect every single-byte change", hasher.base());
            }
        }
        Err(too_large) => println!("Sensitivity: skipped, {}", too_large),
    }

    if failures > 0 {
        bail!("{} input(s) failed verification", failures);
    }
    Ok(())
}

fn show_header(path: &Path) -> Result<()> {
    let data = util::mmap_file(path)?;
    if data.len() < HEADER_LEN {
        bail!(
            "File too short for an LZMA header: {} ({} bytes)",
            path.display(),
            data.len()
        );
    }
    let header = Header::decode(&data[..HEADER_LEN])
        .with_context(|| format!("Failed to decode LZMA header: {}", path.display()))?;

    println!("{}", path.display());
    println!(
        "  Properties: lc={} lp={} pb={} (code {:#04x})",
        header.properties.lc,
        header.properties.lp,
        header.properties.pb,
        header.properties.code()?
    );
    println!("  Dictionary capacity: {} bytes", header.dict_cap);
    match header.size {
        Some(size) => println!("  Uncompressed size: {} bytes", size),
        None => println!("  Uncompressed size: unknown"),
    }
    Ok(())
}
