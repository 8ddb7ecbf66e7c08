//! linospad-unpack - unpack LinoSPAD2 `.dat` acquisition files
//!
//! Usage:
//!   linospad-unpack unpack <file> [-t 512] [--board A5] [-o out.parquet]
//!   linospad-unpack info <file> [-t 512] [--json]

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use linospad::processing::scan_stream;
use linospad::utils::write_matrix;
use linospad::{AcquisitionGeometry, CalibrationDir, DatFile, UnpackConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "linospad.toml";

#[derive(Parser)]
#[command(name = "linospad-unpack")]
#[command(about = "Unpack LinoSPAD2 binary data into per-pixel timestamp matrices")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode, reshape and optionally calibrate a data file
    Unpack {
        /// Path to the .dat file
        file: PathBuf,

        /// Timestamps per pixel per acquisition cycle
        #[arg(short, long)]
        timestamps: Option<usize>,

        /// Board identifier; enables TDC calibration
        #[arg(short, long)]
        board: Option<String>,

        /// Directory with TDC calibration CSV files
        #[arg(long)]
        calibration_dir: Option<PathBuf>,

        /// Output file (.parquet or .csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write -1 for empty slots instead of nulls
        #[arg(long)]
        keep_sentinel: bool,

        /// Path to configuration file
        #[arg(short = 'f', long = "config", default_value = DEFAULT_CONFIG)]
        config_file: PathBuf,
    },

    /// Scan a data file and print word statistics
    Info {
        /// Path to the .dat file
        file: PathBuf,

        /// Check the file against this cycle layout
        #[arg(short, long)]
        timestamps: Option<usize>,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("linospad=info".parse()?))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Unpack {
            file,
            timestamps,
            board,
            calibration_dir,
            output,
            keep_sentinel,
            config_file,
        } => {
            let mut config = load_config(&config_file)?;
            if let Some(t) = timestamps {
                config.timestamps_per_cycle = t;
            }
            if board.is_some() {
                config.board = board;
            }
            if let Some(dir) = calibration_dir {
                config.calibration_dir = dir;
            }
            config.keep_sentinel |= keep_sentinel;
            run_unpack(&file, output.as_deref(), &config)
        }
        Commands::Info {
            file,
            timestamps,
            json,
        } => run_info(&file, timestamps, json),
    }
}

/// A missing config at the default path means "use defaults"
fn load_config(path: &Path) -> anyhow::Result<UnpackConfig> {
    if !path.exists() {
        if path != Path::new(DEFAULT_CONFIG) {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Ok(UnpackConfig::default());
    }
    UnpackConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

fn run_unpack(file: &Path, output: Option<&Path>, config: &UnpackConfig) -> anyhow::Result<()> {
    let dat = DatFile::open(file).with_context(|| format!("opening {}", file.display()))?;
    let t = config.timestamps_per_cycle;

    let matrix = match &config.board {
        Some(board) => {
            let source = CalibrationDir::new(&config.calibration_dir);
            dat.unpack_with_source(t, &source, board)?
        }
        None => {
            warn!("no board given, timestamps are not calibrated");
            dat.unpack(t)?
        }
    };

    let total = matrix.pixels() * matrix.columns();
    let valid_fraction = if total == 0 {
        0.0
    } else {
        matrix.valid_count() as f64 / total as f64
    };
    println!(
        "{}: {} x {} matrix, {} cycles, {:.2}% valid",
        file.display(),
        matrix.pixels(),
        matrix.columns(),
        matrix.cycles(),
        valid_fraction * 100.0
    );

    if let Some(out) = output {
        write_matrix(out, &matrix, config.keep_sentinel)?;
        info!(path = %out.display(), "output written");
    }
    Ok(())
}

fn run_info(file: &Path, timestamps: Option<usize>, json: bool) -> anyhow::Result<()> {
    let file_handle =
        File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(file_handle);
    let stats = scan_stream(reader)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("File: {}", file.display());
        println!("  Words:    {}", stats.words);
        println!(
            "  Valid:    {} ({:.2}%)",
            stats.valid,
            stats.valid_fraction() * 100.0
        );
        println!("  Invalid:  {}", stats.invalid);
        println!("  Address:  {:?}", stats.address_counts);
        if let (Some(lo), Some(hi)) = (stats.min_raw_count, stats.max_raw_count) {
            println!("  Raw count range: {lo}..={hi}");
        }
    }

    if let Some(t) = timestamps {
        let geometry = AcquisitionGeometry::builder()
            .word_count(stats.words as usize)
            .timestamps_per_cycle(t)
            .build();
        match geometry {
            Ok(g) => println!("  Cycles:   {} ({} x {} matrix)", g.cycles, g.pixels(), g.columns()),
            Err(e) => println!("  Layout:   {e}"),
        }
    }
    Ok(())
}
