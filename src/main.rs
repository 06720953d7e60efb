use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rct_screener::model::calibration::ThresholdType;
use rct_screener::pipeline::predict::{PredictOptions, RctScreener};
use rct_screener::report::{read_records, write_predictions, write_raw_scores};

/// Classify title/abstract records as randomized controlled trials.
#[derive(Parser, Debug)]
#[command(name = "rct-screener", version)]
struct Args {
    /// Path to the sparse linear model resource (.rctw, optionally .gz)
    #[arg(long)]
    model: PathBuf,

    /// Path to the calibration table (JSON)
    #[arg(long)]
    calibration: PathBuf,

    /// Input records, one JSON object per line ("-" for stdin)
    #[arg(long, default_value = "-")]
    input: PathBuf,

    /// Output path ("-" for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Decision threshold to apply: sensitive|specific
    #[arg(long, default_value = "sensitive")]
    threshold_type: String,

    /// Score without the publication-type override, ignoring per-record flags
    #[arg(long)]
    no_auto_ptyp: bool,

    /// Treat a missing/malformed use_ptyp flag as absent instead of failing
    #[arg(long)]
    lenient_ptyp: bool,

    /// Emit unscaled decision scores and raw ptyp signals instead of decisions
    #[arg(long)]
    raw_scores: bool,

    /// Log filter (tracing env-filter syntax)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let threshold_type: ThresholdType = args.threshold_type.parse()?;
    let opts = PredictOptions {
        threshold_type,
        auto_use_ptyp: !args.no_auto_ptyp,
        strict_ptyp: !args.lenient_ptyp,
    };

    let screener = RctScreener::load(&args.model, &args.calibration)?;
    info!(
        model = %args.model.display(),
        calibration = %args.calibration.display(),
        "screener ready"
    );

    let records = read_records(open_input(&args.input)?)?;
    info!(n_records = records.len(), "read input records");

    let mut writer = open_output(&args.output)?;
    if args.raw_scores {
        let raw = screener.raw_scores(&records, &opts)?;
        write_raw_scores(&mut writer, &raw)?;
    } else {
        let predictions = screener.predict(&records, &opts)?;
        let n_rct = predictions.iter().filter(|p| p.is_rct).count();
        write_predictions(&mut writer, &predictions)?;
        info!(n_rct, n_records = predictions.len(), "batch classified");
    }
    writer.flush()?;
    Ok(())
}

fn open_input(path: &Path) -> io::Result<BufReader<Box<dyn Read>>> {
    let inner: Box<dyn Read> = if path.as_os_str() == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(File::open(path)?)
    };
    Ok(BufReader::new(inner))
}

fn open_output(path: &Path) -> io::Result<BufWriter<Box<dyn Write>>> {
    let inner: Box<dyn Write> = if path.as_os_str() == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(File::create(path)?)
    };
    Ok(BufWriter::new(inner))
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
