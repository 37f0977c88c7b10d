//! Command-line front end for `qr-rs`: encode a payload to a PNG, or
//! decode symbols out of an image file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use qr_rs::{EcLevel, Payload};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Encode(#[from] qr_rs::QrError),

    #[error("{0}")]
    Image(#[from] qr_rs_image::QrImageError),

    #[error("failed to read input file: {0}")]
    ReadInput(#[source] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "qr-rs", about = "Encode and decode QR Code Model 2 symbols")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Input file: a text/byte payload (`encode`'s implicit default mode).
    input: Option<PathBuf>,
    /// Output PNG path.
    output: Option<PathBuf>,

    /// Error-correction level.
    #[arg(short = 'e', long = "error", value_enum, default_value = "m")]
    error: ErrorArg,
    /// Pixels per module.
    #[arg(short = 'm', long = "module", default_value_t = 2)]
    module: u32,
    /// Quiet-zone width, in modules.
    #[arg(short = 'q', long = "quiet", default_value_t = 8)]
    quiet: u32,
    /// ECI assignment value to prefix the payload with.
    #[arg(short = 'v', long = "value")]
    value: Option<u32>,
    /// Treat the input file as UTF-8 text rather than raw bytes.
    #[arg(short = 't', long = "text")]
    text: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode every QR symbol found in an image file.
    Decode { image: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ErrorArg {
    L,
    M,
    Q,
    H,
}

impl From<ErrorArg> for EcLevel {
    fn from(value: ErrorArg) -> Self {
        match value {
            ErrorArg::L => EcLevel::Low,
            ErrorArg::M => EcLevel::Medium,
            ErrorArg::Q => EcLevel::Quartile,
            ErrorArg::H => EcLevel::High,
        }
    }
}

fn run_encode(cli: &Cli) -> Result<(), CliError> {
    let input = cli.input.as_ref().expect("clap requires `input` outside `decode`");
    let output = cli.output.as_ref().expect("clap requires `output` outside `decode`");

    let raw = std::fs::read(input).map_err(CliError::ReadInput)?;
    let level = EcLevel::from(cli.error);

    let symbol = if cli.text {
        let text = String::from_utf8_lossy(&raw);
        let mut segs = Vec::new();
        if let Some(assignval) = cli.value {
            segs.push(qr_rs::Segment::make_eci(assignval));
        }
        segs.extend(qr_rs::Segment::make_segments(&text));
        qr_rs::Symbol::encode_segments(&segs, level)?
    } else {
        qr_rs::encode(Payload::Bytes(&raw), level, cli.value)?
    };

    info!(version = symbol.version().value(), size = symbol.size(), "encoded symbol");

    let options = qr_rs_image::RenderOptions {
        module_size: cli.module,
        quiet_zone: cli.quiet,
    };
    qr_rs_image::save_png(&symbol, options, output)?;
    Ok(())
}

fn run_decode(image: &PathBuf) -> Result<bool, CliError> {
    let grid = qr_rs_image::load_rgb24(image)?;
    let symbols = qr_rs::decode::decode(
        &grid.pixels,
        grid.width,
        grid.height,
        grid.stride,
        qr_rs::decode::PixelFormat::Rgb24,
    );

    if symbols.is_empty() {
        warn!(?image, "no symbols found");
        return Ok(false);
    }

    for symbol in &symbols {
        let text = String::from_utf8_lossy(&symbol.payload);
        match symbol.eci_assignment {
            Some(eci) => println!("{text}\teci={eci}"),
            None => println!("{text}"),
        }
    }
    Ok(true)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Command::Decode { image }) => match run_decode(image) {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(err) => {
                error!("{err}");
                ExitCode::FAILURE
            }
        },
        None => match run_encode(&cli) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!("{err}");
                ExitCode::FAILURE
            }
        },
    }
}
