//! # zplgfa CLI
//!
//! Command-line interface for turning images into ZPL graphic fields.
//!
//! ## Usage
//!
//! ```bash
//! # Convert a 200 dpi image for a 300 dpi printer
//! zplgfa convert --input logo.png --output logo.zpl
//!
//! # Target a printer preset, keep the orientation, emit a whole label
//! zplgfa convert -i logo.png -o logo.zpl --dpi 100 --printer zebra-203 --rotate 0 --label
//!
//! # Convert a folder of scans in parallel
//! zplgfa batch --out-dir out/ scans/*.png
//!
//! # Render a graphic field back to PNG
//! zplgfa preview --input logo.zpl --output check.png
//!
//! # Run the HTTP service
//! zplgfa serve --listen 0.0.0.0:8080
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use zplgfa::{
    ZplError,
    batch,
    pipeline::{self, ConvertOptions},
    printer::PrinterConfig,
    protocol::graphic_field::{self, GraphicEncoding},
    raster::{ResampleFilter, Rotation},
    render::scale::parse_dpi,
    server::{self, ServerConfig},
};

/// zplgfa - Convert images into ZPL graphic fields
#[derive(Parser, Debug)]
#[command(name = "zplgfa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert one image into a ^GFA graphic field
    Convert {
        /// Image to convert
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Where to write the ZPL text
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[command(flatten)]
        conversion: ConversionArgs,
    },

    /// Convert many images in parallel
    Batch {
        /// Directory the .zpl files are written to
        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,

        /// Images to convert
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        conversion: ConversionArgs,
    },

    /// Render the first graphic field of a ZPL file as PNG
    Preview {
        /// ZPL file containing a ^GF field
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// PNG file to write
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// List built-in printer presets
    Printers,

    /// Run the HTTP conversion service
    Serve {
        /// Address to listen on
        #[arg(long, env = "ZPLGFA_LISTEN", default_value = "127.0.0.1:8080")]
        listen: String,

        /// Maximum upload size in bytes
        #[arg(long, default_value_t = server::DEFAULT_BODY_LIMIT)]
        body_limit: usize,

        /// Largest decoded graphic field accepted by /api/preview, in bytes
        #[arg(long, default_value_t = server::DEFAULT_FIELD_LIMIT)]
        field_limit: u64,
    },
}

/// Options shared by `convert` and `batch`.
#[derive(Args, Debug)]
struct ConversionArgs {
    /// Resolution the image was prepared for
    #[arg(long, visible_alias = "source-dpi", default_value = "200", value_parser = parse_dpi)]
    dpi: f64,

    /// Resolution of the printer head
    #[arg(long, value_parser = parse_dpi, conflicts_with = "printer")]
    target_dpi: Option<f64>,

    /// Printer preset to take the target resolution from (see `zplgfa printers`)
    #[arg(long)]
    printer: Option<String>,

    /// Clockwise rotation in degrees applied before scaling
    #[arg(long, default_value = "90")]
    rotate: Rotation,

    /// How the bitmap is written into the field
    #[arg(long, value_enum, default_value_t = GraphicEncoding::CompressedHex)]
    encoding: GraphicEncoding,

    /// Resampling filter used when scaling
    #[arg(long, value_enum, default_value_t = ResampleFilter::Lanczos3)]
    filter: ResampleFilter,

    /// Wrap the field in a complete ^XA ... ^XZ label
    #[arg(long)]
    label: bool,

    /// Field origin x in dots (with --label)
    #[arg(long, default_value_t = 0)]
    origin_x: u32,

    /// Field origin y in dots (with --label)
    #[arg(long, default_value_t = 0)]
    origin_y: u32,
}

impl ConversionArgs {
    fn into_options(self) -> Result<ConvertOptions, ZplError> {
        let mut options = ConvertOptions {
            source_dpi: self.dpi,
            rotation: self.rotate,
            filter: self.filter,
            encoding: self.encoding,
            label: self.label,
            origin_x: self.origin_x,
            origin_y: self.origin_y,
            ..ConvertOptions::default()
        };

        if let Some(target_dpi) = self.target_dpi {
            options.target_dpi = target_dpi;
        }
        if let Some(name) = self.printer {
            let printer =
                PrinterConfig::by_name(&name).ok_or(ZplError::UnknownPrinter(name))?;
            options = options.for_printer(&printer);
        }

        Ok(options)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ZplError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            conversion,
        } => {
            let options = conversion.into_options()?;
            let result = pipeline::convert_file(&input, &output, &options)?;
            println!(
                "{} -> {} ({}x{} dots, {} bytes)",
                input.display(),
                output.display(),
                result.width,
                result.height,
                result.field.header().total_bytes
            );
        }

        Commands::Batch {
            out_dir,
            inputs,
            conversion,
        } => {
            let options = conversion.into_options()?;
            std::fs::create_dir_all(&out_dir)?;

            let outcomes = batch::run(batch::plan(&inputs, &out_dir), &options)?;
            let total = outcomes.len();
            let mut failed = 0;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(result) => println!(
                        "{} -> {} ({}x{} dots)",
                        outcome.job.input.display(),
                        outcome.job.output.display(),
                        result.width,
                        result.height
                    ),
                    Err(e) => {
                        failed += 1;
                        eprintln!("{}: {}", outcome.job.input.display(), e);
                    }
                }
            }

            if failed > 0 {
                return Err(ZplError::BatchFailed { failed, total });
            }
        }

        Commands::Preview { input, output } => {
            let zpl = std::fs::read_to_string(&input)?;
            let field = graphic_field::parse(&zpl)?;
            let bitmap = field.to_bitmap()?;
            std::fs::write(&output, bitmap.to_png()?)?;
            println!(
                "Saved {}x{} preview to {}",
                bitmap.width(),
                bitmap.height(),
                output.display()
            );
        }

        Commands::Printers => {
            println!("{:<12} {:>5} {:>7}  NAME", "KEY", "DPI", "WIDTH");
            for printer in PrinterConfig::BUILT_IN {
                println!(
                    "{:<12} {:>5} {:>7}  {}",
                    printer.key, printer.dpi, printer.width_dots, printer.name
                );
            }
        }

        Commands::Serve {
            listen,
            body_limit,
            field_limit,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                body_limit,
                field_limit,
            };
            tokio::runtime::Runtime::new()?.block_on(server::serve(config))?;
        }
    }

    Ok(())
}
