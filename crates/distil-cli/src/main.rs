//! Distil CLI - run the palette module against an image and show the results

use std::fs;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use distil_host::{decode, loader, pipeline, DistilModule, DEFAULT_IMAGE_MIME, DEFAULT_MODULE_FILE};

#[derive(Parser)]
#[command(name = "distil")]
#[command(about = "Host harness for the Distil palette WASM module", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distil an image into a color palette
    Run {
        /// Image path or URL
        #[arg(short, long)]
        image: String,

        /// Module artifact path or URL
        #[arg(short, long, default_value = DEFAULT_MODULE_FILE)]
        module: String,

        /// Number of palette colors to request
        #[arg(short, long, default_value_t = 8)]
        palette_size: usize,

        /// Write the rendered swatch fragment to this file
        #[arg(long)]
        html: Option<String>,

        /// Print swatches as JSON instead of plain hex values
        #[arg(long)]
        json: bool,
    },

    /// Re-encode a file as a data: URI
    Encode {
        /// Input file path or URL
        #[arg(short, long)]
        input: String,

        /// MIME type override (sniffed from magic bytes when omitted)
        #[arg(short, long)]
        mime: Option<String>,
    },

    /// Decode the module's Point struct via its _getPoint export
    Point {
        /// Module artifact path or URL
        #[arg(short, long, default_value = DEFAULT_MODULE_FILE)]
        module: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run {
            image,
            module,
            palette_size,
            html,
            json,
        } => run(&image, &module, palette_size, html.as_deref(), json),
        Commands::Encode { input, mime } => encode(&input, mime.as_deref()),
        Commands::Point { module } => point(&module),
    }
}

fn run(
    image: &str,
    module_locator: &str,
    palette_size: usize,
    html: Option<&str>,
    json: bool,
) -> Result<()> {
    let wasm = loader::load_resource(module_locator)
        .with_context(|| format!("loading module from {module_locator}"))?;
    let image_bytes =
        loader::load_resource(image).with_context(|| format!("loading image from {image}"))?;

    let mut module = DistilModule::instantiate(&wasm)?;
    let swatches = pipeline::distil(&mut module, &image_bytes, palette_size)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&swatches)?);
    } else {
        for swatch in &swatches {
            println!("{}", swatch.hex);
        }
    }

    if let Some(path) = html {
        fs::write(path, pipeline::render_swatches(&swatches))
            .with_context(|| format!("writing {path}"))?;
        tracing::info!(path, count = swatches.len(), "wrote swatch fragment");
    }

    Ok(())
}

fn encode(input: &str, mime: Option<&str>) -> Result<()> {
    let bytes =
        loader::load_resource(input).with_context(|| format!("loading input from {input}"))?;

    let mime = mime
        .or_else(|| decode::sniff_image_mime(&bytes))
        .unwrap_or(DEFAULT_IMAGE_MIME);
    println!("{}", decode::to_data_uri(&bytes, mime));

    Ok(())
}

fn point(module_locator: &str) -> Result<()> {
    let wasm = loader::load_resource(module_locator)
        .with_context(|| format!("loading module from {module_locator}"))?;

    let mut module = DistilModule::instantiate(&wasm)?;
    let ptr = module.get_point()?;
    let point = module.with_view(|view| decode::decode_point(view, ptr as usize))?;

    println!("{}", serde_json::to_string_pretty(&point)?);
    Ok(())
}
