use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use forcelayout::generator::{self, DEFAULT_MAX_TICKS, LayoutOptions};
use forcelayout::io::load_config;
use forcelayout::server;

/// Force-directed graph layout: compute layouts headlessly or preview them live.
#[derive(Parser)]
#[command(name = "forcelayout")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input graph file (.json, .yaml) - used when no subcommand specified
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Output file - used when no subcommand specified
    #[arg(short, long, global = true, default_value = "layout.svg")]
    output: PathBuf,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a layout and write it as SVG, HTML or JSON
    Layout {
        /// Input graph file (.json, .yaml)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file; the format follows the extension
        #[arg(short, long, default_value = "layout.svg")]
        output: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Start a preview server that re-runs the layout when the input changes
    Serve {
        /// Input graph file (.json, .yaml)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for the viewer page
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Port to run the server on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

/// Simulation settings shared by every command
#[derive(Args, Debug)]
struct LayoutArgs {
    /// Simulation configuration file (.yaml, .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas width
    #[arg(long)]
    width: Option<f64>,

    /// Canvas height
    #[arg(long)]
    height: Option<f64>,

    /// Seed for deterministic tie-breaking
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks even if the layout has not settled
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: usize,
}

impl Default for LayoutArgs {
    fn default() -> Self {
        Self {
            config: None,
            width: None,
            height: None,
            seed: None,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

impl LayoutArgs {
    /// Config file first, then flag overrides
    fn to_options(&self) -> anyhow::Result<LayoutOptions> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Default::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;

        Ok(LayoutOptions {
            config,
            max_ticks: self.max_ticks,
            title: None,
        })
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn layout(input: &Path, output: &Path, args: &LayoutArgs) -> anyhow::Result<()> {
    let options = args.to_options()?;
    let document = generator::generate(input, output, &options)?;
    info!(
        "wrote layout of '{}' ({} nodes) to {}",
        document.title,
        document.frame.nodes.len(),
        output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Layout {
            input,
            output,
            layout: args,
        }) => {
            layout(&input, &output, &args)?;
        }
        Some(Commands::Serve {
            input,
            output,
            port,
            layout: args,
        }) => {
            server::serve(&input, &output, port, args.to_options()?).await?;
        }
        None => {
            // Default behavior: lay out if input provided
            if let Some(input) = cli.input {
                layout(&input, &cli.output, &LayoutArgs::default())?;
            } else {
                println!("forcelayout: no input specified. Use --help for usage.");
            }
        }
    }

    Ok(())
}
