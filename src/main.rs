use clap::{Parser, Subcommand};
use responsive_uploads::imaging::RustBackend;
use responsive_uploads::{config, logging, server};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "responsive-uploads")]
#[command(about = "Image upload service with mobile and desktop renditions")]
#[command(long_about = "\
Image upload service with mobile and desktop renditions

POST up to 10 PNG or JPEG files to /upload (multipart field \"files\").
Each accepted file is stored, then a 600x600 region from its top-left corner
is scaled to 480px (mobile) and 1920px (desktop) wide.

Storage layout:

  uploads/
  ├── <millis>-<name>              # Original, as uploaded
  ├── mobile/<millis>-<name>       # Mobile rendition
  └── desktop/<millis>-<name>      # Desktop rendition

Everything under uploads/ is served at /uploads/.

Run 'responsive-uploads gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Configuration file (stock defaults apply when it does not exist)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run the upload server (default)
    Serve,
    /// Load and validate the config, then print the effective values
    CheckConfig,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let config = config::load_config(&cli.config)?;
            logging::init_logging(&config.logging.level)?;
            let runtime = build_runtime()?;
            runtime.block_on(server::serve(&config, Arc::new(RustBackend::new())))?;
        }
        Command::CheckConfig => {
            let config = config::load_config(&cli.config)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn build_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}
