use clap::{Parser, Subcommand};
use shelfmark::{config, output, pipeline, render::HtmlRenderer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shelfmark")]
#[command(about = "Static site generator for Calibre libraries")]
#[command(long_about = "\
Static site generator for Calibre libraries

The Calibre catalog is the data source. Every author, every series and the
whole collection get a page; covers are copied alongside.

Output structure:

  docs/
  ├── index.html                   # Every book, by title
  ├── author--jane-doe.html        # One page per author
  ├── series--discworld.html       # Container series: all books beneath it
  ├── series--city-watch.html      # Leaf series: books in series order
  └── covers/
      └── 42.jpg                   # Cover of book 42

Series names containing the delimiter (default '.') become a hierarchy:
'Discworld.City Watch' is the series 'City Watch' inside 'Discworld'.

Run 'shelfmark gen-config' to generate a documented shelfmark.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Calibre library directory (overrides `catalog_root`)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Output directory (overrides `output_dir`)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read the catalog and write the site
    Build,
    /// Read the catalog and show what would be generated
    Scan {
        /// Print the assembled library as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock shelfmark.toml with all options documented
    GenConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "shelfmark=debug"
    } else {
        "shelfmark=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &cli.command {
        Command::Build => {
            let site_config = site_config(&cli)?;
            println!("==> Reading {}", site_config.database_path().display());
            let renderer = HtmlRenderer::new(&site_config);
            let report = pipeline::build(&site_config, &renderer).await?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", report.output_dir.display());
        }
        Command::Scan { json } => {
            let site_config = site_config(&cli)?;
            let library = pipeline::load_library(&site_config).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&library)?);
            } else {
                output::print_scan_output(&library);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file, then apply command-line overrides.
fn site_config(cli: &Cli) -> Result<config::SiteConfig, config::ConfigError> {
    let mut site_config = config::load_config(&cli.config)?;
    if let Some(catalog) = &cli.catalog {
        site_config.catalog_root = catalog.clone();
    }
    if let Some(output) = &cli.output {
        site_config.output_dir = output.clone();
    }
    Ok(site_config)
}
