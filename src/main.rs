//! CLI entry point for presje

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "presje")]
#[command(version = "0.1.0")]
#[command(about = "A server-rendered blog backed by a hosted content store", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the blog server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Export the site as static files
    #[command(alias = "g")]
    Generate,

    /// Remove the exported files
    Clean,

    /// List site content
    List {
        /// Type of content to list (post, category)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "presje=debug,info"
    } else {
        "presje=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };

    match cli.command {
        Commands::Serve { port, ip, open } => {
            let blog = presje::Blog::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            presje::server::start(&blog, &ip, port, open).await?;
        }

        Commands::Generate => {
            let blog = presje::Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");
            let summary = blog.generate().await?;
            println!(
                "Generated {} pages into {:?}",
                summary.pages, blog.public_dir
            );
        }

        Commands::Clean => {
            let blog = presje::Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let blog = presje::Blog::new(&base_dir)?;
            presje::commands::list::run(&blog, &r#type).await?;
        }

        Commands::Version => {
            println!("presje version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
