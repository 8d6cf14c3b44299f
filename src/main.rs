use anyhow::Context;
use atoll_core::config::Config;
use atoll_net::{http::HttpClient, SearchSource};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use url::Url;

#[derive(Parser)]
#[command(name = "atoll", about = "Islands, search and fragment navigation for server-rendered sites")]
struct Cli {
    /// Write debug logs to /tmp/atoll-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,

    /// Read configuration from this file instead of the XDG location.
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the reference blog.
    Serve {
        /// Listen address; defaults to `site.addr`.
        #[arg(long)]
        addr: Option<String>,
    },
    /// Query a running site's search endpoint and print the hits.
    Search {
        query: String,
        /// Site origin; defaults to `site.base_url`.
        #[arg(long)]
        base_url: Option<String>,
    },
}

fn init_logging(debug: bool) -> anyhow::Result<()> {
    if debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/atoll-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("atoll debug log started, tail -f /tmp/atoll-debug.log");
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.site.addr.clone());
            let site = atoll::site::Site::new(
                atoll::site::sample_posts(),
                config.search.clone(),
                config.fragment.clone(),
            );
            atoll::site::serve(&addr, Arc::new(site)).await
        }
        Command::Search { query, base_url } => {
            let base = base_url.unwrap_or_else(|| config.site.base_url.clone());
            let base = Url::parse(&base).with_context(|| format!("invalid base url {base:?}"))?;
            let client = HttpClient::new(base, config.search.clone(), config.fragment.clone());
            let hits = client.search(query.trim()).await?;
            if hits.is_empty() {
                println!("no results");
            }
            for hit in hits {
                println!("{}\t{}", hit.title, hit.url);
            }
            Ok(())
        }
    }
}
