//! Driftline command-line interface
//!
//! A thin front-end over the client library: each subcommand maps to one
//! remote operation and prints the decoded JSON response to stdout.

use clap::{Parser, Subcommand, ValueEnum};
use driftline_client::params::ProxyPool;
use driftline_client::{Client, ClientConfig, RequestParams, SearchParams};
use tracing_subscriber::EnvFilter;

/// Driftline: client for the Driftline crawling cloud
#[derive(Parser, Debug)]
#[command(name = "driftline")]
#[command(version)]
#[command(about = "Crawl, scrape, and search the web through the Driftline cloud", long_about = None)]
struct Cli {
    /// API key; falls back to the DRIFTLINE_API_KEY environment variable
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProxyArg {
    Residential,
    Mobile,
    Isp,
}

impl From<ProxyArg> for ProxyPool {
    fn from(arg: ProxyArg) -> Self {
        match arg {
            ProxyArg::Residential => ProxyPool::Residential,
            ProxyArg::Mobile => ProxyPool::Mobile,
            ProxyArg::Isp => ProxyPool::Isp,
        }
    }
}

/// Crawl tuning flags shared by the page-fetching subcommands
#[derive(Debug, clap::Args)]
struct CrawlFlags {
    /// Limit the number of pages visited
    #[arg(short, long)]
    limit: Option<u32>,

    /// Crawl depth from the start URL
    #[arg(short, long)]
    depth: Option<u32>,

    /// Include page metadata in each record
    #[arg(long)]
    metadata: bool,

    /// Include matched links in each record
    #[arg(long)]
    return_page_links: bool,

    /// Route requests through a proxy pool
    #[arg(long, value_enum)]
    proxy: Option<ProxyArg>,

    /// Reduced-cost mode with speed/accuracy trade-offs
    #[arg(long)]
    lite_mode: bool,
}

impl CrawlFlags {
    fn into_params(self) -> RequestParams {
        RequestParams {
            limit: self.limit,
            depth: self.depth,
            metadata: self.metadata.then_some(true),
            return_page_links: self.return_page_links.then_some(true),
            proxy: self.proxy.map(Into::into),
            lite_mode: self.lite_mode.then_some(true),
            ..RequestParams::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrape a single page
    Scrape {
        /// The URL to scrape
        url: String,
        #[command(flatten)]
        flags: CrawlFlags,
    },
    /// Crawl a website
    Crawl {
        /// The URL to start crawling from
        url: String,
        #[command(flatten)]
        flags: CrawlFlags,
        /// Print records as they arrive instead of buffering
        #[arg(long)]
        stream: bool,
    },
    /// Fetch the links found at a URL
    Links {
        url: String,
        #[command(flatten)]
        flags: CrawlFlags,
    },
    /// Take a screenshot of a URL
    Screenshot {
        url: String,
        #[command(flatten)]
        flags: CrawlFlags,
    },
    /// Search the web and gather the result pages
    Search {
        /// The search query
        query: String,
        /// Number of search results
        #[arg(short, long)]
        num: Option<u32>,
        #[command(flatten)]
        flags: CrawlFlags,
    },
    /// Show the account's remaining credits
    Credits,
    /// Show the active crawl state for a website
    State {
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let mut config = ClientConfig::builder();
    if let Some(key) = cli.api_key {
        config = config.api_key(key);
    }
    let client = Client::with_config(config.build()?)?;

    match cli.command {
        Commands::Scrape { url, flags } => {
            let result = client
                .scrape_url(&url, Some(&flags.into_params()), "application/json")
                .await?;
            print_json(&result)?;
        }
        Commands::Crawl { url, flags, stream } => {
            if stream {
                let delivered = client
                    .crawl_url_each(&url, Some(&flags.into_params()), |record| {
                        println!("{record}");
                    })
                    .await?;
                tracing::info!(delivered, "crawl stream finished");
            } else {
                let result = client
                    .crawl_url(&url, Some(&flags.into_params()), "application/json")
                    .await?;
                print_json(&result)?;
            }
        }
        Commands::Links { url, flags } => {
            let result = client
                .links(&url, Some(&flags.into_params()), "application/json")
                .await?;
            print_json(&result)?;
        }
        Commands::Screenshot { url, flags } => {
            let result = client
                .screenshot(&url, Some(&flags.into_params()), "application/json")
                .await?;
            print_json(&result)?;
        }
        Commands::Search { query, num, flags } => {
            let params = SearchParams {
                base: flags.into_params(),
                num,
                ..SearchParams::default()
            };
            let result = client
                .search(&query, Some(params), "application/json")
                .await?;
            print_json(&result)?;
        }
        Commands::Credits => {
            let result = client.credits().await?;
            print_json(&result)?;
        }
        Commands::State { url } => {
            let result = client
                .crawl_state(&url, None, "application/json")
                .await?;
            print_json(&result)?;
        }
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("driftline_client=info,warn"),
            1 => EnvFilter::new("driftline_client=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
