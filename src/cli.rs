use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::debug;

use crate::api::client::{SearchParams, TwitterClient};
use crate::data::exporter::save_csv;
use crate::data::row::{flatten_tweets, TweetRow};
use crate::data::table::TweetTable;

/// Search recent tweets and save the results to CSV.
#[derive(Debug, Parser)]
#[command(name = "tweetgrab", version, about = "Search recent tweets and save to CSV")]
pub struct Cli {
    /// Search query, e.g. 'python (lang:en)'
    #[arg(required_unless_present = "form")]
    pub query: Option<String>,

    /// CSV path
    #[arg(long, default_value = "outputs/tweets.csv")]
    pub out: PathBuf,

    /// Max results per page (10..100)
    #[arg(long, default_value_t = 100)]
    pub max_results: u32,

    /// How many pages to fetch (x*max-results)
    #[arg(long, default_value_t = 2)]
    pub pages: usize,

    /// ISO8601 start time
    #[arg(long)]
    pub start_time: Option<String>,

    /// ISO8601 end time
    #[arg(long)]
    pub end_time: Option<String>,

    /// Open the interactive form instead of running a one-shot search
    #[arg(long)]
    pub form: bool,
}

/// One-shot search: fetch pages, flatten, export, report.
pub fn run_search(cli: Cli) -> Result<()> {
    let Some(query) = cli.query else {
        bail!("a search query is required");
    };

    let client = TwitterClient::new()?;
    let params = SearchParams::new(query)
        .with_max_results(cli.max_results)
        .with_time_window(cli.start_time, cli.end_time)
        .with_page_limit(cli.pages);

    let mut all_rows: Vec<TweetRow> = Vec::new();
    for page in client.search(params) {
        let page = page?;
        debug!(target: "cli", "page with {} tweets", page.data.len());
        all_rows.extend(flatten_tweets(&page.data, page.includes.as_ref()));
    }

    let table = TweetTable::from_rows(&all_rows);
    let out = save_csv(&table, &cli.out)?;

    println!("Saved {} rows to {}", table.row_count(), out.display());
    Ok(())
}
