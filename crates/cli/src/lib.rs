// The verbosity stuff is cribbed from https://github.com/clap-rs/clap-verbosity-flag/blob/c621a6a8a7c0b6df8f1464a985a5d076b4915693/src/lib.rs and updated for tracing

#![deny(unused_crate_dependencies)]

use anyhow::{Error, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use creodias_finder::{Client, Config, FilterValue, Products, Query};
use std::{fs::File, io::Write, str::FromStr, time::Duration};
use tracing::metadata::Level;
use tracing_subscriber::{
    Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// creodias-finder: search the CREODIAS EO Finder API for satellite products
#[derive(Debug, Parser)]
pub struct Finder {
    #[command(subcommand)]
    command: Command,

    /// The collections root of the EO Finder API.
    #[arg(
        long = "api-url",
        global = true,
        default_value = creodias_finder::API_URL
    )]
    api_url: String,

    /// The number of records to request per page.
    #[arg(long = "max-records", global = true, default_value_t = creodias_finder::MAX_RECORDS)]
    max_records: u64,

    /// The number of pages after which a search is considered too large.
    #[arg(long = "max-pages", global = true, default_value_t = creodias_finder::MAX_PAGES)]
    max_pages: usize,

    /// The timeout of each page request, in seconds.
    #[arg(long = "timeout", global = true)]
    timeout: Option<u64>,

    /// Whether to print compact JSON output.
    ///
    /// By default, JSON output will printed "compact" if it is being output to a file, and printed "pretty" if it is being output to standard output.
    /// Use this argument to force one or the other.
    #[arg(short = 'c', long = "compact-json", global = true)]
    compact_json: Option<bool>,

    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        help = ErrorLevel::verbose_help(),
        long_help = ErrorLevel::verbose_long_help(),
    )]
    verbose: u8,

    #[arg(
        long,
        short = 'q',
        action = clap::ArgAction::Count,
        global = true,
        help = ErrorLevel::quiet_help(),
        long_help = ErrorLevel::quiet_long_help(),
        conflicts_with = "verbose",
    )]
    quiet: u8,
}

/// A creodias-finder subcommand.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Searches the API and writes every product as one JSON object, keyed by product id.
    Search {
        /// The output file.
        ///
        /// To write to standard output, pass `-` or don't provide an argument at all.
        outfile: Option<String>,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Prints the url of the first page of a search, without sending any requests.
    Url {
        #[command(flatten)]
        query: QueryArgs,
    },
}

/// The parameters of a search.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// The data collection, e.g. `Sentinel2`.
    #[arg(long = "collection")]
    collection: Option<String>,

    /// The start of the observations, as an ISO 8601 date or datetime.
    #[arg(long = "start-date")]
    start_date: Option<String>,

    /// The end of the observations, as an ISO 8601 date or datetime.
    ///
    /// If no time is given, 23:59:59 is used.
    #[arg(long = "end-date")]
    end_date: Option<String>,

    /// The area of interest, as well-known text.
    #[arg(long = "geometry")]
    geometry: Option<String>,

    /// Additional query parameters, in `key=value` pairs, e.g. `--filter productType=L1C`.
    #[arg(long = "filter")]
    filters: Vec<KeyValue>,

    /// Range query parameters, in `key=first,second` pairs, e.g. `--range cloudCover=0,20`.
    #[arg(long = "range")]
    ranges: Vec<KeyValue>,
}

#[derive(Debug, Clone)]
struct KeyValue(String, String);

#[derive(Copy, Clone, Debug, Default)]
struct ErrorLevel;

impl Finder {
    /// Runs this command.
    ///
    /// If `init_tracing_subscriber` is `false`, it is expected that the caller
    /// is setting up the appropriate logging.
    pub fn run(self, init_tracing_subscriber: bool) -> Result<()> {
        if init_tracing_subscriber {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_filter(self.log_filter()),
                )
                .init();
        }
        match self.command {
            Command::Search {
                ref outfile,
                ref query,
            } => {
                let query = query.to_query()?;
                let client = Client::with_config(self.config()?)?;
                let products = client.search(&query)?;
                tracing::info!("found {} products", products.len());
                self.put(outfile.as_deref(), &products)
            }
            Command::Url { ref query } => {
                let encoded = query.to_query()?.encode(&self.config()?)?;
                println!("{}", encoded.page_url(1));
                Ok(())
            }
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::new(&self.api_url)?
            .with_max_records(self.max_records)
            .with_max_pages(self.max_pages);
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(Duration::from_secs(timeout));
        }
        Ok(config)
    }

    fn put(&self, href: Option<&str>, products: &Products) -> Result<()> {
        let href = href.and_then(|s| if s == "-" { None } else { Some(s) });
        let pretty = self.compact_json.map(|c| !c).unwrap_or(href.is_none());
        let mut bytes = if pretty {
            serde_json::to_vec_pretty(products)?
        } else {
            serde_json::to_vec(products)?
        };
        bytes.push(b'\n');
        if let Some(href) = href {
            File::create(href)?.write_all(&bytes)?;
        } else {
            std::io::stdout().write_all(&bytes)?;
        }
        Ok(())
    }

    pub fn log_level(&self) -> Option<Level> {
        level_enum(self.verbosity())
    }

    /// Returns the filter for log output, which is off when quiet.
    pub fn log_filter(&self) -> LevelFilter {
        self.log_level()
            .map(LevelFilter::from_level)
            .unwrap_or(LevelFilter::OFF)
    }

    fn verbosity(&self) -> i8 {
        level_value(ErrorLevel::default()) - (self.quiet as i8) + (self.verbose as i8)
    }
}

impl QueryArgs {
    /// Converts these arguments to a query.
    pub fn to_query(&self) -> Result<Query> {
        let mut query = Query::new();
        if let Some(collection) = &self.collection {
            query = query.collection(collection);
        }
        if let Some(start_date) = &self.start_date {
            query = query.start_date(start_date.as_str());
        }
        if let Some(end_date) = &self.end_date {
            query = query.end_date(end_date.as_str());
        }
        if let Some(geometry) = &self.geometry {
            query = query.geometry(geometry);
        }
        for KeyValue(key, value) in &self.filters {
            query = query.filter(key, value.as_str());
        }
        for KeyValue(key, value) in &self.ranges {
            let values: Vec<&str> = value.split(',').map(str::trim).collect();
            query = query.filter(key, FilterValue::try_from(values)?);
        }
        Ok(query)
    }
}

impl ErrorLevel {
    fn default() -> Option<Level> {
        Some(Level::ERROR)
    }

    fn verbose_help() -> Option<&'static str> {
        Some("Increase verbosity")
    }

    fn verbose_long_help() -> Option<&'static str> {
        None
    }

    fn quiet_help() -> Option<&'static str> {
        Some("Decrease verbosity")
    }

    fn quiet_long_help() -> Option<&'static str> {
        None
    }
}

impl FromStr for KeyValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some((key, value)) = s.split_once('=') {
            Ok(KeyValue(key.to_string(), value.to_string()))
        } else {
            Err(anyhow!("invalid key=value: {s}"))
        }
    }
}

fn level_enum(verbosity: i8) -> Option<Level> {
    match verbosity {
        i8::MIN..=-1 => None,
        0 => Some(Level::ERROR),
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        4..=i8::MAX => Some(Level::TRACE),
    }
}

fn level_value(level: Option<Level>) -> i8 {
    match level {
        None => -1,
        Some(Level::ERROR) => 0,
        Some(Level::WARN) => 1,
        Some(Level::INFO) => 2,
        Some(Level::DEBUG) => 3,
        Some(Level::TRACE) => 4,
    }
}

#[cfg(test)]
use {assert_cmd as _, mockito as _, rstest as _, tempfile as _};
