//! CLI runner - executes commands

use crate::bar::{Bar, BarNormalizer};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::AppConfig;
use crate::error::{Error, Result, ResultExt};
use crate::loader::{HttpPageFetcher, LoadOptions, LoadOutcome, PageLoader};
use crate::location::{FixedLocationProvider, LocationCache};
use crate::pagination::LoadMode;
use crate::types::Coordinates;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Browse {
                endpoint,
                lat,
                lon,
                tags,
                open_now,
                pages,
            } => {
                let mut config = self.load_config()?;
                if let Some(endpoint) = endpoint {
                    config.endpoint.clone_from(endpoint);
                }
                if !tags.is_empty() {
                    config.filters.selected_tags.clone_from(tags);
                }
                if *open_now {
                    config.filters.open_now = true;
                }
                config.validate()?;

                let position = match (lat, lon) {
                    (Some(lat), Some(lon)) => Some(Coordinates::new(*lat, *lon)),
                    (None, None) => None,
                    _ => return Err(Error::config("--lat and --lon must be given together")),
                };
                self.browse(&config, position, *pages).await
            }
            Commands::Config => self.show_config(),
        }
    }

    /// Config file if given, defaults otherwise
    fn load_config(&self) -> Result<AppConfig> {
        match &self.cli.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading config");
                AppConfig::from_file(path).with_context(|| format!("config {}", path.display()))
            }
            None => Ok(AppConfig::default()),
        }
    }

    fn show_config(&self) -> Result<()> {
        let config = self.load_config()?;
        print!("{}", config.to_yaml()?);
        Ok(())
    }

    /// Load pages until `pages` are on screen or the feed runs out
    async fn browse(&self, config: &AppConfig, position: Option<Coordinates>, pages: u32) -> Result<()> {
        let provider = position.map_or_else(FixedLocationProvider::unavailable, FixedLocationProvider::new);
        let location = LocationCache::new(Arc::new(provider))
            .with_ttl(config.location.cache_ttl())
            .with_fallback(config.location.fallback());
        let coordinates = location.current_coordinates().await;

        let fetcher = HttpPageFetcher::from_config(config).context("HTTP client")?;
        let loader = PageLoader::builder(Arc::new(fetcher), BarNormalizer)
            .paging(config.paging.clone())
            .filters(config.filters.clone())
            .fallback(config.location.fallback())
            .location(&location)
            .build();

        info!(
            endpoint = %config.endpoint,
            %coordinates,
            tags = ?config.filters.sorted_tags(),
            "Browsing bars"
        );
        let start = Instant::now();

        let mut updates = loader.subscribe();
        let first = loader
            .load_page(1, LoadMode::Initial, LoadOptions::default())
            .await;
        debug!(outcome = %first, "First page");

        let mut printed = 0;
        let (loaded_pages, total_count) = loop {
            let state = updates.borrow_and_update().clone();

            if let Some(bars) = state.data.get(printed..) {
                self.print_bars(bars)?;
            }
            printed = state.data.len();

            if let Some(message) = state.error {
                loader.shutdown();
                return Err(Error::Other(message));
            }
            if state.current_page >= pages || !state.has_more {
                break (state.current_page, state.total_count);
            }

            // A background prefetch may be running; wait for it instead of racing it.
            if state.is_busy() || loader.load_more().await == LoadOutcome::Skipped {
                if updates.changed().await.is_err() {
                    break (state.current_page, state.total_count);
                }
            }
        };

        loader.shutdown();

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(bars = printed, pages = loaded_pages, ?total_count, elapsed_ms, "Browse finished");
        if self.cli.format == OutputFormat::Pretty {
            let total = total_count.map_or_else(String::new, |t| format!(" of {t}"));
            println!("\n{printed} bars{total}, {loaded_pages} page(s) in {elapsed_ms}ms");
        }
        Ok(())
    }

    fn print_bars(&self, bars: &[Bar]) -> Result<()> {
        for bar in bars {
            match self.cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string(bar)?),
                OutputFormat::Pretty => println!("{}", pretty_line(bar)),
            }
        }
        Ok(())
    }
}

fn pretty_line(bar: &Bar) -> String {
    let distance = bar.distance.map_or_else(|| "-".to_string(), |d| format!("{d:.1}"));
    let rating = bar.rating.map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
    let open = match bar.is_open {
        Some(true) => "open",
        Some(false) => "closed",
        None => "",
    };
    format!(
        "{:<32} {:>7} {:>4} {:<6} {}",
        bar.name,
        distance,
        rating,
        open,
        bar.tags.join(", ")
    )
}
