use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use marketplace_scout::api::{HttpListingSource, ListingSource, SnapshotSource};
use marketplace_scout::config::AppConfig;
use marketplace_scout::marketplace::{Marketplace, Panel};
use marketplace_scout::models::{Category, PropertyType, Source};
use marketplace_scout::search::{
    BhkFilter, Featured, FilterState, PageBar, PriceRange, Selection, ViewMode, ViewerContext,
    SEARCH_DEBOUNCE,
};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "marketplace-scout", version, about = "Browse marketplace properties and enquiries")]
struct Cli {
    /// Config file (defaults to ./marketplace.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read data from a JSON snapshot instead of the API
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Home city used to rank nearby results first
    #[arg(long, global = true)]
    city: Option<String>,

    /// Also write the results to this JSON file
    #[arg(long, global = true)]
    json: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Browse paginated property listings
    Properties {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Search and filter buyer/tenant enquiries
    Enquiries {
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Free-text search (typos are tolerated)
    #[arg(long, short)]
    search: Option<String>,

    #[arg(long, default_value = "ALL")]
    category: Selection<Category>,

    #[arg(long = "type", default_value = "ALL")]
    property_type: Selection<PropertyType>,

    #[arg(long, default_value = "ALL")]
    source: Selection<Source>,

    #[arg(long)]
    min_price: Option<i64>,

    #[arg(long)]
    max_price: Option<i64>,

    /// Bedrooms: ALL, a number, or 5+
    #[arg(long, default_value = "ALL")]
    bhk: BhkFilter,

    /// Only featured listings
    #[arg(long, conflicts_with = "not_featured")]
    featured: bool,

    /// Exclude featured listings
    #[arg(long)]
    not_featured: bool,
}

impl FilterArgs {
    fn price_range(&self) -> Result<Option<PriceRange>> {
        if self.min_price.is_none() && self.max_price.is_none() {
            return Ok(None);
        }
        let range = PriceRange::new(
            self.min_price.unwrap_or(0),
            self.max_price.unwrap_or(i64::MAX),
        )?;
        Ok(Some(range))
    }

    fn apply(&self, filters: &mut FilterState, price: Option<PriceRange>) {
        let now = Instant::now();
        if let Some(search) = &self.search {
            filters.set_search(search.clone(), now);
        }
        filters.set_price_range(price, now);
        filters.set_category(self.category);
        filters.set_property_type(self.property_type);
        filters.set_source(self.source);
        filters.set_bhk(self.bhk);
        filters.set_featured(match (self.featured, self.not_featured) {
            (true, _) => Featured::Only,
            (_, true) => Featured::Exclude,
            _ => Featured::Any,
        });
        // One-shot commands have no further keystrokes to wait for
        filters.poll(now + SEARCH_DEBOUNCE);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    info!("🏠 Marketplace Scout");
    info!("====================");

    match &cli.snapshot {
        Some(path) => {
            let source = Arc::new(SnapshotSource::load(path).await?);
            run(source, &cli, &config).await
        }
        None => {
            info!("Using API at {}", config.api_base_url);
            let source = Arc::new(HttpListingSource::new(&config)?);
            run(source, &cli, &config).await
        }
    }
}

async fn run<S: ListingSource + 'static>(source: Arc<S>, cli: &Cli, config: &AppConfig) -> Result<()> {
    let viewer = ViewerContext::new(cli.city.clone().or_else(|| config.viewer_city.clone()));

    match &cli.command {
        Command::Properties {
            filters,
            page,
            page_size,
        } => {
            let price = filters.price_range()?;
            let mut market = Marketplace::new(source, viewer, page_size.unwrap_or(config.page_size));
            market.update(|state| {
                filters.apply(state, price);
                state.set_page(*page);
            });
            market.settle().await;
            print_properties(&market, cli).await?;
            market.leave();
        }
        Command::Enquiries { filters } => {
            let price = filters.price_range()?;
            let mut market = Marketplace::new(source, viewer, config.page_size);
            market.update(|state| {
                state.set_view_mode(ViewMode::Enquiries);
                filters.apply(state, price);
            });
            market.settle().await;
            print_enquiries(&mut market, cli).await?;
            market.leave();
        }
    }

    Ok(())
}

/// Data behind a panel, or why there is none to print.
fn loaded<'a, V>(panel: Panel<'a, V>, what: &str) -> Result<&'a V> {
    match panel {
        Panel::Ready(data) => Ok(data),
        Panel::Error(err) => anyhow::bail!("{err}"),
        Panel::Idle | Panel::Loading { .. } => anyhow::bail!("{what} did not load"),
    }
}

/// 1-based number of the first listing on `page`.
fn first_position(page: u32, page_size: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(page_size) + 1
}

async fn print_properties<S: ListingSource + 'static>(market: &Marketplace<S>, cli: &Cli) -> Result<()> {
    let page = loaded(market.listings_panel(), "Listings")?;

    info!("\n✅ {} properties match ({} pages)\n", page.total, page.total_pages);
    let active = market.filters().criteria().active_count();
    if active > 0 {
        info!("{} filters applied", active);
    }

    let first = first_position(page.page, market.filters().page_size());
    for (position, property) in (first..).zip(&page.items) {
        let featured = if property.featured { " ⭐" } else { "" };
        println!("{}. {}{} (₹{})", position, property.title, featured, property.price);
        match property.bhk {
            Some(bhk) => println!("   {} BHK {} · {}", bhk, property.property_type, property.category),
            None => println!("   {} · {}", property.property_type, property.category),
        }
        match &property.location.locality {
            Some(locality) => println!("   {}, {}", locality, property.location.city),
            None => println!("   {}", property.location.city),
        }
        println!("   ID: {} · posted by {}", property.id, property.source);
        println!();
    }

    let controls = market.page_controls();
    if !controls.is_empty() {
        println!("{}", PageBar(&controls));
    }

    if let Some(path) = &cli.json {
        let json = serde_json::to_string_pretty(&page.items)?;
        tokio::fs::write(path, json).await?;
        info!("💾 Saved {} properties to {}", page.items.len(), path.display());
    }

    Ok(())
}

async fn print_enquiries<S: ListingSource + 'static>(market: &mut Marketplace<S>, cli: &Cli) -> Result<()> {
    loaded(market.enquiries_panel(), "Enquiries")?;

    let visible = market.visible_enquiries();
    info!("\n✅ {} enquiries match\n", visible.len());

    for (i, enquiry) in visible.iter().enumerate() {
        println!("{}. {}", i + 1, enquiry.description);
        let budget = match (enquiry.budget.min, enquiry.budget.max) {
            (Some(min), Some(max)) => format!("₹{min} - ₹{max}"),
            (Some(min), None) => format!("from ₹{min}"),
            (None, Some(max)) => format!("up to ₹{max}"),
            (None, None) => "budget not given".to_string(),
        };
        println!("   {}", budget);
        if let Some(bhk) = enquiry.bhk {
            println!("   {} BHK", bhk);
        }
        if let Some(city) = &enquiry.city {
            println!("   City: {}", city);
        }
        println!("   ID: {}", enquiry.id);
        println!();
    }

    if let Some(path) = &cli.json {
        let json = serde_json::to_string_pretty(&visible)?;
        tokio::fs::write(path, json).await?;
        info!("💾 Saved {} enquiries to {}", visible.len(), path.display());
    }

    Ok(())
}
