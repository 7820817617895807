//! stay-pilot CLI
//!
//! Runs one search-rank-reserve scenario against the live site and writes the
//! ranking and reservation artifacts.

use anyhow::{Context, bail};
use clap::Parser;
use std::{path::PathBuf, time::Duration};
use stay_pilot::{ActionOptions, ArtifactStore, BrowserSession, ConnectionOptions, LaunchOptions, Watchdog,
                 pilot::{ListingAnalyzer, ReservationFlow, SearchCriteria, SearchOptions, SearchPage, SearchSelectors}};

#[derive(Parser, Debug)]
#[command(name = "stay-pilot", version, about = "Search, rank and reserve a listing in a real browser")]
struct Cli {
    /// Destination to search for
    #[arg(long, default_value = "Tel Aviv")]
    location: String,

    /// Check-in date (YYYY-MM-DD)
    #[arg(long)]
    check_in: String,

    /// Check-out date (YYYY-MM-DD)
    #[arg(long)]
    check_out: String,

    #[arg(long, default_value_t = 2)]
    adults: u32,

    #[arg(long, default_value_t = 0)]
    children: u32,

    /// Phone number entered on the reservation page
    #[arg(long)]
    phone: Option<String>,

    /// Launch the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Per-action wait timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Hard timeout for the whole run in seconds
    #[arg(long)]
    suite_timeout: Option<u64>,

    /// Directory receiving the JSON artifacts
    #[arg(long, default_value = "artifacts")]
    artifacts_dir: PathBuf,

    /// Chrome binary to launch
    #[arg(long)]
    chrome_path: Option<PathBuf>,

    /// Home page the search starts from
    #[arg(long)]
    base_url: Option<String>,

    /// DevTools WebSocket URL of a running browser to attach to instead of launching one
    #[arg(long, conflicts_with_all = ["headed", "chrome_path"])]
    ws_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut watchdog = Watchdog::new();
    if let Some(secs) = cli.suite_timeout {
        watchdog.arm(Duration::from_secs(secs))?;
    }

    let outcome = run(&cli);
    watchdog.disarm();
    outcome
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let criteria = SearchCriteria::new(
        cli.location.clone(),
        SearchCriteria::parse_date(&cli.check_in)?,
        SearchCriteria::parse_date(&cli.check_out)?,
        cli.adults,
        cli.children,
    )?;

    let session = match &cli.ws_url {
        Some(ws_url) => BrowserSession::connect(ConnectionOptions::new(ws_url)).context("attaching to browser")?,
        None => {
            let mut launch = LaunchOptions::new().headless(!cli.headed);
            if let Some(path) = &cli.chrome_path {
                launch = launch.chrome_path(path);
            }
            BrowserSession::launch(launch).context("launching browser")?
        }
    };
    let actions = session.actions(ActionOptions::new().timeout(Duration::from_secs(cli.timeout_secs)));
    let store = ArtifactStore::new(&cli.artifacts_dir);

    let mut options = SearchOptions::default();
    if let Some(url) = &cli.base_url {
        options.home_url = url.clone();
    }

    let search = SearchPage::with_config(&actions, SearchSelectors::default(), options);
    let url = search.run(&criteria).context("search")?;

    let missing = criteria.verify_results_url(&url);
    if !missing.is_empty() {
        log::warn!("Results URL is missing {:?}", missing);
    }
    let missing = search.verify_summary(&criteria);
    if !missing.is_empty() {
        log::warn!("Search summary is missing {:?}", missing);
    }

    let analyzer = ListingAnalyzer::new(&actions);
    let winner = analyzer.analyze_and_save(&store).context("ranking listings")?;
    println!("Cheapest top-rated listing: #{} price {} rating {}", winner.index, winner.price, winner.rating);

    let summary = ReservationFlow::new(&actions, analyzer.selectors().cards.clone())
        .attempt_and_save(winner.index, cli.phone.as_deref(), &store)
        .context("reservation")?;

    if summary.total.is_empty() {
        bail!("reservation total is empty");
    }
    println!("Reservation total {} (service fee {})", summary.total, summary.service_fee);

    session.close()?;
    Ok(())
}
