use clap::{Args, Parser, Subcommand};
use nearby_aid::config::{self, Config, FacilityConfig, GeocoderConfig};
use nearby_aid::location::{Coordinate, FacilitySearch, GeocodeOutcome, LocationPipeline};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Nearby Aid: find hospitals, clinics, police and fire stations near a person.
///
/// Examples:
///   nearaid serve --port 8080
///   nearaid geocode "12 Main St, Springfield"
///   nearaid nearby --lat -33.86 --lon 151.21 --radius 1500
#[derive(Parser)]
#[command(name = "nearaid", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    upstream: UpstreamArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the registration web server.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, short = 'p', default_value_t = 3000)]
        port: u16,
    },

    /// Geocode a free-text address.
    Geocode {
        /// Address text, e.g. "12 Main St, Springfield".
        address: String,
    },

    /// List facilities around a coordinate as JSON.
    Nearby {
        /// Latitude (-90 to 90).
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude (-180 to 180).
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Search radius in meters. Defaults to the configured radius.
        #[arg(long)]
        radius: Option<u32>,
    },
}

/// Upstream service settings, each overridable from the environment.
#[derive(Args)]
struct UpstreamArgs {
    /// Nominatim search endpoint.
    #[arg(long, global = true, env = "NEARAID_GEOCODER_URL", default_value = config::DEFAULT_GEOCODER_URL)]
    geocoder_url: String,

    /// Overpass interpreter endpoint.
    #[arg(long, global = true, env = "NEARAID_OVERPASS_URL", default_value = config::DEFAULT_OVERPASS_URL)]
    overpass_url: String,

    /// User-Agent sent to both services.
    #[arg(long, global = true, env = "NEARAID_USER_AGENT")]
    user_agent: Option<String>,

    /// Comma-separated amenity tags to search for.
    #[arg(long, global = true, env = "NEARAID_CATEGORIES")]
    categories: Option<String>,

    /// Default search radius in meters.
    #[arg(long, global = true, env = "NEARAID_RADIUS_M", default_value_t = config::DEFAULT_RADIUS_M)]
    radius_m: u32,

    /// Geocoder timeout in seconds.
    #[arg(long, global = true, default_value_t = 10)]
    geocoder_timeout: u64,

    /// Overpass timeout in seconds.
    #[arg(long, global = true, default_value_t = 20)]
    overpass_timeout: u64,
}

impl UpstreamArgs {
    fn into_config(self) -> Config {
        let defaults = FacilityConfig::default();
        Config {
            geocoder: GeocoderConfig {
                endpoint: self.geocoder_url,
                timeout: Duration::from_secs(self.geocoder_timeout),
            },
            facilities: FacilityConfig {
                endpoint: self.overpass_url,
                timeout: Duration::from_secs(self.overpass_timeout),
                categories: self
                    .categories
                    .as_deref()
                    .map(config::parse_categories)
                    .unwrap_or(defaults.categories),
                default_radius_m: self.radius_m,
            },
            user_agent: self.user_agent.unwrap_or_else(config::default_user_agent),
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nearby_aid=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.upstream.into_config();

    match cli.command {
        Command::Serve { host, port } => serve(&host, port, &config),
        Command::Geocode { address } => geocode(&address, &config),
        Command::Nearby { lat, lon, radius } => nearby(lat, lon, radius, &config),
    }
}

fn serve(host: &str, port: u16, config: &Config) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: cannot start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match runtime.block_on(nearby_aid::server::start(host, port, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: server on {}:{} failed: {}", host, port, e);
            ExitCode::FAILURE
        }
    }
}

fn geocode(address: &str, config: &Config) -> ExitCode {
    let pipeline = LocationPipeline::from_config(config);
    match pipeline.geocoder().resolve(address) {
        GeocodeOutcome::Resolved(c) => {
            println!("{}", c);
            ExitCode::SUCCESS
        }
        GeocodeOutcome::NoInput => {
            eprintln!("Error: address is empty");
            ExitCode::FAILURE
        }
        GeocodeOutcome::NotFound => {
            eprintln!("Unresolved: no match for '{}'", address);
            ExitCode::FAILURE
        }
        GeocodeOutcome::Failed(e) => {
            eprintln!("Unresolved: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn nearby(lat: f64, lon: f64, radius: Option<u32>, config: &Config) -> ExitCode {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        eprintln!("Error: Invalid coordinates. Lat: -90..90, Lon: -180..180");
        return ExitCode::FAILURE;
    }

    let pipeline = LocationPipeline::from_config(config);
    let locator = pipeline.locator();
    let radius = radius.unwrap_or_else(|| locator.default_radius_m());
    let search = locator.find_nearby(Some(Coordinate::new(lat, lon)), radius);
    if let FacilitySearch::Failed(ref e) = search {
        tracing::warn!(error = %e, "facility search failed");
    }

    let facilities = search.into_facilities();
    match serde_json::to_string_pretty(&facilities) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
