//! Nimbus CLI
//!
//! Usage:
//!     nimbus search London
//!     nimbus weather
//!     nimbus weather --city Paris
//!     nimbus cache clear
//!     nimbus config show

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use nimbus_core::Config;
use nimbus_ui::{AppServices, CitySelected, SearchScreenState, WeatherScreenState};
use nimbus_weather::{SqliteWeatherCache, WeatherRecord};

/// Nimbus - current weather with an offline fallback
#[derive(Parser)]
#[command(name = "nimbus")]
#[command(version)]
#[command(about = "Search for a city and show its current weather", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search locations and show weather for the first match
    Search {
        /// City name or partial name
        query: String,
    },

    /// Show weather for the remembered city, or the cached report
    Weather {
        /// Fetch this city instead, and remember it
        #[arg(short, long)]
        city: Option<String>,
    },

    /// Manage the local weather cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove the cached weather report
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    nimbus_core::init()?;

    let cli = Cli::parse();
    let (config, validation) = Config::load_validated()?;
    tracing::info!("Nimbus started");
    if !config.api.has_api_key() && needs_network(&cli.command) {
        eprintln!(
            "Warning: no API key configured; set {} or edit {}",
            nimbus_core::config::API_KEY_ENV,
            Config::config_path()?.display()
        );
    }

    let result = match cli.command {
        Commands::Search { query } => cmd_search(&config, &query).await,
        Commands::Weather { city } => cmd_weather(&config, city).await,
        Commands::Cache {
            action: CacheAction::Clear,
        } => cmd_cache_clear(&config),
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            for warning in &validation.warnings {
                eprintln!("Warning: {}: {}", warning.field, warning.message);
            }
            cmd_config_show(&config)
        }
    };

    if let Err(e) = &result {
        tracing::error!("Command failed: {:#}", e);
    }
    tracing::info!("Nimbus finished");
    result
}

fn needs_network(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Search { .. } | Commands::Weather { city: Some(_) }
    )
}

async fn cmd_search(config: &Config, query: &str) -> Result<()> {
    let services = AppServices::from_config(config)?;
    let mut selected = services.coordinator().subscribe();

    services
        .search()
        .search(query)
        .await
        .context("Search task failed")?;

    let state = services.search().state();
    print_search(&state);

    if matches!(state, SearchScreenState::Success(_)) {
        let weather = selected
            .wait_for(|state| {
                matches!(
                    state,
                    WeatherScreenState::Success(_) | WeatherScreenState::Error(_)
                )
            })
            .await
            .context("Selection coordinator stopped")?
            .clone();
        println!();
        print_weather(&weather);
    }

    services.shutdown().await;
    Ok(())
}

async fn cmd_weather(config: &Config, city: Option<String>) -> Result<()> {
    let services = AppServices::from_config(config)?;

    let state = match city {
        Some(city) => {
            services.coordinator().handle(CitySelected { city }).await;
            services.coordinator().state()
        }
        None => {
            services
                .weather()
                .refresh()
                .await
                .context("Weather task failed")?;
            services.weather().state()
        }
    };
    print_weather(&state);

    services.shutdown().await;
    Ok(())
}

fn cmd_cache_clear(config: &Config) -> Result<()> {
    let path = config.storage.cache_path();
    if !path.exists() {
        println!("No weather cache at {}", path.display());
        return Ok(());
    }

    SqliteWeatherCache::open(&path)?.clear()?;
    println!("Cleared weather cache at {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &Config) -> Result<()> {
    let mut shown = config.clone();
    if config.api.has_api_key() {
        shown.api.api_key = "********".to_string();
    }

    println!("# {}", Config::config_path()?.display());
    print!(
        "{}",
        toml::to_string_pretty(&shown).context("Failed to render configuration")?
    );
    Ok(())
}

fn print_weather(state: &WeatherScreenState) {
    match state {
        WeatherScreenState::Loading => println!("Loading..."),
        WeatherScreenState::Success(record) => {
            for line in weather_lines(record) {
                println!("{}", line);
            }
        }
        WeatherScreenState::Empty { title, message } => {
            println!("{}", title);
            println!("  {}", message);
        }
        WeatherScreenState::Error(message) => eprintln!("Error: {}", message),
    }
}

fn weather_lines(record: &WeatherRecord) -> Vec<String> {
    let location = &record.location;
    let current = &record.current;
    vec![
        format!("{}, {}", location.name, location.country),
        format!("  {}", current.condition.text),
        format!("  Icon: {}", current.condition.icon_url()),
        format!(
            "  {:.1}°C (feels like {:.1}°C)",
            current.temp_c, current.feelslike_c
        ),
        format!("  Humidity {}%  UV {:.1}", current.humidity, current.uv),
    ]
}

fn print_search(state: &SearchScreenState) {
    match state {
        SearchScreenState::Idle => {}
        SearchScreenState::Loading => println!("Searching..."),
        SearchScreenState::Success(candidates) => {
            for (i, candidate) in candidates.iter().enumerate() {
                println!("{:>2}. {}", i + 1, candidate.display_name());
            }
        }
        SearchScreenState::Empty { title, message } => {
            println!("{}", title);
            println!("  {}", message);
        }
        SearchScreenState::Error(message) => eprintln!("Error: {}", message),
    }
}
