use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tokio::net::TcpListener;
use tracing::{error, info};

use weather_api::{AppState, build_router};
use weather_core::{
    AuthService, Config, Database, MemoryCache, Permission, Role, WeatherClient, WeatherReading,
    provider::provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-api", version, about = "Weather favorites API server")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve,

    /// Interactively set the provider API key and listen address.
    Configure,

    /// Give a registered user roles or direct permissions.
    Grant {
        /// Email the user registered with.
        email: String,

        /// Role to assign: "user" or "admin". Repeatable.
        #[arg(long = "role", value_parser = parse_role)]
        roles: Vec<Role>,

        /// Permission to grant, e.g. "create favorites". Repeatable.
        #[arg(long = "permission", value_parser = parse_permission)]
        permissions: Vec<Permission>,
    },

    /// Show current weather for a city without touching the database.
    Show {
        /// City name.
        city: String,
    },
}

fn parse_role(s: &str) -> std::result::Result<Role, String> {
    Role::parse(s).ok_or_else(|| format!("unknown role '{s}' (expected: user, admin)"))
}

fn parse_permission(s: &str) -> std::result::Result<Permission, String> {
    Permission::parse(s).ok_or_else(|| {
        let known: Vec<_> = Permission::ALL.iter().map(Permission::as_str).collect();
        format!("unknown permission '{s}' (expected one of: {})", known.join(", "))
    })
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Serve => serve(&path).await,
            Command::Configure => configure(&path),
            Command::Grant {
                email,
                roles,
                permissions,
            } => grant(&path, &email, &roles, &permissions).await,
            Command::Show { city } => show(&path, &city).await,
        }
    }
}

async fn serve(path: &std::path::Path) -> Result<()> {
    let config = Config::load_with_env(Some(path))?;
    config.validate()?;

    let db = Database::connect(&config.database.url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    let state = AppState::from_config(&config, &db)?;
    let app = build_router(state);

    let listener = TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;

    info!(addr = %config.server.listen, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
        .context("API server error")?;

    info!("API server stopped");
    Ok(())
}

fn configure(path: &std::path::Path) -> Result<()> {
    let mut config = Config::load(path)?;

    let api_key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let listen = Text::new("Listen address:")
        .with_default(&config.server.listen)
        .prompt()?;
    config.server.listen = listen.trim().to_string();

    config.save(path)?;
    println!("Configuration saved to {}", path.display());

    if !config.is_provider_configured() {
        println!("Warning: no API key set; `serve` will refuse to start.");
    }
    Ok(())
}

async fn grant(
    path: &std::path::Path,
    email: &str,
    roles: &[Role],
    permissions: &[Permission],
) -> Result<()> {
    if roles.is_empty() && permissions.is_empty() {
        bail!("Nothing to grant: pass at least one --role or --permission");
    }

    let config = Config::load_with_env(Some(path))?;
    let db = Database::connect(&config.database.url).await?;
    let auth = AuthService::new(db.users(), config.default_role()?, config.token_ttl()?);

    let user = auth.grant(email, roles, permissions).await?;
    println!("Updated access for {} <{}>", user.name, user.email);
    Ok(())
}

async fn show(path: &std::path::Path, city: &str) -> Result<()> {
    let config = Config::load_with_env(Some(path))?;
    let provider = provider_from_config(&config.provider)?;
    let client = WeatherClient::new(provider, Arc::new(MemoryCache::new()), config.cache_ttl());

    let Some(reading) = client.get_current_weather(city).await else {
        bail!("Unable to fetch weather data for '{city}'");
    };

    print!("{}", render(&reading));
    Ok(())
}

/// Human-readable summary of a reading.
fn render(reading: &WeatherReading) -> String {
    format!(
        "{city}, {country} ({time})\n  {condition}, {temp:.1} °C\n  wind {wind:.1} km/h, humidity {humidity}%\n",
        city = reading.city,
        country = reading.country,
        time = reading.local_time,
        condition = reading.condition,
        temp = reading.temperature,
        wind = reading.wind_speed,
        humidity = reading.humidity,
    )
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
