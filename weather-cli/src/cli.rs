use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use tracing::debug;
use weather_sdk::{Config, Mode, Weather, WeatherClient};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather from OpenWeather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an API key and default mode in the config file.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London".
        city: String,

        /// "on-demand" or "polling"; defaults to the configured mode.
        #[arg(long)]
        mode: Option<String>,

        /// OpenWeather API key; defaults to the configured key.
        #[arg(long)]
        api_key: Option<String>,

        /// Print the full JSON response body instead of a summary.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                mode,
                api_key,
                json,
            } => show(&city, mode.as_deref(), api_key, json).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let modes: Vec<Mode> = Mode::all().to_vec();
    let start = modes
        .iter()
        .position(|m| *m == config.default_mode())
        .unwrap_or(0);
    let mode = Select::new("Default mode:", modes)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read mode")?;

    config.set_api_key(api_key.trim().to_string());
    config.set_default_mode(mode);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    city: &str,
    mode: Option<&str>,
    api_key: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    let mode = match mode {
        Some(m) => Mode::try_from(m)?,
        None => config.default_mode(),
    };

    let api_key = match api_key {
        Some(key) => key,
        None => config.require_api_key()?.to_string(),
    };

    debug!(%mode, city, "querying weather");

    let client = config.apply(WeatherClient::builder(api_key, mode)).build()?;
    let result = client.query(city).await;
    client.dispose();

    let weather = result.with_context(|| format!("Failed to fetch weather for '{city}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&weather)?);
    } else {
        print_summary(&weather);
    }

    Ok(())
}

fn print_summary(weather: &Weather) {
    println!("{}", weather.name());
    println!("  Condition:   {}", weather.condition());
    match (weather.temperature(), weather.feels_like()) {
        (Some(temp), Some(feels)) => {
            println!("  Temperature: {temp:.1}°C (feels like {feels:.1}°C)")
        }
        (Some(temp), None) => println!("  Temperature: {temp:.1}°C"),
        _ => {}
    }
    if let Some(humidity) = weather.humidity() {
        println!("  Humidity:    {humidity}%");
    }
    if let Some(speed) = weather.wind_speed() {
        println!("  Wind:        {speed:.1} m/s");
    }
    if let Some(visibility) = weather.visibility {
        println!("  Visibility:  {visibility} m");
    }
    if let Some(at) = weather.observed_at() {
        println!("  Observed:    {}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    if let (Some(rise), Some(set)) = (weather.sunrise(), weather.sunset()) {
        println!(
            "  Sun:         {} – {} UTC",
            rise.format("%H:%M"),
            set.format("%H:%M")
        );
    }
}
