use crate::{error::INVALID_REQUEST_MESSAGE, Itinerary, ItineraryPlanner, PlannerConfig};
use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::time::Duration;
use tracing::{error, info};

/// Shortest destination the CLI will send to the planner.
const MIN_DESTINATION_LEN: usize = 3;

fn command() -> Command {
    Command::new("itinerary-planner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plan a day-by-day trip itinerary with Gemini")
        .arg(
            Arg::new("destination")
                .help("Where to go, e.g. \"Paris, France\"")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("days")
                .help("Number of days to plan")
                .required(true)
                .allow_negative_numbers(true)
                .index(2),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Gemini model to use (or set GEMINI_MODEL)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("Gemini API key (or set GEMINI_API_KEY env var)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Gemini API base URL (or set GEMINI_BASE_URL)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Request timeout in seconds (or set PLANNER_TIMEOUT_SECS)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the itinerary as JSON"),
        )
}

/// CLI entry point for the itinerary planner
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let matches = command().get_matches();
    let (destination, days) = parse_inputs(&matches)?;

    let cli_key = matches.get_one::<String>("api-key").cloned();
    let mut config = PlannerConfig::from_lookup(|key| match key {
        "GEMINI_API_KEY" => cli_key.clone().or_else(|| std::env::var(key).ok()),
        _ => std::env::var(key).ok(),
    })
    .context(
        "Gemini API key is required. Set GEMINI_API_KEY environment variable or use --api-key",
    )?;

    if let Some(model) = matches.get_one::<String>("model") {
        config.model = model.clone();
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = base_url.clone();
    }
    if let Some(seconds) = matches.get_one::<String>("timeout") {
        let seconds: u64 = seconds
            .parse()
            .with_context(|| format!("invalid --timeout value `{seconds}`"))?;
        config.timeout = Duration::from_secs(seconds);
    }

    info!(
        model = %config.model,
        base_url = %config.base_url,
        "planning {} day(s) in {}",
        days,
        destination
    );

    let planner = ItineraryPlanner::from_config(config);
    match planner.generate(&destination, days).await {
        Ok(itinerary) => {
            if matches.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&itinerary)?);
            } else {
                print!("{}", format_itinerary(&itinerary));
            }
            Ok(())
        }
        Err(message) => {
            error!(kind = ?message.kind(), "no itinerary produced");
            bail!("{}", message)
        }
    }
}

/// Trimmed destination of at least three characters and a day count of at least one.
fn parse_inputs(matches: &ArgMatches) -> anyhow::Result<(String, u32)> {
    let destination = matches
        .get_one::<String>("destination")
        .map(|value| value.trim().to_string())
        .unwrap_or_default();
    let days = matches
        .get_one::<String>("days")
        .and_then(|value| value.trim().parse::<u32>().ok())
        .unwrap_or(0);

    if destination.chars().count() < MIN_DESTINATION_LEN || days == 0 {
        bail!(INVALID_REQUEST_MESSAGE);
    }
    Ok((destination, days))
}

fn format_itinerary(itinerary: &Itinerary) -> String {
    let mut out = String::new();
    for day in itinerary {
        out.push_str(&format!(
            "\n{}\n  Morning:   {}\n  Afternoon: {}\n  Night:     {}\n",
            day.day, day.morning, day.afternoon, day.night
        ));
    }
    out
}
