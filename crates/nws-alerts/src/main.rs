use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use nws_cap::{Alert, CapConfig, Feed, HttpFeedSource, UGC};

#[derive(Debug, Parser)]
#[command(name = "nws-alerts")]
#[command(about = "Fetch and filter National Weather Service public alerts")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Keep only alerts with one of these urgencies
    #[arg(long, global = true)]
    urgency: Vec<String>,

    /// Keep only alerts with one of these severities
    #[arg(long, global = true)]
    severity: Vec<String>,

    /// Keep only alerts covering all of these location codes
    #[arg(long, global = true)]
    location: Vec<String>,

    /// Location notation for --location (UGC or FIPS6)
    #[arg(long, global = true, default_value = UGC)]
    notation: String,

    /// Print alert counts grouped by this field instead of the alerts
    #[arg(long, global = true)]
    group_by: Option<String>,

    /// Fields to print for each alert
    #[arg(long, global = true, default_values_t = vec!["event".to_string()])]
    fields: Vec<String>,

    /// Print alerts as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Only print the number of matching alerts
    #[arg(long, global = true)]
    count: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Every active alert in the country
    National,
    /// Every alert for a state (two-letter code)
    State { code: String },
    /// Alerts covering any of the given UGC zone codes
    Zones {
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Alerts for a single county or zone code
    County { code: String },
    /// Alerts from an arbitrary CAP feed URL
    Url { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = CapConfig::from_env()?;
    let source = HttpFeedSource::new(&config)?;

    let mut feed = match &args.command {
        Command::National => Feed::national(&source, &config.national_url).await?,
        Command::State { code } => Feed::whole_state(&source, code, &config.state).await?,
        Command::Zones { codes } => Feed::zones(&source, codes, &config.state).await?,
        Command::County { code } => Feed::county(&source, code, &config.county).await?,
        Command::Url { url } => Feed::from_url(&source, url).await?,
    };
    info!(alerts = feed.len(), "Feed loaded");

    if !args.urgency.is_empty() {
        feed.retain_field("urgency", &args.urgency)?;
    }
    if !args.severity.is_empty() {
        feed.retain_field("severity", &args.severity)?;
    }
    if !args.location.is_empty() {
        feed.retain_location(&args.location, &args.notation);
    }

    if args.count {
        println!("{}", feed.count_alerts());
        return Ok(());
    }

    if let Some(field) = args.group_by.as_deref() {
        for (value, alerts) in feed.categorize(field)? {
            println!("{}\t{}", alerts.len(), value);
        }
        return Ok(());
    }

    for alert in feed.iter() {
        if args.json {
            println!("{}", serde_json::to_string(alert)?);
        } else {
            println!("{}", format_alert(alert, &args.fields));
        }
    }

    Ok(())
}

fn format_alert(alert: &Alert, fields: &[String]) -> String {
    let zones = alert
        .get_geocode(UGC)
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",");
    let mut columns: Vec<&str> = fields
        .iter()
        .map(|name| alert.field(name).unwrap_or("-"))
        .collect();
    columns.push(&zones);
    columns.join("\t")
}
