//! Console harness (wbj) - one conversation in the terminal
//!
//! Asks where you are until the location is known, then prints it with map
//! links. End input (Ctrl+D) to quit early.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use wbj_common::config::{MapConfig, TomlConfig};
use wbj_common::geocoder::NominatimClient;
use wbj_common::links::static_map_link;
use wbj_common::{Candidate, Conversation, PhraseRules, Reply};

mod console;

#[derive(Parser, Debug)]
#[command(name = "wbj")]
#[command(about = "Find out where you are, one question at a time")]
#[command(version)]
struct Args {
    /// TOML configuration file (default: <config dir>/wbj/wbj.toml)
    #[arg(short, long, env = "WBJ_CONFIG")]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Show the map inline (iTerm2)
    #[arg(long)]
    inline_map: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let level = if args.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.as_str().into()),
        )
        .init();
    debug!("Configuration: {}", source);

    let rules = Arc::new(PhraseRules::new(&config.phrases).context("Invalid phrase configuration")?);
    let geocoder =
        NominatimClient::new(&config.geocoder).context("Failed to create geocoder client")?;
    let mut conversation = Conversation::new(rules);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut reply = conversation.turn("", &geocoder).await;

    loop {
        match reply {
            Reply::Prompt(prompt) => {
                println!("{}", prompt);
                print!("> ");
                std::io::stdout().flush()?;

                let Some(line) = lines.next_line().await? else {
                    println!();
                    return Ok(());
                };
                reply = conversation.turn(&line, &geocoder).await;
            }
            Reply::Resolved(location) => {
                let on_the_road = conversation.engine().on_the_road();
                for line in console::summary(&location, &config.maps, on_the_road) {
                    println!("{}", line);
                }
                if args.inline_map {
                    show_inline_map(&location, &config.maps).await;
                }
                return Ok(());
            }
        }
    }
}

async fn show_inline_map(location: &Candidate, maps: &MapConfig) {
    let url = static_map_link(location, maps, console::CONSOLE_MAP_SIZE);
    match fetch_image(&url).await {
        Ok(image) => println!("{}", console::inline_image("map.png", &image)),
        Err(e) => warn!("Could not fetch map image: {:#}", e),
    }
}

async fn fetch_image(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::get(url)
        .await
        .context("Map request failed")?
        .error_for_status()
        .context("Map server refused")?;
    Ok(response.bytes().await?.to_vec())
}
