use clap::{Parser, Subcommand};
use serde_json::Value;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "botgate-cli")]
#[command(about = "Operator CLI for the botgate proxy", long_about = None)]
struct Cli {
    /// Base URL of a running botgate instance.
    #[arg(short, long, default_value = "http://localhost:50001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and pretty-print the stats snapshot
    Stats,
    /// Poll the stats snapshot on an interval
    Watch {
        /// Seconds between polls.
        #[arg(short, long, default_value_t = 5)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let stats_url = format!("{}/stats", cli.url.trim_end_matches('/'));

    match cli.command {
        Commands::Stats => {
            let res = client.get(&stats_url).send().await?;
            print_response(res).await?;
        }
        Commands::Watch { interval } => loop {
            match client.get(&stats_url).send().await {
                Ok(res) => print_response(res).await?,
                Err(e) => eprintln!("Error: {}", e),
            }
            tokio::time::sleep(Duration::from_secs(interval)).await;
        },
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
