use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "redirectd-cli")]
#[command(about = "Management CLI for the redirectd admin API", long_about = None)]
struct Cli {
    /// Admin API base URL.
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin API key; leave empty when the server runs unauthenticated.
    #[arg(short, long, default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every rule with its hit count
    List,
    /// Show a single rule
    Get { host: String },
    /// Create or replace a rule
    Set {
        host: String,
        target: String,
        /// Treat the target as a template
        #[arg(long)]
        template: bool,
    },
    /// Delete a rule
    Remove { host: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if !cli.key.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
        );
    }

    match cli.command {
        Commands::List => {
            let res = client
                .get(format!("{}/api/rules", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Get { host } => {
            let res = client
                .get(format!("{}/api/rules/{}", cli.url, host))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Set {
            host,
            target,
            template,
        } => {
            let res = client
                .put(format!("{}/api/rules", cli.url))
                .headers(headers)
                .json(&serde_json::json!({
                    "host": host,
                    "target": target,
                    "isTemplate": template,
                }))
                .send()
                .await?;
            print_outcome(res).await?;
        }
        Commands::Remove { host } => {
            let res = client
                .delete(format!("{}/api/rules/{}", cli.url, host))
                .headers(headers)
                .send()
                .await?;
            print_outcome(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn print_outcome(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if status.is_success() {
        println!("ok");
        return Ok(());
    }

    eprintln!("Error: admin API returned status {}", status);
    if let Ok(text) = res.text().await {
        eprintln!("Response: {}", text);
    }
    Ok(())
}
