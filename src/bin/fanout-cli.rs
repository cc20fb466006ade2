use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "fanout-cli")]
#[command(about = "Management CLI for the configuration fan-out proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:59890")]
    url: String,

    /// Bearer token, when the proxy requires one.
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the proxy is reachable
    Ping,
    /// Show the proxy version
    Version,
    /// Apply one key/value change to a list of services
    Set {
        /// Target services, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        services: Vec<String>,

        /// Dotted configuration key, e.g. Writable.LogLevel
        #[arg(long)]
        key: String,

        #[arg(long)]
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.api_key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    let base = cli.url.trim_end_matches('/');
    let res = match cli.command {
        Commands::Ping => {
            client.get(format!("{}/api/v2/ping", base))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Version => {
            client.get(format!("{}/api/v2/version", base))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Set { services, key, value } => {
            client.put(format!("{}/api/v2/config/{}", base, services.join(",")))
                .headers(headers)
                .json(&json!({ "key": key, "value": value }))
                .send()
                .await?
        }
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
