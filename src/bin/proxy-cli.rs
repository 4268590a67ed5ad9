use clap::{Parser, Subcommand};
use serde_json::Value;

use subdomain_proxy::http::RegisterRequest;

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Management CLI for the subdomain proxy", long_about = None)]
struct Cli {
    /// Base URL of the proxy.
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind a subdomain name to an origin URL
    Register {
        /// Subdomain label, e.g. `blog` for blog.example.com
        #[arg(short, long)]
        name: String,
        /// Origin URL requests are forwarded to
        #[arg(short, long)]
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Register { name, source } => {
            let res = client
                .post(format!("{}/", cli.url.trim_end_matches('/')))
                .json(&RegisterRequest { name, source })
                .send()
                .await?;
            print_response(res).await?;
        }
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
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
