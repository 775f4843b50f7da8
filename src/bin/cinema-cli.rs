use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

const X_CORRELATION_ID: &str = "x-correlation-id";

#[derive(Parser)]
#[command(name = "cinema-cli")]
#[command(about = "Operator CLI for the cinema gateway", long_about = None)]
struct Cli {
    /// Gateway base URL.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Correlation id to send; the gateway mints one when omitted.
    #[arg(short, long)]
    correlation_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// IMDB liveness as seen by the showtimes service
    Status,
    /// Ping IMDB through the movies service
    Ping,
    /// Look up a movie by IMDB id
    Movie {
        imdb_id: String,
        #[arg(long, env = "IMDB_API_KEY")]
        api_key: String,
    },
    /// List showtimes
    Showtimes {
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(id) = &cli.correlation_id {
        headers.insert(X_CORRELATION_ID, HeaderValue::from_str(id)?);
    }

    let request = match &cli.command {
        Commands::Status => client.get(format!("{base}/showtimes/status")),
        Commands::Ping => client.get(format!("{base}/movies/movies/ping")),
        Commands::Movie { imdb_id, api_key } => client
            .get(format!("{base}/movies/movies/{imdb_id}"))
            .query(&[("apiKey", api_key)]),
        Commands::Showtimes { date, title } => {
            let mut query = Vec::new();
            if let Some(date) = date {
                query.push(("date", date));
            }
            if let Some(title) = title {
                query.push(("title", title));
            }
            client.get(format!("{base}/showtimes/showtime")).query(&query)
        }
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let correlation_id = res
        .headers()
        .get(X_CORRELATION_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    if !status.is_success() {
        eprintln!("Error: gateway returned status {} (correlation id {})", status, correlation_id);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    eprintln!("correlation id: {}", correlation_id);
    Ok(())
}
