use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::path::PathBuf;

use portal_edge::lifecycle::load_startup_config;
use portal_edge::routing::cookies::{LOCALE_COOKIE, ROLE_COOKIE};
use portal_edge::routing::{EdgeRouter, RouteRequest};

#[derive(Parser)]
#[command(name = "portal-cli")]
#[command(about = "Management CLI for the portal edge gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, default_value = "admin-secret-key")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// Show session token counts
    Sessions,
    /// Show the active role access map
    Access,
    /// Route a request offline and print the decision
    Check {
        /// Request path, e.g. /en/portal/teacher
        path: String,

        /// Raw query string without the leading '?'
        #[arg(short, long)]
        query: Option<String>,

        /// Value of the role cookie
        #[arg(long)]
        role: Option<String>,

        /// Value of the locale cookie
        #[arg(long)]
        locale: Option<String>,

        /// Config file; built-in defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let endpoint = match cli.command {
        Commands::Status => "status",
        Commands::Sessions => "sessions",
        Commands::Access => "access",
        Commands::Check {
            path,
            query,
            role,
            locale,
            config,
        } => {
            let config = load_startup_config(config.as_deref())?;
            let router = EdgeRouter::from_config(&config);

            let mut request = RouteRequest::new(path);
            if let Some(query) = query {
                request = request.with_query(query);
            }
            if let Some(role) = role {
                request = request.with_cookie(ROLE_COOKIE, role);
            }
            if let Some(locale) = locale {
                request = request.with_cookie(LOCALE_COOKIE, locale);
            }

            if !router.in_scope(&request.path) {
                println!("{{\"in_scope\": false}}");
                return Ok(());
            }
            let decision = router.route(&request);
            println!("{}", serde_json::to_string_pretty(&decision)?);
            return Ok(());
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = reqwest::Client::new()
        .get(format!("{}/admin/{}", cli.url.trim_end_matches('/'), endpoint))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("{}", text);
        }
        std::process::exit(1);
    }

    let body: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
