//! API demo - drives the resilient client against a JSON placeholder API
//!
//! Exercises caching, invalidation and interceptors from the terminal.

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use std::env;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use resilient_api_client::{
    request_fn, response_fn, ApiClient, ApiResponse, ClientConfig, RawResponse, RequestOptions,
    ResponseAction,
};

/// Default upstream API
const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Cache TTL for the demo profile
const DEMO_CACHE_TTL: Duration = Duration::from_secs(30);

/// CLI command
#[derive(Debug)]
enum Command {
    /// List all users
    Users,
    /// Fetch one user
    User { id: u64 },
    /// Create a sample post
    CreatePost,
    /// Replace a post
    UpdatePost { id: u64 },
    /// Delete a post
    DeletePost { id: u64 },
    /// Cache walkthrough
    Demo,
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"API Demo - resilient JSON client walkthrough

USAGE:
    api-demo users
    api-demo user <id>
    api-demo create-post
    api-demo update-post <id>
    api-demo delete-post <id>
    api-demo demo
    api-demo help

COMMANDS:
    users        GET /users
    user         GET /users/<id>
    create-post  POST /posts with a sample body
    update-post  PUT /posts/<id> with a sample body
    delete-post  DELETE /posts/<id>
    demo         Read users twice (second from cache), create a post,
                 print cache stats, then clear the cache

ENVIRONMENT:
    API_BASE_URL        Upstream base address (default {DEFAULT_BASE_URL})
    API_TIMEOUT_MS      Per-attempt timeout
    API_MAX_RETRIES     Retries after the first attempt
    API_RETRY_DELAY_MS  Linear backoff unit
    API_CACHE           Enable response caching (true/false)
    API_CACHE_TTL_MS    Cache time-to-live
    API_LOGGING         Log request lifecycle (true/false)
    RUST_LOG            Log level (trace, debug, info, warn, error)
"#
    );
}

fn parse_id(args: &[String], usage: &str) -> Result<u64> {
    let raw = args.get(2).ok_or_else(|| anyhow!("Usage: api-demo {}", usage))?;
    raw.parse()
        .with_context(|| format!("Invalid id {:?}", raw))
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        return Ok(Command::Help);
    }

    match args[1].as_str() {
        "users" => Ok(Command::Users),
        "user" => Ok(Command::User {
            id: parse_id(&args, "user <id>")?,
        }),
        "create-post" => Ok(Command::CreatePost),
        "update-post" => Ok(Command::UpdatePost {
            id: parse_id(&args, "update-post <id>")?,
        }),
        "delete-post" => Ok(Command::DeletePost {
            id: parse_id(&args, "delete-post <id>")?,
        }),
        "demo" => Ok(Command::Demo),
        "help" | "--help" | "-h" => Ok(Command::Help),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            Ok(Command::Help)
        }
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Build the client with the demo interceptors installed
fn build_client() -> Result<ApiClient> {
    let base_url = env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let config = ClientConfig::default()
        .with_cache_ttl(DEMO_CACHE_TTL)
        .with_logging(true)
        .with_env_overrides()?;

    let mut client = ApiClient::new(base_url, config)?;

    // Stamp every outgoing request
    client.add_request_interceptor(request_fn(|_url: &str, options: &RequestOptions| {
        Ok(Some(
            options
                .clone()
                .with_header("X-Request-Time", unix_millis().to_string()),
        ))
    }));

    // Wrap payloads with response metadata
    client.add_response_interceptor(response_fn(|response: &RawResponse, data: &Value| {
        Ok(ResponseAction::Replace(json!({
            "data": data,
            "metadata": {
                "status": response.status,
                "statusText": response.status_text,
                "timestamp": unix_millis().to_string(),
            }
        })))
    }));

    Ok(client)
}

fn print_response(title: &str, response: &ApiResponse) -> Result<()> {
    let source = if response.from_cache {
        "from cache"
    } else {
        "fresh"
    };
    println!("== {} ({})", title, source);
    println!("{}", serde_json::to_string_pretty(&response.data)?);
    Ok(())
}

fn print_cache_status(client: &ApiClient) {
    let stats = client.cache_stats();
    println!("Cache entries: {}", stats.size);
    for entry in &stats.entries {
        match entry.expires_in {
            Some(left) => println!("  {} - expires in {}s", entry.key, left.as_secs()),
            None => println!("  {} - expired", entry.key),
        }
    }
}

fn sample_post(id: Option<u64>) -> Value {
    match id {
        Some(id) => json!({
            "id": id,
            "title": "Updated Title",
            "body": "Updated content",
            "userId": 1
        }),
        None => json!({
            "title": "My First Post",
            "body": "This is the content of my post",
            "userId": 1
        }),
    }
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
    match command {
        Command::Users => {
            let users = client.get("/users").await?;
            print_response("GET Users", &users)?;
        }
        Command::User { id } => {
            let user = client.get(&format!("/users/{}", id)).await?;
            print_response(&format!("GET User #{}", id), &user)?;
        }
        Command::CreatePost => {
            let created = client.post("/posts", &sample_post(None)).await?;
            print_response("POST Create Post", &created)?;
        }
        Command::UpdatePost { id } => {
            let updated = client
                .put(&format!("/posts/{}", id), &sample_post(Some(id)))
                .await?;
            print_response(&format!("PUT Update Post #{}", id), &updated)?;
        }
        Command::DeletePost { id } => {
            client.delete(&format!("/posts/{}", id)).await?;
            println!("== DELETE Post #{}: deleted", id);
        }
        Command::Demo => {
            let first = client.get("/users").await?;
            print_response("GET Users", &first)?;
            let second = client.get("/users").await?;
            info!(from_cache = second.from_cache, "Repeated read");
            println!("== GET Users again: from_cache = {}", second.from_cache);

            client.get("/posts").await?;
            print_cache_status(client);

            let created = client.post("/posts", &sample_post(None)).await?;
            print_response("POST Create Post", &created)?;
            print_cache_status(client);

            client.clear_cache();
            println!("== Cache cleared");
            print_cache_status(client);
        }
        Command::Help => print_help(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let command = match parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    let client = build_client()?;
    if let Err(e) = run(&client, command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
