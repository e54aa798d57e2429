use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use papermatch::app::{App, AppError};
use papermatch::config::{CachePolicy, ClientConfig, ConfigError};
use papermatch::net::api::{Api, ApiRequest};
use papermatch::net::error::ApiError;
use papermatch::net::types::{LoginRequest, RegisterRequest};
use papermatch::notify::StderrNotifier;
use papermatch::router::RouterError;
use papermatch::state::session::MATCH_HISTORY_PREFIX;
use papermatch::state::storage::{FileStore, MemoryStore, StorageError};
use papermatch::state::user::{AuthError, SessionError};
use reqwest::Method;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("state storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Router(#[from] RouterError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
    #[error("invalid query pair '{0}' (expected key=value)")]
    InvalidQuery(String),
    #[error("missing password; pass --password, set PAPERMATCH_PASSWORD, or pipe it on stdin")]
    MissingPassword,
    #[error("reading stdin failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "papermatch", about = "PaperMatch session and API client")]
struct Cli {
    /// Backend origin; overrides PAPERMATCH_ORIGIN.
    #[arg(long)]
    origin: Option<String>,

    /// Request timeout in milliseconds; overrides PAPERMATCH_TIMEOUT_MS.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Directory for persisted client state; overrides PAPERMATCH_STATE_DIR.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// `clear` or `keep`; overrides PAPERMATCH_CACHE_POLICY.
    #[arg(long, value_parser = parse_cache_policy)]
    cache_policy: Option<CachePolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the backend is reachable.
    Ping,
    Login(LoginArgs),
    Register(RegisterArgs),
    Logout,
    /// Print the cached profile, optionally refreshing it first.
    Whoami {
        #[arg(long, default_value_t = false)]
        refresh: bool,
    },
    /// Print session state.
    Status,
    /// Run the route guard for an in-app path and print where it lands.
    Open {
        path: String,
    },
    /// Send an arbitrary request relative to `/api`.
    Request(RequestArgs),
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    username: String,
    #[arg(long, env = "PAPERMATCH_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "PAPERMATCH_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct RequestArgs {
    method: String,
    path: String,
    #[arg(long, help = "JSON request body")]
    data: Option<String>,
    #[arg(long = "query", help = "Query pair key=value; repeatable")]
    query: Vec<String>,
    #[arg(long, help = "Per-request timeout in milliseconds")]
    timeout_ms: Option<u64>,
}

fn parse_cache_policy(raw: &str) -> Result<CachePolicy, String> {
    CachePolicy::parse(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let local = Arc::new(FileStore::open(&config.state_dir)?);
    let app = App::new(&config, local, Arc::new(MemoryStore::new()), Arc::new(StderrNotifier))?;

    match cli.command {
        Command::Ping => run_ping(&app).await,
        Command::Login(args) => run_login(&app, args).await,
        Command::Register(args) => run_register(&app, args).await,
        Command::Logout => {
            app.user.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami { refresh } => run_whoami(&app, refresh).await,
        Command::Status => run_status(&app, &config),
        Command::Open { path } => run_open(&app, &path),
        Command::Request(args) => run_request(&app, args).await,
    }
}

fn build_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(origin) = &cli.origin {
        config.origin = origin.trim().trim_end_matches('/').to_owned();
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeouts.request = Duration::from_millis(ms);
    }
    if let Some(dir) = &cli.state_dir {
        config.state_dir.clone_from(dir);
    }
    if let Some(policy) = cli.cache_policy {
        config.cache_policy = policy;
    }
    tracing::debug!(origin = %config.origin, state_dir = %config.state_dir.display(), "config resolved");
    Ok(config)
}

async fn run_ping(app: &App) -> Result<(), CliError> {
    app.api.send(ApiRequest::get("/health")).await?;
    println!("ok");
    Ok(())
}

async fn run_login(app: &App, args: LoginArgs) -> Result<(), CliError> {
    let password = resolve_password(args.password)?;
    let profile = app
        .user
        .login(&LoginRequest { username: args.username, password })
        .await?;
    println!("logged in as {}", profile.username);
    Ok(())
}

async fn run_register(app: &App, args: RegisterArgs) -> Result<(), CliError> {
    let password = resolve_password(args.password)?;
    let profile = app
        .user
        .register(&RegisterRequest { username: args.username, email: args.email, password })
        .await?;
    println!("registered and logged in as {}", profile.username);
    Ok(())
}

async fn run_whoami(app: &App, refresh: bool) -> Result<(), CliError> {
    if !app.user.is_logged_in() {
        println!("not logged in");
        return Ok(());
    }
    let profile = if refresh {
        Some(app.user.get_user_info().await?)
    } else {
        app.session.profile()
    };
    match profile {
        Some(profile) => print_json(&serde_json::to_value(profile)?),
        None => {
            println!("logged in; no cached profile (use --refresh)");
            Ok(())
        }
    }
}

fn run_status(app: &App, config: &ClientConfig) -> Result<(), CliError> {
    let cached_histories = app
        .session
        .local_store()
        .keys()?
        .iter()
        .filter(|k| k.starts_with(MATCH_HISTORY_PREFIX))
        .count();
    let status = serde_json::json!({
        "logged_in": app.session.is_logged_in(),
        "cached_match_histories": cached_histories,
        "username": app.session.profile().map(|p| p.username),
        "origin": config.origin,
        "cache_policy": format!("{:?}", config.cache_policy).to_lowercase(),
    });
    print_json(&status)
}

fn run_open(app: &App, path: &str) -> Result<(), CliError> {
    let nav = app.router.navigate(path)?;
    if nav.redirected {
        println!("{} -> {} ({})", path, nav.location, nav.route.name);
    } else {
        println!("{} ({})", nav.location, nav.route.name);
    }
    Ok(())
}

async fn run_request(app: &App, args: RequestArgs) -> Result<(), CliError> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| CliError::InvalidMethod(args.method.clone()))?;
    let mut request = ApiRequest::new(method, args.path);
    if let Some(raw) = args.data {
        request = request.with_body(serde_json::from_str(&raw)?);
    }
    for pair in args.query {
        let (key, value) = pair.split_once('=').ok_or_else(|| CliError::InvalidQuery(pair.clone()))?;
        request = request.with_query(key, value);
    }
    if let Some(ms) = args.timeout_ms {
        request = request.with_timeout(Duration::from_millis(ms));
    }

    let value = app.api.send(request).await?;
    print_json(&value)
}

fn resolve_password(flag: Option<String>) -> Result<String, CliError> {
    if let Some(password) = flag {
        return Ok(password);
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    if password.is_empty() {
        return Err(CliError::MissingPassword);
    }
    Ok(password)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
