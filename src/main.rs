use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Method;
use serde_json::Value;
use tokio::sync::broadcast;

use sitedesk::config::{ConfigError, GatewayConfig};
use sitedesk::guard::{AdminGuardState, GuardState, SuperadminGuard, TenantGuard};
use sitedesk::nav::{Location, NavigationIntent, Navigator};
use sitedesk::net::api;
use sitedesk::net::{ApiGateway, GatewayError, MultipartForm, Payload, RequestOptions, TransportError};
use sitedesk::session::{FileStorage, SessionStore};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("expected key=value, got `{0}`")]
    InvalidPair(String),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: String, source: std::io::Error },
    #[error("--data cannot be combined with --file or --field")]
    ConflictingPayload,
    #[error("not signed in to a tenant")]
    Unauthenticated,
}

#[derive(Parser, Debug)]
#[command(name = "sitedesk", about = "Session, guard and API shell for the CMS backoffice")]
struct Cli {
    /// Hostname sent as the tenant domain.
    #[arg(long, env = "SITEDESK_HOST", default_value = "localhost")]
    host: String,

    /// Path of the page the command runs on behalf of.
    #[arg(long, env = "SITEDESK_PATH", default_value = "/backoffice")]
    path: String,

    #[arg(long, env = "SITEDESK_SESSION_FILE", default_value = ".sitedesk-session.json")]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login(LoginArgs),
    Logout,
    /// Validate the tenant session against the backend.
    Whoami,
    /// Run the superadmin presence check.
    AdminCheck,
    Api(ApiArgs),
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "SITEDESK_PASSWORD")]
    password: String,

    #[arg(long, default_value_t = false)]
    superadmin: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ApiMethod {
    Get,
    Post,
    Put,
}

impl From<ApiMethod> for Method {
    fn from(method: ApiMethod) -> Self {
        match method {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
            ApiMethod::Put => Method::PUT,
        }
    }
}

#[derive(Args, Debug)]
struct ApiArgs {
    #[arg(value_enum)]
    method: ApiMethod,

    path: String,

    /// JSON request body.
    #[arg(long)]
    data: Option<String>,

    /// Multipart file part as `field=path`.
    #[arg(long = "file")]
    files: Vec<String>,

    /// Multipart text part as `key=value`.
    #[arg(long = "field")]
    fields: Vec<String>,

    /// Query parameter as `key=value`.
    #[arg(long = "query")]
    query: Vec<String>,
}

struct Shell {
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    gateway: Arc<ApiGateway>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = GatewayConfig::from_env()?;
    let storage = Arc::new(FileStorage::new(cli.session_file));
    let session = Arc::new(SessionStore::rehydrate(storage));
    let navigator = Arc::new(Navigator::new(config.routes.clone(), Location::new(cli.host, cli.path)));
    let gateway = Arc::new(ApiGateway::with_reqwest(config, Arc::clone(&session), Arc::clone(&navigator))?);
    let shell = Shell { session, navigator, gateway };

    let mut intents = shell.navigator.subscribe();
    let result = match cli.command {
        Command::Login(args) => run_login(&shell, args).await,
        Command::Logout => {
            if api::logout(&shell.gateway).await {
                eprintln!("signed out");
            } else {
                eprintln!("signed out for this run; the session file could not be cleared");
            }
            Ok(())
        }
        Command::Whoami => run_whoami(&shell).await,
        Command::AdminCheck => run_admin_check(&shell),
        Command::Api(args) => run_api(&shell, args).await,
    };
    report_intents(&mut intents);
    result
}

async fn run_login(shell: &Shell, args: LoginArgs) -> Result<(), CliError> {
    let session = if args.superadmin {
        api::superadmin_login(&shell.gateway, &args.email, &args.password).await?
    } else {
        api::login(&shell.gateway, &args.email, &args.password).await?
    };
    match &session.tenant_id {
        Some(tenant_id) => eprintln!("signed in to tenant {tenant_id}"),
        None => eprintln!("signed in as superadmin"),
    }
    Ok(())
}

async fn run_whoami(shell: &Shell) -> Result<(), CliError> {
    let guard = TenantGuard::new(Arc::clone(&shell.gateway));
    let state = guard.mount().await;
    if state != GuardState::Authenticated {
        if let Some(failure) = guard.last_failure() {
            eprintln!("validation failed: {failure:?}");
            if failure.is_retryable() {
                eprintln!("the session was cleared; sign in again once the backend is reachable");
            }
        }
        return Err(CliError::Unauthenticated);
    }
    if let Some(user) = shell.session.select_user() {
        print_json(&user)?;
    }
    Ok(())
}

fn run_admin_check(shell: &Shell) -> Result<(), CliError> {
    let guard = SuperadminGuard::new(Arc::clone(&shell.session), Arc::clone(&shell.navigator));
    match guard.mount() {
        AdminGuardState::Present => println!("present"),
        AdminGuardState::Absent => println!("absent"),
    }
    Ok(())
}

async fn run_api(shell: &Shell, args: ApiArgs) -> Result<(), CliError> {
    let payload = build_payload(args.data.as_deref(), &args.files, &args.fields)?;
    let mut options = RequestOptions::default();
    for raw in &args.query {
        let (key, value) = split_pair(raw)?;
        options = options.query(key, value);
    }
    let json = shell.gateway.send(args.method.into(), &args.path, payload, options).await?;
    print_json(&json)
}

fn build_payload(data: Option<&str>, files: &[String], fields: &[String]) -> Result<Option<Payload>, CliError> {
    if files.is_empty() && fields.is_empty() {
        let Some(raw) = data else {
            return Ok(None);
        };
        return Ok(Some(Payload::Json(serde_json::from_str::<Value>(raw)?)));
    }
    if data.is_some() {
        return Err(CliError::ConflictingPayload);
    }

    let mut form = MultipartForm::new();
    for raw in fields {
        let (key, value) = split_pair(raw)?;
        form = form.text(key, value);
    }
    for raw in files {
        let (field, path) = split_pair(raw)?;
        let bytes = std::fs::read(path).map_err(|source| CliError::ReadFile { path: path.to_owned(), source })?;
        let file_name = std::path::Path::new(path)
            .file_name()
            .map_or_else(|| path.to_owned(), |name| name.to_string_lossy().into_owned());
        form = form.file(field, file_name, None, bytes);
    }
    Ok(Some(Payload::Multipart(form)))
}

fn split_pair(raw: &str) -> Result<(&str, &str), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(CliError::InvalidPair(raw.to_owned())),
    }
}

fn report_intents(intents: &mut broadcast::Receiver<NavigationIntent>) {
    while let Ok(intent) = intents.try_recv() {
        eprintln!("redirect -> {}", intent.target);
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
