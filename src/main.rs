#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use shiftboard::actions;
use shiftboard::bootstrap::{self, Dashboard};
use shiftboard::config::{ClientConfig, ConfigError};
use shiftboard::feedback::{StderrNotifier, TracingIndicator};
use shiftboard::identity::{FileIdentityStore, IDENTITY_KEY, IdentityError, IdentityPrompt, IdentityStore, Session};
use shiftboard::{ApiError, Gateway, GatewayClient, Method};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("identity store error: {0}")]
    Identity(#[from] IdentityError),
    #[error("no identity stored at {}", .0.display())]
    NoIdentity(PathBuf),
    #[error("payload must be a JSON object")]
    PayloadNotObject,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl CliError {
    /// Gateway failures have already been shown by the notifier.
    fn already_reported(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_transport() || matches!(e, ApiError::Domain { .. }))
    }
}

#[derive(Parser, Debug)]
#[command(name = "shiftboard", about = "Time-clock and team dashboard client")]
struct Cli {
    /// Gateway endpoint; overrides SHIFTBOARD_ENDPOINT_URL.
    #[arg(long)]
    endpoint: Option<String>,

    /// Use this email for every call instead of the stored identity.
    #[arg(long, env = "SHIFTBOARD_EMAIL")]
    email: Option<String>,

    /// Identity file; overrides SHIFTBOARD_IDENTITY_PATH.
    #[arg(long)]
    identity_path: Option<PathBuf>,

    /// Fail instead of asking for an email when none is stored.
    #[arg(long, default_value_t = false)]
    no_prompt: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Gateway(GatewayCommand),
    /// Show or change the stored identity without calling the gateway.
    Identity(IdentityCommand),
}

/// Commands that talk to the gateway endpoint.
#[derive(Subcommand, Debug)]
enum GatewayCommand {
    /// Identify the user and load every dashboard panel.
    Start,
    Whoami,
    ClockIn,
    ClockOut,
    Goals,
    Team,
    Metrics,
    /// Call any action by name.
    Call(CallArgs),
}

#[derive(Args, Debug)]
struct CallArgs {
    action: String,

    /// Send as a read (query string) instead of a JSON POST.
    #[arg(long, default_value_t = false)]
    get: bool,

    #[arg(long, help = "JSON object sent as the POST payload")]
    payload: Option<String>,
}

#[derive(Args, Debug)]
struct IdentityCommand {
    #[command(subcommand)]
    command: IdentitySubcommand,
}

#[derive(Subcommand, Debug)]
enum IdentitySubcommand {
    Show,
    Set { email: String },
}

/// Reads the answer from stdin on a blocking thread.
struct StdinPrompt;

#[async_trait::async_trait]
impl IdentityPrompt for StdinPrompt {
    async fn ask(&self, message: &str) -> Option<String> {
        let message = message.to_owned();
        tokio::task::spawn_blocking(move || {
            eprint!("{message} ");
            let _ = io::stderr().flush();
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).ok()?;
            Some(line.trim().to_owned()).filter(|l| !l.is_empty())
        })
        .await
        .ok()
        .flatten()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.already_reported() {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli { endpoint, email, identity_path, no_prompt, command } = cli;

    let mut config = ClientConfig::from_env()?;
    if let Some(endpoint) = endpoint.as_deref() {
        config = config.with_endpoint(endpoint)?;
    }
    if let Some(path) = identity_path {
        config.identity_path = path;
    }

    match command {
        Command::Identity(identity) => run_identity(&config, identity),
        Command::Gateway(command) => {
            let session = session_for(email.as_deref(), no_prompt, &config);
            let client = GatewayClient::new(&config, session, Arc::new(TracingIndicator), Arc::new(StderrNotifier))?;
            tracing::debug!(endpoint = %client.endpoint(), "gateway client ready");
            run_gateway(Arc::new(client), command).await
        }
    }
}

async fn run_gateway(client: Arc<GatewayClient>, command: GatewayCommand) -> Result<(), CliError> {
    match command {
        GatewayCommand::Start => run_start(client).await,
        GatewayCommand::Whoami => {
            let user = actions::fetch_user_info(client.as_ref()).await?;
            let role = if user.is_admin { " (admin)" } else { "" };
            println!("{}{role}", user.display_name());
            Ok(())
        }
        GatewayCommand::ClockIn => {
            actions::clock_in(client.as_ref()).await?;
            println!("Clocked In!");
            Ok(())
        }
        GatewayCommand::ClockOut => {
            actions::clock_out(client.as_ref()).await?;
            println!("Clocked Out!");
            Ok(())
        }
        GatewayCommand::Goals => {
            for goal in actions::fetch_goals(client.as_ref()).await? {
                println!("{goal}");
            }
            Ok(())
        }
        GatewayCommand::Team => {
            for member in actions::fetch_team(client.as_ref()).await? {
                println!("{member}");
            }
            Ok(())
        }
        GatewayCommand::Metrics => {
            let metrics = actions::submit_metrics(client.as_ref()).await?;
            print_json(&metrics)
        }
        GatewayCommand::Call(args) => run_call(&client, args).await,
    }
}

fn session_for(email: Option<&str>, no_prompt: bool, config: &ClientConfig) -> Session {
    if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) {
        return Session::with_identity(email);
    }
    let session = Session::new(Arc::new(FileIdentityStore::new(&config.identity_path)));
    if no_prompt { session } else { session.with_prompt(Arc::new(StdinPrompt)) }
}

async fn run_start(client: Arc<GatewayClient>) -> Result<(), CliError> {
    match bootstrap::initialize(client).await {
        Ok(dashboard) => {
            print_dashboard(&dashboard)?;
            if let Some(roster) = dashboard.admin_roster {
                if let Some(team) = roster.wait().await {
                    println!("Admin: {} team members loaded", team.len());
                }
            }
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "user not identified; using fallback mode");
            println!("Not Logged In");
            Err(e.into())
        }
    }
}

async fn run_call(client: &GatewayClient, args: CallArgs) -> Result<(), CliError> {
    let payload = match args.payload.as_deref() {
        Some(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => map,
            _ => return Err(CliError::PayloadNotObject),
        },
        None => Map::new(),
    };
    let method = if args.get { Method::Get } else { Method::Post };
    let envelope = client.call(&args.action, payload, method).await?;
    print_json(&serde_json::to_value(&envelope)?)
}

fn run_identity(config: &ClientConfig, identity: IdentityCommand) -> Result<(), CliError> {
    let store = FileIdentityStore::new(&config.identity_path);
    match identity.command {
        IdentitySubcommand::Show => {
            let email = store
                .get(IDENTITY_KEY)
                .ok_or_else(|| CliError::NoIdentity(config.identity_path.clone()))?;
            println!("{email}");
        }
        IdentitySubcommand::Set { email } => {
            store.set(IDENTITY_KEY, email.trim())?;
            println!("identity saved to {}", store.path().display());
        }
    }
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) -> Result<(), CliError> {
    println!("Signed in as {}", dashboard.user.display_name());
    println!("Metrics:");
    print_json(&dashboard.metrics)?;
    println!("Goals:");
    for goal in &dashboard.goals {
        println!("  {goal}");
    }
    println!("Team:");
    for member in &dashboard.team {
        println!("  {member}");
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
