use std::time::Duration;

use accounts_config::load as load_config;
use accounts_database::{Account, AccountFlags};
use accounts_gateway::{create_router, GatewayState};
use accounts_runtime::{telemetry, BackendServices};
use accounts_users::{RegistrationForm, WorkflowError};
use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tracing::info;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Parser)]
#[command(name = "accounts-server")]
#[command(about = "Accounts backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create an account with staff and superuser privileges
    CreateSuperuser(SuperuserArgs),
    /// List accounts ordered by email
    ListAccounts {
        /// Case-insensitive fragment of an email or username
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Change privilege flags of an account
    SetFlags(FlagArgs),
}

#[derive(Debug, Args)]
struct SuperuserArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    phone_number: String,
    /// Read from stdin when not given
    #[arg(long, env = "ACCOUNTS_SUPERUSER_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Debug, Args)]
struct FlagArgs {
    username: String,
    #[arg(long, action = ArgAction::Set)]
    active: Option<bool>,
    #[arg(long, action = ArgAction::Set)]
    staff: Option<bool>,
    #[arg(long, action = ArgAction::Set)]
    superuser: Option<bool>,
}

impl FlagArgs {
    fn flags(&self) -> AccountFlags {
        AccountFlags {
            is_active: self.active,
            is_staff: self.staff,
            is_superuser: self.superuser,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::CreateSuperuser(args) => create_superuser(args).await,
        Commands::ListAccounts { search } => list_accounts(&search).await,
        Commands::SetFlags(args) => set_flags(args).await,
    }
}

async fn initialise() -> anyhow::Result<(accounts_config::AppConfig, BackendServices)> {
    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    Ok((config, services))
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting accounts backend");

    let (config, services) = initialise().await?;

    let purge = services.spawn_session_purge(SESSION_PURGE_INTERVAL);
    let state = GatewayState::new(
        services.db_pool.clone(),
        services.workflow.clone(),
        &config.auth,
    );
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(accounts_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    purge.abort();
    info!("backend shut down");
    Ok(())
}

async fn create_superuser(args: SuperuserArgs) -> anyhow::Result<()> {
    let (_, services) = initialise().await?;

    let password = match args.password {
        Some(password) => password,
        None => read_password().await?,
    };

    let form = RegistrationForm {
        username: args.username,
        password: password.clone(),
        password_confirmation: password,
        email: args.email,
        address: args.address,
        phone_number: args.phone_number,
        name: args.name,
    };

    let account = services
        .workflow
        .create_superuser(&form)
        .await
        .map_err(describe_failure)?;

    println!("Superuser {} created ({})", account.username, account.public_id);
    Ok(())
}

async fn list_accounts(search: &str) -> anyhow::Result<()> {
    let (_, services) = initialise().await?;

    let accounts = services
        .workflow
        .list_accounts(search)
        .await
        .context("failed to list accounts")?;

    print!("{}", render_accounts(&accounts));
    Ok(())
}

async fn set_flags(args: FlagArgs) -> anyhow::Result<()> {
    let flags = args.flags();
    if flags.is_empty() {
        anyhow::bail!("nothing to change: pass --active, --staff or --superuser");
    }

    let (_, services) = initialise().await?;

    let account = services
        .workflow
        .set_flags(&args.username, flags)
        .await
        .map_err(describe_failure)?;

    println!(
        "{}: active={} staff={} superuser={}",
        account.username, account.is_active, account.is_staff, account.is_superuser
    );
    Ok(())
}

async fn read_password() -> anyhow::Result<String> {
    print!("Password: ");
    std::io::Write::flush(&mut std::io::stdout())?;

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .await
        .context("failed to read password from stdin")?;

    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// Turn field errors into a readable message instead of a debug dump
fn describe_failure(error: WorkflowError) -> anyhow::Error {
    match error.field_errors() {
        Some(errors) => {
            let details: Vec<String> = errors
                .iter()
                .map(|(field, error)| format!("{field}: {error}"))
                .collect();
            anyhow::anyhow!("rejected: {}", details.join("; "))
        }
        None => anyhow::Error::new(error),
    }
}

fn render_accounts(accounts: &[Account]) -> String {
    if accounts.is_empty() {
        return "No accounts found\n".to_string();
    }

    let mut out = format!(
        "{:<30} {:<20} {:<6} {:<6} {:<6} {:<25}\n",
        "Email", "Username", "Active", "Staff", "Super", "Last login"
    );
    out.push_str(&"-".repeat(98));
    out.push('\n');

    for account in accounts {
        out.push_str(&format!(
            "{:<30} {:<20} {:<6} {:<6} {:<6} {:<25}\n",
            account.email,
            account.username,
            account.is_active,
            account.is_staff,
            account.is_superuser,
            account.last_login.as_deref().unwrap_or("never"),
        ));
    }

    out
}
