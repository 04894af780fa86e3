//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use courier_core::api::types::EmailType;
use courier_core::api::{ApiClient, Unauthorized};
use courier_core::config::Config;
use courier_core::logging;
use courier_core::session::{SessionController, SessionStore};

mod commands;

#[derive(Parser)]
#[command(name = "courier")]
#[command(version = "0.2")]
#[command(about = "Terminal client for the Courier mail gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the gateway base URL from config
    #[arg(long, env = "COURIER_GATEWAY_URL", value_name = "URL", global = true)]
    gateway_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Account email
        #[arg(long)]
        email: Option<String>,
        /// Account password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(long)]
        email: Option<String>,
        /// Account password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Manage the Gmail connection
    Gmail {
        #[command(subcommand)]
        command: GmailCommands,
    },

    /// Send a single email
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Subject line
        #[arg(long)]
        subject: String,
        /// Message body
        #[arg(long)]
        body: Option<String>,
        /// Read the message body from a file
        #[arg(long, value_name = "PATH", conflicts_with = "body")]
        body_file: Option<PathBuf>,
    },

    /// Send to a CSV of recipients
    Bulk {
        #[command(subcommand)]
        command: BulkCommands,
    },

    /// Browse send history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum GmailCommands {
    /// Connect a Gmail account via Google OAuth
    Connect {
        /// Listen for the OAuth redirect on a local port instead of pasting
        #[arg(long, value_name = "PORT")]
        listen: Option<u16>,
    },
    /// Show the Gmail connection status
    Status,
}

#[derive(clap::Subcommand)]
enum BulkCommands {
    /// Validate a recipient CSV without sending
    Check {
        /// CSV file with email,name columns
        #[arg(value_name = "CSV")]
        file: PathBuf,
    },
    /// Validate a recipient CSV, then send to every valid row
    Send {
        /// CSV file with email,name columns
        #[arg(value_name = "CSV")]
        file: PathBuf,
        /// Subject line
        #[arg(long)]
        subject: String,
        /// Message body
        #[arg(long)]
        body: Option<String>,
        /// Read the message body from a file
        #[arg(long, value_name = "PATH", conflicts_with = "body")]
        body_file: Option<PathBuf>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// History type filter.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum TypeFilter {
    Single,
    Bulk,
}

impl From<TypeFilter> for EmailType {
    fn from(filter: TypeFilter) -> Self {
        match filter {
            TypeFilter::Single => EmailType::Single,
            TypeFilter::Bulk => EmailType::Bulk,
        }
    }
}

#[derive(clap::Subcommand)]
enum HistoryCommands {
    /// List sent emails, newest first
    List {
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Entries per page
        #[arg(long = "page-size", default_value_t = 20)]
        page_size: u32,
        /// Filter by send type
        #[arg(long = "type", value_enum)]
        email_type: Option<TypeFilter>,
    },
    /// Show aggregate send statistics
    Stats,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set the gateway base URL
    SetGateway {
        /// Gateway API base URL, including the /api prefix
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands never touch the gateway or the session.
    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetGateway { url } => commands::config::set_gateway(url),
        };
    }

    let mut config = Config::load().context("load config")?;
    if let Some(url) = cli.gateway_url {
        config.gateway.base_url = url;
    }
    tracing::debug!(gateway = %config.gateway.base_url, "dispatching");

    let api = ApiClient::new(&config)?;
    let mut controller = SessionController::new(SessionStore::open_default());

    // Logout is local-only: clears the session without any gateway call.
    if matches!(cli.command, Commands::Logout) {
        return commands::auth::logout(&mut controller);
    }

    // One startup sequence per process: optimistic restore from disk, then
    // background revalidation against the gateway. Always ends in a definite
    // phase, so every handler below sees a settled session.
    controller.initialize(&api).await;

    let protected = !matches!(cli.command, Commands::Register { .. } | Commands::Login { .. });

    let result = match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&api, &mut controller, name, email, password).await,

        Commands::Login { email, password } => {
            commands::auth::login(&api, &mut controller, email, password).await
        }

        Commands::Whoami => commands::auth::whoami(&api, &controller).await,

        Commands::Gmail { command } => match command {
            GmailCommands::Connect { listen } => {
                commands::gmail::connect(&api, &mut controller, listen).await
            }
            GmailCommands::Status => commands::gmail::status(&api, &controller).await,
        },

        Commands::Send {
            to,
            subject,
            body,
            body_file,
        } => commands::send::run(&api, &controller, &to, &subject, body, body_file).await,

        Commands::Bulk { command } => match command {
            BulkCommands::Check { file } => {
                commands::bulk::check(&api, &controller, &file).await
            }
            BulkCommands::Send {
                file,
                subject,
                body,
                body_file,
                yes,
            } => commands::bulk::send(&api, &controller, &file, &subject, body, body_file, yes).await,
        },

        Commands::History { command } => match command {
            HistoryCommands::List {
                page,
                page_size,
                email_type,
            } => {
                commands::history::list(&api, &controller, page, page_size, email_type.map(Into::into))
                    .await
            }
            HistoryCommands::Stats => commands::history::stats(&api, &controller).await,
        },

        Commands::Logout | Commands::Config { .. } => unreachable!("handled above"),
    };

    // Mid-run expiry on a protected command: same global clear the startup
    // revalidation performs, with guidance back to the login surface. Public
    // auth commands are exempt so a failed login cannot clear an unrelated
    // stored session.
    if protected
        && let Err(err) = &result
        && err.downcast_ref::<Unauthorized>().is_some()
    {
        controller.logout();
        anyhow::bail!(
            "Session expired: the gateway rejected the stored token.\n\
             The local session was cleared. Run `courier login` to sign in again."
        );
    }

    result
}
