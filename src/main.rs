
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use uuid::Uuid;

use flashpaper_client::error::{DEFAULT_ERROR_MESSAGE, parse_error};
use flashpaper_client::state::draft::{DEFAULT_EXPIRES_IN, DEFAULT_LANGUAGE, DEFAULT_MAX_VIEWS};
use flashpaper_client::ui::TracingNotifier;
use flashpaper_client::{
    ApiClient, ClientConfig, ClientError, Credentials, DraftError, DraftStore, FileTokenStore, Navigator,
    SessionContext, SessionPhase, SessionStore,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}", parse_error(.0, DEFAULT_ERROR_MESSAGE))]
    Client(#[from] ClientError),
    #[error("invalid snippet: {0}")]
    Draft(#[from] DraftError),
    #[error("login failed: no session was established")]
    LoginRejected,
    #[error("not logged in; run `flashpaper login`")]
    NotLoggedIn,
    #[error("failed to read stdin: {0}")]
    Stdin(#[from] std::io::Error),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "flashpaper", about = "Burn-after-read snippet client")]
struct Cli {
    /// API base address. Overrides `FLASHPAPER_API_BASE`.
    #[arg(long)]
    base_url: Option<String>,

    /// Token file. Overrides `FLASHPAPER_TOKEN_FILE`.
    #[arg(long)]
    token_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register(CredentialArgs),
    Login(CredentialArgs),
    Logout,
    Whoami,
    Health,
    Snippet(SnippetCommand),
    Dashboard,
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "FLASHPAPER_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct SnippetCommand {
    #[command(subcommand)]
    command: SnippetSubcommand,
}

#[derive(Subcommand, Debug)]
enum SnippetSubcommand {
    Create(CreateArgs),
    View {
        id: Uuid,
    },
    Delete {
        id: Uuid,
    },
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long, default_value = "")]
    title: String,

    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    #[arg(long, default_value_t = DEFAULT_MAX_VIEWS)]
    max_views: u32,

    /// Lifetime in seconds.
    #[arg(long, default_value_t = DEFAULT_EXPIRES_IN)]
    expires_in: u64,

    /// Snippet body. Read from stdin when omitted.
    #[arg(long)]
    content: Option<String>,
}

/// The terminal has no router; a redirect to login becomes a hint.
struct LoginHint;

impl Navigator for LoginHint {
    fn navigate(&self, path: &str) {
        tracing::debug!(%path, "navigate");
        eprintln!("session ended; run `flashpaper login` to sign in again");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level(cli.verbose))
        .init();
    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "no .env loaded");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// INFO by default; `-v` raises to DEBUG.
fn log_level(verbose: bool) -> tracing::Level {
    if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = ClientConfig::for_base_url(&base_url)?.base_url;
    }
    if let Some(token_file) = cli.token_file {
        config.token_file = token_file;
    }
    tracing::debug!(base_url = %config.base_url, token_file = %config.token_file.display(), "config loaded");

    let tokens = FileTokenStore::open(config.token_file.clone()).await?;
    let session = Arc::new(SessionContext::new(Arc::new(tokens)));
    let api = ApiClient::new(&config, session)?
        .with_notifier(Arc::new(TracingNotifier))
        .with_navigator(Arc::new(LoginHint));
    let store = SessionStore::from_config(Arc::new(api), &config);

    match cli.command {
        Command::Register(args) => {
            store.register(&credentials(args)).await?;
            print_json(&serde_json::json!({ "registered": true }))
        }
        Command::Login(args) => {
            let phase = store.login(&credentials(args)).await?;
            if phase == SessionPhase::Anonymous {
                return Err(CliError::LoginRejected);
            }
            print_json(&store.user().await)
        }
        Command::Logout => {
            store.logout().await;
            print_json(&serde_json::json!({ "logged_out": true }))
        }
        Command::Whoami => match store.require_user().await {
            Some(user) => print_json(&user),
            None => Err(CliError::NotLoggedIn),
        },
        Command::Health => print_json(&store.api().health().await?),
        Command::Dashboard => print_json(&store.api().dashboard_stats().await?),
        Command::Snippet(snippet) => run_snippet(&store, snippet).await,
    }
}

async fn run_snippet(store: &SessionStore, snippet: SnippetCommand) -> Result<(), CliError> {
    let api = store.api();
    match snippet.command {
        SnippetSubcommand::Create(args) => {
            let content = match args.content {
                Some(content) => content,
                None => read_stdin().await?,
            };
            let draft = DraftStore::new();
            draft.update(|d| {
                d.content = content;
                d.title = args.title;
                d.language = args.language;
                d.max_views = args.max_views;
                d.expires_in = args.expires_in;
            });
            let created = api.create_snippet(&draft.to_request()?).await?;
            draft.clear();
            api.notifier().success("Snippet created");
            print_json(&created)
        }
        SnippetSubcommand::View { id } => print_json(&api.view_snippet(id).await?),
        SnippetSubcommand::Delete { id } => {
            api.delete_snippet(id).await?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        SnippetSubcommand::List { page, limit } => print_json(&api.list_snippets(page, limit).await?),
    }
}

fn credentials(args: CredentialArgs) -> Credentials {
    Credentials::new(args.email, args.password)
}

async fn read_stdin() -> Result<String, CliError> {
    let mut content = String::new();
    tokio::io::stdin().read_to_string(&mut content).await?;
    Ok(content)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
