use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use modchat::{
    AppState, CompletionClient, GeminiClient, MockCompletionClient, RequestModerationUseCase,
    SessionConfig, SessionController, DEFAULT_PROMPT_TEMPLATE,
};

#[derive(Parser)]
#[command(name = "modchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat simulator web server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value = "3000")]
        port: u16,

        /// Use the offline mock completion client instead of the Gemini API
        #[arg(long)]
        mock: bool,

        /// Pre-set the API key (otherwise taken from GEMINI_API_KEY, or left
        /// empty for the settings panel)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Print the default moderator prompt template
    Prompt,
}

/// The mock client ignores the credential, but submissions are still refused
/// while the key is empty; give mock mode a placeholder so the offline demo
/// works with no configuration at all.
fn resolve_api_key(flag: Option<String>, env: Option<String>, mock: bool) -> String {
    let key = flag.or(env).unwrap_or_default();
    if key.is_empty() && mock {
        "mock".to_string()
    } else {
        key
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            mock,
            api_key,
        } => {
            let client: Arc<dyn CompletionClient> = if mock {
                info!("Using mock completion client");
                Arc::new(MockCompletionClient::new())
            } else {
                Arc::new(GeminiClient::from_env())
            };

            let api_key =
                resolve_api_key(api_key, std::env::var("GEMINI_API_KEY").ok(), mock);
            if api_key.is_empty() {
                info!("No API key configured; set one in the settings panel");
            }

            let controller = SessionController::with_config(SessionConfig::new(api_key));
            let requester = RequestModerationUseCase::new(client);
            let state = Arc::new(AppState::new(controller, requester));

            modchat::serve(&host, port, state).await?;
        }

        Commands::Prompt => {
            println!("{DEFAULT_PROMPT_TEMPLATE}");
        }
    }

    Ok(())
}
