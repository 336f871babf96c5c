//! deskchat CLI: Terminal host for the support chat widget

mod terminal;

use clap::{Parser, Subcommand};
use deskchat_engine::{
    intent, BackendGateway, ConversationController, HttpGateway, MessageSink, Turn, WidgetConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terminal::TerminalSink;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

const DESKCHAT_DIR: &str = ".deskchat";
const CONFIG_FILE: &str = "config.json";

/// Support chat widget for the terminal
#[derive(Parser)]
#[command(name = "deskchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the widget config file (default: .deskchat/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Client identifier, overriding the config file
    #[arg(long, global = true)]
    client_id: Option<String>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat widget (default when no command specified)
    ///
    /// The input hint is reprinted whenever the conversation moves on, for
    /// example after the bot offers a support ticket. Replies arrive while you
    /// type; if you send a line before a reply has loaded, that reply's "..."
    /// line stays on screen above the answer.
    Chat,

    /// Ask the backend a single question
    Ask {
        /// The question to ask
        question: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open a support ticket directly
    Ticket {
        /// The question the ticket is about
        #[arg(long)]
        question: String,

        /// Where the support team should reply
        #[arg(long)]
        email: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the configuration and backend reachability
    Doctor,

    /// Create .deskchat/config.json
    Init,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Path::new(DESKCHAT_DIR).join(CONFIG_FILE));

    if let Some(Commands::Init) = cli.command {
        cmd_init(&config_path, cli.client_id, cli.api_url);
        return;
    }

    let config = match WidgetConfig::load_or_default(&config_path) {
        Ok(config) => config.with_overrides(cli.client_id, cli.api_url),
        Err(e) => {
            error!(path = %config_path.display(), error = %e, "failed to load config");
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let command = cli.command;
    let code = rt.block_on(async move {
        match command {
            None | Some(Commands::Chat) => cmd_chat(&config).await,
            Some(Commands::Ask { question, json }) => cmd_ask(&config, &question, json).await,
            Some(Commands::Ticket {
                question,
                email,
                json,
            }) => cmd_ticket(&config, &question, &email, json).await,
            Some(Commands::Doctor) => cmd_doctor(&config, &config_path).await,
            Some(Commands::Init) => 0,
        }
    });

    if code != 0 {
        std::process::exit(code);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_gateway(config: &WidgetConfig) -> Option<HttpGateway> {
    match HttpGateway::new(config) {
        Ok(gateway) => Some(gateway),
        Err(e) => {
            error!(error = %e, "invalid widget configuration");
            None
        }
    }
}

async fn cmd_chat(config: &WidgetConfig) -> i32 {
    let sink = Arc::new(TerminalSink::new());
    let message_sink: Arc<dyn MessageSink> = sink.clone();

    // A widget without a client id never shows any UI.
    let controller = match ConversationController::from_config(config, message_sink) {
        Ok(controller) => controller,
        Err(e) => {
            error!(error = %e, "chat widget not started");
            return 1;
        }
    };

    debug!(session_id = controller.session_id(), "chat widget started");
    sink.header(&config.title, controller.state().input_hint());
    controller.greet();

    let mut states = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Vec<Turn> = Vec::new();

    loop {
        tokio::select! {
            Ok(()) = states.changed() => {
                let hint = states.borrow_and_update().input_hint();
                sink.hint(hint);
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim() == "/quit" {
                        break;
                    }
                    let turn = controller.handle_input(&line);
                    pending.retain(|t| !t.is_finished());
                    if turn.is_pending() {
                        pending.push(turn);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "failed to read input");
                    break;
                }
            },
        }
    }

    for turn in pending {
        turn.settle().await;
    }
    0
}

async fn cmd_ask(config: &WidgetConfig, question: &str, json: bool) -> i32 {
    let Some(gateway) = build_gateway(config) else {
        return 1;
    };

    match gateway.ask(question).await {
        Ok(result) => {
            if json {
                let status = if result.needs_handoff() {
                    "human_handoff"
                } else {
                    "answered"
                };
                println!(
                    "{}",
                    serde_json::json!({"answer": result.answer, "status": status})
                );
            } else {
                println!("{}", result.answer);
                if result.needs_handoff() {
                    println!("\n(The backend could not answer; run `deskchat ticket` to reach a human.)");
                }
            }
            0
        }
        Err(e) => {
            eprintln!("Ask failed: {e}");
            1
        }
    }
}

async fn cmd_ticket(config: &WidgetConfig, question: &str, email: &str, json: bool) -> i32 {
    let email = email.trim();
    if !intent::looks_like_email(email) {
        eprintln!("Not a valid email address: {email}");
        return 1;
    }

    let Some(gateway) = build_gateway(config) else {
        return 1;
    };

    match gateway.create_ticket(question, email).await {
        Ok(ticket) => {
            let message = ticket.confirmation();
            if json {
                println!("{}", serde_json::json!({"message": message}));
            } else {
                println!("{message}");
            }
            0
        }
        Err(e) => {
            eprintln!("Ticket creation failed: {e}");
            1
        }
    }
}

async fn cmd_doctor(config: &WidgetConfig, config_path: &Path) -> i32 {
    println!("Widget Configuration\n");

    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        "defaults (no config file)".to_string()
    };
    println!("  Config: {source}");
    println!("  Backend: {}", config.api_base_url);
    println!("  Ask endpoint: {}", config.ask_url());
    println!("  Ticket endpoint: {}", config.ticket_url());

    match config.client_id() {
        Ok(id) => println!("  Client id: {id}"),
        Err(e) => println!("  Client id: {e}"),
    }
    println!();

    if let Err(e) = config.validate() {
        println!("Not ready: {e}");
        return 1;
    }

    let Some(gateway) = build_gateway(config) else {
        return 1;
    };

    match gateway.health().await {
        Ok(()) => {
            println!("Backend is healthy");
            0
        }
        Err(e) => {
            println!("Backend unreachable: {e}");
            1
        }
    }
}

fn cmd_init(config_path: &Path, client_id: Option<String>, api_url: Option<String>) {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return;
    }

    let config = WidgetConfig::default().with_overrides(client_id, api_url);
    match config.save(config_path) {
        Ok(()) => println!("Created {}", config_path.display()),
        Err(e) => {
            eprintln!("Failed to write config: {e}");
            std::process::exit(1);
        }
    }

    if config.client_id().is_err() {
        println!(
            "\nSet \"client_id\" in {} before starting the widget",
            config_path.display()
        );
    }
}
