//! aipanel CLI: chat side panel with persistent history

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use aipanel_engine::{
    DelegatedResponder, ExchangeController, FileStore, MessageStore, PanelConfig, PanelResponder,
    Sender, SubmitOutcome,
};

/// Chat side panel with a delegated or simulated AI backend
#[derive(Parser)]
#[command(name = "aipanel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Panel data directory (history and config)
    #[arg(long, default_value = ".aipanel")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the panel TUI (default when no command specified)
    Panel,

    /// Initialize the data directory and default config
    Init,

    /// Run one headless turn and print the reply
    Send {
        /// The message to send
        message: String,
    },

    /// Print the persisted conversation
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the persisted conversation
    Clear,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Panel) => {
            let controller = build_controller(&cli.data_dir);
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            if let Err(e) = rt.block_on(aipanel_tui::run_panel(controller)) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Init) => {
            init_tracing();
            cmd_init(&cli.data_dir);
        }
        Some(Commands::Send { message }) => {
            init_tracing();
            cmd_send(&cli.data_dir, &message);
        }
        Some(Commands::History { json }) => {
            init_tracing();
            cmd_history(&cli.data_dir, json);
        }
        Some(Commands::Clear) => {
            init_tracing();
            cmd_clear(&cli.data_dir);
        }
    }
}

/// Install the tracing subscriber for headless commands.
///
/// The TUI path skips this; log lines would corrupt the screen.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Wire up the exchange controller from config and storage.
fn build_controller(data_dir: &Path) -> ExchangeController {
    let config_path = data_dir.join("config.json");
    let config = if config_path.exists() {
        match PanelConfig::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {e}");
                std::process::exit(1);
            }
        }
    } else {
        PanelConfig::default()
    };

    let delegate = config.delegate.as_ref().map(DelegatedResponder::from_config);
    let provider = Arc::new(PanelResponder::new(delegate));

    let store = match FileStore::new(data_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Error opening storage: {e}");
            std::process::exit(1);
        }
    };

    ExchangeController::new(provider, store)
}

fn cmd_init(data_dir: &Path) {
    if let Err(e) = std::fs::create_dir_all(data_dir) {
        eprintln!("Failed to create {}: {e}", data_dir.display());
        std::process::exit(1);
    }

    let config_path = data_dir.join("config.json");
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        let config = PanelConfig::default();
        match config.save(&config_path) {
            Ok(()) => println!("Created {}", config_path.display()),
            Err(e) => {
                eprintln!("Failed to write config: {e}");
                std::process::exit(1);
            }
        }
    }

    println!("\nInitialization complete!");
    println!("Add a \"delegate\" entry to the config to wire up an external assistant;");
    println!("without one the panel answers with simulated replies.");
}

fn cmd_send(data_dir: &Path, message: &str) {
    let mut controller = build_controller(data_dir);

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    rt.block_on(async {
        controller.load_history().await;

        match controller.submit(message).await {
            SubmitOutcome::Ignored => {
                eprintln!("Nothing to send (empty message)");
                std::process::exit(1);
            }
            SubmitOutcome::Completed => {
                if let Some(reply) = controller
                    .conversation()
                    .messages()
                    .iter()
                    .rev()
                    .find(|m| m.sender == Sender::Ai)
                {
                    println!("{}", reply.text);
                }
            }
        }
    });
}

fn cmd_history(data_dir: &Path, json: bool) {
    let store = match FileStore::new(data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening storage: {e}");
            std::process::exit(1);
        }
    };

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let messages = rt.block_on(store.load()).unwrap_or_else(|e| {
        eprintln!("Error loading history: {e}");
        std::process::exit(1);
    });

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&messages).expect("failed to serialize")
        );
        return;
    }

    if messages.is_empty() {
        println!("No messages");
        return;
    }

    for message in &messages {
        let who = match message.sender {
            Sender::User => "you",
            Sender::Ai => "ai ",
        };
        println!(
            "[{}] {} {}",
            message.timestamp.format("%Y-%m-%d %H:%M"),
            who,
            message.text
        );
    }
}

fn cmd_clear(data_dir: &Path) {
    let store = match FileStore::new(data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening storage: {e}");
            std::process::exit(1);
        }
    };

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(store.clear()) {
        Ok(()) => println!("History cleared"),
        Err(e) => {
            eprintln!("Failed to clear history: {e}");
            std::process::exit(1);
        }
    }
}
