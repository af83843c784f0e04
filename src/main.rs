use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

mod application;
mod domain;
mod infrastructure;

use application::commands::{
    AtListCommand, AtSubscribeCommand, AtUnsubscribeCommand, ReloadPluginsCommand,
};
use application::context::BotContext;
use application::messaging::dispatcher::Dispatcher;
use domain::entities::{Friend, MessageChain, MessageEvent, Origin};
use infrastructure::adapters::console::ConsoleAdapter;
use infrastructure::adapters::mirai::MiraiAdapter;
use infrastructure::config::Config;
use infrastructure::datasource::JsonDataSource;
use infrastructure::plugins::PluginRegistry;
use infrastructure::storage::SqliteStore;

#[derive(Parser)]
#[command(name = "lantern-bot")]
#[command(about = "Group notification bot with a hot-reloadable command layer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_bot(cli.config);
        }
        Commands::Version => {
            println!("lantern-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn run_bot(config_path: String) {
    // Load config
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    info!("Starting lantern-bot: {}", config.bot.name);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return;
        }
    };

    rt.block_on(async {
        // Notification store
        let store = match SqliteStore::open(&config.storage.database) {
            Ok(store) => {
                info!("Database initialized");
                Arc::new(store)
            }
            Err(e) => {
                error!("Failed to initialize database: {}", e);
                return;
            }
        };

        // Subscription records
        let datasource = if config.datasource.path.exists() {
            match JsonDataSource::load(&config.datasource.path) {
                Ok(datasource) => {
                    info!("Loaded {} push targets", datasource.target_count());
                    Arc::new(datasource)
                }
                Err(e) => {
                    error!("Failed to load subscriptions: {}", e);
                    return;
                }
            }
        } else {
            warn!(
                "Subscription file not found: {}, starting empty",
                config.datasource.path.display()
            );
            Arc::new(JsonDataSource::empty())
        };

        // Plugin system
        let plugins = Arc::new(PluginRegistry::new(&config.plugins.directory));
        if config.plugins.auto_load {
            match plugins.load_all() {
                Ok(count) => info!("Plugin system initialized with {} plugins", count),
                Err(e) => warn!("Failed to load plugins: {}", e),
            }
        }

        // Command handlers
        let mut dispatcher = Dispatcher::new();
        let prefix = config.bot.prefix.clone();
        dispatcher.register(Arc::new(AtListCommand::new(&prefix)));
        dispatcher.register(Arc::new(AtSubscribeCommand::new(&prefix)));
        dispatcher.register(Arc::new(AtUnsubscribeCommand::new(&prefix)));
        dispatcher.register(Arc::new(ReloadPluginsCommand::new(&prefix)));
        info!("Registered {} command handlers", dispatcher.len());

        // Select adapter
        let mirai_config = config.adapters.mirai.clone().filter(|m| m.enabled);
        let config = Arc::new(config);

        if let Some(mirai_config) = mirai_config {
            let adapter = match MiraiAdapter::connect(
                mirai_config.base_url.as_str(),
                mirai_config.verify_key.as_deref(),
                config.bot.account,
            )
            .await
            {
                Ok(adapter) => Arc::new(adapter),
                Err(e) => {
                    error!("Failed to connect to mirai: {}", e);
                    return;
                }
            };

            let ctx = BotContext {
                account: config.bot.account,
                config: config.clone(),
                chat: adapter.clone(),
                store,
                datasource,
                plugins,
            };
            run_mirai_bot(adapter, ctx, dispatcher).await;
        } else {
            // Console mode (dev)
            let console = Arc::new(ConsoleAdapter::new());
            let ctx = BotContext {
                account: config.bot.account,
                config: config.clone(),
                chat: console.clone(),
                store,
                datasource,
                plugins,
            };
            run_console_bot(console, ctx, dispatcher).await;
        }
    });
}

async fn run_mirai_bot(adapter: Arc<MiraiAdapter>, ctx: BotContext, dispatcher: Dispatcher) {
    info!("Starting message loop");
    loop {
        match adapter.fetch_messages(10).await {
            Ok(events) => {
                for event in events {
                    dispatcher.dispatch(&ctx, &event).await;
                }
            }
            Err(e) => warn!("Failed to fetch messages: {}", e),
        }
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }
}

async fn run_console_bot(console: Arc<ConsoleAdapter>, ctx: BotContext, dispatcher: Dispatcher) {
    info!("Console mode: lines are treated as private messages from the operator");
    let account = ctx.config.bot.master.unwrap_or(0);
    let mut next_id: i64 = 0;

    loop {
        let Some(line) = console.read_line("> ").await else {
            break;
        };
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        next_id += 1;
        let event = MessageEvent {
            source: next_id,
            time: chrono::Utc::now(),
            chain: MessageChain::plain(line),
            origin: Origin::Friend(Friend {
                id: account,
                nickname: "console".to_string(),
            }),
        };
        dispatcher.dispatch(&ctx, &event).await;
    }
}

fn init_config() {
    let path = std::path::Path::new("config.yaml");
    if path.exists() {
        println!("config.yaml already exists, not overwriting");
        return;
    }

    let config = Config::default();
    match config.to_yaml() {
        Ok(yaml) => {
            if let Err(e) = std::fs::write(path, yaml) {
                error!("Failed to write config.yaml: {}", e);
            } else {
                println!("Wrote default config to config.yaml");
            }
        }
        Err(e) => error!("Failed to render default config: {}", e),
    }
}
