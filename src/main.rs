use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use easy_consulting::{
    config::{AppConfig, SeedCatalog, database, seed::resolve_seed_catalog},
    core::{
        ActionResult, Collection, ControllerOptions, InitializationController,
        admin::make_admin,
        order::{OrderStatus, update_order_status},
        settings::load_site_settings,
    },
    errors::{Error, Result},
    legacy::LegacyClient,
    store::{DocumentStore, MemoryStore, SeaOrmStore},
};
use serde_json::json;
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Seed and inspect the Easy Consulting document store.
#[derive(Debug, Parser)]
#[command(name = "easy-consulting", version, about)]
struct Cli {
    /// Database connection string
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// TOML file replacing the built-in seed catalog
    #[arg(long, global = true, env = "SEED_CONFIG_PATH")]
    seed_file: Option<PathBuf>,

    /// Use a throwaway in-memory store instead of the database
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Initialize every collection, or just one
    Init {
        /// Collection to initialize
        #[arg(long)]
        collection: Option<String>,
    },
    /// Report whether a collection has documents
    Check {
        /// Collection name
        name: String,
    },
    /// Print per-collection statistics
    Stats {
        /// Dump the full report, documents included, as JSON
        #[arg(long)]
        documents: bool,
    },
    /// Grant admin rights to an email
    MakeAdmin {
        /// Email to promote
        email: String,
        /// Email of the admin performing the change
        #[arg(long)]
        actor: String,
    },
    /// Change an order's status and notify the legacy backend
    OrderStatus {
        /// Order id
        id: String,
        /// One of "Pending", "On going", "Done"
        status: OrderStatus,
    },
    /// Print the normalized site settings
    Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since variables can be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Environment first, then command-line overrides
    let mut app_config = AppConfig::from_env()
        .inspect_err(|e| error!("Failed to load application configuration: {}", e))?;
    if let Some(url) = cli.database_url.clone() {
        app_config.database_url = url;
    }
    if let Some(path) = cli.seed_file.clone() {
        app_config.seed_config_path = Some(path);
    }

    // 4. Pick a backend and run
    if cli.memory {
        info!("Using in-memory store; nothing will be persisted");
        run(Arc::new(MemoryStore::new()), &app_config, cli.command).await
    } else {
        let db = database::create_connection(&app_config.database_url)
            .await
            .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
        database::create_tables(&db).await?;
        info!("Database initialized successfully.");
        run(Arc::new(SeaOrmStore::new(db)), &app_config, cli.command).await
    }
}

/// Auto-initialization only applies to `init --collection`. Plain `init`
/// already initializes everything and the other commands must not write.
const fn mounts_with_auto_init(command: &Command) -> bool {
    matches!(command, Command::Init { collection: Some(_) })
}

async fn build_controller<S: DocumentStore>(
    store: Arc<S>,
    catalog: SeedCatalog,
    config: &AppConfig,
    command: &Command,
) -> InitializationController<S> {
    let options = ControllerOptions {
        auto_initialize: config.auto_initialize && mounts_with_auto_init(command),
        ..ControllerOptions::default()
    };
    InitializationController::mount(store, catalog, options).await
}

/// Runs `init`. Unknown collection names are rejected before the controller
/// sees them.
async fn run_init<S: DocumentStore>(
    controller: &InitializationController<S>,
    collection: Option<&str>,
) -> Result<ActionResult> {
    match collection {
        Some(name) => {
            let collection: Collection = name.parse()?;
            Ok(controller.initialize_collection(collection.as_str()).await)
        }
        None => Ok(controller.initialize_all().await),
    }
}

async fn run<S: DocumentStore + 'static>(store: Arc<S>, config: &AppConfig, command: Command) -> Result<()> {
    let catalog = resolve_seed_catalog(config.seed_config_path.as_deref())?;
    let controller = build_controller(Arc::clone(&store), catalog, config, &command).await;

    match command {
        Command::Init { collection } => {
            let result = run_init(&controller, collection.as_deref()).await?;
            print_action(&result)?;
        }
        Command::Check { name } => print_action(&controller.check_collection(&name).await)?,
        Command::Stats { documents } => {
            let result = controller.fetch_stats().await;
            if documents {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_stats_summary(&result);
            }
        }
        Command::MakeAdmin { email, actor } => {
            let id = make_admin(store.as_ref(), &actor, &email).await?;
            println!("{}", json!({ "success": true, "id": id, "email": email }));
        }
        Command::OrderStatus { id, status } => {
            update_order_status(store.as_ref(), &id, status).await?;
            let legacy = LegacyClient::new(config.legacy_api_url.clone())?;
            let notified = legacy
                .patch(&format!("/statusUpdate/{id}"), &json!({ "status": status }))
                .await
                .is_some();
            if !notified {
                warn!("Legacy backend was not notified about order {}", id);
            }
            println!("{}", json!({ "success": true, "id": id, "status": status, "legacyNotified": notified }));
        }
        Command::Settings => {
            let settings = load_site_settings(store.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(settings.values())?);
        }
    }
    Ok(())
}

fn print_action(result: &ActionResult) -> Result<()> {
    println!("{}", result.message());
    println!("{}", serde_json::to_string_pretty(result)?);
    if result.success() {
        Ok(())
    } else {
        // names are validated up front, so what is left are store failures
        Err(Error::store(result.message()))
    }
}

fn print_stats_summary(result: &ActionResult) {
    let ActionResult::Stats(report) = result else {
        println!("{}", result.message());
        return;
    };
    if let Some(message) = report.error_message() {
        println!("Failed to collect stats: {message}");
        return;
    }
    for collection in Collection::ALL {
        if let Some(stats) = report.get(collection) {
            println!(
                "{:<10} exists: {:<5} documents: {}",
                collection.as_str(),
                stats.exists,
                stats.document_count
            );
        }
    }
}
