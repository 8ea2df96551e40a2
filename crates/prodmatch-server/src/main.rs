//! ProdMatch — matches invoice line items against a self-growing product catalog.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use prodmatch_core::{MatchResult, ProdMatchConfig};
use prodmatch_infer::Embedder;
use prodmatch_resolve::Matcher;
use prodmatch_server::{build_router, AppState};
use prodmatch_store::{CatalogStore, SqliteCatalogStore};

fn print_help() {
    println!("ProdMatch — invoice line to product catalog matching");
    println!();
    println!("Usage: prodmatch [command]");
    println!();
    println!("Commands:");
    println!("  (none)                       Start the server");
    println!("  upload <catalog.json>        Embed and insert a catalog file");
    println!("  check <name> [description]   Match one product, inserting it if new");
    println!("  help                         Show this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if let Some(cmd) = args.get(1).map(String::as_str) {
        if matches!(cmd, "--help" | "-h" | "help") {
            print_help();
            return Ok(());
        }
    }

    // Fail fast on missing or malformed configuration
    let config = ProdMatchConfig::from_env()?;

    let store: Arc<dyn CatalogStore> = Arc::new(
        SqliteCatalogStore::open(&config.storage)
            .map_err(|e| anyhow::anyhow!("Failed to open catalog: {}", e))?,
    );
    let embedder = prodmatch_infer::create_embedder(&config.embedding)?;

    match args.get(1).map(String::as_str) {
        None => serve(config, store, embedder).await,
        Some("upload") => {
            let path = args
                .get(2)
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("Usage: prodmatch upload <catalog.json>"))?;
            let items = prodmatch_ingest::load_catalog_file(&path)?;
            let report =
                prodmatch_ingest::upload_catalog(store.as_ref(), embedder.as_ref(), items).await?;
            println!(
                "Catalog upload completed: {} inserted, {} skipped",
                report.inserted, report.skipped
            );
            Ok(())
        }
        Some("check") => {
            let name = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Usage: prodmatch check <name> [description]"))?;
            let description = args.get(3).map(String::as_str).unwrap_or("");
            let matcher = Matcher::new(store, embedder, config.threshold)
                .with_scan_warn_rows(config.storage.scan_warn_rows);
            match matcher.check_product(name, description).await? {
                MatchResult::Matched { entry, distance } => {
                    println!("Found similar product:");
                    println!("    Name: {}", entry.product_name);
                    println!("    Description: {}", entry.product_description);
                    println!("    Distance: {:.4}", distance);
                }
                MatchResult::NoMatch { entry, .. } => {
                    println!(
                        "No good match found. Inserted '{}' as catalog entry {}",
                        entry.product_name, entry.id
                    );
                }
            }
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'prodmatch help' for usage.", other);
            std::process::exit(1);
        }
    }
}

async fn serve(
    config: ProdMatchConfig,
    store: Arc<dyn CatalogStore>,
    embedder: Arc<dyn Embedder>,
) -> anyhow::Result<()> {
    let port = config.port;
    info!(
        "Catalog at {} ({} entries), threshold={}",
        store.location(),
        store.count().await?,
        config.threshold
    );

    let state = Arc::new(AppState::new(config, store, embedder));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ProdMatch server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("ProdMatch server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
