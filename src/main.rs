use anyhow::Context;
use wpstore::config::Config;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config).await {
        eprintln!("Startup failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let graph = wpstore::object_graph(config);

    let dao = graph
        .dao()
        .await
        .with_context(|| format!("opening database in {}", config.data_dir.display()))?;
    let reminders = dao.get_all().await.context("reading blogging reminders")?;
    let enabled = reminders.iter().filter(|r| r.is_enabled()).count();

    tracing::info!(
        sites = reminders.len(),
        enabled,
        "Local store ready"
    );

    graph.database().await?.close().await;
    Ok(())
}
