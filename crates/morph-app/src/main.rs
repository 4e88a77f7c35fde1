// morph-duel entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr; stdout carries the JSON-lines protocol)
// 2. Load config (copying defaults on first run)
// 3. Load the word list and build the morph graph
// 4. Build the duel engine with a channel broadcaster
// 5. Spawn the stdin reader task
// 6. Run the command loop until stdin closes

use std::sync::Arc;

use anyhow::Context;
use morph_app::app;
use morph_core::broadcast::ChannelBroadcaster;
use morph_core::config;
use morph_core::dictionary::Dictionary;
use morph_core::duel::{DuelEngine, EngineSettings};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("morph-duel starting up");

    // 2. Load config
    let base_dir = std::env::current_dir().context("failed to resolve working directory")?;
    let config = config::load_config(&base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: {}-letter words, {} turn limit, {} hints per player, {:?} distance",
        config.game.word_length,
        config.game.max_turns,
        config.game.max_hints_per_player,
        config.game.distance_metric
    );

    // 3. Word list and morph graph
    let dictionary = Dictionary::load(&config.dictionary, &base_dir, config.game.word_length)
        .context("failed to load word list")?;
    let dictionary = Arc::new(dictionary);
    let graph = dictionary.graph();
    info!(
        "Morph graph ready: {} words, {} edges, {} eligible start words",
        graph.len(),
        graph.edge_count(),
        graph.words_with_min_degree(config.game.min_start_degree).len()
    );

    // 4. Engine
    let (event_tx, event_rx) = mpsc::channel(256);
    let (line_tx, line_rx) = mpsc::channel(64);
    let engine = DuelEngine::new(EngineSettings::from_config(&config), graph, dictionary)
        .with_broadcaster(Arc::new(ChannelBroadcaster::new(event_tx)));

    // 5. stdin reader
    let reader_handle = tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = app::read_lines(stdin, line_tx).await {
            error!("stdin reader error: {}", e);
        }
    });

    // 6. Command loop
    info!("Ready; reading requests from stdin");
    let mut stdout = tokio::io::stdout();
    app::run(&engine, line_rx, event_rx, &mut stdout)
        .await
        .context("command loop failed")?;

    reader_handle.abort();
    info!("morph-duel shut down cleanly");
    Ok(())
}

/// Initialize tracing to stderr so stdout stays a clean JSON channel.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("morph_core=info,morph_app=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
