// Main entry point - Dependency injection and route rendering
use api_dashboards::application::debounce::{settled, KeyedDebouncer};
use api_dashboards::infrastructure::config::load_config;
use api_dashboards::presentation::app_state::AppState;
use api_dashboards::presentation::handlers::render_route;
use api_dashboards::presentation::routes::{resolve, Route, DASHBOARDS};
use futures::StreamExt;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// How long watch mode waits for the next settled search once input ends.
const WATCH_DRAIN: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;
    let state = AppState::from_config(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--watch") {
        return watch(&state).await;
    }

    let targets: Vec<String> = if args.is_empty() {
        std::iter::once("/".to_string())
            .chain(DASHBOARDS.iter().map(|kind| kind.path().to_string()))
            .collect()
    } else {
        args
    };

    for target in &targets {
        let value = render_route(&state, target).await?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

/// Reads routes from stdin, one per line. Lines typed in quick succession are
/// debounced per route so only the settled search on each dashboard is fetched.
async fn watch(state: &AppState) -> anyhow::Result<()> {
    let (mut debouncer, rx) = KeyedDebouncer::new();
    let mut targets = Box::pin(settled(rx));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if !line.trim().is_empty() => {
                    let target = line.trim().to_string();
                    let route = resolve(&target).map(|r| r.route);
                    let quiet = match route {
                        Some(Route::Dashboard(kind)) => kind.quiet_period(&state.debounce),
                        _ => Duration::ZERO,
                    };
                    debouncer.push_after(route, target, quiet);
                }
                Some(_) => {}
                None => break,
            },
            Some(target) = targets.next() => print_route(state, &target).await,
        }
    }

    // Several dashboards may still be settling
    while let Ok(Some(target)) = tokio::time::timeout(WATCH_DRAIN, targets.next()).await {
        print_route(state, &target).await;
    }
    Ok(())
}

async fn print_route(state: &AppState, target: &str) {
    match render_route(state, target).await {
        Ok(value) => match serde_json::to_string(&value) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to encode {}: {}", target, e),
        },
        Err(e) => tracing::error!("{:#}", e),
    }
}
