//! HTTP relay between the routine builder and the upstream chat API.
//!
//! The relay holds the upstream credential (`OPENAI_API_KEY`) so clients
//! never see it. Every request is a POST whose body carries the transcript.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default address
//! OPENAI_API_KEY=... routine-relay
//!
//! # Listen elsewhere and pick models
//! routine-relay --bind 0.0.0.0:9000 --model gpt-4o --search-model gpt-4o-mini
//! ```

use std::sync::Arc;

use arrrg::CommandLine;
use tower_http::trace::TraceLayer;

use routine_builder::relay::{RelayArgs, RelayConfig};
use routine_builder::{OpenAi, Relay, TracingLogger, register_biometrics, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,routine_builder=debug".to_string()),
        )
        .init();

    let (args, _) = RelayArgs::from_command_line_relaxed("routine-relay [OPTIONS]");
    let config = RelayConfig::from(args);

    register_biometrics(biometrics::Collector::new());

    let upstream = OpenAi::with_options(None, Some(config.upstream_url.clone()))?;
    let bind = config.bind.clone();
    let relay = Relay::new(upstream, config).with_logger(Arc::new(TracingLogger));

    let app = router(Arc::new(relay)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(addr = %bind, "starting routine-relay");
    axum::serve(listener, app).await?;
    Ok(())
}
