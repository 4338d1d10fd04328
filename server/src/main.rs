use anyhow::Result;
use axum::Router;
use clap::Parser;
use ir_core::EngineConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Corpus to index at startup (JSON, JSONL or text file, or a directory)
    #[arg(long, default_value = "./data/documents")]
    corpus: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Hash buckets for the inverted index
    #[arg(long, default_value_t = EngineConfig::default().index_buckets)]
    index_buckets: usize,
    /// Hash buckets for the frequency table behind /zipf
    #[arg(long, default_value_t = EngineConfig::default().frequency_buckets)]
    frequency_buckets: usize,
}

impl Args {
    fn config(&self) -> EngineConfig {
        EngineConfig { index_buckets: self.index_buckets, frequency_buckets: self.frequency_buckets }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app: Router = build_app(&args.corpus, args.config())?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_flags_reach_the_engine_config() {
        let args = Args::try_parse_from(["server", "--index-buckets", "64", "--frequency-buckets", "7"]).unwrap();
        let config = args.config();
        assert_eq!(config.index_buckets, 64);
        assert_eq!(config.frequency_buckets, 7);
    }

    #[test]
    fn bucket_flags_default_to_engine_defaults() {
        let args = Args::try_parse_from(["server"]).unwrap();
        let defaults = EngineConfig::default();
        assert_eq!(args.config().index_buckets, defaults.index_buckets);
        assert_eq!(args.config().frequency_buckets, defaults.frequency_buckets);
    }
}
