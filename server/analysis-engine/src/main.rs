//! Binary entrypoint: read one telemetry JSON object from stdin, write one
//! assessment JSON object to stdout. Logs go to stderr.

use std::io::{self, Read, Write};
use std::path::Path;

use analysis_engine::{Config, Engine, TestExecutionTelemetry};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  if let Err(e) = run_binary().await {
    let _ = writeln!(io::stderr(), "analysis-engine error: {:#}", e);
    std::process::exit(1);
  }
}

async fn run_binary() -> anyhow::Result<()> {
  let config = Config::from_env_and_file(Path::new(".env"))?;
  let engine = Engine::from_config(&config)?;

  let mut raw = String::new();
  io::stdin()
    .lock()
    .read_to_string(&mut raw)
    .context("reading stdin")?;
  let telemetry: TestExecutionTelemetry =
    serde_json::from_str(&raw).context("parsing telemetry JSON")?;

  let out = engine.analyze(&telemetry).await;
  let json = serde_json::to_vec(&out)?;
  io::stdout().write_all(&json)?;
  Ok(())
}
