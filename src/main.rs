use anyhow::{Context, Result};
use serde_json::json;
use std::io::Read;

use pagespark_lib::store::MemoryStore;
use pagespark_lib::{telemetry, Config, GenerationRequest, Orchestrator, PageService};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env().context("loading configuration")?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("reading request from stdin")?;
    let request: GenerationRequest =
        serde_json::from_str(&input).context("parsing generation request")?;

    let orchestrator = Orchestrator::from_config(&config)?;
    let service = PageService::new(orchestrator, MemoryStore::new());

    let receipt = service.generate_page(&request).await?;
    let html = service.live_page(receipt.id).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "receipt": receipt, "html": html }))?
    );
    Ok(())
}
