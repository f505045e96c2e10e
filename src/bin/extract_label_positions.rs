//! 每页题号位置 → label_positions_<year>.json

use anyhow::Result;
use kangaroo_fixtures::orchestrator::label_pipeline;
use kangaroo_fixtures::{cli, App, Config};

const TOOL: &str = "extract_label_positions";

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse_or_exit(TOOL, "/path/to/kangaroo-YYYY.pdf");

    let app = App::initialize(Config::from_env(), TOOL, &args).await?;
    label_pipeline::run(&app, &args).await?;

    Ok(())
}
