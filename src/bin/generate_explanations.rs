//! 题目截图 + LLM → explanations_<year>.json

use anyhow::Result;
use kangaroo_fixtures::orchestrator::explanation_pipeline;
use kangaroo_fixtures::{cli, App, Config};

const TOOL: &str = "generate_explanations";

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse_or_exit(TOOL, "/path/to/kangaroo-YYYY.pdf");

    let app = App::initialize(Config::from_env(), TOOL, &args).await?;
    explanation_pipeline::run(&app, &args).await?;

    Ok(())
}
