//! 答案册内嵌文本 → explanations_<year>.json

use anyhow::Result;
use kangaroo_fixtures::orchestrator::solution_pipeline;
use kangaroo_fixtures::{cli, App, Config};

const TOOL: &str = "extract_solutions";

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse_or_exit(TOOL, "/path/to/Broschuere-YYYYB.pdf");

    let app = App::initialize(Config::from_env(), TOOL, &args).await?;
    solution_pipeline::run(&app, &args).await?;

    Ok(())
}
