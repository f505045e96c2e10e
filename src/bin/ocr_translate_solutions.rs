//! 答案册 OCR + 翻译 → explanations_<year>.json

use anyhow::Result;
use kangaroo_fixtures::orchestrator::ocr_pipeline;
use kangaroo_fixtures::{cli, App, Config};

const TOOL: &str = "ocr_translate_solutions";

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse_or_exit(TOOL, "/path/to/Broschuere-YYYYB.pdf");

    let app = App::initialize(Config::from_env(), TOOL, &args).await?;
    ocr_pipeline::run(&app, &args).await?;

    Ok(())
}
