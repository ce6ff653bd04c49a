mod args;
mod tui;
mod usgs;

use anyhow::Result;
use colored::Colorize;

#[tokio::main]
async fn main() {
    let args = args::get();

    if let Err(e) = run(args).await {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}

async fn run(args: args::Args) -> Result<()> {
    let config = tui::AppConfig::load_with_overrides(&args)?;

    if args.print_url {
        println!("{}", config.build_url());
        return Ok(());
    }

    tui::run(config).await
}
