mod action;
mod app;
mod catalog;
mod cli;
mod config;
mod errors;
mod installer;
mod logging;
mod manifest;
mod project;

use clap::Parser;
use cli::Cli;
use color_eyre::Result;

use crate::app::App;
use crate::config::Config;

fn main() -> Result<()> {
    errors::init()?;
    logging::init()?;

    let args = Cli::parse();
    let config = Config::new()?;
    let app = App::new(config, args.project, args.manifest);
    app.run(args.command.into_actions())?;
    Ok(())
}
