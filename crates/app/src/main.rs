mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use config::Config;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = Config::load();
    let mut stdout = io::stdout().lock();

    match args.command {
        Command::Inspect { project } => {
            commands::inspect(&config.project_path(&project), &mut stdout)?;
        }
        Command::Validate { project, catalog } => {
            let catalog_dir = catalog.or(config.catalog_dir.clone());
            let catalog = commands::open_catalog(catalog_dir.as_deref())?;
            let offline =
                commands::validate(&config.project_path(&project), catalog, &mut stdout)?;
            if offline > 0 {
                return Ok(ExitCode::from(2));
            }
        }
        Command::Convert {
            input,
            output,
            format,
        } => {
            commands::convert(
                &config.project_path(&input),
                &config.project_path(&output),
                format.into(),
            )?;
        }
        Command::New { path, name } => {
            commands::new_project(&config.project_path(&path), &name)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
