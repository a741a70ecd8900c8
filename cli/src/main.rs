use clap::Parser;

mod cli;
mod commands;
mod config;
mod context;
mod logging;
pub mod output;
#[macro_use]
mod test_macros;
use cli::Args;
use commands::CommandRunner;
use config::ConfigFile;
use context::Context;
use db::DatabaseService;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(args.verbose);

    // A missing config only matters to commands that connect
    let (timeouts, target) = match ConfigFile::load(args.config.clone()) {
        Ok(config) => (
            config.timeouts(),
            config
                .target(args.target.as_deref())
                .map_err(|e| e.to_string()),
        ),
        Err(e) => (Default::default(), Err(e.to_string())),
    };

    let ctx = Context::new(DatabaseService::postgres(timeouts), target)?;
    let output = args.command.run(&ctx, args.format);
    ctx.close();

    println!("{}", output?);
    Ok(())
}
