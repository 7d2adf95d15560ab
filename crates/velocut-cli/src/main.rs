// crates/velocut-cli/src/main.rs
//
// The minimal playback host (§6 CLI surface). `anyhow` takes over from
// `velocut_core::Error` at this boundary, matching the crate's own
// documented error-handling design (crates/velocut-core/src/error.rs).

mod args;
mod run;

use clap::Parser;

fn main() {
    let cli = match args::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    if cli.help {
        let _ = <args::Cli as clap::CommandFactory>::command().print_help();
        println!();
        std::process::exit(1);
    }

    let level = if cli.log { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
    env_logger::Builder::new().filter_level(level).init();

    if let Err(e) = run::run(cli) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
