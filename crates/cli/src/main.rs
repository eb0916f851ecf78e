use clap::Parser;
use creodias_finder_cli::Finder;
use std::process::ExitCode;

fn main() -> ExitCode {
    let finder = Finder::parse();
    match finder.run(true) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}
