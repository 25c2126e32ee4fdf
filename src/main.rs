use clap::Parser;
use folioduel::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
