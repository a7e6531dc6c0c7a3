mod cli;
mod deck;
mod paths;
mod run;
mod snapshot;

use anyhow::Result;

fn main() -> Result<()> {
    let args = cli::parse();
    run::run(args)
}
