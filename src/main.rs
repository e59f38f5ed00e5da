use clap::Parser;
use climate_qc::cli::{run, Cli};
use climate_qc::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
