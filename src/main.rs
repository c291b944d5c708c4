use anyhow::Result;
use clap::Parser;
use symbolista::Cli;

fn main() -> Result<()> {
    Cli::parse().run()
}
