use std::{fs::File, io::BufReader};

use anyhow::{Context, Result};
use ledger_shorthand::{AliasConfig, AliasTable, bin_utils::Service};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let aliases = args
        .next()
        .context("Expected an alias file as the first argument")?;
    let arguments = args
        .next()
        .context("Expected an argument list as the second argument")?;

    let file = File::open(&aliases).with_context(|| format!("Failed to open `{aliases}`"))?;
    let config = AliasConfig::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse `{aliases}`"))?;
    let table = AliasTable::new(config)
        .with_context(|| format!("Invalid alias definitions in `{aliases}`"))?;
    tracing::info!(aliases = aliases.as_str(), "alias table loaded");

    let file =
        File::open(&arguments).with_context(|| format!("Failed to open `{arguments}`"))?;
    let service = Service {
        table,
        input: file,
        output: &mut std::io::stdout(),
        error_printer: Box::new(|line, err| eprintln!("Error at line {line}: {err}")),
    };
    service.run()
}
