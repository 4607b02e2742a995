use std::io::Write;

use anyhow::Context;
use csv::Writer;
use serde::Serialize;

use crate::argument::{Argument, ArgumentKind};

#[derive(Debug, Serialize)]
pub struct ResolvedRow {
    pub input: String,
    pub kind: ArgumentKind,
    pub wallet: String,
    pub currency: Option<String>,
    pub issuer: Option<String>,
    pub amount: Option<String>,
    pub shorthand: String,
}

impl From<&Argument<'_>> for ResolvedRow {
    fn from(arg: &Argument<'_>) -> Self {
        Self {
            input: arg.input().to_string(),
            kind: arg.kind(),
            wallet: arg.wallet().to_string(),
            currency: arg.asset().map(|asset| asset.code.clone()),
            issuer: arg.asset().and_then(|asset| asset.issuer.clone()),
            amount: arg.amount().map(|amount| amount.to_string()),
            shorthand: arg.to_shorthand(),
        }
    }
}

/// Serializes `rows` with a header line taken from the first row's field
/// names and returns how many rows were written.
pub fn write_rows<W, T>(output: W, rows: impl IntoIterator<Item = T>) -> anyhow::Result<usize>
where
    W: Write,
    T: Serialize,
{
    let mut writer = Writer::from_writer(output);
    let mut written = 0;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Cannot write resolved row {}", written + 1))?;
        written += 1;
    }
    writer.flush().context("Cannot flush resolved rows")?;
    Ok(written)
}
