//! Bootstraps [`AliasTable`] for the command line: reads shorthand arguments
//! from CSV and writes them back resolved. Kept in the library so integration
//! tests can drive it.

use std::io::{Read, Write};

use crate::{alias::AliasTable, argument::ArgumentError};
use anyhow::Result;
use csv_parser::{ArgumentRow, CsvArgumentParser};
use csv_printer::{ResolvedRow, write_rows};
use thiserror::Error;
use tracing::debug;
pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Argument(#[from] ArgumentError),
}

pub struct Service<'w, R, W: 'w> {
    pub table: AliasTable,
    pub input: R,
    pub output: &'w mut W,
    pub error_printer: Box<dyn FnMut(u64, RowError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvArgumentParser::new(self.input);

        let mut resolved = Vec::new();
        for (line, row) in parser {
            match resolve_row(&self.table, row) {
                Ok(row) => resolved.push(row),
                Err(err) => (self.error_printer)(line, err),
            }
        }

        let written = write_rows(self.output, resolved)?;
        debug!(rows = written, "resolved arguments written");
        Ok(())
    }
}

fn resolve_row(
    table: &AliasTable,
    row: csv::Result<ArgumentRow>,
) -> Result<ResolvedRow, RowError> {
    let row = row?;
    let arg = table.parse(&row.argument)?;
    if let Some(expected) = row.expect {
        arg.require_kind(expected)?;
    }
    Ok(ResolvedRow::from(&arg))
}
