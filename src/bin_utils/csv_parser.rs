use std::io::Read;

use crate::argument::ArgumentKind;
use csv::{DeserializeRecordsIntoIter, Trim};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ArgumentRow {
    pub argument: String,
    #[serde(default)]
    pub expect: Option<ArgumentKind>,
}

/// Parses a list of shorthand arguments in CSV format, with an optional
/// expected kind per argument
pub struct CsvArgumentParser<R> {
    iter: DeserializeRecordsIntoIter<R, ArgumentRow>,
}

impl<R> CsvArgumentParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_deserialize(),
        }
    }
}

impl<R> Iterator for CsvArgumentParser<R>
where
    R: Read,
{
    type Item = (u64, csv::Result<ArgumentRow>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}
