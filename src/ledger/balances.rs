use std::collections::BTreeMap;

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    alias::{AliasTable, Asset},
    argument::{Argument, ArgumentError, ArgumentKind, ArgumentParts},
};

use super::BalanceLine;

/// Turns the balance lines of `owner` into value arguments.
///
/// Positive lines are kept, empty lines are dropped. Negative lines are what
/// `owner` has issued to others; they are summed per currency and reported as
/// a single line issued by `owner` itself, ordered by currency code.
pub fn net_balances<'t>(
    table: &'t AliasTable,
    lines: Vec<BalanceLine>,
    owner: &str,
) -> Result<Vec<Argument<'t>>, ArgumentError> {
    let mut issued: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut netted = Vec::with_capacity(lines.len());
    for line in lines {
        if line.value > Decimal::ZERO {
            netted.push(line);
        } else if line.value < Decimal::ZERO {
            *issued.entry(line.currency).or_default() += line.value;
        }
    }
    netted.extend(issued.into_iter().map(|(currency, value)| BalanceLine {
        value,
        currency,
        counterparty: Some(owner.to_string()),
    }));

    netted
        .into_iter()
        .map(|line| to_argument(table, line, owner))
        .collect()
}

fn to_argument<'t>(
    table: &'t AliasTable,
    line: BalanceLine,
    owner: &str,
) -> Result<Argument<'t>, ArgumentError> {
    let amount = line
        .value
        .to_f64()
        .ok_or_else(|| ArgumentError::NonFiniteAmount {
            amount: line.value.to_string(),
        })?;
    let parts = ArgumentParts {
        kind: ArgumentKind::Value,
        wallet: owner.to_string(),
        asset: Some(Asset {
            code: line.currency,
            issuer: line.counterparty,
        }),
        amount: Some(amount),
    };
    Argument::from_parts(table, &parts)
}
