use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::argument::{Argument, ArgumentError};

pub mod balances;
pub mod session;

pub use balances::net_balances;
pub use session::LedgerSession;

/// Amount as the ledger API represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAmount {
    pub value: String,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
}

/// One trust line (or the native balance) of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLine {
    pub value: Decimal,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSource {
    pub address: String,
    pub max_amount: LedgerAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDestination {
    pub address: String,
    pub amount: LedgerAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub source: PaymentSource,
    pub destination: PaymentDestination,
}

impl Payment {
    /// Sends at most `source`'s amount so that `destination` receives its
    /// amount. Both arguments must be values.
    pub fn between(
        source: &Argument<'_>,
        destination: &Argument<'_>,
    ) -> Result<Self, ArgumentError> {
        Ok(Self {
            source: PaymentSource {
                address: source.wallet().to_string(),
                max_amount: source.ledger_amount()?,
            },
            destination: PaymentDestination {
                address: destination.wallet().to_string(),
                amount: destination.ledger_amount()?,
            },
        })
    }
}

/// Unsigned transaction returned by the ledger when preparing a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
    pub tx_json: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub signed_transaction: String,
    pub id: String,
}

/// Everything needed to submit a payment and to track it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedPayment {
    pub blob: String,
    pub hash: String,
    pub json: String,
}

/// Connection to a ledger server.
///
/// Only canonical addresses cross this boundary; aliases are resolved by
/// [`LedgerSession`] before any call is made.
pub trait LedgerClient {
    type Error: std::error::Error + 'static;

    /// Balances of `address`, as of `ledger_index` or the latest validated
    /// ledger.
    fn balances(
        &self,
        address: &str,
        ledger_index: Option<u32>,
    ) -> Result<Vec<BalanceLine>, Self::Error>;

    fn prepare_payment(
        &self,
        address: &str,
        payment: &Payment,
    ) -> Result<PreparedTransaction, Self::Error>;

    fn sign(&self, tx_json: &str, secret: &str) -> Result<SignedTransaction, Self::Error>;
}

#[derive(Debug, Error)]
pub enum LedgerError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error("No secret is configured for wallet `{wallet}`")]
    MissingSecret { wallet: String },
    #[error(transparent)]
    Client(E),
}
