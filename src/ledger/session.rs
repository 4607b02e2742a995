use tracing::debug;

use crate::{
    alias::AliasTable,
    argument::{Argument, ArgumentKind},
};

use super::{LedgerClient, LedgerError, Payment, PreparedTransaction, SignedPayment, net_balances};

/// Shorthand front end of a [`LedgerClient`].
pub struct LedgerSession<'t, C> {
    table: &'t AliasTable,
    client: C,
    ledger_index: Option<u32>,
}

impl<'t, C> LedgerSession<'t, C>
where
    C: LedgerClient,
{
    /// `ledger_index` is the default ledger balances are read from; `None`
    /// means the latest validated one.
    pub fn new(table: &'t AliasTable, client: C, ledger_index: Option<u32>) -> Self {
        Self {
            table,
            client,
            ledger_index,
        }
    }

    pub fn table(&self) -> &'t AliasTable {
        self.table
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Balances of a wallet argument, netted per [`net_balances`].
    pub fn balance(
        &self,
        wallet: &str,
        ledger_index: Option<u32>,
    ) -> Result<Vec<Argument<'t>>, LedgerError<C::Error>> {
        let wallet = self.table.parse(wallet)?;
        wallet.require_kind(ArgumentKind::Wallet)?;

        let ledger_index = ledger_index.or(self.ledger_index);
        let lines = self
            .client
            .balances(wallet.wallet(), ledger_index)
            .map_err(LedgerError::Client)?;
        debug!(
            wallet = %wallet,
            ?ledger_index,
            lines = lines.len(),
            "balances received"
        );
        Ok(net_balances(self.table, lines, wallet.wallet())?)
    }

    /// Prepares and signs a payment from `src` to `dst`, both value
    /// arguments. The source wallet must have a secret configured.
    pub fn send(&self, src: &str, dst: &str) -> Result<SignedPayment, LedgerError<C::Error>> {
        let src = self.table.parse(src)?;
        src.require_kind(ArgumentKind::Value)?;
        let dst = self.table.parse(dst)?;
        dst.require_kind(ArgumentKind::Value)?;

        let secret = src.secret_key().ok_or_else(|| LedgerError::MissingSecret {
            wallet: src.table().shorten(src.wallet()).to_string(),
        })?;
        let payment = Payment::between(&src, &dst)?;
        let prepared = self
            .client
            .prepare_payment(src.wallet(), &payment)
            .map_err(LedgerError::Client)?;
        debug!(src = %src, dst = %dst, "payment prepared");
        self.sign(prepared, secret)
    }

    fn sign(
        &self,
        prepared: PreparedTransaction,
        secret: &str,
    ) -> Result<SignedPayment, LedgerError<C::Error>> {
        let signed = self
            .client
            .sign(&prepared.tx_json, secret)
            .map_err(LedgerError::Client)?;
        Ok(SignedPayment {
            blob: signed.signed_transaction,
            hash: signed.id,
            json: prepared.tx_json,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, str::FromStr};

    use rust_decimal::Decimal;
    use thiserror::Error;

    use crate::{
        alias::tests::{BANK, FUND, FUND_SECRET, ROOT, sample_table},
        argument::ArgumentError,
        ledger::{BalanceLine, SignedTransaction},
    };

    use super::*;

    #[derive(Debug, Error)]
    #[error("Ledger is unavailable")]
    struct Unavailable;

    #[derive(Default)]
    struct FakeLedger {
        lines: Vec<BalanceLine>,
        offline: bool,
        balance_requests: RefCell<Vec<(String, Option<u32>)>>,
        payments: RefCell<Vec<Payment>>,
    }

    impl LedgerClient for FakeLedger {
        type Error = Unavailable;

        fn balances(
            &self,
            address: &str,
            ledger_index: Option<u32>,
        ) -> Result<Vec<BalanceLine>, Self::Error> {
            if self.offline {
                return Err(Unavailable);
            }
            self.balance_requests
                .borrow_mut()
                .push((address.to_string(), ledger_index));
            Ok(self.lines.clone())
        }

        fn prepare_payment(
            &self,
            address: &str,
            payment: &Payment,
        ) -> Result<PreparedTransaction, Self::Error> {
            if self.offline {
                return Err(Unavailable);
            }
            self.payments.borrow_mut().push(payment.clone());
            Ok(PreparedTransaction {
                tx_json: format!("{{\"Account\":\"{address}\"}}"),
            })
        }

        fn sign(&self, tx_json: &str, secret: &str) -> Result<SignedTransaction, Self::Error> {
            Ok(SignedTransaction {
                signed_transaction: format!("{secret}:{tx_json}"),
                id: "E3FE6EA3D48F0C2B639448020EA4F03D4F4F8FFDB243A852A0F59177921B4879".to_string(),
            })
        }
    }

    #[test]
    fn balance_of_wallet_alias() {
        let table = sample_table();
        let client = FakeLedger {
            lines: vec![BalanceLine {
                value: Decimal::from_str("250").unwrap(),
                currency: "XRP".to_string(),
                counterparty: None,
            }],
            ..Default::default()
        };
        let session = LedgerSession::new(&table, client, Some(7));

        let balances = session.balance("bank", None).unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].to_string(), "XRP:250@bank");

        session.balance("root", Some(9)).unwrap();
        assert_eq!(
            *session.client().balance_requests.borrow(),
            [(BANK.to_string(), Some(7)), (ROOT.to_string(), Some(9))]
        );
    }

    #[test]
    fn balance_requires_wallet() {
        let table = sample_table();
        let session = LedgerSession::new(&table, FakeLedger::default(), None);
        let err = session.balance("USD@bank", None).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Argument(ArgumentError::KindMismatch {
                expected: ArgumentKind::Wallet,
                ..
            })
        ));
        assert!(session.client().balance_requests.borrow().is_empty());

        let offline = FakeLedger {
            offline: true,
            ..Default::default()
        };
        let session = LedgerSession::new(&table, offline, None);
        let err = session.balance("bank", None).unwrap_err();
        assert!(matches!(err, LedgerError::Client(Unavailable)));
        assert_eq!(err.to_string(), "Ledger is unavailable");
    }

    #[test]
    fn send_payment() {
        let table = sample_table();
        let session = LedgerSession::new(&table, FakeLedger::default(), None);

        let signed = session.send("USD:10@fund", "USD:9.5@root").unwrap();
        assert_eq!(signed.json, format!("{{\"Account\":\"{FUND}\"}}"));
        assert_eq!(signed.blob, format!("{FUND_SECRET}:{}", signed.json));
        assert_eq!(signed.hash.len(), 64);

        let payments = session.client().payments.borrow();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].source.address, FUND);
        assert_eq!(payments[0].source.max_amount.value, "10");
        assert_eq!(payments[0].destination.address, ROOT);
        assert_eq!(payments[0].destination.amount.value, "9.5");
        assert_eq!(
            payments[0].destination.amount.counterparty.as_deref(),
            Some(BANK)
        );
    }

    #[test]
    fn send_rejects_bad_arguments() {
        let table = sample_table();
        let session = LedgerSession::new(&table, FakeLedger::default(), None);

        assert!(matches!(
            session.send("fund", "USD:1@root").unwrap_err(),
            LedgerError::Argument(ArgumentError::KindMismatch { .. })
        ));
        assert!(matches!(
            session.send("USD:1@fund", "USD@root").unwrap_err(),
            LedgerError::Argument(ArgumentError::KindMismatch { .. })
        ));
        assert!(matches!(
            session.send("USD:x@fund", "USD:1@root").unwrap_err(),
            LedgerError::Argument(ArgumentError::NonFiniteAmount { .. })
        ));

        let err = session.send("USD:1@bank", "USD:1@root").unwrap_err();
        assert!(matches!(&err, LedgerError::MissingSecret { wallet } if wallet == "bank"));
        assert_eq!(err.to_string(), "No secret is configured for wallet `bank`");
        assert!(session.client().payments.borrow().is_empty());
    }
}
