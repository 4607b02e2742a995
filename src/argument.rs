use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    alias::{AliasTable, Asset, Namespace, ResolveError},
    ledger::LedgerAmount,
};

/// Argument tiers, ordered: every value also names an asset and a wallet,
/// every asset also names a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentKind {
    Wallet,
    Asset,
    Value,
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentKind::Wallet => f.write_str("wallet"),
            ArgumentKind::Asset => f.write_str("asset"),
            ArgumentKind::Value => f.write_str("value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentError {
    #[error("Malformed argument `{input}`")]
    MalformedInput { input: String },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("Amount `{amount}` is not a finite number")]
    NonFiniteAmount { amount: String },
    #[error("Argument `{input}` is {actual}, expected {expected}")]
    KindMismatch {
        input: String,
        expected: ArgumentKind,
        actual: ArgumentKind,
    },
    #[error("Field `{field}` is required for {kind} argument")]
    MissingField {
        kind: ArgumentKind,
        field: &'static str,
    },
}

/// Structured form of an argument, for building one without the shorthand
/// grammar. Fields above the declared `kind` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentParts {
    pub kind: ArgumentKind,
    pub wallet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
enum Tier {
    Wallet,
    Asset(Asset),
    Value { asset: Asset, amount: f64 },
}

/// A wallet, an asset held in a wallet, or an amount of an asset held in a
/// wallet, with every field resolved to its canonical form.
///
/// Arguments stay bound to the [`AliasTable`] that resolved them, which is
/// used again to render them back into shorthand via [`fmt::Display`].
#[derive(Clone)]
pub struct Argument<'t> {
    table: &'t AliasTable,
    input: String,
    wallet: String,
    tier: Tier,
}

/// Raw fields, before resolution.
struct Draft<'a> {
    amount: Option<AmountSource<'a>>,
    asset: Option<AssetSource<'a>>,
    wallet: &'a str,
}

enum AmountSource<'a> {
    Text(&'a str),
    Number(f64),
}

enum AssetSource<'a> {
    Token(&'a str),
    Structured(&'a Asset),
}

/// Highest tier first; the first failing step aborts the resolution.
const PIPELINE: [ArgumentKind; 3] = [
    ArgumentKind::Value,
    ArgumentKind::Asset,
    ArgumentKind::Wallet,
];

#[derive(Default)]
struct Resolved {
    amount: Option<f64>,
    asset: Option<Asset>,
    wallet: Option<String>,
}

impl Draft<'_> {
    /// Splits `[ASSET[:AMOUNT]@]WALLET`. The wallet holds neither `@` nor
    /// `:`, the asset holds at most one `.`, the amount holds no `:`.
    fn tokenize(input: &str) -> Option<Draft<'_>> {
        let (prefix, wallet) = match input.split_once('@') {
            Some((prefix, wallet)) => (Some(prefix), wallet),
            None => (None, input),
        };
        if wallet.is_empty() || wallet.contains(['@', ':']) {
            return None;
        }
        let Some(prefix) = prefix else {
            return Some(Draft {
                amount: None,
                asset: None,
                wallet,
            });
        };

        let (asset, amount) = match prefix.split_once(':') {
            Some((asset, amount)) => (asset, Some(amount)),
            None => (prefix, None),
        };
        if asset.is_empty() || asset.matches('.').count() > 1 {
            return None;
        }
        if amount.is_some_and(|amount| amount.is_empty() || amount.contains(':')) {
            return None;
        }
        Some(Draft {
            amount: amount.map(AmountSource::Text),
            asset: Some(AssetSource::Token(asset)),
            wallet,
        })
    }

    /// Highest tier whose marker is present.
    fn kind(&self) -> ArgumentKind {
        if self.amount.is_some() {
            ArgumentKind::Value
        } else if self.asset.is_some() {
            ArgumentKind::Asset
        } else {
            ArgumentKind::Wallet
        }
    }

    fn resolve(
        &self,
        table: &AliasTable,
        kind: ArgumentKind,
    ) -> Result<(String, Tier), ArgumentError> {
        let mut resolved = Resolved::default();
        for tier in PIPELINE.into_iter().filter(|tier| *tier <= kind) {
            match tier {
                ArgumentKind::Value => resolved.amount = Some(self.resolve_amount(kind)?),
                ArgumentKind::Asset => {
                    resolved.asset = Some(self.resolve_asset(table, kind)?);
                }
                ArgumentKind::Wallet => {
                    resolved.wallet = Some(table.to_absolute_wallet(self.wallet)?);
                }
            }
        }
        resolved.finish(kind)
    }

    fn resolve_amount(&self, kind: ArgumentKind) -> Result<f64, ArgumentError> {
        let (amount, text) = match self.amount {
            Some(AmountSource::Text(text)) => (text.parse::<f64>().ok(), text.to_string()),
            Some(AmountSource::Number(number)) => (Some(number), number.to_string()),
            None => {
                return Err(ArgumentError::MissingField {
                    kind,
                    field: "amount",
                });
            }
        };
        amount
            .filter(|amount| amount.is_finite())
            .ok_or(ArgumentError::NonFiniteAmount { amount: text })
    }

    fn resolve_asset(
        &self,
        table: &AliasTable,
        kind: ArgumentKind,
    ) -> Result<Asset, ArgumentError> {
        match self.asset {
            Some(AssetSource::Token(token)) => Ok(table.to_asset(token)?),
            Some(AssetSource::Structured(asset)) => {
                let asset =
                    table.canonicalize_asset(asset.code.clone(), asset.issuer.clone())?;
                if asset.is_native()
                    || asset.issuer.is_some()
                    || table.asset_alias(&asset).is_some()
                {
                    return Ok(asset);
                }
                // a bare issued code must name an asset alias, as in `CODE@WALLET`
                match table.asset(&asset.code) {
                    Some(aliased) => Ok(aliased.clone()),
                    None => Err(ResolveError::UnresolvedAlias {
                        namespace: Namespace::Asset,
                        alias: asset.code,
                    }
                    .into()),
                }
            }
            None => Err(ArgumentError::MissingField {
                kind,
                field: "asset",
            }),
        }
    }
}

impl Resolved {
    fn finish(self, kind: ArgumentKind) -> Result<(String, Tier), ArgumentError> {
        let missing = |field: &'static str| ArgumentError::MissingField { kind, field };
        let wallet = self.wallet.ok_or_else(|| missing("wallet"))?;
        let tier = match kind {
            ArgumentKind::Wallet => Tier::Wallet,
            ArgumentKind::Asset => Tier::Asset(self.asset.ok_or_else(|| missing("asset"))?),
            ArgumentKind::Value => Tier::Value {
                asset: self.asset.ok_or_else(|| missing("asset"))?,
                amount: self.amount.ok_or_else(|| missing("amount"))?,
            },
        };
        Ok((wallet, tier))
    }
}

impl<'t> Argument<'t> {
    /// Parses `WALLET`, `ASSET@WALLET` or `ASSET:AMOUNT@WALLET`, where every
    /// wallet and asset may be an alias known to `table`.
    pub fn parse(table: &'t AliasTable, input: &str) -> Result<Self, ArgumentError> {
        let result = Draft::tokenize(input)
            .ok_or_else(|| ArgumentError::MalformedInput {
                input: input.to_string(),
            })
            .and_then(|draft| draft.resolve(table, draft.kind()));
        match result {
            Ok((wallet, tier)) => Ok(Self {
                table,
                input: input.to_string(),
                wallet,
                tier,
            }),
            Err(err) => {
                debug!(input, error = %err, "argument rejected");
                Err(err)
            }
        }
    }

    pub fn from_parts(
        table: &'t AliasTable,
        parts: &ArgumentParts,
    ) -> Result<Self, ArgumentError> {
        let draft = Draft {
            amount: parts.amount.map(AmountSource::Number),
            asset: parts.asset.as_ref().map(AssetSource::Structured),
            wallet: &parts.wallet,
        };
        let (wallet, tier) = draft.resolve(table, parts.kind)?;
        let input = serde_json::to_string(parts).unwrap_or_else(|_| format!("{parts:?}"));
        Ok(Self {
            table,
            input,
            wallet,
            tier,
        })
    }

    pub fn kind(&self) -> ArgumentKind {
        match self.tier {
            Tier::Wallet => ArgumentKind::Wallet,
            Tier::Asset(_) => ArgumentKind::Asset,
            Tier::Value { .. } => ArgumentKind::Value,
        }
    }

    /// Canonical wallet address.
    pub fn wallet(&self) -> &str {
        &self.wallet
    }

    pub fn asset(&self) -> Option<&Asset> {
        match &self.tier {
            Tier::Wallet => None,
            Tier::Asset(asset) | Tier::Value { asset, .. } => Some(asset),
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self.tier {
            Tier::Value { amount, .. } => Some(amount),
            _ => None,
        }
    }

    /// Text the argument was built from: the shorthand, or the JSON form of
    /// [`ArgumentParts`].
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn table(&self) -> &'t AliasTable {
        self.table
    }

    pub fn require_kind(&self, expected: ArgumentKind) -> Result<(), ArgumentError> {
        let actual = self.kind();
        if actual == expected {
            Ok(())
        } else {
            Err(ArgumentError::KindMismatch {
                input: self.input.clone(),
                expected,
                actual,
            })
        }
    }

    /// Secret of the wallet alias behind this argument's wallet. `None` for
    /// unknown wallets and read-only aliases.
    pub fn secret_key(&self) -> Option<&'t str> {
        self.table.secret_for(&self.wallet)
    }

    /// Amount in the shape the ledger API expects. Only value arguments carry
    /// one.
    pub fn ledger_amount(&self) -> Result<LedgerAmount, ArgumentError> {
        let Tier::Value { asset, amount } = &self.tier else {
            return Err(ArgumentError::KindMismatch {
                input: self.input.clone(),
                expected: ArgumentKind::Value,
                actual: self.kind(),
            });
        };
        Ok(LedgerAmount {
            value: amount.to_string(),
            currency: asset.code.clone(),
            counterparty: asset.issuer.clone(),
        })
    }

    pub fn to_shorthand(&self) -> String {
        self.to_string()
    }
}

/// Field equality: the bound table and the original input are ignored.
impl PartialEq for Argument<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.wallet == other.wallet && self.tier == other.tier
    }
}

impl fmt::Debug for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("input", &self.input)
            .field("kind", &self.kind())
            .field("wallet", &self.wallet)
            .field("asset", &self.asset())
            .field("amount", &self.amount())
            .finish()
    }
}

/// Shortest shorthand: every canonical value is replaced by its alias where
/// one exists.
impl fmt::Display for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tier {
            Tier::Wallet => {}
            Tier::Asset(asset) => write!(f, "{}@", self.table.shorten_asset(asset))?,
            Tier::Value { asset, amount } => {
                write!(f, "{}:{}@", self.table.shorten_asset(asset), amount)?
            }
        }
        f.write_str(self.table.shorten(&self.wallet))
    }
}

impl AliasTable {
    pub fn parse(&self, input: &str) -> Result<Argument<'_>, ArgumentError> {
        Argument::parse(self, input)
    }
}
