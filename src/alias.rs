use std::{
    collections::{BTreeMap, HashMap, hash_map::Entry},
    fmt,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{AliasConfig, AssetSpec, WalletEntry, WalletSpec};

/// Currency code of the ledger's native asset, which never has an issuer.
pub const NATIVE_CODE: &str = "XRP";

/// Classic ledger address: `r` followed by at least 25 ASCII alphanumerics.
pub fn is_classic_address(token: &str) -> bool {
    token.len() > 25
        && token.starts_with('r')
        && token.chars().all(|c| c.is_ascii_alphanumeric())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Wallet,
    Asset,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Wallet => f.write_str("wallet"),
            Namespace::Asset => f.write_str("asset"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Unknown {namespace} alias `{alias}`")]
    UnresolvedAlias { namespace: Namespace, alias: String },
    #[error("Invalid asset `{token}`: {reason}")]
    InvalidAssetSpec { token: String, reason: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot use `{alias}` as {namespace} alias: {reason}")]
    ReservedAlias {
        namespace: Namespace,
        alias: String,
        reason: &'static str,
    },
    #[error("Wallet alias `{alias}` has malformed address `{address}`")]
    InvalidAddress { alias: String, address: String },
    #[error("Asset alias `{alias}` cannot be expanded")]
    Asset {
        alias: String,
        #[source]
        source: ResolveError,
    },
}

/// Rejects alias names that the shorthand grammar could not render back
/// unambiguously.
fn check_alias(namespace: Namespace, alias: &str) -> Result<(), ConfigError> {
    let reason = if alias.is_empty() {
        Some("name is empty")
    } else if alias.contains(['@', ':', '.']) {
        Some("name contains `@`, `:` or `.`")
    } else if is_classic_address(alias) {
        Some("name reads as an address")
    } else if namespace == Namespace::Asset && alias == NATIVE_CODE {
        Some("name is the native currency code")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ConfigError::ReservedAlias {
            namespace,
            alias: alias.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Currency code plus its canonical issuer. The native asset has no issuer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl Asset {
    pub fn native() -> Self {
        Self {
            code: NATIVE_CODE.to_string(),
            issuer: None,
        }
    }

    pub fn is_native(&self) -> bool {
        self.code == NATIVE_CODE
    }
}

/// Renders `CODE` or `CODE.ISSUER`, which is also the reverse index key.
impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issuer {
            Some(issuer) => write!(f, "{}.{}", self.code, issuer),
            None => f.write_str(&self.code),
        }
    }
}

/// Bidirectional symbol table between short aliases and canonical ledger
/// identifiers.
///
/// Built once from an [`AliasConfig`] and never mutated afterwards, so a
/// shared reference can serve any number of parses.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    wallets: BTreeMap<String, WalletEntry>,
    assets: BTreeMap<String, Asset>,
    // canonical address or `CODE[.ISSUER]` -> alias
    reverse: HashMap<String, String>,
}

impl AliasTable {
    pub fn new(config: AliasConfig) -> Result<Self, ConfigError> {
        let mut table = Self::default();
        table.expand(config)?;
        table.reverse();
        debug!(
            wallets = table.wallets.len(),
            assets = table.assets.len(),
            "alias table ready"
        );
        Ok(table)
    }

    /// Normalizes shorthand entries and canonicalizes asset issuers.
    /// Wallets go first, so asset issuers can refer to any wallet alias.
    fn expand(&mut self, config: AliasConfig) -> Result<(), ConfigError> {
        for (alias, spec) in config.wallets {
            check_alias(Namespace::Wallet, &alias)?;
            let entry = match spec {
                WalletSpec::Address(address) => WalletEntry {
                    address,
                    secret: None,
                },
                WalletSpec::Entry(entry) => entry,
            };
            if !is_classic_address(&entry.address) {
                return Err(ConfigError::InvalidAddress {
                    alias,
                    address: entry.address,
                });
            }
            self.wallets.insert(alias, entry);
        }

        for (alias, spec) in config.assets {
            check_alias(Namespace::Asset, &alias)?;
            let (code, issuer) = match spec {
                AssetSpec::Shorthand(shorthand) => {
                    let mut parts = shorthand.split('.');
                    let code = parts.next().unwrap_or_default().to_string();
                    let issuer = parts.next().map(str::to_string);
                    (code, issuer)
                }
                AssetSpec::Entry { code, issuer } => (code, issuer),
            };
            let asset = self
                .canonicalize_asset(code, issuer)
                .map_err(|source| ConfigError::Asset {
                    alias: alias.clone(),
                    source,
                })?;
            self.assets.insert(alias, asset);
        }
        Ok(())
    }

    /// Validates a structured asset and resolves its issuer to an address.
    pub(crate) fn canonicalize_asset(
        &self,
        code: String,
        issuer: Option<String>,
    ) -> Result<Asset, ResolveError> {
        let issuer = issuer.filter(|issuer| !issuer.is_empty());
        if code.is_empty() {
            return Err(ResolveError::InvalidAssetSpec {
                token: code,
                reason: "currency code is empty",
            });
        }
        if code == NATIVE_CODE {
            if issuer.is_some() {
                return Err(ResolveError::InvalidAssetSpec {
                    token: code,
                    reason: "native asset carries no issuer",
                });
            }
            return Ok(Asset::native());
        }
        let issuer = match issuer {
            Some(issuer) => Some(self.to_absolute_wallet(&issuer)?),
            None => None,
        };
        Ok(Asset { code, issuer })
    }

    /// Keys are canonical values only, so shortening is idempotent. When two
    /// aliases share a canonical value the first one wins.
    fn reverse(&mut self) {
        let wallets = self
            .wallets
            .iter()
            .map(|(alias, entry)| (entry.address.clone(), alias));
        let assets = self
            .assets
            .iter()
            .map(|(alias, asset)| (asset.to_string(), alias));

        for (key, alias) in wallets.chain(assets) {
            match self.reverse.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(alias.clone());
                }
                Entry::Occupied(entry) => {
                    warn!(
                        key = entry.key().as_str(),
                        kept = entry.get().as_str(),
                        ignored = alias.as_str(),
                        "several aliases share one canonical value"
                    );
                }
            }
        }
    }

    /// Returns `token` unchanged when it already is a classic address,
    /// otherwise the address behind the wallet alias `token`.
    pub fn to_absolute_wallet(&self, token: &str) -> Result<String, ResolveError> {
        if is_classic_address(token) {
            return Ok(token.to_string());
        }
        self.wallets
            .get(token)
            .map(|entry| entry.address.clone())
            .ok_or_else(|| ResolveError::UnresolvedAlias {
                namespace: Namespace::Wallet,
                alias: token.to_string(),
            })
    }

    /// Resolves `CODE.ISSUER`, the native code, or an asset alias.
    pub fn to_asset(&self, token: &str) -> Result<Asset, ResolveError> {
        let (code, issuer) = match token.split_once('.') {
            Some((code, issuer)) => (code, Some(issuer)),
            None => (token, None),
        };
        let invalid = |reason: &'static str| ResolveError::InvalidAssetSpec {
            token: token.to_string(),
            reason,
        };

        if code.is_empty() {
            return Err(invalid("currency code is empty"));
        }
        if code == NATIVE_CODE {
            return match issuer {
                Some(_) => Err(invalid("native asset carries no issuer")),
                None => Ok(Asset::native()),
            };
        }
        match issuer {
            Some("") => Err(invalid("issuer is empty")),
            // no fallback to the asset aliases if the issuer is unknown
            Some(issuer) => Ok(Asset {
                code: code.to_string(),
                issuer: Some(self.to_absolute_wallet(issuer)?),
            }),
            None => self
                .assets
                .get(code)
                .cloned()
                .ok_or_else(|| ResolveError::UnresolvedAlias {
                    namespace: Namespace::Asset,
                    alias: code.to_string(),
                }),
        }
    }

    /// Best effort: the alias for a canonical value, or the value itself.
    pub fn shorten<'a>(&'a self, token: &'a str) -> &'a str {
        self.reverse.get(token).map_or(token, String::as_str)
    }

    /// Asset alias if one is registered for `asset`, otherwise the code with
    /// the shortened issuer.
    pub fn shorten_asset(&self, asset: &Asset) -> String {
        let key = asset.to_string();
        if let Some(alias) = self.reverse.get(&key) {
            return alias.clone();
        }
        match &asset.issuer {
            Some(issuer) => format!("{}.{}", asset.code, self.shorten(issuer)),
            None => key,
        }
    }

    /// Alias registered for exactly `asset`, if any.
    pub fn asset_alias(&self, asset: &Asset) -> Option<&str> {
        self.reverse.get(&asset.to_string()).map(String::as_str)
    }

    /// Secret configured for the wallet alias of `address`, if any.
    pub fn secret_for(&self, address: &str) -> Option<&str> {
        let alias = self.reverse.get(address)?;
        self.wallets.get(alias)?.secret.as_deref()
    }

    pub fn wallet(&self, alias: &str) -> Option<&WalletEntry> {
        self.wallets.get(alias)
    }

    pub fn asset(&self, alias: &str) -> Option<&Asset> {
        self.assets.get(alias)
    }

    pub fn wallets(&self) -> impl Iterator<Item = (&str, &WalletEntry)> {
        self.wallets
            .iter()
            .map(|(alias, entry)| (alias.as_str(), entry))
    }

    pub fn assets(&self) -> impl Iterator<Item = (&str, &Asset)> {
        self.assets
            .iter()
            .map(|(alias, asset)| (alias.as_str(), asset))
    }
}
