use std::{collections::BTreeMap, io::Read};

use serde::{Deserialize, Serialize};

/// Root account of the public test network.
pub const TESTNET_ROOT: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

/// Structured wallet entry. Wallets without a secret are read-only aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletEntry {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Wallet alias definition, either a bare address or a structured entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WalletSpec {
    Address(String),
    Entry(WalletEntry),
}

/// Asset alias definition, either `CODE` / `CODE.ISSUER` or a structured entry.
/// The issuer may be a wallet alias in both forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetSpec {
    Shorthand(String),
    Entry {
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        issuer: Option<String>,
    },
}

/// Raw alias definitions, as supplied by the embedding application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasConfig {
    #[serde(default)]
    pub wallets: BTreeMap<String, WalletSpec>,
    #[serde(default)]
    pub assets: BTreeMap<String, AssetSpec>,
}

impl AliasConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_reader<R>(reader: R) -> serde_json::Result<Self>
    where
        R: Read,
    {
        serde_json::from_reader(reader)
    }

    /// Preset used against the test network: `bank` is the account funded by
    /// the faucet, `fund` a freshly generated keypair.
    pub fn testnet(bank: impl Into<String>, fund: WalletEntry) -> Self {
        let wallets = BTreeMap::from([
            ("bank".to_string(), WalletSpec::Address(bank.into())),
            ("fund".to_string(), WalletSpec::Entry(fund)),
            ("root".to_string(), WalletSpec::Address(TESTNET_ROOT.to_string())),
        ]);
        let assets = BTreeMap::from([
            ("XMM".to_string(), AssetSpec::Shorthand("XMM.fund".to_string())),
            ("USD".to_string(), AssetSpec::Shorthand("USD.bank".to_string())),
            ("BTC".to_string(), AssetSpec::Shorthand("BTC.bank".to_string())),
        ]);
        Self { wallets, assets }
    }
}
