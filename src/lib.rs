/// Alias definitions as supplied by the embedding application.
pub mod config;

/// Bidirectional symbol table: wallet and asset aliases to canonical ledger
/// identifiers, and back.
pub mod alias;

/// Shorthand arguments (`WALLET`, `ASSET@WALLET`, `ASSET:AMOUNT@WALLET`),
/// parsed and rendered through an [`alias::AliasTable`].
pub mod argument;

/// Boundary with a ledger server: client interface, wire types, and the
/// session that feeds it resolved arguments.
///
/// NOTE: no client implementation lives in this crate, the network side is
/// up to the embedding application.
pub mod ledger;

/// Command line bootstrap, in the library so the integration test can use
/// it.
pub mod bin_utils;

pub use alias::{AliasTable, Asset};
pub use argument::{Argument, ArgumentError, ArgumentKind, ArgumentParts};
pub use config::AliasConfig;
