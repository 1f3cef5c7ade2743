//! Traits which describe the blockchain access the channel core requires.
//! Includes traits for fetching previously-confirmed transactions (needed to
//! reconstruct a counterparty's broadcast close) and for broadcasting new
//! transactions.

use bitcoin::blockdata::transaction::Transaction;
use bitcoin::hash_types::Txid;

/// An interface to a node (or electrum-like index) which can look up
/// transactions the channel has seen confirm and broadcast new ones.
pub trait ChainClient: Sync + Send {
	/// Fetches a previously-confirmed transaction by its txid. Returns None
	/// if the backing node does not know the transaction.
	fn get_tx(&self, txid: &Txid) -> Option<Transaction>;

	/// Sends a transaction out to (hopefully) be mined.
	fn broadcast_transaction(&self, tx: &Transaction);
}
