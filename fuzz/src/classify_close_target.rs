// Totality of the close classifier: whatever transaction confirms, it must
// come back as a typed result, never a panic.

use bitcoin::blockdata::transaction::Transaction;
use bitcoin::consensus::encode::deserialize;
use bitcoin::hash_types::Txid;

use paychan::chain::chaininterface::ChainClient;
use paychan::ln::channelmonitor::{build_grab_tx, classify_close};

use utils::make_channel;

struct OneTxChain(Transaction);

impl ChainClient for OneTxChain {
	fn get_tx(&self, txid: &Txid) -> Option<Transaction> {
		if *txid == self.0.txid() {
			Some(self.0.clone())
		} else {
			None
		}
	}

	fn broadcast_transaction(&self, _tx: &Transaction) {}
}

#[inline]
pub fn do_test(data: &[u8]) {
	let mut tx: Transaction = match deserialize(data) {
		Ok(tx) => tx,
		Err(_) => return,
	};
	let mut chan = make_channel();

	// Point the transaction's first input at the funding outpoint half the
	// time so the interesting paths actually run.
	if !tx.input.is_empty() && data[0] & 1 == 0 {
		tx.input[0].previous_output = chan.alice.funding_outpoint.into_bitcoin_outpoint();
	}

	let utxos = match classify_close(&mut chan.alice, &tx, 100) {
		Ok(utxos) => utxos,
		Err(_) => return,
	};
	// Anything flagged grabbable must flow through the remedy builder
	// without panicking, even though the backing close is nonsense.
	let chain = OneTxChain(tx);
	for utxo in utxos.iter() {
		if utxo.spend_lag == -1 {
			let _ = build_grab_tx(&chan.alice, &chan.secp_ctx, &chain, &chan.alice_keys, utxo);
		}
	}
}

#[no_mangle]
pub extern "C" fn classify_close_run(data: *const u8, datalen: usize) {
	let data = unsafe { std::slice::from_raw_parts(data, datalen) };
	do_test(data);
}
