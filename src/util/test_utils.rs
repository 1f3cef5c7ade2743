use bitcoin::blockdata::transaction::Transaction;
use bitcoin::hash_types::Txid;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1;
use bitcoin::secp256k1::Secp256k1;

use chain::chaininterface::ChainClient;
use chain::keysinterface::KeysManager;
use chain::transaction::OutPoint;
use ln::channel::{Qchan, DEFAULT_TIMEOUT_BLOCKS};
use util::logger::{Logger, Record};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct TestLogger {
	pub lines: Mutex<Vec<String>>,
}

impl TestLogger {
	pub fn new() -> TestLogger {
		TestLogger { lines: Mutex::new(Vec::new()) }
	}
}

impl Logger for TestLogger {
	fn log(&self, record: &Record) {
		self.lines.lock().unwrap().push(format!("{} {} [{}:{}]", record.level, record.args, record.file, record.line));
	}
}

pub struct TestChainClient {
	pub txn: Mutex<HashMap<Txid, Transaction>>,
	pub broadcasted: Mutex<Vec<Transaction>>,
}

impl TestChainClient {
	pub fn new() -> TestChainClient {
		TestChainClient {
			txn: Mutex::new(HashMap::new()),
			broadcasted: Mutex::new(Vec::new()),
		}
	}

	pub fn confirm(&self, tx: &Transaction) {
		self.txn.lock().unwrap().insert(tx.txid(), tx.clone());
	}
}

impl ChainClient for TestChainClient {
	fn get_tx(&self, txid: &Txid) -> Option<Transaction> {
		self.txn.lock().unwrap().get(txid).cloned()
	}

	fn broadcast_transaction(&self, tx: &Transaction) {
		self.broadcasted.lock().unwrap().push(tx.clone());
	}
}

/// Both halves of one channel, with the funding ritual's outcome already in
/// place: mirrored records at state 0 holding each other's state-0
/// revocation pubkeys.
pub struct ChanPair {
	pub alice: Qchan,
	pub bob: Qchan,
	pub alice_keys: KeysManager,
	pub bob_keys: KeysManager,
	pub secp_ctx: Secp256k1<secp256k1::All>,
}

pub const TEST_PEER_IDX: u32 = 1;
pub const TEST_KEY_IDX: u32 = 1;

pub fn create_chan_pair(funding_value: u64, alice_amt: u64) -> ChanPair {
	let secp_ctx = Secp256k1::new();
	let alice_keys = KeysManager::new(&[0x41; 32]);
	let bob_keys = KeysManager::new(&[0x42; 32]);
	let funding_outpoint = OutPoint::new(Txid::from_slice(&[0xfd; 32]).unwrap(), 0);

	let alice_logger: Arc<Logger> = Arc::new(TestLogger::new());
	let bob_logger: Arc<Logger> = Arc::new(TestLogger::new());

	let alice = Qchan::new(funding_outpoint, funding_value, alice_amt,
		alice_keys.get_chan_pub(TEST_PEER_IDX, TEST_KEY_IDX),
		bob_keys.get_chan_pub(TEST_PEER_IDX, TEST_KEY_IDX),
		alice_keys.get_refund_pub(TEST_PEER_IDX, TEST_KEY_IDX),
		bob_keys.get_refund_pub(TEST_PEER_IDX, TEST_KEY_IDX),
		alice_keys.get_elkrem_root(TEST_PEER_IDX, TEST_KEY_IDX),
		DEFAULT_TIMEOUT_BLOCKS, TEST_PEER_IDX, TEST_KEY_IDX, alice_logger);
	let bob = Qchan::new(funding_outpoint, funding_value, funding_value - alice_amt,
		bob_keys.get_chan_pub(TEST_PEER_IDX, TEST_KEY_IDX),
		alice_keys.get_chan_pub(TEST_PEER_IDX, TEST_KEY_IDX),
		bob_keys.get_refund_pub(TEST_PEER_IDX, TEST_KEY_IDX),
		alice_keys.get_refund_pub(TEST_PEER_IDX, TEST_KEY_IDX),
		bob_keys.get_elkrem_root(TEST_PEER_IDX, TEST_KEY_IDX),
		DEFAULT_TIMEOUT_BLOCKS, TEST_PEER_IDX, TEST_KEY_IDX, bob_logger);

	let mut pair = ChanPair { alice, bob, alice_keys, bob_keys, secp_ctx };
	// The funding ritual's last step: exchange state-0 revocation pubkeys.
	pair.alice.state.my_hakd_pub = Some(pair.bob.their_hakd_pub(&pair.secp_ctx, 0).unwrap());
	pair.bob.state.my_hakd_pub = Some(pair.alice.their_hakd_pub(&pair.secp_ctx, 0).unwrap());
	pair
}

impl ChanPair {
	/// Runs one full update round pushing `push_to_alice` satoshis from bob
	/// to alice (negative pushes the other way), driving both records
	/// through advance / ingest / sign / verify.
	pub fn run_round(&mut self, push_to_alice: i64) {
		let next_idx = self.alice.state.state_idx + 1;
		self.alice.state.delta = push_to_alice;
		self.bob.state.delta = -push_to_alice;

		let alice_next_hakd = self.bob.their_hakd_pub(&self.secp_ctx, next_idx).unwrap();
		let bob_next_hakd = self.alice.their_hakd_pub(&self.secp_ctx, next_idx).unwrap();
		let alice_revoke = self.alice.elk_send.at(next_idx - 1).unwrap();
		let bob_revoke = self.bob.elk_send.at(next_idx - 1).unwrap();

		self.alice.advance_state(alice_next_hakd).unwrap();
		self.bob.advance_state(bob_next_hakd).unwrap();
		self.alice.ingest_elkrem(&self.secp_ctx, bob_revoke).unwrap();
		self.bob.ingest_elkrem(&self.secp_ctx, alice_revoke).unwrap();

		let sig_for_bob = self.alice.sign_state(&self.secp_ctx, &self.alice_keys).unwrap();
		let sig_for_alice = self.bob.sign_state(&self.secp_ctx, &self.bob_keys).unwrap();
		self.alice.verify_sig(&self.secp_ctx, &sig_for_alice.serialize_der()).unwrap();
		self.bob.verify_sig(&self.secp_ctx, &sig_for_bob.serialize_der()).unwrap();
	}
}
