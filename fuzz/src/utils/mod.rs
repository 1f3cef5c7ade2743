use bitcoin::hash_types::Txid;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1;
use bitcoin::secp256k1::Secp256k1;

use paychan::chain::keysinterface::KeysManager;
use paychan::chain::transaction::OutPoint;
use paychan::ln::channel::Qchan;
use paychan::util::logger::{Logger, Record};

use std::sync::Arc;

pub struct DevNullLogger;

impl Logger for DevNullLogger {
	fn log(&self, _record: &Record) {}
}

/// A deterministic channel a few states in, with its wallets, so targets can
/// throw arbitrary close transactions at a realistic record.
pub struct FuzzChannel {
	pub alice: Qchan,
	pub bob: Qchan,
	pub alice_keys: KeysManager,
	pub bob_keys: KeysManager,
	pub secp_ctx: Secp256k1<secp256k1::All>,
}

pub fn make_channel() -> FuzzChannel {
	let secp_ctx = Secp256k1::new();
	let alice_keys = KeysManager::new(&[0x51; 32]);
	let bob_keys = KeysManager::new(&[0x52; 32]);
	let funding_outpoint = OutPoint::new(Txid::from_slice(&[0xfc; 32]).unwrap(), 0);

	let mut alice = Qchan::new(funding_outpoint, 2_000_000, 1_000_000,
		alice_keys.get_chan_pub(1, 1), bob_keys.get_chan_pub(1, 1),
		alice_keys.get_refund_pub(1, 1), bob_keys.get_refund_pub(1, 1),
		alice_keys.get_elkrem_root(1, 1), 5, 1, 1, Arc::new(DevNullLogger));
	let mut bob = Qchan::new(funding_outpoint, 2_000_000, 1_000_000,
		bob_keys.get_chan_pub(1, 1), alice_keys.get_chan_pub(1, 1),
		bob_keys.get_refund_pub(1, 1), alice_keys.get_refund_pub(1, 1),
		bob_keys.get_elkrem_root(1, 1), 5, 1, 1, Arc::new(DevNullLogger));
	alice.state.my_hakd_pub = Some(bob.their_hakd_pub(&secp_ctx, 0).unwrap());
	bob.state.my_hakd_pub = Some(alice.their_hakd_pub(&secp_ctx, 0).unwrap());

	let mut chan = FuzzChannel { alice, bob, alice_keys, bob_keys, secp_ctx };
	for _ in 0..2 {
		run_round(&mut chan, 50_000);
	}
	chan
}

fn run_round(chan: &mut FuzzChannel, push_to_alice: i64) {
	let next_idx = chan.alice.state.state_idx + 1;
	chan.alice.state.delta = push_to_alice;
	chan.bob.state.delta = -push_to_alice;

	let alice_next = chan.bob.their_hakd_pub(&chan.secp_ctx, next_idx).unwrap();
	let bob_next = chan.alice.their_hakd_pub(&chan.secp_ctx, next_idx).unwrap();
	let alice_revoke = chan.alice.elk_send.at(next_idx - 1).unwrap();
	let bob_revoke = chan.bob.elk_send.at(next_idx - 1).unwrap();

	chan.alice.advance_state(alice_next).unwrap();
	chan.bob.advance_state(bob_next).unwrap();
	chan.alice.ingest_elkrem(&chan.secp_ctx, bob_revoke).unwrap();
	chan.bob.ingest_elkrem(&chan.secp_ctx, alice_revoke).unwrap();

	let sig_for_bob = chan.alice.sign_state(&chan.secp_ctx, &chan.alice_keys).unwrap();
	let sig_for_alice = chan.bob.sign_state(&chan.secp_ctx, &chan.bob_keys).unwrap();
	chan.alice.verify_sig(&chan.secp_ctx, &sig_for_alice.serialize_der()).unwrap();
	chan.bob.verify_sig(&chan.secp_ctx, &sig_for_bob.serialize_der()).unwrap();
}
