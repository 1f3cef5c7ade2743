//! Tests which drive both halves of a channel through whole update rounds
//! and on into the various ways a channel can end up on chain.

use bitcoin::blockdata::transaction::Transaction;
use bitcoin::consensus::encode::serialize;
use bitcoin::secp256k1::Signature;
use bitcoin::util::bip143;

use chain::keysinterface::Wallet;
use ln::channel::{get_state_idx_from_tx, Qchan, COMMIT_FEE_SAT};
use ln::channelmonitor::{build_grab_tx, classify_close};
use util::errors::ChanError;
use util::logger::Logger;
use util::ser::{ReadableArgs, Writeable};
use util::test_utils::{create_chan_pair, TestChainClient, TestLogger, TEST_KEY_IDX, TEST_PEER_IDX};

use std::sync::Arc;

const FUNDING_VALUE: u64 = 2_000_000;
const ALICE_START: u64 = 1_000_000;

fn commitment_sighash(chan: &Qchan, tx: &Transaction) -> ::bitcoin::secp256k1::Message {
	let (funding_script, _) = chan.funding_redeemscript();
	hash_to_message!(&bip143::SighashComponents::new(tx)
		.sighash_all(&tx.input[0], &funding_script, chan.funding_value)[..])
}

// Both sides must assemble byte-identical commitments for the same state or
// no signature would ever validate.
#[test]
fn mirrored_commitments_are_identical() {
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);
	let alice_hakd = pair.alice.their_hakd_pub(&pair.secp_ctx, 1).unwrap();
	let alices_own = pair.alice.build_state_tx(&pair.secp_ctx, Some(&alice_hakd)).unwrap();
	let bobs_for_alice = pair.bob.build_state_tx(&pair.secp_ctx, None).unwrap();
	assert_eq!(serialize(&alices_own), serialize(&bobs_for_alice));
}

#[test]
fn one_payment_then_cooperative_close() {
	// Scenario: one full round moving 250k to alice, then a clean close.
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);

	assert_eq!(pair.alice.state.state_idx, 1);
	assert_eq!(pair.alice.state.my_amt, 1_250_000);
	assert!(pair.alice.state.my_prev_hakd_pub.is_none());
	assert!(pair.alice.state.sig.is_some());
	assert_eq!(pair.bob.state.my_amt, 750_000);
	assert_eq!(pair.alice.elk_recv.upto(), Some(0));

	let close_tx = pair.alice.simple_close_tx().unwrap();
	// The close is symmetric; bob must build the same bytes to co-sign.
	assert_eq!(serialize(&close_tx), serialize(&pair.bob.simple_close_tx().unwrap()));

	let bob_sig = pair.bob.sign_simple_close(&pair.secp_ctx, &pair.bob_keys).unwrap();
	let sighash = commitment_sighash(&pair.alice, &close_tx);
	pair.secp_ctx.verify(&sighash, &bob_sig, &pair.alice.their_chan_pub).unwrap();
	pair.alice.sign_simple_close(&pair.secp_ctx, &pair.alice_keys).unwrap();

	let utxos = classify_close(&mut pair.alice, &close_tx, 100).unwrap();
	assert_eq!(utxos.len(), 1);
	assert_eq!(utxos[0].value, 1_250_000 - COMMIT_FEE_SAT);
	assert_eq!(utxos[0].spend_lag, 1);
	assert_eq!(pair.alice.close_data.as_ref().unwrap().close_txid, close_tx.txid());
	assert_eq!(pair.alice.close_data.as_ref().unwrap().close_height, 100);

	// The record is read-only once closed.
	assert_eq!(pair.alice.advance_state(pair.alice.their_hakd_pub(&pair.secp_ctx, 2).unwrap()),
		Err(ChanError::StateOrderViolation));
	assert_eq!(pair.alice.sign_state(&pair.secp_ctx, &pair.alice_keys).err().unwrap(),
		ChanError::StateOrderViolation);
}

#[test]
fn break_tx_witness_is_complete() {
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);

	let break_tx = pair.alice.sign_break_tx(&pair.secp_ctx, &pair.alice_keys).unwrap();
	let witness = &break_tx.input[0].witness;
	assert_eq!(witness.len(), 4);
	assert!(witness[0].is_empty());
	let (funding_script, swapped) = pair.alice.funding_redeemscript();
	assert_eq!(&witness[3][..], funding_script.as_bytes());

	// Both signatures carry SIGHASH_ALL and verify against the right keys in
	// sorted-pubkey order.
	let (first_key, second_key) = if swapped {
		(&pair.alice.their_chan_pub, &pair.alice.my_chan_pub)
	} else {
		(&pair.alice.my_chan_pub, &pair.alice.their_chan_pub)
	};
	let sighash = commitment_sighash(&pair.alice, &break_tx);
	for (sig_bytes, key) in [(&witness[1], first_key), (&witness[2], second_key)].iter() {
		assert_eq!(*sig_bytes.last().unwrap(), 1);
		let sig = Signature::from_der(&sig_bytes[..sig_bytes.len() - 1]).unwrap();
		pair.secp_ctx.verify(&sighash, &sig, key).unwrap();
	}
}

#[test]
fn unilateral_close_at_current_state() {
	// Scenario: alice's own current commitment confirms. Her money sits on
	// the encumbered leg behind the CSV delay; bob's side of the same
	// transaction pays him immediately.
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);

	let break_tx = pair.alice.sign_break_tx(&pair.secp_ctx, &pair.alice_keys).unwrap();

	let utxos = classify_close(&mut pair.alice, &break_tx, 110).unwrap();
	assert_eq!(utxos.len(), 1);
	assert_eq!(utxos[0].spend_lag, 5);
	assert_eq!(utxos[0].value, 1_250_000 - COMMIT_FEE_SAT);

	let utxos = classify_close(&mut pair.bob, &break_tx, 110).unwrap();
	assert_eq!(utxos.len(), 1);
	assert_eq!(utxos[0].spend_lag, 1);
	assert_eq!(utxos[0].value, 750_000 - COMMIT_FEE_SAT);
}

#[test]
fn revoked_broadcast_is_grabbable() {
	// Scenario: bob broadcasts his long-revoked state-1 commitment after the
	// channel has moved on to state 3. Alice takes her direct leg and sweeps
	// his encumbered leg with the reconstructed revocation key.
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);
	// Bob's fully-signed state-1 commitment, as he could broadcast it.
	let revoked_tx = pair.bob.sign_break_tx(&pair.secp_ctx, &pair.bob_keys).unwrap();
	pair.run_round(10_000);
	pair.run_round(-40_000);
	assert_eq!(pair.alice.state.state_idx, 3);

	let utxos = classify_close(&mut pair.alice, &revoked_tx, 120).unwrap();
	assert_eq!(utxos.len(), 2);
	assert_eq!(utxos[0].spend_lag, 1);
	assert_eq!(utxos[0].value, 1_250_000 - COMMIT_FEE_SAT);
	assert_eq!(utxos[1].spend_lag, -1);
	assert_eq!(utxos[1].value, 750_000 - COMMIT_FEE_SAT);

	let chain = TestChainClient::new();
	chain.confirm(&revoked_tx);
	let grab_tx = build_grab_tx(&pair.alice, &pair.secp_ctx, &chain, &pair.alice_keys, &utxos[1]).unwrap();

	assert_eq!(grab_tx.input.len(), 1);
	assert_eq!(grab_tx.input[0].previous_output, utxos[1].outpoint);
	assert_eq!(grab_tx.output.len(), 1);
	assert_eq!(grab_tx.output[0].value, utxos[1].value - COMMIT_FEE_SAT);

	// The witness must solve the revoked output: the preimage script hashes
	// to the on-chain P2WSH program and the signature verifies against the
	// revocation key inside that script.
	let witness = &grab_tx.input[0].witness;
	assert_eq!(witness.len(), 2);
	let witness_script = ::bitcoin::blockdata::script::Script::from(witness[1].clone());
	assert_eq!(::ln::chan_utils::script_to_p2wsh(&witness_script),
		revoked_tx.output[utxos[1].outpoint.vout as usize].script_pubkey);
	let revocation_key = ::bitcoin::secp256k1::key::PublicKey::from_slice(&witness_script.as_bytes()[2..35]).unwrap();
	let sighash = hash_to_message!(&bip143::SighashComponents::new(&grab_tx)
		.sighash_all(&grab_tx.input[0], &witness_script, utxos[1].value)[..]);
	assert_eq!(*witness[0].last().unwrap(), 1);
	let sig = Signature::from_der(&witness[0][..witness[0].len() - 1]).unwrap();
	pair.secp_ctx.verify(&sighash, &sig, &revocation_key).unwrap();

	// A remedy against the current state must not exist: classifying bob's
	// *current* commitment yields no grabbable output.
	let mut fresh = create_chan_pair(FUNDING_VALUE, ALICE_START);
	fresh.run_round(250_000);
	let current_tx = fresh.bob.sign_break_tx(&fresh.secp_ctx, &fresh.bob_keys).unwrap();
	let utxos = classify_close(&mut fresh.alice, &current_tx, 120).unwrap();
	assert_eq!(utxos.len(), 1);
	assert_eq!(utxos[0].spend_lag, 1);
}

#[test]
fn inconsistent_elkrem_breaks_channel() {
	// Scenario: bob reveals an elkrem hash the receiver tree happens to
	// accept, but which does not hash up to the revocation key he committed
	// to. The round aborts with the channel marked broken-by-peer and
	// nothing usable lost: alice still holds her state-1 signature.
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);
	let sig_before = pair.alice.state.sig.clone().unwrap();

	let next_hakd = pair.bob.their_hakd_pub(&pair.secp_ctx, 2).unwrap();
	pair.alice.advance_state(next_hakd).unwrap();
	// Receiver index 1 is a bare leaf, so the tree cannot reject it...
	assert_eq!(pair.alice.ingest_elkrem(&pair.secp_ctx, [0xbb; 32]),
		Err(ChanError::ChannelBroken));
	// ...but the HAKD check catches it: the old revocation key stays armed
	// and the stored signature is untouched.
	assert!(pair.alice.state.my_prev_hakd_pub.is_some());
	assert_eq!(pair.alice.state.sig.clone().unwrap(), sig_before);
}

#[test]
fn state_index_is_masked_on_chain() {
	// Scenario: the six spare bytes must not leak the raw state index.
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);

	for round in 0..3i64 {
		pair.run_round(10_000 * (round + 1));
		let state_idx = pair.alice.state.state_idx;
		let their_hakd = pair.alice.their_hakd_pub(&pair.secp_ctx, state_idx).unwrap();
		let tx = pair.alice.build_state_tx(&pair.secp_ctx, Some(&their_hakd)).unwrap();

		let offset = pair.alice.zero_offset();
		assert_ne!(offset, 0);
		// Both parties agree on the mask...
		assert_eq!(offset, pair.bob.zero_offset());
		// ...the index round-trips through the tx...
		assert_eq!(get_state_idx_from_tx(&tx, offset), state_idx);
		// ...and the raw bits on chain are not the index itself.
		let raw = (((tx.input[0].sequence & 0x00ff_ffff) as u64) << 24)
			| (tx.lock_time & 0x00ff_ffff) as u64;
		assert_ne!(raw, state_idx);
	}
}

#[test]
fn funding_keys_sort_identically_for_both_sides() {
	let pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	let (alice_script, alice_swapped) = pair.alice.funding_redeemscript();
	let (bob_script, bob_swapped) = pair.bob.funding_redeemscript();
	assert_eq!(alice_script, bob_script);
	assert_ne!(alice_swapped, bob_swapped);
}

#[test]
fn verify_sig_is_idempotent_and_rejects_garbage() {
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);

	let sig = pair.bob.sign_state(&pair.secp_ctx, &pair.bob_keys).unwrap();
	let der = sig.serialize_der().to_vec();
	pair.alice.verify_sig(&pair.secp_ctx, &der).unwrap();
	// Re-verifying the same signature is fine and leaves the same one stored.
	pair.alice.verify_sig(&pair.secp_ctx, &der).unwrap();
	assert_eq!(pair.alice.state.sig.clone().unwrap(), sig);

	// A signature by the wrong key is a BadSig, not a state change.
	let wrong = pair.alice.sign_state(&pair.secp_ctx, &pair.alice_keys).unwrap();
	assert_eq!(pair.alice.verify_sig(&pair.secp_ctx, &wrong.serialize_der()),
		Err(ChanError::BadSig));
	assert_eq!(pair.alice.state.sig.clone().unwrap(), sig);

	// Garbage does not even parse.
	assert_eq!(pair.alice.verify_sig(&pair.secp_ctx, &[0u8; 71]),
		Err(ChanError::DecodeErr));
}

#[test]
fn out_of_order_steps_are_refused() {
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);

	// Signing or verifying mid-round, before the counterparty's revocation
	// arrived, is refused.
	let next_hakd = pair.bob.their_hakd_pub(&pair.secp_ctx, 2).unwrap();
	pair.alice.advance_state(next_hakd.clone()).unwrap();
	assert_eq!(pair.alice.sign_state(&pair.secp_ctx, &pair.alice_keys).err().unwrap(),
		ChanError::StateOrderViolation);
	assert_eq!(pair.alice.verify_sig(&pair.secp_ctx, &[0u8; 71]),
		Err(ChanError::StateOrderViolation));
	// As is advancing again on top of the unfinished round.
	assert_eq!(pair.alice.advance_state(next_hakd),
		Err(ChanError::StateOrderViolation));

	// Completing the round unblocks everything.
	let bob_revoke = pair.bob.elk_send.at(1).unwrap();
	pair.alice.ingest_elkrem(&pair.secp_ctx, bob_revoke).unwrap();
	assert!(pair.alice.sign_state(&pair.secp_ctx, &pair.alice_keys).is_ok());
	// A second ingest of the same round is out of order.
	assert_eq!(pair.alice.ingest_elkrem(&pair.secp_ctx, bob_revoke),
		Err(ChanError::StateOrderViolation));
}

#[test]
fn delta_must_be_flushed_before_building() {
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);
	pair.alice.state.delta = 1_000;
	assert_eq!(pair.alice.sign_state(&pair.secp_ctx, &pair.alice_keys).err().unwrap(),
		ChanError::InflightNotFlushed);
	assert_eq!(pair.alice.simple_close_tx().err().unwrap(), ChanError::InflightNotFlushed);
	pair.alice.state.delta = 0;
	assert!(pair.alice.sign_state(&pair.secp_ctx, &pair.alice_keys).is_ok());
}

#[test]
fn unrelated_spend_is_not_my_channel() {
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);
	let mut tx = pair.alice.sign_break_tx(&pair.secp_ctx, &pair.alice_keys).unwrap();
	tx.input[0].previous_output.vout = 7;
	assert_eq!(classify_close(&mut pair.alice, &tx, 100), Err(ChanError::NotMyChannel));
	// A refused classification does not mark the channel closed.
	assert!(pair.alice.close_data.is_none());
}

#[test]
fn malformed_two_output_break_is_reported() {
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);
	let mut tx = pair.alice.sign_break_tx(&pair.secp_ctx, &pair.alice_keys).unwrap();
	// Two P2WPKH outputs but commitment-tagged sequence/locktime fields.
	let pkh_script = ::ln::chan_utils::get_p2wpkh(&pair.alice.my_refund_pub);
	for out in tx.output.iter_mut() {
		out.script_pubkey = pkh_script.clone();
	}
	assert_eq!(classify_close(&mut pair.alice, &tx, 100), Err(ChanError::MalformedClose));
}

#[test]
fn channel_record_round_trips_through_storage() {
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	pair.run_round(250_000);
	pair.run_round(-100_000);

	let encoded = pair.alice.encode();
	let logger: Arc<Logger> = Arc::new(TestLogger::new());
	let restored = <Qchan as ReadableArgs<Arc<Logger>>>::read(&mut &encoded[..], logger).unwrap();

	assert_eq!(restored.funding_outpoint, pair.alice.funding_outpoint);
	assert_eq!(restored.funding_value, FUNDING_VALUE);
	assert_eq!(restored.peer_idx, TEST_PEER_IDX);
	assert_eq!(restored.key_idx, TEST_KEY_IDX);
	assert_eq!(restored.state.state_idx, 2);
	assert_eq!(restored.state.my_amt, pair.alice.state.my_amt);
	assert_eq!(restored.state.my_hakd_pub, pair.alice.state.my_hakd_pub);
	assert_eq!(restored.state.sig, pair.alice.state.sig);
	assert!(restored.close_data.is_none());
	assert!(restored.elk_recv == pair.alice.elk_recv);

	// The restored record keeps working: it builds the same commitment.
	let their_hakd = pair.alice.their_hakd_pub(&pair.secp_ctx, 2).unwrap();
	assert_eq!(serialize(&restored.build_state_tx(&pair.secp_ctx, Some(&their_hakd)).unwrap()),
		serialize(&pair.alice.build_state_tx(&pair.secp_ctx, Some(&their_hakd)).unwrap()));
}

#[test]
fn state_zero_commitments_are_buildable_and_unmasked() {
	// Before the first round a channel can still be force-closed at the
	// funding allocation, with the index field unmasked (zero).
	let mut pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	let sig_for_alice = pair.bob.sign_state(&pair.secp_ctx, &pair.bob_keys).unwrap();
	pair.alice.verify_sig(&pair.secp_ctx, &sig_for_alice.serialize_der()).unwrap();

	let break_tx = pair.alice.sign_break_tx(&pair.secp_ctx, &pair.alice_keys).unwrap();
	assert_eq!(get_state_idx_from_tx(&break_tx, 0), 0);
	assert_eq!(break_tx.input[0].sequence, 0xff00_0000);
	assert_eq!(break_tx.lock_time, 0x2100_0000);
}

// hex fixture sanity check: the funding script layout is the documented
// OP_2 <key> <key> OP_2 OP_CHECKMULTISIG.
#[test]
fn funding_script_encoding() {
	let pair = create_chan_pair(FUNDING_VALUE, ALICE_START);
	let (script, _) = pair.alice.funding_redeemscript();
	let encoded = ::hex::encode(script.as_bytes());
	assert!(encoded.starts_with("5221"));
	assert!(encoded.ends_with("52ae"));
	assert_eq!(script.len(), 71);
}
