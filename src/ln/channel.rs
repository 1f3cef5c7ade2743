//! The durable channel record and its update state machine.
//!
//! A channel advances by repeating one round: fold the in-flight delta and
//! bump the state index (`advance_state`), ingest the counterparty's
//! revocation of the old state (`ingest_elkrem`), sign the counterparty's new
//! commitment (`sign_state`) and store their signature on ours
//! (`verify_sig`). At rest exactly one counterparty signature is held, for
//! the current state, and everything older is revoked.

use bitcoin::blockdata::script::Script;
use bitcoin::blockdata::transaction::{SigHashType, Transaction, TxIn, TxOut};
use bitcoin::hash_types::Txid;
use bitcoin::secp256k1::key::PublicKey;
use bitcoin::secp256k1::{Secp256k1, Signature, Signing, Verification};
use bitcoin::util::bip143;

use chain::keysinterface::Wallet;
use chain::transaction::OutPoint;
use ln::chan_utils;
use ln::elkrem::{ElkremReceiver, ElkremSender, MAX_INDEX as MAX_ELKREM_INDEX};
use ln::msgs::DecodeError;
use util::byte_utils;
use util::errors::ChanError;
use util::logger::Logger;
use util::ser::{Readable, ReadableArgs, Writeable, Writer};

use std::io::Read;
use std::sync::Arc;

/// Flat fee deducted from each output of a commitment or close transaction.
/// Must match the counterparty's value or signatures will not line up; a
/// production design would negotiate this per channel.
pub const COMMIT_FEE_SAT: u64 = 5_000;

/// Default CSV delay, in blocks, on the encumbered leg of a commitment.
pub const DEFAULT_TIMEOUT_BLOCKS: u16 = 5;

/// Largest value representable in the 48 bits of sequence/locktime spare
/// space a commitment transaction carries the masked state index in.
const MAX_48: u64 = 0x0000_ffff_ffff_ffff;

/// Returned by [`Qchan::zero_offset`] when the elkrem hashes deriving the
/// offset are not yet available; rejected by everything that consumes an
/// offset.
///
/// [`Qchan::zero_offset`]: struct.Qchan.html#method.zero_offset
pub const ZERO_OFFSET_SENTINEL: u64 = 0xffff_ffff_ffff_ffff;

const SERIALIZATION_VERSION: u8 = 1;
const MIN_SERIALIZATION_VERSION: u8 = 1;

/// The in-RAM summary of the current agreed state of a channel.
#[derive(Clone)]
pub struct StatCom {
	/// Monotonic 48-bit state counter.
	pub state_idx: u64,
	/// Satoshis currently allocated to the local side; the counterparty has
	/// the funding value minus this.
	pub my_amt: u64,
	/// In-flight change, negative for the pusher and positive for the
	/// puller. Must be folded (zero) before any transaction is built.
	pub delta: i64,
	/// The revocation pubkey locking the local side's encumbered output in
	/// the current state. Supplied by the counterparty, who alone can
	/// produce its elkrem tweak until they revoke.
	pub my_hakd_pub: Option<PublicKey>,
	/// The previous state's revocation pubkey, held until the counterparty
	/// reveals the elkrem hash behind it, then cleared.
	pub my_prev_hakd_pub: Option<PublicKey>,
	/// The counterparty's signature on the local side's current commitment.
	/// At most one signature is ever retained, so no stale commitment can be
	/// handed to the broadcaster.
	pub sig: Option<Signature>,
}

/// Filled in once a transaction spending the funding outpoint confirms.
#[derive(Clone)]
pub struct CloseData {
	/// Txid of the transaction which closed the channel.
	pub close_txid: Txid,
	/// Block height the close confirmed at.
	pub close_height: u32,
}

/// A durable record representing one bilateral payment channel.
///
/// Channel creation (the funding ritual) happens outside this library; a
/// fresh record arrives here at state 0 with no stored signature. All state
/// transitions on one record must be serialised by the caller; different
/// channels are independent.
pub struct Qchan {
	/// The on-chain 2-of-2 output all channel states spend.
	pub funding_outpoint: OutPoint,
	/// Value of the funding output, in satoshis.
	pub funding_value: u64,

	/// Our key in the funding output's 2-of-2.
	pub my_chan_pub: PublicKey,
	/// The counterparty's key in the funding output's 2-of-2.
	pub their_chan_pub: PublicKey,
	/// Our terminal payout key; every commitment pays our unencumbered leg
	/// to this key.
	pub my_refund_pub: PublicKey,
	/// The counterparty's terminal payout key.
	pub their_refund_pub: PublicKey,
	/// Base point for the revocation keys locking our money and for our
	/// timeout keys. Shares its secret with `my_refund_pub`, which is what
	/// lets a remedy sweep reconstruct the revocation secret.
	pub my_hakd_base: PublicKey,
	/// The counterparty's base point, mirror of `my_hakd_base`.
	pub their_hakd_base: PublicKey,

	/// Elkrem sender seeded from a channel-specific secret; we reveal one
	/// hash per superseded state.
	pub elk_send: ElkremSender,
	/// Elkrem receiver holding everything the counterparty has revealed.
	pub elk_recv: ElkremReceiver,

	/// CSV delay on the encumbered leg of every commitment.
	pub timeout_blocks: u16,

	/// Current state summary.
	pub state: StatCom,
	/// Set once the channel has closed on chain; the record is read-only
	/// from then on.
	pub close_data: Option<CloseData>,

	/// Wallet locator for this channel's private keys.
	pub peer_idx: u32,
	/// Wallet locator for this channel's private keys.
	pub key_idx: u32,

	pub(crate) logger: Arc<Logger>,
}

/// Writes a masked state index into the spare bits of a single-input
/// transaction: the low 24 bits of the sequence under a 0xff tag byte and
/// the low 24 bits of the locktime under a 0x21 tag byte.
pub fn set_state_idx_bits(tx: &mut Transaction, state_idx: u64, offset: u64) -> Result<(), ChanError> {
	if tx.input.len() != 1 || state_idx > MAX_48 || offset > MAX_48 {
		return Err(ChanError::InternalInvariant);
	}
	let masked = state_idx ^ offset;
	tx.input[0].sequence = 0xff00_0000 | ((masked >> 24) as u32 & 0x00ff_ffff);
	tx.lock_time = 0x2100_0000 | (masked as u32 & 0x00ff_ffff);
	Ok(())
}

/// Recovers the state index hidden in a commitment transaction's sequence
/// and locktime fields. Returns 0 for anything that does not carry an index
/// (wrong input count, missing tag bytes, unusable offset); 0 therefore
/// reads as "unrecognised or cooperative".
pub fn get_state_idx_from_tx(tx: &Transaction, offset: u64) -> u64 {
	if tx.input.len() != 1 || offset > MAX_48 {
		return 0;
	}
	let sequence = tx.input[0].sequence;
	if sequence >> 24 != 0xff || tx.lock_time >> 24 != 0x21 {
		return 0;
	}
	let high = (sequence & 0x00ff_ffff) as u64;
	let low = (tx.lock_time & 0x00ff_ffff) as u64;
	((high << 24) | low) ^ offset
}

impl Qchan {
	/// Assembles a channel record as the funding ritual leaves it: state 0,
	/// no stored signature, nothing ingested. Each side's HAKD base is its
	/// refund point.
	pub fn new(funding_outpoint: OutPoint, funding_value: u64, my_amt: u64,
	           my_chan_pub: PublicKey, their_chan_pub: PublicKey,
	           my_refund_pub: PublicKey, their_refund_pub: PublicKey,
	           elkrem_root: [u8; 32], timeout_blocks: u16,
	           peer_idx: u32, key_idx: u32, logger: Arc<Logger>) -> Qchan {
		Qchan {
			funding_outpoint,
			funding_value,
			my_chan_pub,
			their_chan_pub,
			my_refund_pub: my_refund_pub.clone(),
			their_refund_pub: their_refund_pub.clone(),
			my_hakd_base: my_refund_pub,
			their_hakd_base: their_refund_pub,
			elk_send: ElkremSender::new(elkrem_root),
			elk_recv: ElkremReceiver::new(),
			timeout_blocks,
			state: StatCom {
				state_idx: 0,
				my_amt,
				delta: 0,
				my_hakd_pub: None,
				my_prev_hakd_pub: None,
				sig: None,
			},
			close_data: None,
			peer_idx,
			key_idx,
			logger,
		}
	}

	fn check_open(&self) -> Result<(), ChanError> {
		if self.close_data.is_some() {
			return Err(ChanError::StateOrderViolation);
		}
		Ok(())
	}

	// Signing and verifying are only legal once the old state's revocation
	// has been ingested (which also makes every elkrem index the builders
	// need available).
	fn check_round_position(&self) -> Result<(), ChanError> {
		if self.state.state_idx > 0 && self.state.my_prev_hakd_pub.is_some() {
			return Err(ChanError::StateOrderViolation);
		}
		Ok(())
	}

	/// The funding output's 2-of-2 redeemscript and whether lexicographic
	/// sorting put the counterparty's key first.
	pub fn funding_redeemscript(&self) -> (Script, bool) {
		chan_utils::make_funding_redeemscript(&self.my_chan_pub, &self.their_chan_pub)
	}

	/// The 48-bit mask both sides apply to state indices before writing them
	/// into commitment transactions, derived from the two elkrem-0 hashes.
	/// Returns [`ZERO_OFFSET_SENTINEL`] while either hash is unavailable.
	///
	/// [`ZERO_OFFSET_SENTINEL`]: constant.ZERO_OFFSET_SENTINEL.html
	pub fn zero_offset(&self) -> u64 {
		let send_zero = match self.elk_send.at(0) {
			Ok(hash) => hash,
			Err(_) => return ZERO_OFFSET_SENTINEL,
		};
		let recv_zero = match self.elk_recv.at(0) {
			Ok(hash) => hash,
			Err(_) => return ZERO_OFFSET_SENTINEL,
		};
		byte_utils::slice_to_be48(&send_zero[2..8]) ^ byte_utils::slice_to_be48(&recv_zero[2..8])
	}

	/// The revocation pubkey locking the counterparty's encumbered output at
	/// the given state. Built from our elkrem, so we can always produce it;
	/// the counterparty stores it as their `my_hakd_pub` and cannot unlock
	/// it until we reveal the tweak.
	pub fn their_hakd_pub<C: Verification>(&self, secp_ctx: &Secp256k1<C>, state_idx: u64) -> Result<PublicKey, ChanError> {
		let elk = self.elk_send.at(state_idx)?;
		chan_utils::derive_public_key(secp_ctx, &self.their_hakd_base, &elk)
	}

	/// Rebuilds the revocation pubkey that locked our counterparty's view of
	/// our money at a past state, from the elkrem hash they have since
	/// revealed.
	pub fn my_hakd_pub_at<C: Verification>(&self, secp_ctx: &Secp256k1<C>, state_idx: u64) -> Result<PublicKey, ChanError> {
		let elk = self.elk_recv.at(state_idx)?;
		chan_utils::derive_public_key(secp_ctx, &self.my_hakd_base, &elk)
	}

	/// Our timeout key at the given state: the key we sweep our own
	/// commitment's encumbered leg with after the CSV delay.
	pub fn my_timeout_pub<C: Verification>(&self, secp_ctx: &Secp256k1<C>, state_idx: u64) -> Result<PublicKey, ChanError> {
		if state_idx == 0 {
			// No elkrem exists below index 0; state 0 uses the raw base.
			return Ok(self.my_hakd_base.clone());
		}
		let elk = self.elk_send.at(state_idx - 1)?;
		chan_utils::derive_public_key(secp_ctx, &self.my_hakd_base, &elk)
	}

	/// The counterparty's timeout key at the given state. Requires their
	/// elkrem for the previous state, which they reveal at the start of the
	/// round creating this state.
	pub fn their_timeout_pub<C: Verification>(&self, secp_ctx: &Secp256k1<C>, state_idx: u64) -> Result<PublicKey, ChanError> {
		if state_idx == 0 {
			return Ok(self.their_hakd_base.clone());
		}
		let elk = self.elk_recv.at(state_idx - 1)?;
		chan_utils::derive_public_key(secp_ctx, &self.their_hakd_base, &elk)
	}

	/// Builds the commitment transaction for the current state.
	///
	/// With `their_hakd_pub = None` this is the counterparty's transaction
	/// (the one we sign and hand over): their money on the encumbered leg,
	/// ours paid straight to our refund key. With `Some(key)` it is our own,
	/// the mirror image, with `key` as the revocation key on our encumbered
	/// leg. Both sides build bit-identical transactions for the same state,
	/// with the masked state index in the sequence/locktime spare bits and
	/// outputs in BIP-69 order.
	pub fn build_state_tx<C: Verification>(&self, secp_ctx: &Secp256k1<C>, their_hakd_pub: Option<&PublicKey>) -> Result<Transaction, ChanError> {
		if self.state.delta != 0 {
			return Err(ChanError::InflightNotFlushed);
		}
		let state_idx = self.state.state_idx;
		// State 0 predates both elkrem-0 hashes, so it is built unmasked.
		let offset = if state_idx == 0 {
			0
		} else {
			let offset = self.zero_offset();
			if offset > MAX_48 {
				return Err(ChanError::ElkUnknown);
			}
			offset
		};
		let their_amt = self.funding_value.checked_sub(self.state.my_amt)
			.ok_or(ChanError::InternalInvariant)?;
		let (revocation_key, timeout_key, encumbered_amt, refund_key, refund_amt) = match their_hakd_pub {
			None => {
				let revocation_key = match self.state.my_hakd_pub {
					Some(ref key) => key.clone(),
					None => return Err(ChanError::StateOrderViolation),
				};
				(revocation_key, self.their_timeout_pub(secp_ctx, state_idx)?,
				 their_amt, &self.my_refund_pub, self.state.my_amt)
			},
			Some(key) => {
				(key.clone(), self.my_timeout_pub(secp_ctx, state_idx)?,
				 self.state.my_amt, &self.their_refund_pub, their_amt)
			},
		};
		let encumbered_amt = encumbered_amt.checked_sub(COMMIT_FEE_SAT)
			.ok_or(ChanError::InternalInvariant)?;
		let refund_amt = refund_amt.checked_sub(COMMIT_FEE_SAT)
			.ok_or(ChanError::InternalInvariant)?;

		let redeemscript = chan_utils::get_revokeable_redeemscript(&revocation_key, self.timeout_blocks, &timeout_key);
		let mut output = vec![
			TxOut {
				value: encumbered_amt,
				script_pubkey: chan_utils::script_to_p2wsh(&redeemscript),
			},
			TxOut {
				value: refund_amt,
				script_pubkey: chan_utils::get_p2wpkh(refund_key),
			},
		];
		chan_utils::sort_outputs(&mut output);

		let mut tx = Transaction {
			version: 2,
			lock_time: 0,
			input: vec![TxIn {
				previous_output: self.funding_outpoint.into_bitcoin_outpoint(),
				script_sig: Script::new(),
				sequence: 0,
				witness: Vec::new(),
			}],
			output,
		};
		set_state_idx_bits(&mut tx, state_idx, offset)?;
		Ok(tx)
	}

	/// Folds the in-flight delta into the allocation and moves to the next
	/// state index, rotating in the revocation pubkey the counterparty sent
	/// for it. The first step of every update round.
	pub fn advance_state(&mut self, next_my_hakd_pub: PublicKey) -> Result<(), ChanError> {
		self.check_open()?;
		if self.state.my_prev_hakd_pub.is_some() {
			// The previous round never completed its revocation.
			return Err(ChanError::StateOrderViolation);
		}
		let new_idx = self.state.state_idx + 1;
		if new_idx > MAX_ELKREM_INDEX {
			return Err(ChanError::InternalInvariant);
		}
		let new_amt = self.state.my_amt as i64 + self.state.delta;
		if new_amt < 0 || new_amt as u64 > self.funding_value {
			return Err(ChanError::InternalInvariant);
		}
		log_trace!(self, "Advancing channel {}/{} to state {}, my amount {} -> {}",
			self.peer_idx, self.key_idx, new_idx, self.state.my_amt, new_amt);
		self.state.my_amt = new_amt as u64;
		self.state.delta = 0;
		self.state.my_prev_hakd_pub = self.state.my_hakd_pub.take();
		self.state.my_hakd_pub = Some(next_my_hakd_pub);
		self.state.state_idx = new_idx;
		Ok(())
	}

	/// Ingests the counterparty's elkrem hash revoking the previous state.
	///
	/// The hash must extend the receiver tree consistently and must hash up
	/// to the revocation pubkey the counterparty committed to for that
	/// state; a mismatch there means they equivocated and the channel is
	/// beyond repair (`ChannelBroken`) - close it unilaterally.
	pub fn ingest_elkrem<C: Verification>(&mut self, secp_ctx: &Secp256k1<C>, elk: [u8; 32]) -> Result<(), ChanError> {
		self.check_open()?;
		let expected_idx = match self.elk_recv.upto() {
			None => 0,
			Some(upto) => upto + 1,
		};
		if self.state.state_idx == 0 || expected_idx != self.state.state_idx - 1 {
			return Err(ChanError::StateOrderViolation);
		}
		self.elk_recv.add_next(elk)?;
		if self.state.state_idx == 1 {
			// State 0 carried no revocation key, so there is nothing to
			// check the first reveal against.
			self.state.my_prev_hakd_pub = None;
			return Ok(());
		}
		let candidate = chan_utils::derive_public_key(secp_ctx, &self.my_hakd_base, &elk)?;
		match self.state.my_prev_hakd_pub {
			Some(ref prev) if *prev == candidate => {},
			Some(_) => {
				log_error!(self, "Counterparty revealed elkrem {} inconsistent with their revocation key for channel {}/{}",
					expected_idx, self.peer_idx, self.key_idx);
				return Err(ChanError::ChannelBroken);
			},
			None => return Err(ChanError::StateOrderViolation),
		}
		self.state.my_prev_hakd_pub = None;
		Ok(())
	}

	/// Signs the counterparty's commitment for the current state with our
	/// funding key. The caller ships the signature DER-encoded with the
	/// SIGHASH byte stripped; it is always SIGHASH_ALL.
	pub fn sign_state<C: Signing + Verification, W: Wallet>(&self, secp_ctx: &Secp256k1<C>, wallet: &W) -> Result<Signature, ChanError> {
		self.check_open()?;
		self.check_round_position()?;
		let tx = self.build_state_tx(secp_ctx, None)?;
		let (funding_script, _) = self.funding_redeemscript();
		let sighash = hash_to_message!(&bip143::SighashComponents::new(&tx)
			.sighash_all(&tx.input[0], &funding_script, self.funding_value)[..]);
		let chan_priv = wallet.get_chan_priv(self.peer_idx, self.key_idx);
		log_trace!(self, "Signing state {} commitment for channel {}/{}",
			self.state.state_idx, self.peer_idx, self.key_idx);
		Ok(secp_ctx.sign(&sighash, &chan_priv))
	}

	/// Checks the counterparty's signature on our commitment for the current
	/// state and, on success, stores it as the one retained signature.
	pub fn verify_sig<C: Signing + Verification>(&mut self, secp_ctx: &Secp256k1<C>, sig: &[u8]) -> Result<(), ChanError> {
		self.check_open()?;
		self.check_round_position()?;
		let sig = match Signature::from_der(sig) {
			Ok(sig) => sig,
			Err(_) => return Err(ChanError::DecodeErr),
		};
		let their_hakd_pub = self.their_hakd_pub(secp_ctx, self.state.state_idx)?;
		let tx = self.build_state_tx(secp_ctx, Some(&their_hakd_pub))?;
		let (funding_script, _) = self.funding_redeemscript();
		let sighash = hash_to_message!(&bip143::SighashComponents::new(&tx)
			.sighash_all(&tx.input[0], &funding_script, self.funding_value)[..]);
		if secp_ctx.verify(&sighash, &sig, &self.their_chan_pub).is_err() {
			return Err(ChanError::BadSig);
		}
		log_trace!(self, "Storing counterparty signature for state {} on channel {}/{}",
			self.state.state_idx, self.peer_idx, self.key_idx);
		self.state.sig = Some(sig);
		Ok(())
	}

	/// Builds our current commitment fully signed for broadcast: the stored
	/// counterparty signature plus a fresh one of ours, ordered to match the
	/// sorted funding keys. The unilateral-close path for an unresponsive
	/// peer.
	pub fn sign_break_tx<C: Signing + Verification, W: Wallet>(&self, secp_ctx: &Secp256k1<C>, wallet: &W) -> Result<Transaction, ChanError> {
		self.check_open()?;
		self.check_round_position()?;
		let their_sig = match self.state.sig {
			Some(ref sig) => sig.clone(),
			None => return Err(ChanError::StateOrderViolation),
		};
		let their_hakd_pub = self.their_hakd_pub(secp_ctx, self.state.state_idx)?;
		let mut tx = self.build_state_tx(secp_ctx, Some(&their_hakd_pub))?;
		let (funding_script, swapped) = self.funding_redeemscript();
		let sighash = hash_to_message!(&bip143::SighashComponents::new(&tx)
			.sighash_all(&tx.input[0], &funding_script, self.funding_value)[..]);
		let my_sig = secp_ctx.sign(&sighash, &wallet.get_chan_priv(self.peer_idx, self.key_idx));

		let mut my_sig_der = my_sig.serialize_der().to_vec();
		my_sig_der.push(SigHashType::All as u8);
		let mut their_sig_der = their_sig.serialize_der().to_vec();
		their_sig_der.push(SigHashType::All as u8);

		// Leading empty element eats the extra pop of OP_CHECKMULTISIG.
		let mut witness = Vec::with_capacity(4);
		witness.push(Vec::new());
		if swapped {
			witness.push(their_sig_der);
			witness.push(my_sig_der);
		} else {
			witness.push(my_sig_der);
			witness.push(their_sig_der);
		}
		witness.push(funding_script.into_bytes());
		tx.input[0].witness = witness;
		log_info!(self, "Built break transaction for channel {}/{} at state {}",
			self.peer_idx, self.key_idx, self.state.state_idx);
		Ok(tx)
	}

	/// Builds the cooperative close: the funding output paid out directly to
	/// the two refund keys at the current allocation.
	pub fn simple_close_tx(&self) -> Result<Transaction, ChanError> {
		if self.state.delta != 0 {
			return Err(ChanError::InflightNotFlushed);
		}
		let my_amt = self.state.my_amt.checked_sub(COMMIT_FEE_SAT)
			.ok_or(ChanError::InternalInvariant)?;
		let their_amt = self.funding_value.checked_sub(self.state.my_amt)
			.and_then(|amt| amt.checked_sub(COMMIT_FEE_SAT))
			.ok_or(ChanError::InternalInvariant)?;
		let mut output = vec![
			TxOut { value: my_amt, script_pubkey: chan_utils::get_p2wpkh(&self.my_refund_pub) },
			TxOut { value: their_amt, script_pubkey: chan_utils::get_p2wpkh(&self.their_refund_pub) },
		];
		chan_utils::sort_outputs(&mut output);
		Ok(Transaction {
			version: 2,
			lock_time: 0,
			input: vec![TxIn {
				previous_output: self.funding_outpoint.into_bitcoin_outpoint(),
				script_sig: Script::new(),
				sequence: 0xffff_ffff,
				witness: Vec::new(),
			}],
			output,
		})
	}

	/// Signs the cooperative close with our funding key.
	pub fn sign_simple_close<C: Signing, W: Wallet>(&self, secp_ctx: &Secp256k1<C>, wallet: &W) -> Result<Signature, ChanError> {
		self.check_open()?;
		let tx = self.simple_close_tx()?;
		let (funding_script, _) = self.funding_redeemscript();
		let sighash = hash_to_message!(&bip143::SighashComponents::new(&tx)
			.sighash_all(&tx.input[0], &funding_script, self.funding_value)[..]);
		Ok(secp_ctx.sign(&sighash, &wallet.get_chan_priv(self.peer_idx, self.key_idx)))
	}
}

impl Writeable for StatCom {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		self.state_idx.write(writer)?;
		self.my_amt.write(writer)?;
		self.delta.write(writer)?;
		self.my_hakd_pub.write(writer)?;
		self.my_prev_hakd_pub.write(writer)?;
		self.sig.write(writer)?;
		Ok(())
	}
}

impl Readable for StatCom {
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		Ok(StatCom {
			state_idx: Readable::read(reader)?,
			my_amt: Readable::read(reader)?,
			delta: Readable::read(reader)?,
			my_hakd_pub: Readable::read(reader)?,
			my_prev_hakd_pub: Readable::read(reader)?,
			sig: Readable::read(reader)?,
		})
	}
}

impl Writeable for CloseData {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		self.close_txid.write(writer)?;
		self.close_height.write(writer)?;
		Ok(())
	}
}

impl Readable for CloseData {
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		Ok(CloseData {
			close_txid: Readable::read(reader)?,
			close_height: Readable::read(reader)?,
		})
	}
}

impl Writeable for Qchan {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		SERIALIZATION_VERSION.write(writer)?;
		MIN_SERIALIZATION_VERSION.write(writer)?;
		self.funding_outpoint.write(writer)?;
		self.funding_value.write(writer)?;
		self.my_chan_pub.write(writer)?;
		self.their_chan_pub.write(writer)?;
		self.my_refund_pub.write(writer)?;
		self.their_refund_pub.write(writer)?;
		self.my_hakd_base.write(writer)?;
		self.their_hakd_base.write(writer)?;
		self.elk_send.write(writer)?;
		self.elk_recv.write(writer)?;
		self.timeout_blocks.write(writer)?;
		self.state.write(writer)?;
		self.close_data.write(writer)?;
		self.peer_idx.write(writer)?;
		self.key_idx.write(writer)?;
		Ok(())
	}
}

impl ReadableArgs<Arc<Logger>> for Qchan {
	fn read<R: Read>(reader: &mut R, logger: Arc<Logger>) -> Result<Self, DecodeError> {
		let _ver: u8 = Readable::read(reader)?;
		let min_ver: u8 = Readable::read(reader)?;
		if min_ver > SERIALIZATION_VERSION {
			return Err(DecodeError::UnknownVersion);
		}
		Ok(Qchan {
			funding_outpoint: Readable::read(reader)?,
			funding_value: Readable::read(reader)?,
			my_chan_pub: Readable::read(reader)?,
			their_chan_pub: Readable::read(reader)?,
			my_refund_pub: Readable::read(reader)?,
			their_refund_pub: Readable::read(reader)?,
			my_hakd_base: Readable::read(reader)?,
			their_hakd_base: Readable::read(reader)?,
			elk_send: Readable::read(reader)?,
			elk_recv: Readable::read(reader)?,
			timeout_blocks: Readable::read(reader)?,
			state: Readable::read(reader)?,
			close_data: Readable::read(reader)?,
			peer_idx: Readable::read(reader)?,
			key_idx: Readable::read(reader)?,
			logger,
		})
	}
}
