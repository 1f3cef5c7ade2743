//! Classification of transactions spending a channel's funding outpoint, and
//! construction of remedy (grab) transactions when the spend turns out to be
//! a revoked commitment.
//!
//! The caller watches the chain for the funding outpoint; once a spend
//! confirms it hands the transaction to [`classify_close`], which marks the
//! channel closed and reports the outputs now owed to the local side. An
//! output flagged grabbable is passed on to [`build_grab_tx`], which
//! reconstructs the revoked state's revocation secret from the elkrem the
//! counterparty revealed when they superseded it, and sweeps.
//!
//! [`classify_close`]: fn.classify_close.html
//! [`build_grab_tx`]: fn.build_grab_tx.html

use bitcoin::blockdata::script::Script;
use bitcoin::blockdata::transaction::{OutPoint as BitcoinOutPoint, SigHashType, Transaction, TxIn};
use bitcoin::hash_types::WPubkeyHash;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::key::PublicKey;
use bitcoin::secp256k1::{Secp256k1, Signing, Verification};
use bitcoin::util::bip143;

use chain::chaininterface::ChainClient;
use chain::keysinterface::Wallet;
use ln::chan_utils;
use ln::channel::{get_state_idx_from_tx, CloseData, Qchan, COMMIT_FEE_SAT, ZERO_OFFSET_SENTINEL};
use util::errors::ChanError;

/// An output a channel close left to the local side.
///
/// `spend_lag` encodes how the output can be taken, in the shape the shared
/// wallet-side UTxO tracker expects: `1` means spendable in the next block,
/// a larger value means spendable after that many blocks of CSV delay, and
/// `-1` means the output belongs to a revoked counterparty commitment and a
/// remedy sweep is available immediately.
#[derive(Clone, PartialEq, Debug)]
pub struct SpendableUtxo {
	/// Outpoint of the spendable output on the close transaction.
	pub outpoint: BitcoinOutPoint,
	/// Value of the output in satoshis.
	pub value: u64,
	/// Spendability class; see the struct docs.
	pub spend_lag: i32,
}

const P2WSH_LEN: usize = 34;
const P2WPKH_LEN: usize = 22;

/// Classifies a confirmed transaction spending the channel's funding
/// outpoint and records the close on the channel.
///
/// Returns the outputs now owed to the local side: nothing or a direct
/// payout for a cooperative close, a CSV-delayed output when we broadcast
/// our own commitment, an immediate payout when the counterparty broadcast
/// theirs, plus a grabbable marker when what they broadcast was revoked.
pub fn classify_close(chan: &mut Qchan, tx: &Transaction, height: u32) -> Result<Vec<SpendableUtxo>, ChanError> {
	if tx.input.len() != 1 || tx.input[0].previous_output != chan.funding_outpoint.into_bitcoin_outpoint() {
		return Err(ChanError::NotMyChannel);
	}
	let offset = chan.zero_offset();
	if offset == ZERO_OFFSET_SENTINEL && chan.state.state_idx > 0 {
		return Err(ChanError::ElkUnknown);
	}
	let hinted_idx = get_state_idx_from_tx(tx, if offset == ZERO_OFFSET_SENTINEL { 0 } else { offset });
	let txid = tx.txid();
	chan.close_data = Some(CloseData { close_txid: txid, close_height: height });

	if hinted_idx == 0 || tx.output.len() != 2 {
		// No recognisable state index: treat as a cooperative close and pick
		// out whichever output pays our refund key directly.
		let my_pkh = WPubkeyHash::hash(&chan.my_refund_pub.serialize()).into_inner();
		let mut utxos = Vec::new();
		for (vout, out) in tx.output.iter().enumerate() {
			if out.script_pubkey.is_v0_p2wpkh() && out.script_pubkey.as_bytes()[2..22] == my_pkh[..] {
				utxos.push(SpendableUtxo {
					outpoint: BitcoinOutPoint { txid, vout: vout as u32 },
					value: out.value,
					spend_lag: 1,
				});
			}
		}
		log_info!(chan, "Channel {}/{} closed cooperatively by {}, {} outputs ours",
			chan.peer_idx, chan.key_idx, txid, utxos.len());
		return Ok(utxos);
	}

	// A commitment: one encumbered P2WSH leg and one direct P2WPKH leg.
	let (wsh_vout, pkh_vout) = match (tx.output[0].script_pubkey.len(), tx.output[1].script_pubkey.len()) {
		(P2WSH_LEN, P2WPKH_LEN) => (0usize, 1usize),
		(P2WPKH_LEN, P2WSH_LEN) => (1usize, 0usize),
		_ => return Err(ChanError::MalformedClose),
	};

	let pkh_mine = tx.output[pkh_vout].script_pubkey == chan_utils::get_p2wpkh(&chan.my_refund_pub);
	if !pkh_mine {
		// Our own commitment confirmed; our money is on the encumbered leg
		// behind the CSV delay.
		log_info!(chan, "Channel {}/{} closed at state {} by our commitment {}",
			chan.peer_idx, chan.key_idx, hinted_idx, txid);
		return Ok(vec![SpendableUtxo {
			outpoint: BitcoinOutPoint { txid, vout: wsh_vout as u32 },
			value: tx.output[wsh_vout].value,
			spend_lag: chan.timeout_blocks as i32,
		}]);
	}

	// The counterparty broadcast; our side pays out directly.
	let mut utxos = vec![SpendableUtxo {
		outpoint: BitcoinOutPoint { txid, vout: pkh_vout as u32 },
		value: tx.output[pkh_vout].value,
		spend_lag: 1,
	}];
	if hinted_idx < chan.state.state_idx {
		// A superseded state: they already revealed the elkrem behind its
		// revocation key, so their encumbered leg is ours for the taking.
		log_warn!(chan, "Channel {}/{}: counterparty broadcast REVOKED state {} (current {}), remedy available",
			chan.peer_idx, chan.key_idx, hinted_idx, chan.state.state_idx);
		utxos.push(SpendableUtxo {
			outpoint: BitcoinOutPoint { txid, vout: wsh_vout as u32 },
			value: tx.output[wsh_vout].value,
			spend_lag: -1,
		});
	} else if hinted_idx > chan.state.state_idx {
		// A state newer than anything we signed. Tolerated: we still take
		// our direct leg, and never touch the encumbered one.
		log_warn!(chan, "Channel {}/{}: close hints at future state {} (current {})",
			chan.peer_idx, chan.key_idx, hinted_idx, chan.state.state_idx);
	} else {
		log_info!(chan, "Channel {}/{} closed at current state {} by counterparty commitment {}",
			chan.peer_idx, chan.key_idx, hinted_idx, txid);
	}
	Ok(utxos)
}

/// Builds the signed remedy transaction sweeping the encumbered leg of a
/// revoked counterparty commitment, marked `spend_lag = -1` by
/// [`classify_close`].
///
/// The revocation secret is our refund secret plus the elkrem scalar the
/// counterparty revealed when the broadcast state was superseded; the
/// reconstructed key is checked against the script actually on chain before
/// anything is signed.
///
/// [`classify_close`]: fn.classify_close.html
pub fn build_grab_tx<S: Signing + Verification, C: ChainClient, W: Wallet>(
	chan: &Qchan, secp_ctx: &Secp256k1<S>, chain: &C, wallet: &W, utxo: &SpendableUtxo,
) -> Result<Transaction, ChanError> {
	if utxo.spend_lag != -1 {
		return Err(ChanError::InternalInvariant);
	}
	let close_tx = match chain.get_tx(&utxo.outpoint.txid) {
		Some(tx) => tx,
		None => return Err(ChanError::InternalInvariant),
	};
	if close_tx.output.len() != 2 {
		return Err(ChanError::MalformedClose);
	}
	let target = match close_tx.output.get(utxo.outpoint.vout as usize) {
		Some(out) if out.script_pubkey.len() == P2WSH_LEN => out,
		_ => return Err(ChanError::MalformedClose),
	};

	let offset = chan.zero_offset();
	if offset == ZERO_OFFSET_SENTINEL {
		return Err(ChanError::ElkUnknown);
	}
	let hinted_idx = get_state_idx_from_tx(&close_tx, offset);
	match chan.elk_recv.upto() {
		Some(upto) if hinted_idx <= upto => {},
		_ => return Err(ChanError::ElkUnknown),
	}
	let elk = chan.elk_recv.at(hinted_idx)?;

	// Our refund secret plus the revealed scalar is the revocation secret
	// for the broadcast state; prove it by rebuilding the on-chain script.
	let grab_priv = chan_utils::derive_private_key(&elk, &wallet.get_refund_priv(chan.peer_idx, chan.key_idx))?;
	let grab_pub = PublicKey::from_secret_key(secp_ctx, &grab_priv);
	let timeout_key = chan.their_timeout_pub(secp_ctx, hinted_idx)?;
	let redeemscript = chan_utils::get_revokeable_redeemscript(&grab_pub, chan.timeout_blocks, &timeout_key);
	if chan_utils::script_to_p2wsh(&redeemscript) != target.script_pubkey {
		return Err(ChanError::ScriptMismatch);
	}

	let sweep_value = utxo.value.checked_sub(COMMIT_FEE_SAT)
		.ok_or(ChanError::InternalInvariant)?;
	let mut grab_tx = Transaction {
		version: 2,
		lock_time: 0,
		input: vec![TxIn {
			previous_output: utxo.outpoint.clone(),
			script_sig: Script::new(),
			sequence: 0xffff_ffff,
			witness: Vec::new(),
		}],
		output: vec![wallet.new_change_out(sweep_value)],
	};

	let sighash = hash_to_message!(&bip143::SighashComponents::new(&grab_tx)
		.sighash_all(&grab_tx.input[0], &redeemscript, utxo.value)[..]);
	let mut sig = secp_ctx.sign(&sighash, &grab_priv).serialize_der().to_vec();
	sig.push(SigHashType::All as u8);
	grab_tx.input[0].witness = vec![sig, redeemscript.into_bytes()];
	log_info!(chan, "Built grab transaction sweeping {} sat from revoked state {} of channel {}/{}",
		sweep_value, hinted_idx, chan.peer_idx, chan.key_idx);
	Ok(grab_tx)
}
