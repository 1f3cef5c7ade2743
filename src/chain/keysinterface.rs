//! keysinterface provides the channel core with the per-channel secret keys
//! it signs with, and with fresh change outputs for sweeps. Clients keep the
//! actual key material; the core only ever asks for it through the [`Wallet`]
//! trait, addressed by the `(peer_idx, key_idx)` locator stored in the
//! channel record.
//!
//! [`Wallet`]: trait.Wallet.html

use bitcoin::blockdata::opcodes;
use bitcoin::blockdata::script::Builder;
use bitcoin::blockdata::transaction::TxOut;
use bitcoin::hash_types::WPubkeyHash;
use bitcoin::hashes::sha256::Hash as Sha256;
use bitcoin::hashes::{Hash, HashEngine};
use bitcoin::secp256k1;
use bitcoin::secp256k1::key::{PublicKey, SecretKey};
use bitcoin::secp256k1::Secp256k1;

use util::byte_utils;

use std::sync::atomic::{AtomicUsize, Ordering};

/// A trait to describe an object which can get user secrets and key material.
///
/// The channel pubkeys stored in a `Qchan` must have been derived from the
/// secrets this wallet returns for the same locator, or signatures will not
/// match and remedy reconstruction (which adds the revealed elkrem scalar to
/// the refund secret) will fail with a script mismatch.
pub trait Wallet: Sync + Send {
	/// Gets the private key behind the channel's 2-of-2 funding pubkey.
	fn get_chan_priv(&self, peer_idx: u32, key_idx: u32) -> SecretKey;
	/// Gets the private key behind the channel's refund pubkey. This secret
	/// also backs the channel's HAKD base point.
	fn get_refund_priv(&self, peer_idx: u32, key_idx: u32) -> SecretKey;
	/// Allocates a fresh change output of the given value, owned by the
	/// wallet. Used as the destination of remedy sweeps.
	fn new_change_out(&self, value: u64) -> TxOut;
}

/// Simple Wallet implementor that derives all channel secrets from a 32-byte
/// seed. The seed MUST be backed up safely prior to use: it is required to
/// recover channel funds, including sweeps of revoked counterparty closes.
pub struct KeysManager {
	secp_ctx: Secp256k1<secp256k1::SignOnly>,
	seed: [u8; 32],
	change_child_index: AtomicUsize,
}

macro_rules! key_step {
	($seed: expr, $info: expr, $prev_key: expr) => {{
		let mut sha = Sha256::engine();
		sha.input($seed);
		sha.input(&$prev_key[..]);
		sha.input(&$info[..]);
		SecretKey::from_slice(&Sha256::from_engine(sha).into_inner()).expect("SHA-256 is busted")
	}}
}

impl KeysManager {
	/// Constructs a KeysManager from a 32-byte seed. If the seed is in some
	/// way biased (eg your RNG is busted) this may panic (but more
	/// importantly, you will possibly lose funds).
	pub fn new(seed: &[u8; 32]) -> KeysManager {
		KeysManager {
			secp_ctx: Secp256k1::signing_only(),
			seed: *seed,
			change_child_index: AtomicUsize::new(0),
		}
	}

	fn channel_seed(&self, peer_idx: u32, key_idx: u32) -> [u8; 32] {
		let mut sha = Sha256::engine();
		sha.input(&self.seed);
		sha.input(&byte_utils::be32_to_array(peer_idx));
		sha.input(&byte_utils::be32_to_array(key_idx));
		sha.input(&b"channel seed"[..]);
		Sha256::from_engine(sha).into_inner()
	}

	/// Derives the root of the elkrem tree whose hashes this node reveals to
	/// the given channel's counterparty, one per superseded state.
	pub fn get_elkrem_root(&self, peer_idx: u32, key_idx: u32) -> [u8; 32] {
		let chan_seed = self.channel_seed(peer_idx, key_idx);
		let mut sha = Sha256::engine();
		sha.input(&chan_seed);
		sha.input(&b"elkrem root"[..]);
		Sha256::from_engine(sha).into_inner()
	}

	/// Returns the public key for the channel funding key of the locator.
	pub fn get_chan_pub(&self, peer_idx: u32, key_idx: u32) -> PublicKey {
		PublicKey::from_secret_key(&self.secp_ctx, &self.get_chan_priv(peer_idx, key_idx))
	}

	/// Returns the public key for the refund key of the locator. This point
	/// doubles as the channel's HAKD base.
	pub fn get_refund_pub(&self, peer_idx: u32, key_idx: u32) -> PublicKey {
		PublicKey::from_secret_key(&self.secp_ctx, &self.get_refund_priv(peer_idx, key_idx))
	}
}

impl Wallet for KeysManager {
	fn get_chan_priv(&self, peer_idx: u32, key_idx: u32) -> SecretKey {
		let chan_seed = self.channel_seed(peer_idx, key_idx);
		key_step!(&self.seed, b"chan key", chan_seed)
	}

	fn get_refund_priv(&self, peer_idx: u32, key_idx: u32) -> SecretKey {
		let chan_seed = self.channel_seed(peer_idx, key_idx);
		let chan_priv = key_step!(&self.seed, b"chan key", chan_seed);
		key_step!(&self.seed, b"refund key", chan_priv)
	}

	fn new_change_out(&self, value: u64) -> TxOut {
		let child_ix = self.change_child_index.fetch_add(1, Ordering::AcqRel);
		let mut sha = Sha256::engine();
		sha.input(&self.seed);
		sha.input(&byte_utils::be64_to_array(child_ix as u64));
		sha.input(&b"change key"[..]);
		let change_priv = SecretKey::from_slice(&Sha256::from_engine(sha).into_inner()).expect("SHA-256 is busted");
		let change_pub = PublicKey::from_secret_key(&self.secp_ctx, &change_priv);
		let wpubkey_hash = WPubkeyHash::hash(&change_pub.serialize());
		TxOut {
			value,
			script_pubkey: Builder::new().push_opcode(opcodes::all::OP_PUSHBYTES_0)
			                             .push_slice(&wpubkey_hash.into_inner())
			                             .into_script(),
		}
	}
}
