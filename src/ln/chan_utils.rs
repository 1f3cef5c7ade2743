//! Various utilities for building scripts and deriving keys related to
//! channel transactions. The two script templates here, together with the
//! scalar-tweak key derivation, are the whole on-chain surface of a channel.

use bitcoin::blockdata::opcodes;
use bitcoin::blockdata::script::{Builder, Script};
use bitcoin::blockdata::transaction::TxOut;
use bitcoin::hash_types::WPubkeyHash;
use bitcoin::hashes::sha256::Hash as Sha256;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::key::{PublicKey, SecretKey};
use bitcoin::secp256k1::{Secp256k1, Verification};

use util::errors::ChanError;

/// Builds the 2-of-2 redeemscript locking the channel funding output. The
/// keys are sorted lexicographically by their compressed serialization so
/// both sides build identical bytes; the returned bool reports whether the
/// sort reversed the argument order. Callers need it to order witness
/// signatures for OP_CHECKMULTISIG.
pub fn make_funding_redeemscript(a: &PublicKey, b: &PublicKey) -> (Script, bool) {
	let our_bytes = a.serialize();
	let their_bytes = b.serialize();
	let swapped = their_bytes[..] < our_bytes[..];
	let (first, second) = if swapped {
		(&their_bytes, &our_bytes)
	} else {
		(&our_bytes, &their_bytes)
	};
	let script = Builder::new().push_opcode(opcodes::all::OP_PUSHNUM_2)
	                           .push_slice(&first[..])
	                           .push_slice(&second[..])
	                           .push_opcode(opcodes::all::OP_PUSHNUM_2)
	                           .push_opcode(opcodes::all::OP_CHECKMULTISIG)
	                           .into_script();
	(script, swapped)
}

/// Builds the script locking the encumbered leg of a commitment transaction:
/// spendable at once with a signature for `revocation_key`, or after
/// `csv_delay` blocks with a signature for `timeout_key`.
pub fn get_revokeable_redeemscript(revocation_key: &PublicKey, csv_delay: u16, timeout_key: &PublicKey) -> Script {
	Builder::new().push_opcode(opcodes::all::OP_DUP)
	              .push_slice(&revocation_key.serialize())
	              .push_opcode(opcodes::all::OP_CHECKSIG)
	              .push_opcode(opcodes::all::OP_NOTIF)
	              .push_slice(&timeout_key.serialize())
	              .push_opcode(opcodes::all::OP_CHECKSIGVERIFY)
	              .push_int(csv_delay as i64)
	              .push_opcode(opcodes::all::OP_CSV)
	              .push_opcode(opcodes::all::OP_ENDIF)
	              .into_script()
}

/// Wraps a witness script into a version-0 P2WSH output script.
pub fn script_to_p2wsh(script: &Script) -> Script {
	Builder::new().push_opcode(opcodes::all::OP_PUSHBYTES_0)
	              .push_slice(&Sha256::hash(script.as_bytes()).into_inner())
	              .into_script()
}

/// Builds the P2WPKH output script paying directly to the given key.
pub fn get_p2wpkh(key: &PublicKey) -> Script {
	Builder::new().push_opcode(opcodes::all::OP_PUSHBYTES_0)
	              .push_slice(&WPubkeyHash::hash(&key.serialize()).into_inner())
	              .into_script()
}

/// Adds `elk_scalar * G` to a base point. This is how every per-state key in
/// the channel is produced from its base.
pub fn derive_public_key<C: Verification>(secp_ctx: &Secp256k1<C>, base_point: &PublicKey, elk_scalar: &[u8; 32]) -> Result<PublicKey, ChanError> {
	let mut key = base_point.clone();
	// Fails only if the scalar is >= the curve order or the sum is the point
	// at infinity; either means something is deeply wrong.
	match key.add_exp_assign(secp_ctx, &elk_scalar[..]) {
		Ok(_) => Ok(key),
		Err(_) => Err(ChanError::InternalInvariant),
	}
}

/// Adds `elk_scalar` to a base secret key, mod the curve order. The result
/// pairs with [`derive_public_key`] of the corresponding base point; the
/// revocation scheme depends on that.
///
/// [`derive_public_key`]: fn.derive_public_key.html
pub fn derive_private_key(elk_scalar: &[u8; 32], base_secret: &SecretKey) -> Result<SecretKey, ChanError> {
	let mut key = base_secret.clone();
	match key.add_assign(&elk_scalar[..]) {
		Ok(_) => Ok(key),
		Err(_) => Err(ChanError::InternalInvariant),
	}
}

/// Sorts transaction outputs per BIP-69 (value ascending, then output script
/// lexicographically), so both sides assemble byte-identical transactions.
pub fn sort_outputs(outputs: &mut Vec<TxOut>) {
	outputs.sort_unstable_by(|a, b| {
		a.value.cmp(&b.value).then_with(|| {
			a.script_pubkey.as_bytes().cmp(b.script_pubkey.as_bytes())
		})
	});
}
