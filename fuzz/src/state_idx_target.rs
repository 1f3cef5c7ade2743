// Round-trip totality of the masked state-index encoding: any 48-bit index
// under any 48-bit offset must come back out of the sequence/locktime bits
// exactly, and decoding must never panic whatever the fields hold.

use bitcoin::blockdata::script::Script;
use bitcoin::blockdata::transaction::{OutPoint, Transaction, TxIn};
use bitcoin::hash_types::Txid;
use bitcoin::hashes::Hash;

use paychan::ln::channel::{get_state_idx_from_tx, set_state_idx_bits};

const MAX_48: u64 = 0x0000_ffff_ffff_ffff;

fn slice_to_u64(slice: &[u8]) -> u64 {
	let mut val = 0u64;
	for byte in slice.iter() {
		val = (val << 8) | *byte as u64;
	}
	val
}

#[inline]
pub fn do_test(data: &[u8]) {
	if data.len() < 16 {
		return;
	}
	let state_idx = slice_to_u64(&data[0..8]) & MAX_48;
	let offset = slice_to_u64(&data[8..16]) & MAX_48;

	let mut tx = Transaction {
		version: 2,
		lock_time: 0,
		input: vec![TxIn {
			previous_output: OutPoint { txid: Txid::from_slice(&[7; 32]).unwrap(), vout: 0 },
			script_sig: Script::new(),
			sequence: 0,
			witness: Vec::new(),
		}],
		output: Vec::new(),
	};
	set_state_idx_bits(&mut tx, state_idx, offset).unwrap();
	assert_eq!(get_state_idx_from_tx(&tx, offset), state_idx);

	// Decoding with arbitrary fields must be total.
	tx.input[0].sequence = slice_to_u64(&data[0..4]) as u32;
	tx.lock_time = slice_to_u64(&data[4..8]) as u32;
	get_state_idx_from_tx(&tx, offset);
	get_state_idx_from_tx(&tx, slice_to_u64(&data[8..16]));
}

#[no_mangle]
pub extern "C" fn state_idx_run(data: *const u8, datalen: usize) {
	let data = unsafe { std::slice::from_raw_parts(data, datalen) };
	do_test(data);
}
