//! Contains simple structs describing parts of transactions on the chain.

use std::io::Read;

use bitcoin::blockdata::transaction::OutPoint as BitcoinOutPoint;
use bitcoin::hash_types::Txid;

use ln::msgs::DecodeError;
use util::ser::{Readable, Writeable, Writer};

/// A reference to a transaction output.
///
/// Differs from bitcoin::blockdata::transaction::OutPoint as the index is a
/// u16 instead of u32 (funding transactions never have that many outputs).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct OutPoint {
	/// The referenced transaction's txid.
	pub txid: Txid,
	/// The index of the referenced output in its transaction's vout.
	pub index: u16,
}

impl OutPoint {
	/// Creates a new `OutPoint` from the txid and the index.
	pub fn new(txid: Txid, index: u16) -> OutPoint {
		OutPoint { txid, index }
	}

	/// Converts this OutPoint into the OutPoint field as used by rust-bitcoin
	pub fn into_bitcoin_outpoint(&self) -> BitcoinOutPoint {
		BitcoinOutPoint {
			txid: self.txid,
			vout: self.index as u32,
		}
	}
}

impl Writeable for OutPoint {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		self.txid.write(writer)?;
		self.index.write(writer)?;
		Ok(())
	}
}

impl Readable for OutPoint {
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		Ok(OutPoint {
			txid: Readable::read(reader)?,
			index: Readable::read(reader)?,
		})
	}
}
