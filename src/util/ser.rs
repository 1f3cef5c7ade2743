//! A very simple serialization framework which is used for durable channel
//! records and for the wire messages in [`ln::msgs`].
//!
//! [`ln::msgs`]: ../../ln/msgs/index.html

use std::io::Read;

use bitcoin::blockdata::script::Script;
use bitcoin::blockdata::transaction::TxOut;
use bitcoin::hash_types::Txid;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::key::PublicKey;
use bitcoin::secp256k1::Signature;

use ln::msgs::DecodeError;
use util::byte_utils;

const MAX_BUF_SIZE: usize = 64 * 1024;

/// A sink to which serialized data is written.
///
/// Wrap a [`std::io::Write`] in a [`WriterWriteAdaptor`] to get one.
pub trait Writer {
	/// Writes the given buf out. See std::io::Write::write_all for more
	fn write_all(&mut self, buf: &[u8]) -> Result<(), ::std::io::Error>;
	/// Hints that data of the given size is about the be written. This may not always be called
	/// prior to data being written and may be safely ignored.
	fn size_hint(&mut self, size: usize);
}

/// A [`Writer`] over any [`std::io::Write`].
pub struct WriterWriteAdaptor<'a, W: ::std::io::Write + 'a>(pub &'a mut W);

impl<'a, W: ::std::io::Write> Writer for WriterWriteAdaptor<'a, W> {
	#[inline]
	fn write_all(&mut self, buf: &[u8]) -> Result<(), ::std::io::Error> {
		self.0.write_all(buf)
	}
	#[inline]
	fn size_hint(&mut self, _size: usize) { }
}

/// A [`Writer`] collecting into an in-memory buffer.
pub struct VecWriter(pub Vec<u8>);

impl Writer for VecWriter {
	#[inline]
	fn write_all(&mut self, buf: &[u8]) -> Result<(), ::std::io::Error> {
		self.0.extend_from_slice(buf);
		Ok(())
	}
	#[inline]
	fn size_hint(&mut self, size: usize) {
		self.0.reserve_exact(size);
	}
}

/// Objects which can be written out to a Writer.
pub trait Writeable {
	/// Writes self out to the given Writer
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error>;

	/// Writes self out to a Vec<u8>
	fn encode(&self) -> Vec<u8> {
		let mut msg = VecWriter(Vec::new());
		self.write(&mut msg).unwrap();
		msg.0
	}
}

/// Objects which can be read in from a Read.
pub trait Readable
	where Self: Sized
{
	/// Reads Self in from the given Read
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError>;
}

/// Objects which can be read in from a Read, given some additional
/// non-serialized state (e.g. a logger handle) to fill in.
pub trait ReadableArgs<P>
	where Self: Sized
{
	/// Reads Self in from the given Read
	fn read<R: Read>(reader: &mut R, params: P) -> Result<Self, DecodeError>;
}

macro_rules! hash_to_message {
	($slice: expr) => {
		::bitcoin::secp256k1::Message::from_slice($slice).unwrap()
	};
}

impl Writeable for u8 {
	#[inline]
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		writer.write_all(&[*self])
	}
}
impl Readable for u8 {
	#[inline]
	fn read<R: Read>(reader: &mut R) -> Result<u8, DecodeError> {
		let mut buf = [0; 1];
		reader.read_exact(&mut buf)?;
		Ok(buf[0])
	}
}

impl Writeable for u16 {
	#[inline]
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		writer.write_all(&byte_utils::be16_to_array(*self))
	}
}
impl Readable for u16 {
	#[inline]
	fn read<R: Read>(reader: &mut R) -> Result<u16, DecodeError> {
		let mut buf = [0; 2];
		reader.read_exact(&mut buf)?;
		Ok(byte_utils::slice_to_be16(&buf))
	}
}

impl Writeable for u32 {
	#[inline]
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		writer.write_all(&byte_utils::be32_to_array(*self))
	}
}
impl Readable for u32 {
	#[inline]
	fn read<R: Read>(reader: &mut R) -> Result<u32, DecodeError> {
		let mut buf = [0; 4];
		reader.read_exact(&mut buf)?;
		Ok(byte_utils::slice_to_be32(&buf))
	}
}

impl Writeable for u64 {
	#[inline]
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		writer.write_all(&byte_utils::be64_to_array(*self))
	}
}
impl Readable for u64 {
	#[inline]
	fn read<R: Read>(reader: &mut R) -> Result<u64, DecodeError> {
		let mut buf = [0; 8];
		reader.read_exact(&mut buf)?;
		Ok(byte_utils::slice_to_be64(&buf))
	}
}

// Serialized as two's-complement big-endian; used for in-flight deltas.
impl Writeable for i64 {
	#[inline]
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		(*self as u64).write(writer)
	}
}
impl Readable for i64 {
	#[inline]
	fn read<R: Read>(reader: &mut R) -> Result<i64, DecodeError> {
		Ok(<u64 as Readable>::read(reader)? as i64)
	}
}

impl Writeable for [u8; 32] {
	#[inline]
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		writer.write_all(self)
	}
}
impl Readable for [u8; 32] {
	#[inline]
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		let mut buf = [0; 32];
		reader.read_exact(&mut buf)?;
		Ok(buf)
	}
}

impl<T: Writeable> Writeable for Option<T> {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		match *self {
			None => 0u8.write(writer)?,
			Some(ref data) => {
				1u8.write(writer)?;
				data.write(writer)?;
			},
		}
		Ok(())
	}
}
impl<T: Readable> Readable for Option<T> {
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		match <u8 as Readable>::read(reader)? {
			0u8 => Ok(None),
			1u8 => Ok(Some(Readable::read(reader)?)),
			_ => Err(DecodeError::InvalidValue),
		}
	}
}

impl Writeable for PublicKey {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		writer.write_all(&self.serialize())
	}
}
impl Readable for PublicKey {
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		let mut buf = [0; 33];
		reader.read_exact(&mut buf)?;
		match PublicKey::from_slice(&buf) {
			Ok(key) => Ok(key),
			Err(_) => Err(DecodeError::InvalidValue),
		}
	}
}

// Variable-length DER, without the trailing sighash byte.
impl Writeable for Signature {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		let der = self.serialize_der();
		(der.len() as u16).write(writer)?;
		writer.write_all(&der)
	}
}
impl Readable for Signature {
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		let len = <u16 as Readable>::read(reader)? as usize;
		if len > 73 {
			return Err(DecodeError::InvalidValue);
		}
		let mut buf = [0; 73];
		reader.read_exact(&mut buf[..len])?;
		match Signature::from_der(&buf[..len]) {
			Ok(sig) => Ok(sig),
			Err(_) => Err(DecodeError::InvalidValue),
		}
	}
}

impl Writeable for Txid {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		writer.write_all(&self[..])
	}
}
impl Readable for Txid {
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		let buf: [u8; 32] = Readable::read(reader)?;
		Ok(Txid::from_slice(&buf).unwrap())
	}
}

impl Writeable for Script {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		(self.len() as u16).write(writer)?;
		writer.write_all(self.as_bytes())
	}
}
impl Readable for Script {
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		let len = <u16 as Readable>::read(reader)? as usize;
		if len > MAX_BUF_SIZE {
			return Err(DecodeError::BadLengthDescriptor);
		}
		let mut buf = vec![0; len];
		reader.read_exact(&mut buf)?;
		Ok(Script::from(buf))
	}
}

impl Writeable for TxOut {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		self.value.write(writer)?;
		self.script_pubkey.write(writer)
	}
}
impl Readable for TxOut {
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		Ok(TxOut {
			value: Readable::read(reader)?,
			script_pubkey: Readable::read(reader)?,
		})
	}
}
