//! Wire message payloads for the channel-update round, and the
//! [`DecodeError`] type the serialization layer reports.
//!
//! Framing and transport are the client's problem; these are only the
//! payloads the core produces and consumes. One update round is four
//! messages: the pushing side opens with `RequestToSend`, the puller
//! counter-proposes with `AckSig` carrying its signature, the pusher answers
//! with `SigRev`, and the puller finishes with `Revoke`. Each side's
//! revoking elkrem hash rides in its first message of the round so the
//! recipient can build the new state's keys before signing.
//!
//! [`DecodeError`]: enum.DecodeError.html

use bitcoin::secp256k1::key::PublicKey;
use bitcoin::secp256k1::Signature;

use std::fmt;
use std::io::Read;

use util::ser::{Readable, Writeable, Writer};

/// Message type byte for [`RequestToSend`](struct.RequestToSend.html).
pub const MSG_RTS: u8 = 0x80;
/// Message type byte for [`AckSig`](struct.AckSig.html).
pub const MSG_ACKSIG: u8 = 0x81;
/// Message type byte for [`SigRev`](struct.SigRev.html).
pub const MSG_SIGREV: u8 = 0x82;
/// Message type byte for [`Revoke`](struct.Revoke.html).
pub const MSG_REVOKE: u8 = 0x83;

/// An error in decoding a message or struct.
#[derive(Debug)]
pub enum DecodeError {
	/// A version byte in the data was newer than we can handle
	UnknownVersion,
	/// Value was invalid, e.g. a byte which was supposed to be a public key
	/// was not on the curve
	InvalidValue,
	/// Buffer too short
	ShortRead,
	/// A length descriptor in the packet didn't describe the later data correctly
	BadLengthDescriptor,
	/// Error from std::io
	Io(::std::io::Error),
}

impl fmt::Display for DecodeError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			DecodeError::UnknownVersion => f.write_str("Unknown version byte"),
			DecodeError::InvalidValue => f.write_str("Nonsense bytes didn't map to the type they were interpreted as"),
			DecodeError::ShortRead => f.write_str("Packet extended beyond the provided bytes"),
			DecodeError::BadLengthDescriptor => f.write_str("A length descriptor in the packet didn't describe the later data correctly"),
			DecodeError::Io(ref e) => e.fmt(f),
		}
	}
}

impl From<::std::io::Error> for DecodeError {
	fn from(e: ::std::io::Error) -> Self {
		if e.kind() == ::std::io::ErrorKind::UnexpectedEof {
			DecodeError::ShortRead
		} else {
			DecodeError::Io(e)
		}
	}
}

/// The pushing side's opening message of an update round: how much it wants
/// to push, the revocation pubkey the recipient should lock the pusher's
/// money with in the new state, and the elkrem hash revoking the pusher's
/// previous state.
#[derive(Clone, PartialEq, Debug)]
pub struct RequestToSend {
	/// Satoshis pushed to the recipient in the proposed state.
	pub amt: u64,
	/// The recipient's `my_hakd_pub` for the new state.
	pub next_hakd_pub: PublicKey,
	/// The sender's elkrem hash for its previous state index.
	pub revoke_elkrem: [u8; 32],
}

/// The pulling side's answer: its signature on the pusher's new commitment,
/// plus the mirror-image key material for the pusher's record.
#[derive(Clone, PartialEq, Debug)]
pub struct AckSig {
	/// Signature over the pusher's new commitment transaction, DER, sighash
	/// byte stripped.
	pub sig: Signature,
	/// The pusher's `my_hakd_pub` for the new state.
	pub next_hakd_pub: PublicKey,
	/// The sender's elkrem hash for its previous state index.
	pub revoke_elkrem: [u8; 32],
}

/// The pusher's signature on the puller's new commitment, revoking the
/// pusher's old state as a side effect of the round.
#[derive(Clone, PartialEq, Debug)]
pub struct SigRev {
	/// Signature over the puller's new commitment transaction, DER, sighash
	/// byte stripped.
	pub sig: Signature,
	/// The sender's elkrem hash for its previous state index, repeated for
	/// hosts which deliver messages out of band.
	pub revoke_elkrem: [u8; 32],
}

/// The closing message of a round.
#[derive(Clone, PartialEq, Debug)]
pub struct Revoke {
	/// The sender's elkrem hash for its previous state index.
	pub revoke_elkrem: [u8; 32],
}

impl Writeable for RequestToSend {
	fn write<W: Writer>(&self, w: &mut W) -> Result<(), ::std::io::Error> {
		self.amt.write(w)?;
		self.next_hakd_pub.write(w)?;
		self.revoke_elkrem.write(w)?;
		Ok(())
	}
}

impl Readable for RequestToSend {
	fn read<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
		Ok(RequestToSend {
			amt: Readable::read(r)?,
			next_hakd_pub: Readable::read(r)?,
			revoke_elkrem: Readable::read(r)?,
		})
	}
}

impl Writeable for AckSig {
	fn write<W: Writer>(&self, w: &mut W) -> Result<(), ::std::io::Error> {
		self.sig.write(w)?;
		self.next_hakd_pub.write(w)?;
		self.revoke_elkrem.write(w)?;
		Ok(())
	}
}

impl Readable for AckSig {
	fn read<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
		Ok(AckSig {
			sig: Readable::read(r)?,
			next_hakd_pub: Readable::read(r)?,
			revoke_elkrem: Readable::read(r)?,
		})
	}
}

impl Writeable for SigRev {
	fn write<W: Writer>(&self, w: &mut W) -> Result<(), ::std::io::Error> {
		self.sig.write(w)?;
		self.revoke_elkrem.write(w)?;
		Ok(())
	}
}

impl Readable for SigRev {
	fn read<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
		Ok(SigRev {
			sig: Readable::read(r)?,
			revoke_elkrem: Readable::read(r)?,
		})
	}
}

impl Writeable for Revoke {
	fn write<W: Writer>(&self, w: &mut W) -> Result<(), ::std::io::Error> {
		self.revoke_elkrem.write(w)
	}
}

impl Readable for Revoke {
	fn read<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
		Ok(Revoke {
			revoke_elkrem: Readable::read(r)?,
		})
	}
}
