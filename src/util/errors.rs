//! Error types live here.

use std::fmt;

/// Indicates an error on the channel's state machine or its on-chain handling.
/// None of these are retried internally; the client decides whether to retry,
/// drop the offending message, or force-close the channel.
#[derive(Debug, PartialEq, Clone)]
pub enum ChanError {
	/// A required elkrem index has not been revealed by the counterparty yet.
	ElkUnknown,
	/// The elkrem receiver rejected a revealed hash as inconsistent with the tree.
	ElkInconsistent,
	/// A counterparty signature failed verification. The state was not updated.
	BadSig,
	/// A commitment was requested while an in-flight delta was unapplied.
	InflightNotFlushed,
	/// A protocol step arrived out of order and was refused.
	StateOrderViolation,
	/// The counterparty revealed an elkrem hash which does not match the
	/// revocation key they previously committed to. The channel cannot be
	/// advanced further and should be unilaterally closed.
	ChannelBroken,
	/// An on-chain script did not match what the channel state implies.
	ScriptMismatch,
	/// A transaction spending the funding outpoint has an unrecognised shape.
	MalformedClose,
	/// The given transaction does not spend this channel's funding outpoint.
	NotMyChannel,
	/// A signature or message failed to deserialize.
	DecodeErr,
	/// A durable-state invariant was violated. Indicates a bug in the caller
	/// (or an astronomically unlikely scalar overflow); do not continue using
	/// the channel record.
	InternalInvariant,
}

impl fmt::Display for ChanError {
	fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
		match *self {
			ChanError::ElkUnknown => f.write_str("Required elkrem hash not yet revealed"),
			ChanError::ElkInconsistent => f.write_str("Revealed elkrem hash inconsistent with tree"),
			ChanError::BadSig => f.write_str("Counterparty signature failed verification"),
			ChanError::InflightNotFlushed => f.write_str("In-flight delta must be folded before building a commitment"),
			ChanError::StateOrderViolation => f.write_str("Channel operation out of order"),
			ChanError::ChannelBroken => f.write_str("Counterparty revealed elkrem inconsistent with committed revocation key"),
			ChanError::ScriptMismatch => f.write_str("On-chain script does not match channel state"),
			ChanError::MalformedClose => f.write_str("Close transaction has unrecognised shape"),
			ChanError::NotMyChannel => f.write_str("Transaction does not spend the channel funding outpoint"),
			ChanError::DecodeErr => f.write_str("Failed to decode signature or message"),
			ChanError::InternalInvariant => f.write_str("Channel invariant violated, caller bug"),
		}
	}
}
