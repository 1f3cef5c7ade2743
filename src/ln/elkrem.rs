//! The elkrem tree: a forward-revealable sequence of up to 2^48 - 1 hashes.
//!
//! The sender can produce the hash at any index from a single 32-byte root.
//! The receiver ingests hashes one at a time, in order, and can re-derive any
//! previously ingested hash while only ever storing one node per tree level.
//!
//! Hashes are revealed in post-order: every third reveal (on average) is the
//! parent of two earlier reveals, which lets the receiver both verify it and
//! drop the two children. A freshly revealed leaf has no children to check
//! against, so roughly half of all invalid reveals are only caught one or two
//! reveals later; callers must treat `add_next` success as provisional until
//! the hash is actually used.

use bitcoin::hashes::sha256d::Hash as Sha256dHash;
use bitcoin::hashes::Hash;

use util::errors::ChanError;
use util::ser::{Readable, Writeable, Writer};

use ln::msgs::DecodeError;

use std::io::Read;

/// Height of the full elkrem tree.
pub const MAX_HEIGHT: u8 = 47;
/// Largest index either side of the tree can produce; the root of a
/// post-order-indexed full tree of height 47.
pub const MAX_INDEX: u64 = (1u64 << 48) - 2;

fn left_sha(sha: &[u8; 32]) -> [u8; 32] {
	Sha256dHash::hash(sha).into_inner()
}

// The right child is tagged with a trailing byte so siblings never collide.
fn right_sha(sha: &[u8; 32]) -> [u8; 32] {
	let mut buf = [0u8; 33];
	buf[..32].copy_from_slice(sha);
	buf[32] = 1;
	Sha256dHash::hash(&buf).into_inner()
}

/// Walks from the subtree root at post-order index `from` (height `height`)
/// down to the node at index `to`. Left children live at `i - 2^h`, right
/// children at `i - 1`.
fn descend(to: u64, from: u64, height: u8, sha: [u8; 32]) -> Result<[u8; 32], ChanError> {
	let mut i = from;
	let mut h = height;
	let mut cur = sha;
	while i > to {
		if h == 0 {
			// Ran out of tree without hitting the index; the index is not
			// under this root.
			return Err(ChanError::ElkUnknown);
		}
		let sub = 1u64 << h;
		if sub > i {
			return Err(ChanError::ElkUnknown);
		}
		if to <= i - sub {
			cur = left_sha(&cur);
			i -= sub;
		} else {
			cur = right_sha(&cur);
			i -= 1;
		}
		h -= 1;
	}
	Ok(cur)
}

/// The sending half of an elkrem tree: produces the hash at any index
/// directly from the root.
#[derive(Clone, PartialEq)]
pub struct ElkremSender {
	root: [u8; 32],
}

impl ElkremSender {
	/// Builds a sender from a channel-specific root secret.
	pub fn new(root: [u8; 32]) -> ElkremSender {
		ElkremSender { root }
	}

	/// Returns the hash at the given index, for any `idx <= MAX_INDEX`.
	pub fn at(&self, idx: u64) -> Result<[u8; 32], ChanError> {
		if idx > MAX_INDEX {
			return Err(ChanError::ElkUnknown);
		}
		descend(idx, MAX_INDEX, MAX_HEIGHT, self.root)
	}
}

#[derive(Clone, PartialEq)]
struct ElkremNode {
	idx: u64,
	height: u8,
	sha: [u8; 32],
}

/// The receiving half of an elkrem tree: ingests revealed hashes in index
/// order, keeping at most one node per level.
#[derive(Clone, PartialEq)]
pub struct ElkremReceiver {
	stack: Vec<ElkremNode>,
}

impl ElkremReceiver {
	/// Builds an empty receiver; `upto` starts out as None.
	pub fn new() -> ElkremReceiver {
		ElkremReceiver { stack: Vec::new() }
	}

	/// The largest index ingested so far, or None if nothing has been.
	pub fn upto(&self) -> Option<u64> {
		self.stack.last().map(|node| node.idx)
	}

	/// Ingests the next revealed hash.
	///
	/// If the hash closes off a subtree (both its children were previously
	/// revealed) it is verified against them and replaces them on the stack;
	/// otherwise it is accepted provisionally.
	pub fn add_next(&mut self, sha: [u8; 32]) -> Result<(), ChanError> {
		let mut node = ElkremNode { idx: 0, height: 0, sha };
		if let Some(top) = self.stack.last() {
			if top.idx >= MAX_INDEX {
				return Err(ChanError::ElkInconsistent);
			}
			node.idx = top.idx + 1;
		}
		let t = self.stack.len();
		if t >= 2 && self.stack[t - 2].height == self.stack[t - 1].height {
			// This reveal must be the parent of the top two nodes.
			if left_sha(&sha) != self.stack[t - 2].sha {
				return Err(ChanError::ElkInconsistent);
			}
			if right_sha(&sha) != self.stack[t - 1].sha {
				return Err(ChanError::ElkInconsistent);
			}
			node.height = self.stack[t - 1].height + 1;
			self.stack.truncate(t - 2);
		}
		self.stack.push(node);
		Ok(())
	}

	/// Returns the stored hash for any index up to and including `upto()`.
	pub fn at(&self, idx: u64) -> Result<[u8; 32], ChanError> {
		for node in self.stack.iter() {
			if idx <= node.idx {
				return descend(idx, node.idx, node.height, node.sha);
			}
		}
		Err(ChanError::ElkUnknown)
	}
}

impl Writeable for ElkremSender {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		self.root.write(writer)
	}
}

impl Readable for ElkremSender {
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		Ok(ElkremSender { root: Readable::read(reader)? })
	}
}

impl Writeable for ElkremReceiver {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ::std::io::Error> {
		(self.stack.len() as u8).write(writer)?;
		for node in self.stack.iter() {
			node.idx.write(writer)?;
			node.height.write(writer)?;
			node.sha.write(writer)?;
		}
		Ok(())
	}
}

impl Readable for ElkremReceiver {
	fn read<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
		let len = <u8 as Readable>::read(reader)?;
		// One left-spine node per level plus the latest reveal.
		if len > MAX_HEIGHT + 1 {
			return Err(DecodeError::InvalidValue);
		}
		let mut stack = Vec::with_capacity(len as usize);
		let mut last_idx = None;
		for _ in 0..len {
			let node = ElkremNode {
				idx: Readable::read(reader)?,
				height: Readable::read(reader)?,
				sha: Readable::read(reader)?,
			};
			if node.idx > MAX_INDEX || node.height > MAX_HEIGHT {
				return Err(DecodeError::InvalidValue);
			}
			if let Some(prev) = last_idx {
				if node.idx <= prev {
					return Err(DecodeError::InvalidValue);
				}
			}
			last_idx = Some(node.idx);
			stack.push(node);
		}
		Ok(ElkremReceiver { stack })
	}
}
