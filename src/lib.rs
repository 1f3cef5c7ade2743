#![crate_name = "paychan"]

//! Duplex payment channels over Bitcoin.
//!
//! Implements the hard parts of a two-party payment channel: the elkrem
//! revocation tree, the HAKD key-derivation algebra, commitment transaction
//! construction with a masked state index, the sign/verify/revoke state
//! machine, and classification of on-chain closes including remedy (grab)
//! transactions for revoked broadcasts.
//!
//! Chain access, persistent storage and peer transport are left to the
//! client, which drives this library through the narrow traits in `chain`.

extern crate bitcoin;

#[cfg(test)]
extern crate hex;

#[macro_use]
pub mod util;
pub mod chain;
pub mod ln;
