//! High level channel bits.
//!
//! A [`channel::Qchan`] is the durable record of one bilateral channel; its
//! methods implement the sign / counter-sign / revoke update round.
//! [`channelmonitor`] classifies transactions spending the funding outpoint
//! and builds remedy sweeps of revoked broadcasts, and [`elkrem`] is the
//! revealable hash tree the revocation scheme is built on.
//!
//! [`channel::Qchan`]: channel/struct.Qchan.html
//! [`channelmonitor`]: channelmonitor/index.html
//! [`elkrem`]: elkrem/index.html

pub mod channel;
pub mod channelmonitor;
pub mod chan_utils;
pub mod elkrem;
pub mod msgs;

#[cfg(test)]
mod functional_tests;
