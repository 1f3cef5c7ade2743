//! Structs and traits which allow other parts of rust-paychan to interact
//! with the blockchain and with key material held by the client's wallet.

pub mod chaininterface;
pub mod keysinterface;
pub mod transaction;
