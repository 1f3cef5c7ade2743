//! Low-level utilities: logging, serialization, errors and byte munging.

#[macro_use]
pub(crate) mod macro_logger;

// These have to come after macro_logger to build
pub mod logger;
#[macro_use]
pub mod ser;
pub mod errors;

pub(crate) mod byte_utils;

#[cfg(test)]
pub(crate) mod test_utils;
