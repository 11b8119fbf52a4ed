#![no_std]
#![deny(missing_docs)]
//! # onewire-core
//! A no-std implementation of the 1-Wire protocol vocabulary.
//!
//! This crate provides a trait-based interface for mastering a 1-Wire bus, allowing you to implement the protocol on various platforms.
//! [OneWireMaster] defines the basic operations required of a bus master, such as resetting the bus, writing and reading bytes, and writing and reading bits.
//! It also includes an asynchronous version of the trait, [OneWireMasterAsync], for use in async environments.
//!
//! The crate also provides the [RomId] 64-bit ROM identifier shared by bus masters and slave emulators, and the
//! [OneWireCrc] CRC-8 used to protect it.

pub mod consts;
mod error;
mod rom;
mod traits;
mod traits_async;
mod utils;
pub use consts::*;
pub use error::OneWireError;
pub use rom::RomId;
pub use traits::OneWireMaster;
pub use traits_async::OneWireMasterAsync;
pub use utils::OneWireCrc;

/// Error type for 1-Wire operations.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;
