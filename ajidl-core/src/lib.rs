#![deny(
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    missing_docs
)]
#![warn(unreachable_pub, clippy::std_instead_of_core)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod log;

mod error;
pub use error::{Error, Result};
pub mod signature;
pub use signature::Signature;
pub mod idl;
pub use idl::Interface;
#[cfg(feature = "xml")]
pub mod xml;
