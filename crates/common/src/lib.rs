//! Wire-level primitives shared across the segment-store protocol crates.
//!
//! Provides low-level encode/decode traits and the associated error type used
//! when reading typed fields from a raw byte buffer.

mod error;
mod wire;

pub use error::WireError;
pub use wire::{WireDecode, WireEncode};
