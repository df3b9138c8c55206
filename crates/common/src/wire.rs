//! Typed big-endian field reads and writes over raw wire buffers.
//!
//! Every multi-byte integer on the wire is big-endian. Variable-size fields
//! (segment names, tokens, event bodies) are length-prefixed; identifiers
//! (writers, attributes) are 16 raw bytes carried as `u128`.

use std::mem::size_of;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::WireError;

/// Extension trait on [`Bytes`] for reading typed wire-protocol fields.
pub trait WireDecode {
    fn read_u8(&mut self) -> Result<u8, WireError>;
    fn read_u16(&mut self) -> Result<u16, WireError>;
    fn read_u32(&mut self) -> Result<u32, WireError>;
    fn read_i32(&mut self) -> Result<i32, WireError>;
    fn read_i64(&mut self) -> Result<i64, WireError>;
    /// Reads a 16-byte identifier (writer or attribute id).
    fn read_u128(&mut self) -> Result<u128, WireError>;
    /// Reads a single byte that must be `0` or `1`.
    fn read_bool(&mut self) -> Result<bool, WireError>;
    /// Reads a 2-byte length prefix followed by that many bytes.
    fn read_length_prefixed_u16(&mut self) -> Result<Bytes, WireError>;
    /// Reads a 4-byte length prefix followed by that many bytes.
    fn read_length_prefixed_u32(&mut self) -> Result<Bytes, WireError>;
}

fn check_remaining(src: &Bytes, expected: usize) -> Result<(), WireError> {
    if src.remaining() < expected {
        return Err(WireError::BufferTooShort { expected, actual: src.remaining() });
    }
    Ok(())
}

impl WireDecode for Bytes {
    fn read_u8(&mut self) -> Result<u8, WireError> {
        check_remaining(self, size_of::<u8>())?;
        Ok(self.get_u8())
    }

    fn read_u16(&mut self) -> Result<u16, WireError> {
        check_remaining(self, size_of::<u16>())?;
        Ok(self.get_u16())
    }

    fn read_u32(&mut self) -> Result<u32, WireError> {
        check_remaining(self, size_of::<u32>())?;
        Ok(self.get_u32())
    }

    fn read_i32(&mut self) -> Result<i32, WireError> {
        check_remaining(self, size_of::<i32>())?;
        Ok(self.get_i32())
    }

    fn read_i64(&mut self) -> Result<i64, WireError> {
        check_remaining(self, size_of::<i64>())?;
        Ok(self.get_i64())
    }

    fn read_u128(&mut self) -> Result<u128, WireError> {
        check_remaining(self, size_of::<u128>())?;
        Ok(self.get_u128())
    }

    fn read_bool(&mut self) -> Result<bool, WireError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::InvalidBool(other)),
        }
    }

    fn read_length_prefixed_u16(&mut self) -> Result<Bytes, WireError> {
        let length = self.read_u16()? as usize;
        check_remaining(self, length)?;
        Ok(self.copy_to_bytes(length))
    }

    fn read_length_prefixed_u32(&mut self) -> Result<Bytes, WireError> {
        let length = self.read_u32()? as usize;
        check_remaining(self, length)?;
        Ok(self.copy_to_bytes(length))
    }
}

/// Extension trait on [`BytesMut`] for writing typed wire-protocol fields.
///
/// Mirrors [`WireDecode`] so encode and decode stay symmetric across commands.
/// Fixed-width writes come straight from [`BufMut`]; only the length-prefixed
/// forms need helpers.
pub trait WireEncode {
    /// Writes a 2-byte length prefix followed by the given bytes.
    fn put_length_prefixed_u16(&mut self, bytes: impl AsRef<[u8]>);
    /// Writes a 4-byte length prefix followed by the given bytes.
    fn put_length_prefixed_u32(&mut self, bytes: impl AsRef<[u8]>);
    /// Writes a bool as a single `0`/`1` byte.
    fn put_bool(&mut self, value: bool);
}

impl WireEncode for BytesMut {
    fn put_length_prefixed_u16(&mut self, bytes: impl AsRef<[u8]>) {
        let bytes = bytes.as_ref();
        self.put_u16(bytes.len() as u16);
        self.put(bytes);
    }

    fn put_length_prefixed_u32(&mut self, bytes: impl AsRef<[u8]>) {
        let bytes = bytes.as_ref();
        self.put_u32(bytes.len() as u32);
        self.put(bytes);
    }

    fn put_bool(&mut self, value: bool) {
        self.put_u8(value as u8);
    }
}
