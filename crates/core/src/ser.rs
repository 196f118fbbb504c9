//! A simple trait for binary (de)Serialization using std `Read` and `Write` traits.
//!
//! Every structure on the wire is a fixed concatenation of fixed-width or
//! explicitly length-prefixed fields. Integers are big-endian. Sequences are
//! prefixed by a 4-byte count. There are no delimiters and no optional gaps.

use std::io::{Cursor, Error as IOError, Read, Write};

use thiserror::Error;

use crate::enc::bases::{decode_hex, EncodingError};

/// The codec version this library reads and writes.
pub const LATEST_CODEC: u16 = 0;

/// The largest memo a transaction may carry.
pub const MAX_MEMO_LENGTH: usize = 256;

// Upper bound on speculative allocation when a length prefix is read from
// untrusted input. Larger sequences still decode, they just grow as they go.
const MAX_PREALLOCATION: usize = 1024;

/// Errors related to serialization of types.
#[derive(Debug, Error)]
pub enum SerError {
    /// IOError bubbled up from a `Write` passed to a `ByteFormat::write_to` implementation,
    /// or a `Read` that ran out of bytes.
    #[error(transparent)]
    IOError(#[from] IOError),

    /// An encoding error while converting from a string representation.
    #[error(transparent)]
    EncodingError(#[from] EncodingError),

    /// Got an input type tag that no input variant is registered for.
    #[error("Unknown input type ID: {0}")]
    UnknownInputId(u32),

    /// Got an output type tag that no output variant is registered for.
    #[error("Unknown output type ID: {0}")]
    UnknownOutputId(u32),

    /// Got a payload, transaction or credential type tag that is not registered.
    #[error("Unknown type ID: {0}")]
    UnknownTypeId(u32),

    /// An owner set requires more signatures than it has addresses.
    #[error("Threshold {threshold} is greater than the number of addresses ({addresses})")]
    ThresholdTooHigh {
        /// The requested threshold
        threshold: u32,
        /// The number of addresses in the owner set
        addresses: usize,
    },

    /// Memos are capped at `MAX_MEMO_LENGTH` bytes.
    #[error("Memo is {0} bytes. Max is 256.")]
    MemoTooLong(usize),

    /// The codec version prefix is not one we know how to read.
    #[error("Unsupported codec version: {0}")]
    UnsupportedCodec(u16),

    /// `from_bytes` finished decoding before the end of its input.
    #[error("Got {0} trailing bytes after deserialization")]
    TrailingBytes(usize),

    /// A sequence is too long for its 4-byte length prefix.
    #[error("Sequence of {0} items does not fit a 4-byte length prefix")]
    SequenceTooLong(usize),

    /// Error bubbled up from a nested component.
    #[error("Error in component: {0}")]
    ComponentError(String),
}

/// Type alias for serialization errors
pub type SerResult<T> = Result<T, SerError>;

/// Read a single byte.
pub fn read_u8<R>(reader: &mut R) -> SerResult<u8>
where
    R: Read,
{
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Write a single byte.
pub fn write_u8<W>(writer: &mut W, number: u8) -> SerResult<usize>
where
    W: Write,
{
    writer.write_all(&[number])?;
    Ok(1)
}

/// Convenience function for reading a BE u16
pub fn read_u16_be<R>(reader: &mut R) -> SerResult<u16>
where
    R: Read,
{
    Ok(u16::from_be_bytes(read_array(reader)?))
}

/// Convenience function for writing a BE u16
pub fn write_u16_be<W>(writer: &mut W, number: u16) -> SerResult<usize>
where
    W: Write,
{
    writer.write_all(&number.to_be_bytes())?;
    Ok(2)
}

/// Convenience function for reading a BE u32
pub fn read_u32_be<R>(reader: &mut R) -> SerResult<u32>
where
    R: Read,
{
    Ok(u32::from_be_bytes(read_array(reader)?))
}

/// Convenience function for writing a BE u32
pub fn write_u32_be<W>(writer: &mut W, number: u32) -> SerResult<usize>
where
    W: Write,
{
    writer.write_all(&number.to_be_bytes())?;
    Ok(4)
}

/// Convenience function for reading a BE u64
pub fn read_u64_be<R>(reader: &mut R) -> SerResult<u64>
where
    R: Read,
{
    Ok(u64::from_be_bytes(read_array(reader)?))
}

/// Convenience function for writing a BE u64
pub fn write_u64_be<W>(writer: &mut W, number: u64) -> SerResult<usize>
where
    W: Write,
{
    writer.write_all(&number.to_be_bytes())?;
    Ok(8)
}

/// Read exactly `N` bytes into an array.
pub fn read_array<R, const N: usize>(reader: &mut R) -> SerResult<[u8; N]>
where
    R: Read,
{
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Convert a length to its 4-byte prefix.
pub fn length_prefix(len: usize) -> SerResult<u32> {
    u32::try_from(len).map_err(|_| SerError::SequenceTooLong(len))
}

/// Read a 4-byte length, then that many bytes.
pub fn read_prefixed_bytes<R>(reader: &mut R) -> SerResult<Vec<u8>>
where
    R: Read,
{
    let len = read_u32_be(reader)? as u64;
    let mut buf = Vec::with_capacity(std::cmp::min(len as usize, MAX_PREALLOCATION));
    reader.by_ref().take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(IOError::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(buf)
}

/// Write a 4-byte length, then the bytes.
pub fn write_prefixed_bytes<W>(writer: &mut W, bytes: &[u8]) -> SerResult<usize>
where
    W: Write,
{
    let mut len = write_u32_be(writer, length_prefix(bytes.len())?)?;
    writer.write_all(bytes)?;
    len += bytes.len();
    Ok(len)
}

/// Read the 2-byte codec version and reject versions other than `LATEST_CODEC`.
pub fn read_codec_version<R>(reader: &mut R) -> SerResult<u16>
where
    R: Read,
{
    let version = read_u16_be(reader)?;
    if version != LATEST_CODEC {
        return Err(SerError::UnsupportedCodec(version));
    }
    Ok(version)
}

/// The serialized length of a count-prefixed sequence.
pub fn seq_length<T>(items: &[T]) -> usize
where
    T: ByteFormat,
{
    4 + items.iter().map(ByteFormat::serialized_length).sum::<usize>()
}

/// Decode a node-style array: a 2-byte codec version, a 4-byte count, then that many items.
/// The whole of `bytes` must be consumed.
pub fn read_codec_seq<T>(bytes: &[u8]) -> Result<Vec<T>, T::Error>
where
    T: ByteFormat,
{
    let mut cursor = Cursor::new(bytes);
    read_codec_version(&mut cursor)?;
    let items = T::read_seq_from(&mut cursor)?;
    check_consumed(&cursor)?;
    Ok(items)
}

/// Encode a node-style array: a 2-byte codec version, a 4-byte count, then the items.
pub fn write_codec_seq<T>(items: &[T]) -> Result<Vec<u8>, T::Error>
where
    T: ByteFormat,
{
    let mut buf = Vec::with_capacity(2 + seq_length(items));
    write_u16_be(&mut buf, LATEST_CODEC)?;
    T::write_seq_to(&mut buf, items)?;
    Ok(buf)
}

fn check_consumed(cursor: &Cursor<&[u8]>) -> SerResult<()> {
    let remaining = cursor.get_ref().len() as u64 - cursor.position();
    if remaining != 0 {
        return Err(SerError::TrailingBytes(remaining as usize));
    }
    Ok(())
}

/// A simple trait for deserializing from `std::io::Read` and serializing to `std::io::Write`.
///
/// `ByteFormat` is used for every wire entity: IDs, inputs, outputs, payloads, UTXOs and
/// transactions. Decoding leaves the reader positioned exactly past the entity's extent, so
/// entities can be read back to back from a single stream.
pub trait ByteFormat {
    /// An associated error type
    type Error: From<SerError> + From<IOError> + std::error::Error;

    /// Returns the byte-length of the serialized data structure.
    fn serialized_length(&self) -> usize;

    /// Deserializes an instance of `Self` from a `std::io::Read`.
    fn read_from<R>(reader: &mut R) -> Result<Self, Self::Error>
    where
        R: Read,
        Self: std::marker::Sized;

    /// Serializes `Self` to a `std::io::Write`. Following `Write` trait conventions, its `Ok`
    /// type is a `usize` denoting the number of bytes written.
    fn write_to<W>(&self, writer: &mut W) -> Result<usize, Self::Error>
    where
        W: Write;

    /// Read a 4-byte count, then that many instances of `Self`.
    fn read_seq_from<R>(reader: &mut R) -> Result<Vec<Self>, Self::Error>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        let count = read_u32_be(reader)? as usize;
        let mut items = Vec::with_capacity(std::cmp::min(count, MAX_PREALLOCATION));
        for _ in 0..count {
            items.push(Self::read_from(reader)?);
        }
        Ok(items)
    }

    /// Write a 4-byte count, then each item in order.
    fn write_seq_to<W>(writer: &mut W, items: &[Self]) -> Result<usize, Self::Error>
    where
        W: Write,
        Self: std::marker::Sized,
    {
        let mut len = write_u32_be(writer, length_prefix(items.len())?)?;
        for item in items {
            len += item.write_to(writer)?;
        }
        Ok(len)
    }

    /// Deserialize an instance of `Self` that spans all of `bytes`. Errors with
    /// `TrailingBytes` if anything is left over.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>
    where
        Self: std::marker::Sized,
    {
        let mut cursor = Cursor::new(bytes);
        let item = Self::read_from(&mut cursor)?;
        check_consumed(&cursor)?;
        Ok(item)
    }

    /// Serialize `self` to a new byte vector.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        let mut v = Vec::with_capacity(self.serialized_length());
        self.write_to(&mut v)?;
        Ok(v)
    }

    /// Decodes a hex string to a `Vec<u8>`, deserializes an instance of `Self` from that vector.
    /// Accepts an optional `0x` prefix. No checksum is expected.
    fn deserialize_hex(s: &str) -> Result<Self, Self::Error>
    where
        Self: std::marker::Sized,
    {
        let v = decode_hex(s).map_err(SerError::from)?;
        Self::from_bytes(&v)
    }

    /// Serializes `self` to a vector, returns the hex-encoded vector
    fn serialize_hex(&self) -> Result<String, Self::Error> {
        Ok(hex::encode(self.to_bytes()?))
    }
}
