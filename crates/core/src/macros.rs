//! Useful macros for implementing wire types

#[macro_export]
/// Implement `serde::Serialize` and `serde::Deserialize` by passing through to the hex
/// serialization of `ByteFormat`.
macro_rules! impl_hex_serde {
    ($item:ty) => {
        impl serde::Serialize for $item {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                let s = $crate::ser::ByteFormat::serialize_hex(self)
                    .map_err(|e| serde::ser::Error::custom(e.to_string()))?;
                serializer.serialize_str(&s)
            }
        }

        impl<'de> serde::Deserialize<'de> for $item {
            fn deserialize<D>(deserializer: D) -> Result<$item, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s: String = serde::Deserialize::deserialize(deserializer)?;
                <$item as $crate::ser::ByteFormat>::deserialize_hex(&s)
                    .map_err(|e| serde::de::Error::custom(e.to_string()))
            }
        }
    };
}

#[macro_export]
/// Implement `serde::Serialize` and `serde::Deserialize` by passing through to cb58.
macro_rules! impl_cb58_serde {
    ($item:ty) => {
        impl serde::Serialize for $item {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_cb58())
            }
        }

        impl<'de> serde::Deserialize<'de> for $item {
            fn deserialize<D>(deserializer: D) -> Result<$item, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s: String = serde::Deserialize::deserialize(deserializer)?;
                <$item>::from_cb58(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
            }
        }
    };
}

#[macro_export]
/// Make a new fixed-length byte identifier. IDs render as cb58 in `Display`, `Debug` and serde,
/// and serialize as their raw bytes on the wire.
macro_rules! fixed_byte_id {
    (
        $(#[$outer:meta])*
        $name:ident, $len:expr
    ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// The byte-length of this identifier
            pub const LENGTH: usize = $len;

            /// Wrap raw bytes
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// The all-zero identifier
            pub const fn zero() -> Self {
                Self([0u8; $len])
            }

            /// True if every byte is zero
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Copy from a slice of exactly `LENGTH` bytes
            pub fn from_slice(bytes: &[u8]) -> $crate::enc::EncodingResult<Self> {
                if bytes.len() != $len {
                    return Err($crate::enc::EncodingError::InvalidSize {
                        got: bytes.len(),
                        expected: $len,
                    });
                }
                let mut buf = [0u8; $len];
                buf.copy_from_slice(bytes);
                Ok(Self(buf))
            }

            /// Return a reference to the underlying bytes
            pub fn as_bytes(&self) -> &[u8] {
                &self.0[..]
            }

            /// Encode as cb58
            pub fn to_cb58(&self) -> String {
                $crate::enc::encode_cb58(&self.0)
            }

            /// Decode from cb58
            pub fn from_cb58(s: &str) -> $crate::enc::EncodingResult<Self> {
                Self::from_slice(&$crate::enc::decode_cb58(s)?)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_cb58())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.to_cb58())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::enc::EncodingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_cb58(s)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0[..]
            }
        }

        impl $crate::ser::ByteFormat for $name {
            type Error = $crate::ser::SerError;

            fn serialized_length(&self) -> usize {
                $len
            }

            fn read_from<R>(reader: &mut R) -> $crate::ser::SerResult<Self>
            where
                R: std::io::Read,
                Self: std::marker::Sized,
            {
                Ok(Self($crate::ser::read_array(reader)?))
            }

            fn write_to<W>(&self, writer: &mut W) -> $crate::ser::SerResult<usize>
            where
                W: std::io::Write,
            {
                writer.write_all(&self.0)?;
                Ok($len)
            }
        }

        $crate::impl_cb58_serde!($name);
    };
}

#[macro_export]
/// Wrap a 4-byte-length-prefixed vector of bytes (`u8`) in a newtype, and implement convenience
/// functions for it.
macro_rules! wrap_prefixed_byte_vector {
    (
        $(#[$outer:meta])*
        $wrapper_name:ident
    ) => {
        $(#[$outer])*
        #[derive(Clone, Debug, Eq, PartialEq, Default, Hash, PartialOrd, Ord)]
        pub struct $wrapper_name(Vec<u8>);

        impl $crate::ser::ByteFormat for $wrapper_name {
            type Error = $crate::ser::SerError;

            fn serialized_length(&self) -> usize {
                4 + self.len()
            }

            fn read_from<R>(reader: &mut R) -> Result<Self, Self::Error>
            where
                R: std::io::Read,
            {
                Ok(Self($crate::ser::read_prefixed_bytes(reader)?))
            }

            fn write_to<W>(&self, writer: &mut W) -> Result<usize, Self::Error>
            where
                W: std::io::Write,
            {
                $crate::ser::write_prefixed_bytes(writer, &self.0)
            }
        }

        $crate::impl_hex_serde!($wrapper_name);

        impl std::convert::AsRef<[u8]> for $wrapper_name {
            fn as_ref(&self) -> &[u8] {
                &self.0[..]
            }
        }

        impl $wrapper_name {
            /// Construct an empty wrapped vector instance.
            pub fn null() -> Self {
                Self(vec![])
            }

            /// Return a reference to the underlying bytes
            pub fn items(&self) -> &[u8] {
                &self.0
            }

            /// Return the length of the item vector.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Return true if the length of the item vector is 0.
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }
        }

        impl From<&[u8]> for $wrapper_name {
            fn from(v: &[u8]) -> Self {
                Self(v.to_vec())
            }
        }

        impl From<Vec<u8>> for $wrapper_name {
            fn from(v: Vec<u8>) -> Self {
                Self(v)
            }
        }
    };
}

#[cfg(test)]
mod test {
    use crate::ser::ByteFormat;

    fixed_byte_id!(
        /// A test identifier
        TestId,
        4
    );

    wrap_prefixed_byte_vector!(
        /// A test byte vector
        TestBytes
    );

    #[test]
    fn it_round_trips_fixed_ids() {
        let id = TestId::new([1, 2, 3, 4]);
        assert_eq!(id.serialized_length(), 4);
        assert_eq!(id.serialize_hex().unwrap(), "01020304");
        assert_eq!(TestId::deserialize_hex("01020304").unwrap(), id);
        assert_eq!(TestId::from_cb58(&id.to_cb58()).unwrap(), id);
        assert_eq!(id.to_string().parse::<TestId>().unwrap(), id);
        assert!(TestId::default().is_zero());
        assert!(TestId::from_slice(&[1, 2, 3]).is_err());
    }

    #[test]
    fn it_serializes_ids_as_cb58_json() {
        let id = TestId::new([9, 9, 9, 9]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_cb58()));
        assert_eq!(serde_json::from_str::<TestId>(&json).unwrap(), id);
    }

    #[test]
    fn it_round_trips_prefixed_byte_vectors() {
        let b = TestBytes::from(vec![0xab, 0xcd]);
        assert_eq!(b.serialized_length(), 6);
        assert_eq!(b.serialize_hex().unwrap(), "00000002abcd");
        assert_eq!(TestBytes::deserialize_hex("00000002abcd").unwrap(), b);
        assert!(TestBytes::null().is_empty());

        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "\"00000002abcd\"");
        assert_eq!(serde_json::from_str::<TestBytes>(&json).unwrap(), b);
    }
}
