//! Typed payloads. A payload is a one-byte type tag and a content blob. The tag fixes how the
//! content is rendered and how it is parsed from text.

use std::io::{ErrorKind, Read, Write};

use camino_core::{
    enc::{
        decode_base58, decode_base64, decode_cb58, encode_base58, encode_base64, encode_cb58,
        EncodingError,
    },
    ser::{
        length_prefix, read_u32_be, read_u8, write_u32_be, write_u8, ByteFormat, SerError,
        SerResult,
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    enc::{format_address, parse_address},
    types::ShortId,
};

/// Every registered payload type. The discriminant is the wire tag.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PayloadType {
    Bin = 0,
    Utf8 = 1,
    HexStr = 2,
    B58Str = 3,
    B64Str = 4,
    BigNum = 5,
    XChainAddr = 6,
    PChainAddr = 7,
    CChainAddr = 8,
    TxId = 9,
    AssetId = 10,
    UtxoId = 11,
    NftId = 12,
    SubnetId = 13,
    ChainId = 14,
    NodeId = 15,
    SecpSig = 16,
    SecpEnc = 17,
    Jpeg = 18,
    Png = 19,
    Bmp = 20,
    Ico = 21,
    Svg = 22,
    Csv = 23,
    Json = 24,
    Yaml = 25,
    Email = 26,
    Url = 27,
    Ipfs = 28,
    Onion = 29,
    Magnet = 30,
}

/// How a payload type's content is rendered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// Raw bytes
    Binary,
    /// UTF-8 text
    Text,
    /// Hex text
    Hex,
    /// Base58 text
    Base58,
    /// Base64 text
    Base64,
    /// A big-endian unsigned integer, rendered as hex
    BigNum,
    /// A 20-byte address on the chain with this alias
    ChainAddress(&'static str),
    /// A cb58 checksummed ID
    Cb58,
    /// A cb58 node ID with the `NodeID-` prefix
    NodeId,
}

const NODE_ID_PREFIX: &str = "NodeID-";

impl PayloadType {
    /// Look up a wire tag
    pub fn from_u8(type_id: u8) -> SerResult<Self> {
        use PayloadType::*;
        let t = match type_id {
            0 => Bin,
            1 => Utf8,
            2 => HexStr,
            3 => B58Str,
            4 => B64Str,
            5 => BigNum,
            6 => XChainAddr,
            7 => PChainAddr,
            8 => CChainAddr,
            9 => TxId,
            10 => AssetId,
            11 => UtxoId,
            12 => NftId,
            13 => SubnetId,
            14 => ChainId,
            15 => NodeId,
            16 => SecpSig,
            17 => SecpEnc,
            18 => Jpeg,
            19 => Png,
            20 => Bmp,
            21 => Ico,
            22 => Svg,
            23 => Csv,
            24 => Json,
            25 => Yaml,
            26 => Email,
            27 => Url,
            28 => Ipfs,
            29 => Onion,
            30 => Magnet,
            _ => return Err(SerError::UnknownTypeId(type_id as u32)),
        };
        Ok(t)
    }

    /// The wire tag
    pub fn type_id(self) -> u8 {
        self as u8
    }

    /// The conventional upper-case name, e.g. "HEXSTR"
    pub fn name(self) -> &'static str {
        use PayloadType::*;
        match self {
            Bin => "BIN",
            Utf8 => "UTF8",
            HexStr => "HEXSTR",
            B58Str => "B58STR",
            B64Str => "B64STR",
            BigNum => "BIGNUM",
            XChainAddr => "XCHAINADDR",
            PChainAddr => "PCHAINADDR",
            CChainAddr => "CCHAINADDR",
            TxId => "TXID",
            AssetId => "ASSETID",
            UtxoId => "UTXOID",
            NftId => "NFTID",
            SubnetId => "SUBNETID",
            ChainId => "CHAINID",
            NodeId => "NODEID",
            SecpSig => "SECPSIG",
            SecpEnc => "SECPENC",
            Jpeg => "JPEG",
            Png => "PNG",
            Bmp => "BMP",
            Ico => "ICO",
            Svg => "SVG",
            Csv => "CSV",
            Json => "JSON",
            Yaml => "YAML",
            Email => "EMAIL",
            Url => "URL",
            Ipfs => "IPFS",
            Onion => "ONION",
            Magnet => "MAGNET",
        }
    }

    /// How this type's content is rendered
    pub fn kind(self) -> PayloadKind {
        use PayloadType::*;
        match self {
            Bin | Jpeg | Png | Bmp | Ico => PayloadKind::Binary,
            Utf8 | Svg | Csv | Json | Yaml | Email | Url | Onion | Magnet => PayloadKind::Text,
            HexStr => PayloadKind::Hex,
            B58Str | SecpSig | SecpEnc | Ipfs => PayloadKind::Base58,
            B64Str => PayloadKind::Base64,
            BigNum => PayloadKind::BigNum,
            XChainAddr => PayloadKind::ChainAddress("X"),
            PChainAddr => PayloadKind::ChainAddress("P"),
            CChainAddr => PayloadKind::ChainAddress("C"),
            TxId | AssetId | UtxoId | NftId | SubnetId | ChainId => PayloadKind::Cb58,
            NodeId => PayloadKind::NodeId,
        }
    }
}

/// A rendered payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadValue {
    /// Binary and media payloads
    Bytes(Vec<u8>),
    /// Everything else
    Text(String),
}

/// A typed payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    payload_type: PayloadType,
    content: Vec<u8>,
}

impl Payload {
    /// Wrap content under a type
    pub fn new(payload_type: PayloadType, content: Vec<u8>) -> Self {
        Self {
            payload_type,
            content,
        }
    }

    /// Construct a payload from its wire tag. Errors with `UnknownTypeId` for unregistered tags.
    pub fn select(type_id: u8, content: Vec<u8>) -> SerResult<Self> {
        Ok(Self::new(PayloadType::from_u8(type_id)?, content))
    }

    /// Parse the textual form of a payload of this type. Binary types take base58.
    pub fn from_text(payload_type: PayloadType, text: &str) -> SerResult<Self> {
        let content = match payload_type.kind() {
            PayloadKind::Text => text.as_bytes().to_vec(),
            PayloadKind::Hex => hex::decode(text).map_err(EncodingError::from)?,
            PayloadKind::Binary | PayloadKind::Base58 => decode_base58(text)?,
            PayloadKind::Base64 => decode_base64(text)?,
            PayloadKind::BigNum => {
                let digits = text.strip_prefix("0x").unwrap_or(text);
                let padded = if digits.len() % 2 == 1 {
                    format!("0{}", digits)
                } else {
                    digits.to_owned()
                };
                hex::decode(padded).map_err(EncodingError::from)?
            }
            PayloadKind::ChainAddress(alias) => {
                let (got, _hrp, id) = parse_address(text)?;
                if got != alias {
                    return Err(EncodingError::WrongChain {
                        got,
                        expected: alias.to_owned(),
                    }
                    .into());
                }
                id.as_bytes().to_vec()
            }
            PayloadKind::Cb58 => decode_cb58(text)?,
            PayloadKind::NodeId => {
                decode_cb58(text.strip_prefix(NODE_ID_PREFIX).unwrap_or(text))?
            }
        };
        Ok(Self::new(payload_type, content))
    }

    /// The payload type
    pub fn payload_type(&self) -> PayloadType {
        self.payload_type
    }

    /// The wire tag
    pub fn type_id(&self) -> u8 {
        self.payload_type.type_id()
    }

    /// The raw content
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Render the content. Chain addresses are rendered under `hrp`.
    pub fn return_type(&self, hrp: &str) -> SerResult<PayloadValue> {
        let text = match self.payload_type.kind() {
            PayloadKind::Binary => return Ok(PayloadValue::Bytes(self.content.clone())),
            PayloadKind::Text => String::from_utf8(self.content.clone())
                .map_err(|e| SerError::ComponentError(e.to_string()))?,
            PayloadKind::Hex | PayloadKind::BigNum => hex::encode(&self.content),
            PayloadKind::Base58 => encode_base58(&self.content),
            PayloadKind::Base64 => encode_base64(&self.content),
            PayloadKind::ChainAddress(alias) => {
                format_address(alias, hrp, &ShortId::from_slice(&self.content)?)?
            }
            PayloadKind::Cb58 => encode_cb58(&self.content),
            PayloadKind::NodeId => format!("{}{}", NODE_ID_PREFIX, encode_cb58(&self.content)),
        };
        Ok(PayloadValue::Text(text))
    }
}

impl ByteFormat for Payload {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        4 + 1 + self.content.len()
    }

    fn read_from<R>(reader: &mut R) -> SerResult<Self>
    where
        R: Read,
    {
        let len = read_u32_be(reader)?;
        if len == 0 {
            return Err(SerError::ComponentError(
                "payload length does not cover its type tag".to_owned(),
            ));
        }
        let payload_type = PayloadType::from_u8(read_u8(reader)?)?;
        let expected = (len - 1) as u64;
        let mut content = vec![];
        reader.by_ref().take(expected).read_to_end(&mut content)?;
        if (content.len() as u64) < expected {
            return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into());
        }
        Ok(Self::new(payload_type, content))
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = write_u32_be(writer, length_prefix(1 + self.content.len())?)?;
        len += write_u8(writer, self.type_id())?;
        writer.write_all(&self.content)?;
        Ok(len + self.content.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_serializes_payloads() {
        let p = Payload::from_text(PayloadType::Utf8, "hi").unwrap();
        assert_eq!(p.serialize_hex().unwrap(), "00000003016869");
        assert_eq!(p.serialized_length(), 7);
        assert_eq!(Payload::deserialize_hex("00000003016869").unwrap(), p);

        let empty = Payload::new(PayloadType::Bin, vec![]);
        assert_eq!(empty.serialize_hex().unwrap(), "0000000100");
        assert_eq!(Payload::deserialize_hex("0000000100").unwrap(), empty);
    }

    #[test]
    fn it_decodes_payloads_back_to_back() {
        let a = Payload::new(PayloadType::Json, b"{}".to_vec());
        let b = Payload::new(PayloadType::Png, vec![0x89, 0x50]);
        let mut bytes = a.to_bytes().unwrap();
        bytes.extend(b.to_bytes().unwrap());
        let mut reader = bytes.as_slice();
        assert_eq!(Payload::read_from(&mut reader).unwrap(), a);
        assert_eq!(Payload::read_from(&mut reader).unwrap(), b);
        assert!(reader.is_empty());
    }

    #[test]
    fn it_dispatches_every_registered_tag() {
        for id in 0u8..=30 {
            let t = PayloadType::from_u8(id).unwrap();
            assert_eq!(t.type_id(), id);
            let p = Payload::select(id, vec![1, 2, 3]).unwrap();
            let bytes = p.to_bytes().unwrap();
            assert_eq!(bytes[4], id);
            assert_eq!(Payload::from_bytes(&bytes).unwrap(), p);
        }
        for id in [31u8, 32, 200, 255].iter() {
            match Payload::select(*id, vec![]) {
                Err(SerError::UnknownTypeId(got)) => assert_eq!(got, *id as u32),
                other => panic!("expected UnknownTypeId, got {:?}", other),
            }
        }
        assert_eq!(PayloadType::Magnet.name(), "MAGNET");
        assert_eq!(PayloadType::HexStr.name(), "HEXSTR");
    }

    #[test]
    fn it_rejects_malformed_payload_bytes() {
        assert!(matches!(
            Payload::deserialize_hex("00000000"),
            Err(SerError::ComponentError(_))
        ));
        assert!(matches!(
            Payload::deserialize_hex("000000011f"),
            Err(SerError::UnknownTypeId(31))
        ));
        assert!(matches!(
            Payload::deserialize_hex("0000000501aabb"),
            Err(SerError::IOError(_))
        ));
    }

    #[test]
    fn it_renders_and_parses_text_forms() {
        let hex = Payload::from_text(PayloadType::HexStr, "deadbeef").unwrap();
        assert_eq!(hex.content(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(
            hex.return_type("camino").unwrap(),
            PayloadValue::Text("deadbeef".to_owned())
        );
        match Payload::from_text(PayloadType::HexStr, "not hex") {
            Err(SerError::EncodingError(EncodingError::Hex(_))) => {}
            other => panic!("expected Hex error, got {:?}", other),
        }

        let big = Payload::from_text(PayloadType::BigNum, "0x3e8").unwrap();
        assert_eq!(big.content(), &[0x03, 0xe8]);

        let b64 = Payload::from_text(PayloadType::B64Str, "Y2FtaW5v").unwrap();
        assert_eq!(b64.content(), b"camino");
        assert_eq!(
            b64.return_type("camino").unwrap(),
            PayloadValue::Text("Y2FtaW5v".to_owned())
        );

        let id = encode_cb58(&[5u8; 32]);
        let tx = Payload::from_text(PayloadType::TxId, &id).unwrap();
        assert_eq!(tx.return_type("camino").unwrap(), PayloadValue::Text(id.clone()));

        let node = Payload::from_text(PayloadType::NodeId, &format!("NodeID-{}", id)).unwrap();
        assert_eq!(
            node.return_type("camino").unwrap(),
            PayloadValue::Text(format!("NodeID-{}", id))
        );

        let png = Payload::new(PayloadType::Png, vec![1, 2]);
        assert_eq!(png.return_type("camino").unwrap(), PayloadValue::Bytes(vec![1, 2]));
    }

    #[test]
    fn it_checks_chain_address_aliases() {
        let addr = "P-kopernikus18s7rc0pu8s7rc0pu8s7rc0pu8s7rc0puv5hs3a";
        let p = Payload::from_text(PayloadType::PChainAddr, addr).unwrap();
        assert_eq!(p.content(), &[0x3c; 20]);
        assert_eq!(
            p.return_type("kopernikus").unwrap(),
            PayloadValue::Text(addr.to_owned())
        );
        match Payload::from_text(PayloadType::XChainAddr, addr) {
            Err(SerError::EncodingError(EncodingError::WrongChain { .. })) => {}
            other => panic!("expected WrongChain, got {:?}", other),
        }
    }
}
