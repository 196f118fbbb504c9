//! Defines parameterized chain-address encoders for each network and chain.

use std::marker::PhantomData;

use camino_core::enc::{
    decode_bech32, decode_bech32_any, encode_bech32, AddressEncoder, EncodingError,
    EncodingResult,
};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    nets::{Camino, Columbus, Kopernikus, Local, NetworkParams},
    types::ShortId,
};

/// A chain address string, e.g. `P-camino1...`.
#[derive(PartialEq, Eq, Clone, Debug, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Borrow the address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The alias that prefixes addresses on a chain.
pub trait ChainAlias {
    /// "P", "X", "C" or "T"
    const ALIAS: &'static str;
}

/// The platform chain
#[derive(Debug, Clone)]
pub struct PChain;

impl ChainAlias for PChain {
    const ALIAS: &'static str = "P";
}

/// The exchange chain
#[derive(Debug, Clone)]
pub struct XChain;

impl ChainAlias for XChain {
    const ALIAS: &'static str = "X";
}

/// The contract chain
#[derive(Debug, Clone)]
pub struct CChain;

impl ChainAlias for CChain {
    const ALIAS: &'static str = "C";
}

/// The touristic chain
#[derive(Debug, Clone)]
pub struct TChain;

impl ChainAlias for TChain {
    const ALIAS: &'static str = "T";
}

/// The standard encoder for Camino chain addresses. Parameterized by a `NetworkParams` type
/// and a `ChainAlias` type.
#[derive(Debug, Clone, PartialEq)]
pub struct CaminoEncoder<N: NetworkParams, C: ChainAlias>(PhantomData<fn(N, C) -> (N, C)>);

impl<N: NetworkParams, C: ChainAlias> AddressEncoder for CaminoEncoder<N, C> {
    type Address = Address;
    type Error = EncodingError;
    type RecipientIdentifier = ShortId;

    fn encode_address(s: &ShortId) -> EncodingResult<Address> {
        format_address(C::ALIAS, N::HRP, s).map(Address)
    }

    fn decode_address(addr: &Address) -> EncodingResult<ShortId> {
        parse_address_for(C::ALIAS, N::HRP, addr.as_str())
    }

    fn string_to_address(string: &str) -> EncodingResult<Address> {
        parse_address_for(C::ALIAS, N::HRP, string)?;
        Ok(Address(string.to_owned()))
    }
}

/// P-chain addresses on Camino mainnet
pub type CaminoPChain = CaminoEncoder<Camino, PChain>;
/// X-chain addresses on Camino mainnet
pub type CaminoXChain = CaminoEncoder<Camino, XChain>;
/// P-chain addresses on Columbus
pub type ColumbusPChain = CaminoEncoder<Columbus, PChain>;
/// P-chain addresses on Kopernikus
pub type KopernikusPChain = CaminoEncoder<Kopernikus, PChain>;
/// T-chain addresses on Kopernikus
pub type KopernikusTChain = CaminoEncoder<Kopernikus, TChain>;
/// P-chain addresses on a local network
pub type LocalPChain = CaminoEncoder<Local, PChain>;

/// Render `<alias>-<bech32(hrp, id)>`.
pub fn format_address(alias: &str, hrp: &str, id: &ShortId) -> EncodingResult<String> {
    Ok(format!("{}-{}", alias, encode_bech32(hrp, id.as_bytes())?))
}

/// Split an address into its chain alias, HRP and 20-byte payload without checking either
/// prefix against an expected value.
pub fn parse_address(address: &str) -> EncodingResult<(String, String, ShortId)> {
    let (alias, rest) = address
        .split_once('-')
        .ok_or_else(|| EncodingError::MissingSeparator(address.to_owned()))?;
    let (hrp, payload) = decode_bech32_any(rest)?;
    Ok((alias.to_owned(), hrp, ShortId::from_slice(&payload)?))
}

/// Parse an address, requiring the given chain alias and HRP.
pub fn parse_address_for(alias: &str, hrp: &str, address: &str) -> EncodingResult<ShortId> {
    let (got, rest) = address
        .split_once('-')
        .ok_or_else(|| EncodingError::MissingSeparator(address.to_owned()))?;
    if got != alias {
        return Err(EncodingError::WrongChain {
            got: got.to_owned(),
            expected: alias.to_owned(),
        });
    }
    ShortId::from_slice(&decode_bech32(hrp, rest)?)
}

/// The address hash of a serialized secp256k1 public key: `ripemd160(sha256(pubkey))`.
pub fn address_from_public_key(pubkey: &[u8]) -> ShortId {
    let digest = Ripemd160::digest(Sha256::digest(pubkey));
    let mut buf = [0u8; 20];
    buf.copy_from_slice(&digest);
    ShortId::new(buf)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_encodes_and_decodes_addresses() {
        let cases = [
            (
                ShortId::new([0x3c; 20]),
                "P-kopernikus18s7rc0pu8s7rc0pu8s7rc0pu8s7rc0puv5hs3a",
            ),
            (
                ShortId::new([
                    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19,
                ]),
                "P-kopernikus1qqqsyqcyq5rqwzqfpg9scrgwpugpzysnuy38th",
            ),
        ];
        for (id, addr) in cases.iter() {
            let encoded = KopernikusPChain::encode_address(id).unwrap();
            assert_eq!(encoded.as_str(), *addr);
            assert_eq!(&KopernikusPChain::decode_address(&encoded).unwrap(), id);
            assert_eq!(KopernikusPChain::string_to_address(addr).unwrap(), encoded);
        }
    }

    #[test]
    fn it_formats_camino_addresses() {
        let id = ShortId::new([
            0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19,
        ]);
        assert_eq!(
            format_address("X", "camino", &id).unwrap(),
            "X-camino1qqqsyqcyq5rqwzqfpg9scrgwpugpzysndcppsz"
        );
        let (alias, hrp, parsed) =
            parse_address("X-camino1qqqsyqcyq5rqwzqfpg9scrgwpugpzysndcppsz").unwrap();
        assert_eq!(alias, "X");
        assert_eq!(hrp, "camino");
        assert_eq!(parsed, id);
    }

    #[test]
    fn it_rejects_wrong_prefixes() {
        let addr = "P-kopernikus18s7rc0pu8s7rc0pu8s7rc0pu8s7rc0puv5hs3a";
        match CaminoPChain::string_to_address(addr) {
            Err(EncodingError::WrongHrp { got, expected }) => {
                assert_eq!(got, "kopernikus");
                assert_eq!(expected, "camino");
            }
            other => panic!("expected WrongHrp, got {:?}", other),
        }
        match KopernikusTChain::string_to_address(addr) {
            Err(EncodingError::WrongChain { got, expected }) => {
                assert_eq!(got, "P");
                assert_eq!(expected, "T");
            }
            other => panic!("expected WrongChain, got {:?}", other),
        }
        match KopernikusPChain::string_to_address("kopernikus18s7rc0pu8s7rc0pu8s7rc0pu8s7rc0puv5hs3a") {
            Err(EncodingError::MissingSeparator(_)) => {}
            other => panic!("expected MissingSeparator, got {:?}", other),
        }
    }

    #[test]
    fn it_hashes_public_keys_to_addresses() {
        let mut pubkey = [0x11u8; 33];
        pubkey[0] = 2;
        assert_eq!(
            hex::encode(address_from_public_key(&pubkey).as_bytes()),
            "adfce54f529b2154e3c361bbe3f7d41db0635717"
        );
    }
}
