//! The `AddressEncoder` trait.

/// An AddressEncoder encodes and decodes addresses. It handles converting the in-protocol
/// recipient (a 20-byte address hash) to its human-readable form and back. It also contains a
/// function that wraps a string in the appropriate address type.
///
/// Implementations are parameterized by network and chain, so that the same logic can be used
/// on every network and every chain alias.
pub trait AddressEncoder {
    /// A type representing the encoded address
    type Address;
    /// An error type that will be returned in case of encoding errors
    type Error;
    /// A type representing the in-protocol recipient.
    type RecipientIdentifier;

    /// Encode a recipient as an address.
    fn encode_address(s: &Self::RecipientIdentifier) -> Result<Self::Address, Self::Error>;

    /// Decode a recipient from an address.
    fn decode_address(addr: &Self::Address) -> Result<Self::RecipientIdentifier, Self::Error>;

    /// Attempt to convert a string into an `Address`.
    fn string_to_address(s: &str) -> Result<Self::Address, Self::Error>;
}
