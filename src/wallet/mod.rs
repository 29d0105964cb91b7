use rand::rngs::OsRng;
use secp256k1::Secp256k1;

/// Scheme used when sharing a node address (e.g. rendered as a QR code).
pub const ADDRESS_URI_SCHEME: &str = "snifz";

/// Address for a node started without a configured one: hex of a fresh
/// compressed secp256k1 public key. The secret key is dropped, so such a
/// node can collect rewards but never sign a transfer out.
pub fn generate_node_address() -> String {
    let (_, public_key) = Secp256k1::new().generate_keypair(&mut OsRng);
    hex::encode(public_key.serialize())
}

/// Shareable form of a node address, `snifz://<address>`.
pub fn address_uri(address: &str) -> String {
    format!("{ADDRESS_URI_SCHEME}://{address}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_address_is_compressed_pubkey_hex() {
        let addr = generate_node_address();
        assert_eq!(addr.len(), 66);
        assert!(addr.starts_with("02") || addr.starts_with("03"));
        assert!(hex::decode(&addr).is_ok());
    }

    #[test]
    fn generated_addresses_are_unique() {
        assert_ne!(generate_node_address(), generate_node_address());
    }

    #[test]
    fn uri_wraps_address() {
        assert_eq!(address_uri("02abc"), "snifz://02abc");
    }
}
