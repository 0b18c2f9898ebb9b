//! ECDSA helpers over secp256k1
//!
//! Digest signing for local co-signing, signature verification and
//! P2PKH address rendering for a given network.

use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::hash::sha256;
use crate::config::Network;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// Render the pay-to-pubkey-hash address of a compressed public key
pub fn public_key_to_address(public_key: &PublicKey, network: Network) -> String {
    bitcoin::Address::p2pkh(&bitcoin::PublicKey::new(*public_key), network.to_bitcoin())
        .to_string()
}

fn digest_message(message_hash: &[u8]) -> Result<Message, KeyError> {
    // Anything that is not already a 32 byte digest gets hashed first
    let hash = if message_hash.len() == 32 {
        message_hash.to_vec()
    } else {
        sha256(message_hash)
    };
    Ok(Message::from_digest_slice(&hash)?)
}

/// Sign a digest, returning a 64-byte compact signature
pub fn sign_digest(secret_key: &SecretKey, message_hash: &[u8]) -> Result<Vec<u8>, KeyError> {
    let secp = Secp256k1::signing_only();
    let message = digest_message(message_hash)?;
    let signature = secp.sign_ecdsa(&message, secret_key);
    Ok(signature.serialize_compact().to_vec())
}

/// Verify a compact signature against a public key
pub fn verify_digest(
    public_key: &PublicKey,
    message_hash: &[u8],
    signature: &[u8],
) -> Result<bool, KeyError> {
    let secp = Secp256k1::verification_only();
    let message = digest_message(message_hash)?;
    let sig = Signature::from_compact(signature).map_err(|_| KeyError::InvalidSignature)?;

    Ok(secp.verify_ecdsa(&message, &sig, public_key).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_one() -> SecretKey {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        SecretKey::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_address_of_generator_point() {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_one());

        assert_eq!(
            public_key_to_address(&public_key, Network::Mainnet),
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"
        );
        assert_eq!(
            public_key_to_address(&public_key, Network::Testnet),
            "mrCDrCybB6J1vRfbwM5hemdJz73FwDBC8r"
        );
    }

    #[test]
    fn test_sign_and_verify() {
        let secp = Secp256k1::new();
        let secret_key = secret_one();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let digest = sha256(b"co-sign me");

        let signature = sign_digest(&secret_key, &digest).unwrap();
        assert_eq!(signature.len(), 64);
        assert!(verify_digest(&public_key, &digest, &signature).unwrap());
        assert!(!verify_digest(&public_key, &sha256(b"other"), &signature).unwrap());
    }
}
