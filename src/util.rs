//! Cryptographic and script utilities

use bitcoin::hashes::{sha256, Hash};
use bitcoin::opcodes::OP_0;
use bitcoin::script::Builder;
use bitcoin::{Script, ScriptBuf};
use secp256k1::{Keypair, Message, Secp256k1};

/// Create a keypair from a u32 secret key (for testing)
///
/// # Examples
///
/// ```
/// use stencil::util::keypair_from_u32;
///
/// let keypair = keypair_from_u32(42);
/// assert!(keypair.x_only_public_key().0.serialize().len() == 32);
/// ```
///
/// # Panics
///
/// Panics if the secret key bytes produce an invalid secp256k1 secret key
/// (this should never happen for reasonable u32 inputs).
#[must_use]
pub fn keypair_from_u32(secret_key: u32) -> Keypair {
    let mut secret_key_bytes = [0u8; 32];
    secret_key_bytes[28..].copy_from_slice(&secret_key.to_be_bytes());
    Keypair::from_seckey_slice(&Secp256k1::new(), &secret_key_bytes)
        .expect("secret key should be valid")
}

/// Get the compressed public key for a secret key
///
/// # Examples
///
/// ```
/// use stencil::util::public_key;
///
/// let pubkey = public_key(1);
/// assert!(pubkey.compressed);
///
/// // Same key should produce same pubkey
/// let pubkey2 = public_key(1);
/// assert_eq!(pubkey, pubkey2);
/// ```
#[must_use]
pub fn public_key(secret_key: u32) -> bitcoin::PublicKey {
    bitcoin::PublicKey::new(keypair_from_u32(secret_key).public_key())
}

/// Sign a 32-byte digest with ECDSA, returning the DER-encoded signature
///
/// # Examples
///
/// ```
/// use stencil::util::sign_ecdsa;
///
/// let message = [0u8; 32];
/// let signature = sign_ecdsa(1, message);
/// assert!(signature.len() <= 72);
/// ```
#[must_use]
pub fn sign_ecdsa(secret_key: u32, message: [u8; 32]) -> Vec<u8> {
    let secp = Secp256k1::new();
    let keypair = keypair_from_u32(secret_key);
    let message = Message::from_digest(message);
    secp.sign_ecdsa(&message, &keypair.secret_key())
        .serialize_der()
        .to_vec()
}

/// P2WSH locking script paying the given witness script
///
/// # Examples
///
/// ```
/// use stencil::bitcoin::script::Builder;
/// use stencil::util::p2wsh_script_pubkey;
///
/// let witness_script = Builder::new().push_int(1).into_script();
/// let spk = p2wsh_script_pubkey(&witness_script);
/// assert_eq!(spk.len(), 34);
/// ```
#[must_use]
pub fn p2wsh_script_pubkey(witness_script: &Script) -> ScriptBuf {
    let digest = sha256::Hash::hash(witness_script.as_bytes());
    Builder::new()
        .push_opcode(OP_0)
        .push_slice(digest.to_byte_array())
        .into_script()
}
