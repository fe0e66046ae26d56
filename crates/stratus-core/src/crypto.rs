//! Password-based archive encryption: Argon2id key derivation and
//! AES-256-GCM.
//!
//! Wire format:
//! `[8-byte magic][u32 memory_cost][u32 time_cost][u32 parallelism]`
//! `[16-byte salt][12-byte nonce][ciphertext with 16-byte tag]`,
//! integers little-endian. The header up to the nonce is bound as AAD.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::Argon2;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{Result, StratusError};

const MAGIC: &[u8; 8] = b"STRATUS1";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = MAGIC.len() + 12 + SALT_LEN;

/// Upper bound accepted when decrypting (4 GiB), so a forged header cannot
/// demand unbounded memory.
const MAX_MEMORY_COST: u32 = 4 * 1024 * 1024;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// KiB.
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

pub fn encrypt(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    encrypt_with_params(plaintext, password, KdfParams::default())
}

pub fn encrypt_with_params(plaintext: &[u8], password: &str, kdf: KdfParams) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(MAGIC);
    header.extend_from_slice(&kdf.memory_cost.to_le_bytes());
    header.extend_from_slice(&kdf.time_cost.to_le_bytes());
    header.extend_from_slice(&kdf.parallelism.to_le_bytes());
    header.extend_from_slice(&salt);

    let key = derive_key(password, &salt, kdf)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| StratusError::KeyDerivation(format!("cipher init: {e}")))?;
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: plaintext,
                aad: &header,
            },
        )
        .map_err(|e| StratusError::Other(format!("AES-GCM encrypt: {e}")))?;

    let mut out = header;
    out.reserve(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

pub fn decrypt(data: &[u8], password: &str) -> Result<Vec<u8>> {
    if data.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
        return Err(StratusError::DecryptionFailed);
    }
    let (header, rest) = data.split_at(HEADER_LEN);
    if &header[..MAGIC.len()] != MAGIC {
        return Err(StratusError::InvalidFormat(
            "not a stratus encrypted archive".into(),
        ));
    }

    let kdf = KdfParams {
        memory_cost: read_u32(header, MAGIC.len()),
        time_cost: read_u32(header, MAGIC.len() + 4),
        parallelism: read_u32(header, MAGIC.len() + 8),
    };
    if kdf.memory_cost > MAX_MEMORY_COST {
        return Err(StratusError::InvalidFormat(format!(
            "KDF memory cost {} KiB exceeds limit",
            kdf.memory_cost
        )));
    }
    let salt = &header[MAGIC.len() + 12..];
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let key = derive_key(password, salt, kdf)?;
    let cipher =
        Aes256Gcm::new_from_slice(key.as_ref()).map_err(|_| StratusError::DecryptionFailed)?;
    cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: header,
            },
        )
        .map_err(|_| StratusError::DecryptionFailed)
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(bytes)
}

fn derive_key(password: &str, salt: &[u8], kdf: KdfParams) -> Result<Zeroizing<[u8; 32]>> {
    let params = argon2::Params::new(kdf.memory_cost, kdf.time_cost, kdf.parallelism, Some(32))
        .map_err(|e| StratusError::KeyDerivation(format!("argon2 params: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password.as_bytes(), salt, output.as_mut())
        .map_err(|e| StratusError::KeyDerivation(format!("argon2 hash: {e}")))?;
    Ok(output)
}

#[cfg(test)]
pub(crate) fn test_params() -> KdfParams {
    KdfParams {
        memory_cost: 64,
        time_cost: 1,
        parallelism: 1,
    }
}
