//! Key derivation and the candidate ciphers tried against a container
//!
//! Keys come from the PKCS#12 KDF over SHA-256, which is how a
//! `PBEWITHSHA256AND256BITAES-CBC-BC` cipher derives them. No container
//! written by the Android app has been checked against this yet, so the
//! password encoding and the rounds to iterations mapping are assumed.
//! Containers written by this crate read back with it.

use crate::binary::{ContainerHeader, SaltAndRounds, MAX_ROUNDS};

use sha2::digest::core_api::BlockSizeUser;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Salt used by containers written before salted headers existed
pub const LEGACY_SALT: [u8; 8] = [0xA4, 0x0B, 0xC8, 0x34, 0xD6, 0x95, 0xF3, 0x13];
/// Iteration count used by containers written before salted headers existed
pub const LEGACY_ITERATIONS: u32 = 20;

const KEY_MATERIAL_ID: u8 = 1;
const IV_MATERIAL_ID: u8 = 2;
const AES256_KEY_LENGTH: usize = 32;
const AES_BLOCK_LENGTH: usize = 16;

/// Password the user unlocks a container with
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    /// Wrap a password typed by the user
    pub fn new<S: Into<String>>(password: S) -> Password {
        Password(password.into())
    }

    /// PKCS#12 encoding: UTF-16BE code units followed by a two byte NUL
    ///
    /// The empty password encodes to no bytes at all.
    fn pkcs12_bytes(&self) -> Vec<u8> {
        if self.0.is_empty() {
            return Vec::new();
        }
        let mut bytes: Vec<u8> = self.0.encode_utf16().flat_map(u16::to_be_bytes).collect();
        bytes.extend_from_slice(&[0, 0]);
        bytes
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Password {
        Password::new(password)
    }
}

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
/// Encryption algorithm applied to the container payload
pub enum CipherAlgorithm {
    /// PKCS#12 key derivation with SHA-256, AES 256 in CBC mode
    Pkcs12Sha256Aes256Cbc,
}

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
/// Historical generation of the container format a cipher belongs to
pub enum Generation {
    /// Key derived from the salt and rounds recorded in the header
    Current,
    /// Fixed built-in salt and iteration count, used by headerless files
    LegacyDefault,
}

/// Iteration count the format uses for a given rounds value
///
/// Rounds above [`MAX_ROUNDS`] never pass header validation and are capped.
pub fn iterations_for_rounds(rounds: u8) -> u32 {
    1u32 << rounds.min(MAX_ROUNDS)
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A cipher configuration that has not derived its key yet
pub struct CipherCandidate {
    generation: Generation,
    algorithm: CipherAlgorithm,
    salt_and_rounds: Option<SaltAndRounds>,
}

impl CipherCandidate {
    /// Candidate for the current generation, bound to a header's salt and rounds
    pub fn current(salt_and_rounds: SaltAndRounds) -> CipherCandidate {
        CipherCandidate {
            generation: Generation::Current,
            algorithm: CipherAlgorithm::Pkcs12Sha256Aes256Cbc,
            salt_and_rounds: Some(salt_and_rounds),
        }
    }

    /// The single cipher used by containers without a header
    pub fn legacy_default() -> CipherCandidate {
        CipherCandidate {
            generation: Generation::LegacyDefault,
            algorithm: CipherAlgorithm::Pkcs12Sha256Aes256Cbc,
            salt_and_rounds: None,
        }
    }

    /// Format generation this candidate belongs to
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Salt and rounds this candidate expects to find in the header
    pub fn salt_and_rounds(&self) -> Option<&SaltAndRounds> {
        self.salt_and_rounds.as_ref()
    }

    fn kdf_params(&self) -> (&[u8], u32) {
        match &self.salt_and_rounds {
            Some(pair) => (pair.salt(), iterations_for_rounds(pair.rounds())),
            None => (&LEGACY_SALT, LEGACY_ITERATIONS),
        }
    }

    /// Run the key derivation for this candidate
    pub fn derive(&self, password: &Password) -> CipherSuite {
        let (salt, iterations) = self.kdf_params();
        debug!(
            generation = ?self.generation,
            iterations,
            "Deriving container key"
        );
        let password = Zeroizing::new(password.pkcs12_bytes());
        let key = pkcs12_kdf::<Sha256>(
            &password,
            salt,
            KEY_MATERIAL_ID,
            iterations,
            AES256_KEY_LENGTH,
        );
        let iv = pkcs12_kdf::<Sha256>(
            &password,
            salt,
            IV_MATERIAL_ID,
            iterations,
            AES_BLOCK_LENGTH,
        );
        CipherSuite {
            generation: self.generation,
            algorithm: self.algorithm,
            salt_and_rounds: self.salt_and_rounds.clone(),
            key: CipherKey(key),
            iv,
        }
    }
}

/// Ordered candidate ciphers for a container, most likely first
///
/// Legacy containers only ever decode with the legacy default cipher.
pub fn cipher_candidates(header: &ContainerHeader) -> Vec<CipherCandidate> {
    match header.salt_and_rounds() {
        Some(pair) => vec![
            CipherCandidate::current(pair.clone()),
            CipherCandidate::legacy_default(),
        ],
        None => vec![CipherCandidate::legacy_default()],
    }
}

/// Cipher configuration for the header, as used when writing a container
pub(crate) fn writing_candidate(header: &ContainerHeader) -> CipherCandidate {
    match header.salt_and_rounds() {
        Some(pair) => CipherCandidate::current(pair.clone()),
        None => CipherCandidate::legacy_default(),
    }
}

/// Used to initialise the encryption/decryption cipher
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct CipherKey(pub(crate) Vec<u8>);

#[derive(Clone)]
/// Algorithm, key and parameters used to decrypt one container
///
/// Built once from a [`CipherCandidate`] and reused for every
/// subsequent read or write of that container.
pub struct CipherSuite {
    generation: Generation,
    algorithm: CipherAlgorithm,
    salt_and_rounds: Option<SaltAndRounds>,
    pub(crate) key: CipherKey,
    pub(crate) iv: Vec<u8>,
}

impl CipherSuite {
    /// Format generation the key was derived for
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Payload encryption algorithm
    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    /// Salt and rounds this key was derived from, `None` for legacy keys
    pub fn salt_and_rounds(&self) -> Option<&SaltAndRounds> {
        self.salt_and_rounds.as_ref()
    }
}

impl fmt::Debug for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherSuite")
            .field("generation", &self.generation)
            .field("algorithm", &self.algorithm)
            .field("salt_and_rounds", &self.salt_and_rounds)
            .finish_non_exhaustive()
    }
}

/// Repeat `data` to fill a whole number of `block` sized chunks
fn fill_blocks(data: &[u8], block: usize) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }
    let len = block * ((data.len() + block - 1) / block);
    data.iter().cycle().take(len).copied().collect()
}

/// PKCS#12 key derivation (RFC 7292, appendix B.2)
pub(crate) fn pkcs12_kdf<D: Digest + BlockSizeUser>(
    password: &[u8],
    salt: &[u8],
    id: u8,
    iterations: u32,
    len: usize,
) -> Vec<u8> {
    let u = <D as Digest>::output_size();
    let v = <D as BlockSizeUser>::block_size();

    let diversifier = vec![id; v];
    let mut input = fill_blocks(salt, v);
    input.extend(fill_blocks(password, v));

    let mut output = Vec::with_capacity(len + u);
    while output.len() < len {
        let mut hasher = D::new();
        hasher.update(&diversifier);
        hasher.update(&input);
        let mut a = hasher.finalize();
        for _ in 1..iterations {
            a = D::digest(&a);
        }
        output.extend_from_slice(&a);
        if output.len() >= len {
            break;
        }

        // I_j = (I_j + B + 1) mod 2^(8v) for every v byte block of I
        let b: Vec<u8> = a.iter().cycle().take(v).copied().collect();
        for chunk in input.chunks_mut(v) {
            let mut carry = 1u16;
            for (byte, add) in chunk.iter_mut().zip(b.iter()).rev() {
                let sum = *byte as u16 + *add as u16 + carry;
                *byte = sum as u8;
                carry = sum >> 8;
            }
        }
    }
    input.zeroize();
    output.truncate(len);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(rounds: u8) -> SaltAndRounds {
        SaltAndRounds::new(vec![1, 2, 3, 4, 5, 6, 7, 8], rounds).unwrap()
    }

    #[test]
    fn password_encoding_is_nul_terminated_utf16() {
        assert_eq!(
            Password::new("ab").pkcs12_bytes(),
            vec![0x00, 0x61, 0x00, 0x62, 0x00, 0x00]
        );
        assert_eq!(Password::new("").pkcs12_bytes(), Vec::<u8>::new());
        assert_eq!(
            Password::new("\u{1F512}").pkcs12_bytes(),
            vec![0xD8, 0x3D, 0xDD, 0x12, 0x00, 0x00]
        );
    }

    #[test]
    fn rounds_map_to_powers_of_two() {
        assert_eq!(iterations_for_rounds(4), 16);
        assert_eq!(iterations_for_rounds(10), 1024);
        assert_eq!(iterations_for_rounds(31), 1 << 31);
    }

    #[test]
    fn rounds_beyond_range_do_not_overflow() {
        assert_eq!(iterations_for_rounds(32), 1 << 31);
        assert_eq!(iterations_for_rounds(u8::MAX), 1 << 31);
    }

    #[test]
    fn salted_header_tries_current_then_legacy() {
        let header = ContainerHeader::Salted(pair(10));
        let candidates = cipher_candidates(&header);
        let generations: Vec<_> = candidates.iter().map(|c| c.generation()).collect();
        assert_eq!(generations, vec![Generation::Current, Generation::LegacyDefault]);
        assert_eq!(candidates[0].salt_and_rounds(), Some(&pair(10)));
        assert_eq!(candidates[1].salt_and_rounds(), None);
    }

    #[test]
    fn legacy_header_has_one_candidate() {
        let candidates = cipher_candidates(&ContainerHeader::Legacy);
        assert_eq!(candidates, vec![CipherCandidate::legacy_default()]);
    }

    #[test]
    fn derivation_is_deterministic() {
        let candidate = CipherCandidate::current(pair(4));
        let first = candidate.derive(&Password::new("hunter2"));
        let second = candidate.derive(&Password::new("hunter2"));
        assert_eq!(first.key.0, second.key.0);
        assert_eq!(first.iv, second.iv);
        assert_eq!(first.key.0.len(), AES256_KEY_LENGTH);
        assert_eq!(first.iv.len(), AES_BLOCK_LENGTH);
    }

    #[test]
    fn derivation_depends_on_every_input() {
        let base = CipherCandidate::current(pair(4)).derive(&Password::new("hunter2"));
        let other_password = CipherCandidate::current(pair(4)).derive(&Password::new("hunter3"));
        let other_rounds = CipherCandidate::current(pair(5)).derive(&Password::new("hunter2"));
        let other_salt = CipherCandidate::current(SaltAndRounds::new(vec![8; 8], 4).unwrap())
            .derive(&Password::new("hunter2"));
        let legacy = CipherCandidate::legacy_default().derive(&Password::new("hunter2"));
        for other in [other_password, other_rounds, other_salt, legacy] {
            assert_ne!(base.key.0, other.key.0);
        }
    }

    #[test]
    fn key_and_iv_use_different_diversifiers() {
        let key = pkcs12_kdf::<Sha256>(b"\x00a\x00\x00", b"salt", KEY_MATERIAL_ID, 1, 16);
        let iv = pkcs12_kdf::<Sha256>(b"\x00a\x00\x00", b"salt", IV_MATERIAL_ID, 1, 16);
        assert_ne!(key, iv);
    }

    #[test]
    fn longer_output_extends_shorter_output() {
        let short = pkcs12_kdf::<Sha256>(b"\x00a\x00\x00", b"salt", KEY_MATERIAL_ID, 3, 32);
        let long = pkcs12_kdf::<Sha256>(b"\x00a\x00\x00", b"salt", KEY_MATERIAL_ID, 3, 80);
        assert_eq!(long.len(), 80);
        assert_eq!(&long[..32], &short[..]);
    }

    #[test]
    fn single_iteration_is_one_hash() {
        let out = pkcs12_kdf::<Sha256>(&[], &[], KEY_MATERIAL_ID, 1, 32);
        let expected = Sha256::digest([KEY_MATERIAL_ID; 64]);
        assert_eq!(out, expected.to_vec());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let suite = CipherCandidate::legacy_default().derive(&Password::new("hunter2"));
        let debug = format!("{:?} {:?}", suite, Password::new("hunter2"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("key"));
    }
}
