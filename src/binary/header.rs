use super::errors::{ContainerCreationError, OpenError};
use crate::utils;
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use std::io::{self, Read, Write};

/// Marker at the start of every container that carries salt and rounds
pub const SIGNATURE: [u8; 4] = [0x22, 0x34, 0x56, 0x79];
/// Smallest rounds value a container may record
pub const MIN_ROUNDS: u8 = 4;
/// Largest rounds value a container may record
pub const MAX_ROUNDS: u8 = 31;
/// Rounds used for newly generated headers
pub const DEFAULT_ROUNDS: u8 = 12;
/// Salt length used for newly generated headers
pub const DEFAULT_SALT_LENGTH: usize = 16;

#[derive(Clone, PartialEq, Eq)]
/// Key derivation parameters recorded in the container header
pub struct SaltAndRounds {
    salt: Vec<u8>,
    rounds: u8,
}

impl SaltAndRounds {
    /// Pair a salt with a rounds value
    ///
    /// Returns `None` when rounds is outside [`MIN_ROUNDS`]..=[`MAX_ROUNDS`]
    /// or when the salt does not fit the one byte length prefix.
    pub fn new(salt: Vec<u8>, rounds: u8) -> Option<SaltAndRounds> {
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&rounds) || salt.len() > u8::MAX as usize {
            return None;
        }
        Some(SaltAndRounds { salt, rounds })
    }

    /// Salt mixed into key derivation
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Cost parameter for key derivation
    pub fn rounds(&self) -> u8 {
        self.rounds
    }

    /// Salt as lower case hex
    pub fn salt_hex(&self) -> String {
        utils::to_hex_string(&self.salt)
    }
}

impl fmt::Debug for SaltAndRounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaltAndRounds")
            .field("salt", &self.salt_hex())
            .field("rounds", &self.rounds)
            .finish()
    }
}

/// Raw outcome of reading the first bytes of a container
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum HeaderScan {
    Salted(SaltAndRounds),
    Legacy,
    RoundsOutOfRange(u8),
}

impl HeaderScan {
    /// Salt and rounds, absent for legacy files and discarded out of range values
    pub(crate) fn into_salt_and_rounds(self) -> Option<SaltAndRounds> {
        match self {
            HeaderScan::Salted(pair) => Some(pair),
            _ => None,
        }
    }
}

/// Read the signature, salt and rounds from the start of `reader`
///
/// Short input is reported as a legacy file rather than an error, only
/// failures of the reader itself are returned as `Err`.
pub(crate) fn scan<R: Read>(reader: &mut R) -> io::Result<HeaderScan> {
    let mut signature = [0u8; 4];
    if utils::read_up_to(reader, &mut signature)? < signature.len() || signature != SIGNATURE {
        return Ok(HeaderScan::Legacy);
    }

    let mut length = [0u8];
    if utils::read_up_to(reader, &mut length)? == 0 {
        return Ok(HeaderScan::Legacy);
    }
    let mut salt = utils::buffer(length[0] as usize);
    if utils::read_up_to(reader, &mut salt)? < salt.len() {
        return Ok(HeaderScan::Legacy);
    }

    let mut rounds = [0u8];
    if utils::read_up_to(reader, &mut rounds)? == 0 {
        return Ok(HeaderScan::Legacy);
    }

    Ok(match SaltAndRounds::new(salt, rounds[0]) {
        Some(pair) => HeaderScan::Salted(pair),
        None => HeaderScan::RoundsOutOfRange(rounds[0]),
    })
}

/// Read the salt and rounds in use by a container
///
/// Returns `None` for legacy containers with no header, and for headers
/// whose rounds value is out of range.
pub fn read_salt_and_rounds<R: Read>(mut reader: R) -> io::Result<Option<SaltAndRounds>> {
    Ok(scan(&mut reader)?.into_salt_and_rounds())
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Unencrypted container configuration
///
/// [`ContainerHeader::from_os_random()`] will provide a header with
/// the default rounds and a new salt from the OS secure RNG
pub enum ContainerHeader {
    /// Current format, key derived from the recorded salt and rounds
    Salted(SaltAndRounds),
    /// Older format without a header, the whole file is ciphertext
    Legacy,
}

impl ContainerHeader {
    pub(crate) fn read<R: Read>(reader: &mut R) -> Result<ContainerHeader, OpenError> {
        match scan(reader)? {
            HeaderScan::Salted(pair) => Ok(ContainerHeader::Salted(pair)),
            HeaderScan::Legacy => Ok(ContainerHeader::Legacy),
            HeaderScan::RoundsOutOfRange(rounds) => Err(OpenError::RoundsOutOfRange(rounds)),
        }
    }

    /// Generate a salted header with [`DEFAULT_ROUNDS`] and a random salt
    pub fn from_os_random() -> Result<ContainerHeader, ContainerCreationError> {
        let mut salt = utils::buffer(DEFAULT_SALT_LENGTH);
        OsRng.try_fill_bytes(&mut salt)?;
        let pair = SaltAndRounds {
            salt,
            rounds: DEFAULT_ROUNDS,
        };
        Ok(ContainerHeader::Salted(pair))
    }

    /// Salt and rounds for salted containers
    pub fn salt_and_rounds(&self) -> Option<&SaltAndRounds> {
        match self {
            ContainerHeader::Salted(pair) => Some(pair),
            ContainerHeader::Legacy => None,
        }
    }

    /// Whether this container predates the salted header
    pub fn is_legacy(&self) -> bool {
        *self == ContainerHeader::Legacy
    }

    /// Write the header as it appears at the start of a container
    ///
    /// Legacy headers write nothing.
    pub fn write<W: Write>(&self, mut output: W) -> io::Result<()> {
        if let ContainerHeader::Salted(pair) = self {
            output.write_all(&SIGNATURE)?;
            output.write_all(&[pair.salt.len() as u8])?;
            output.write_all(&pair.salt)?;
            output.write_all(&[pair.rounds])?;
        }
        Ok(())
    }
}
