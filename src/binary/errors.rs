use crate::objstream;
use crate::stream;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors encountered loading a container prior to decryption
pub enum OpenError {
    /// The header carries the signature but a rounds value outside [4, 31]
    #[error("Unsupported container - rounds value {0} is outside the range 4 to 31")]
    RoundsOutOfRange(u8),
    /// Error encountered reading the container
    #[error("IO error reading file - {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
/// Errors encountered unlocking an encrypted container
pub enum UnlockError {
    /// No candidate cipher produced a consistent header and stream
    ///
    /// The format has no authentication tag, so a wrong password and a
    /// damaged file cannot be told apart.
    #[error("Incorrect password or corrupt container")]
    IncorrectPassword,
    /// The decrypted stream ended in the middle of the record list
    #[error("Corrupt container - decrypted data ends unexpectedly")]
    Truncated,
    /// The records use an encoding this library does not read
    #[error("Unsupported container variant - {0}")]
    UnsupportedLegacyVariant(String),
    /// The decrypted data does not follow the record schema
    #[error("Corrupt container - record data is invalid - {0}")]
    InvalidRecords(objstream::Error),
    /// Error seeking or reading the underlying input
    #[error("IO error reading container - {0}")]
    Io(#[from] io::Error),
}

impl From<objstream::Error> for UnlockError {
    fn from(e: objstream::Error) -> UnlockError {
        match e {
            objstream::Error::Io(e)
                if e.kind() == io::ErrorKind::UnexpectedEof || stream::is_bad_padding(&e) =>
            {
                UnlockError::Truncated
            }
            objstream::Error::UnsupportedVersion(version) => UnlockError::UnsupportedLegacyVariant(
                format!("object stream version {}", version),
            ),
            objstream::Error::UnsupportedClassEncoding(class) => {
                UnlockError::UnsupportedLegacyVariant(format!("custom encoding for {}", class))
            }
            e => UnlockError::InvalidRecords(e),
        }
    }
}

#[derive(Debug, Error)]
/// Errors encountered writing a container
pub enum WriteError {
    /// The output failed while writing
    #[error("Error writing container - {0}")]
    Io(#[from] io::Error),
    /// The container could not be written as `set_password()` has not been called.
    #[error("No key to write container with")]
    MissingKeys,
    /// The header was changed after `set_password()` was called
    #[error("Header was changed since the key was derived, call set_password() again")]
    StaleKeys,
}

#[derive(Debug, Error)]
/// Errors encountered creating a new container
pub enum ContainerCreationError {
    /// Could not obtain secure random data
    #[error("Error getting RNG data for salt")]
    Random(#[from] rand::Error),
}
