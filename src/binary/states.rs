use super::decode::{self, Attempt};
use super::errors::{self, UnlockError};
use super::header::ContainerHeader;
use crate::crypto::{self, CipherSuite, Password};
use crate::objstream;
use crate::stream;
use crate::types::SecretRecord;
use std::fmt;
use std::io::{Read, Seek, Write};
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Lock state of a [`Container`]
pub trait ContainerState: std::fmt::Debug {
    /// Unencrypted container configuration
    fn header(&self) -> &ContainerHeader;
}

#[derive(Debug)]
/// A secrets container
///
/// Most methods are available on a specific state
/// like Container<Locked> or Container<Unlocked>
pub struct Container<S>
where
    S: ContainerState,
{
    pub(super) state: S,
}

impl<T: ContainerState> Container<T> {
    /// Unencrypted container configuration
    pub fn header(&self) -> &ContainerHeader {
        self.state.header()
    }
}

/// A locked container, use unlock(password) to unlock
///
/// Holds on to the input, which is read again for every candidate cipher.
pub struct Locked<R> {
    /// Header read when the container was opened
    pub(crate) header: ContainerHeader,
    /// Seekable source of the whole container
    pub(crate) input: R,
}

impl<R> fmt::Debug for Locked<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locked")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl<R> ContainerState for Locked<R> {
    fn header(&self) -> &ContainerHeader {
        &self.header
    }
}

/// Error from [`Container::unlock`], returning the still locked container
pub struct FailedUnlock<R>(
    /// The container, still locked and ready for another attempt
    pub Container<Locked<R>>,
    /// Why unlocking failed
    pub UnlockError,
);

impl<R> fmt::Debug for FailedUnlock<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FailedUnlock")
            .field(&self.0)
            .field(&self.1)
            .finish()
    }
}

impl<R> fmt::Display for FailedUnlock<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.1, f)
    }
}

impl<R> std::error::Error for FailedUnlock<R> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.1)
    }
}

impl<R> From<FailedUnlock<R>> for UnlockError {
    fn from(failed: FailedUnlock<R>) -> UnlockError {
        failed.1
    }
}

impl<R: Read + Seek> Container<Locked<R>> {
    fn decode(
        &mut self,
        password: &Password,
    ) -> Result<(CipherSuite, Vec<SecretRecord>), UnlockError> {
        for candidate in crypto::cipher_candidates(&self.state.header) {
            let suite = candidate.derive(password);
            match decode::decode_with(&mut self.state.input, &suite)? {
                Attempt::Decoded(records) => return Ok((suite, records)),
                Attempt::Rejected => {
                    debug!(generation = ?candidate.generation(), "Candidate cipher rejected")
                }
            }
        }
        Err(UnlockError::IncorrectPassword)
    }

    /// Unlocks the container
    ///
    /// Candidate ciphers are tried in order and the first whose header and
    /// stream check out is kept for later writes. If unlock fails, returns
    /// the locked container along with the error.
    pub fn unlock(
        mut self,
        password: &Password,
    ) -> Result<Container<Unlocked>, FailedUnlock<R>> {
        match self.decode(password) {
            Ok((suite, records)) => Ok(Container {
                state: Unlocked {
                    header: self.state.header,
                    suite: Some(suite),
                    records,
                },
            }),
            Err(e) => Err(FailedUnlock(self, e)),
        }
    }

    /// Give back the underlying input
    pub fn into_inner(self) -> R {
        self.state.input
    }
}

#[derive(Debug)]
/// An unlocked container, allowing access to stored secrets
pub struct Unlocked {
    /// Header the container is written with
    pub(crate) header: ContainerHeader,
    /// Cipher derived when unlocking or from [`Container::set_password`]
    pub(crate) suite: Option<CipherSuite>,
    /// Decoded secrets, in stored order
    pub(crate) records: Vec<SecretRecord>,
}

impl ContainerState for Unlocked {
    fn header(&self) -> &ContainerHeader {
        &self.header
    }
}

impl Container<Unlocked> {
    /// Generate a new container holding the given records
    ///
    /// Uses OS randomness to generate the salt. Note that you need to set a
    /// password with [`Container::set_password`] to be able to write it.
    pub fn from_records(
        records: Vec<SecretRecord>,
    ) -> Result<Container<Unlocked>, errors::ContainerCreationError> {
        let header = ContainerHeader::from_os_random()?;
        Ok(Container {
            state: Unlocked {
                header,
                suite: None,
                records,
            },
        })
    }

    /// Mutable access to the header, to change salt or rounds before writing
    ///
    /// Keys derived earlier no longer match a changed header, call
    /// [`Container::set_password`] again afterwards.
    pub fn header_mut(&mut self) -> &mut ContainerHeader {
        &mut self.state.header
    }

    /// Derive the key used to write this container from `password`
    pub fn set_password(&mut self, password: &Password) {
        let candidate = crypto::writing_candidate(&self.state.header);
        self.state.suite = Some(candidate.derive(password));
    }

    /// Cipher used to write the container, if a password is known
    pub fn cipher_suite(&self) -> Option<&CipherSuite> {
        self.state.suite.as_ref()
    }

    /// Secrets held by this container
    pub fn records(&self) -> &[SecretRecord] {
        &self.state.records
    }

    /// Consume the container, returning its secrets
    pub fn into_records(self) -> Vec<SecretRecord> {
        self.state.records
    }

    /// Write this container to the given output stream
    pub fn write<W: Write>(&self, mut output: W) -> Result<(), errors::WriteError> {
        let suite = self
            .state
            .suite
            .as_ref()
            .ok_or(errors::WriteError::MissingKeys)?;
        if suite.salt_and_rounds() != self.state.header.salt_and_rounds() {
            return Err(errors::WriteError::StaleKeys);
        }
        self.state.header.write(&mut output)?;
        let mut encrypted = stream::write_stream(&mut output, suite)?;
        objstream::write_records(&mut encrypted, &self.state.records)?;
        encrypted.finish()?;
        output.flush()?;
        Ok(())
    }
}

impl Deref for Container<Unlocked> {
    type Target = Vec<SecretRecord>;

    fn deref(&self) -> &Vec<SecretRecord> {
        &self.state.records
    }
}

impl DerefMut for Container<Unlocked> {
    fn deref_mut(&mut self) -> &mut Vec<SecretRecord> {
        &mut self.state.records
    }
}
