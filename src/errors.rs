//! Error types for secrets-rs

pub use crate::binary::errors::{ContainerCreationError, OpenError, UnlockError, WriteError};
pub use crate::binary::FailedUnlock;
pub use crate::export::ExportError;
pub use crate::objstream::Error as RecordError;
use thiserror::Error;

#[derive(Error, Debug)]
/// Wrapper error type for this library
pub enum Error {
    /// Failed to open a container
    #[error("Could not open container: {0}")]
    Open(#[from] OpenError),
    /// Failed unlocking a container
    #[error("Could not unlock container: {0}")]
    Unlock(#[from] UnlockError),
    /// Failed writing a container
    #[error("Could not write container: {0}")]
    Write(#[from] WriteError),
    /// Failed generating a new container
    #[error("Could not create container: {0}")]
    Creation(#[from] ContainerCreationError),
    /// Failed exporting secrets
    #[error("Could not export secrets: {0}")]
    Export(#[from] ExportError),
}

impl<R> From<FailedUnlock<R>> for Error {
    fn from(failed: FailedUnlock<R>) -> Error {
        Error::Unlock(failed.1)
    }
}
