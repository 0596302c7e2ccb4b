//! Serialized access to a container on disk

use crate::binary::{self, Container, Unlocked};
use crate::crypto::Password;
use crate::errors::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// A container file shared between several users of the same process
///
/// Every load and save holds one lock for the whole operation, so at most
/// one accessor touches the file at a time. Share it behind an `Arc`.
#[derive(Debug)]
pub struct SecretsFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SecretsFile {
    /// Access the container at `path`, which need not exist yet
    pub fn new<P: Into<PathBuf>>(path: P) -> SecretsFile {
        SecretsFile {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the container
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // Nothing is guarded, so poisoning carries no state
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open and unlock the container
    pub fn load(&self, password: &Password) -> Result<Container<Unlocked>, Error> {
        let _guard = self.guard();
        debug!(path = %self.path.display(), "Loading container");
        let locked = binary::open(&self.path)?;
        Ok(locked.unlock(password)?)
    }

    /// Write the container, replacing the file at this path
    ///
    /// The data is written to a sibling temporary file which is then renamed
    /// over the original.
    pub fn save(&self, container: &Container<Unlocked>) -> Result<(), Error> {
        let _guard = self.guard();
        debug!(path = %self.path.display(), "Saving container");
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        let written = File::create(&temp)
            .map_err(binary::errors::WriteError::from)
            .and_then(|file| container.write(BufWriter::new(file)));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        fs::rename(&temp, &self.path).map_err(binary::errors::WriteError::from)?;
        Ok(())
    }
}
