#![deny(missing_docs)]

//! Module to read and write containers of the Secrets for Android password manager.
//!
//! The main types in this crate are:
//!
//! * [`SecretRecord`] which represents a single stored credential
//! * [`Container`] which represents a container file, including encryption options
//!
//! # Opening a container
//!
//! Containers can be read with the [`secrets_rs::open`] function. This reads
//! the unencrypted header. It can then be unlocked by providing a [`Password`]
//! to the [`Container.unlock`] method to access the stored secrets.
//!
//! ```no_run
//! # fn main() -> Result<(), secrets_rs::Error> {
//! use secrets_rs::Password;
//!
//! let container = secrets_rs::open("secrets")?;
//! let unlocked = container.unlock(&Password::new("hunter2"))?;
//! for secret in unlocked.records() {
//!     println!("{}", secret.description().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! There is no integrity check in the format. A wrong password and damage
//! near the start of the file both surface as
//! [`UnlockError::IncorrectPassword`]. A file cut short after that gives
//! [`UnlockError::Truncated`].
//!
//! Key derivation follows the conventions described in [`crypto`]. They have
//! not yet been checked against a container written by the Android app.
//!
//! # Writing a container
//!
//! A new container is created with [`Container::from_records`], which picks a
//! random salt. Salt and rounds can be changed through
//! [`Container::header_mut`]. Before writing, set the password with
//! [`Container.set_password`].
//!
//! ```rust
//! use secrets_rs::{Container, ContainerHeader, Password, SaltAndRounds, SecretRecord};
//! use std::io::Cursor;
//!
//! # fn main() -> Result<(), secrets_rs::Error> {
//! let record = SecretRecord {
//!     description: Some("Bank".to_string()),
//!     username: Some("alice".to_string()),
//!     ..Default::default()
//! };
//! let mut container = Container::from_records(vec![record])?;
//! *container.header_mut() =
//!     ContainerHeader::Salted(SaltAndRounds::new(vec![7; 8], 4).unwrap());
//! container.set_password(&Password::new("foo123"));
//!
//! let mut file = Vec::new();
//! container.write(&mut file)?;
//!
//! let reopened = secrets_rs::from_reader(Cursor::new(file))?;
//! let unlocked = reopened.unlock(&Password::new("foo123"))?;
//! assert_eq!(unlocked.records()[0].username(), Some("alice"));
//! # Ok(())
//! # }
//! ```
//!
//! # Exporting
//!
//! [`export::write_csv`] writes a header row followed by one row per secret,
//! with passwords in clear.
//!
//! [`Container`]: crate::Container
//! [`Container.unlock`]: crate::Container#method.unlock
//! [`Container.set_password`]: crate::Container#method.set_password
//! [`Password`]: crate::Password
//! [`SecretRecord`]: crate::SecretRecord
//! [`secrets_rs::open`]: crate::open

pub mod binary;
pub mod crypto;
pub mod errors;
pub mod export;
pub mod objstream;
pub mod store;
mod stream;
mod types;
mod utils;

/// Secret record datatypes
pub mod records {
    pub use crate::types::*;
}
pub use binary::{from_reader, open, Container, ContainerHeader, SaltAndRounds};
pub use crypto::Password;
pub use errors::{Error, UnlockError};
pub use store::SecretsFile;
pub use types::SecretRecord;
