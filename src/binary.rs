//! Secrets container files and the outer binary format

mod decode;
pub(crate) mod errors;
mod header;
mod read;
mod states;

pub use header::{
    read_salt_and_rounds, ContainerHeader, SaltAndRounds, DEFAULT_ROUNDS, DEFAULT_SALT_LENGTH,
    MAX_ROUNDS, MIN_ROUNDS, SIGNATURE,
};
pub use read::{from_reader, open};
pub use states::{Container, ContainerState, FailedUnlock, Locked, Unlocked};
