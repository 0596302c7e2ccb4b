use super::{errors, header::ContainerHeader, Container, Locked};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Read a container from a seekable input
///
/// Only the header is read here. The container starts locked, use
/// [`Container::unlock`] to decrypt it. Rounds outside the supported range
/// are rejected before any password is needed.
pub fn from_reader<R: Read + Seek>(
    mut input: R,
) -> Result<Container<Locked<R>>, errors::OpenError> {
    input.seek(SeekFrom::Start(0))?;
    let header = ContainerHeader::read(&mut input)?;
    debug!(legacy = header.is_legacy(), "Read container header");
    Ok(Container {
        state: Locked { header, input },
    })
}

/// Read a container from a given path
///
/// The container starts locked, use [`Container::unlock`] to unlock
pub fn open<P: AsRef<Path>>(path: P) -> Result<Container<Locked<File>>, errors::OpenError> {
    let file = File::open(path.as_ref())?;
    from_reader(file)
}
