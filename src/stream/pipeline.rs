use crate::crypto::{CipherAlgorithm, CipherSuite};
use std::io;

use aes::Aes256;
use derive_more::From;

use super::{BlockCipherReader, BlockCipherWriter, BlockCipherWriterExt};

fn invalid_cipher_params() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        "Invalid cipher params - Could not create CBC block mode".to_string(),
    )
}

/// Decrypting view of a container payload
pub(crate) fn read_stream<'a, R: io::Read + 'a>(
    inner: R,
    suite: &CipherSuite,
) -> io::Result<Box<dyn io::Read + 'a>> {
    let buffered = io::BufReader::new(inner);
    match suite.algorithm() {
        CipherAlgorithm::Pkcs12Sha256Aes256Cbc => {
            BlockCipherReader::<Aes256, _>::wrap(buffered, &suite.key, &suite.iv)
                .map(|r| Box::new(r) as Box<dyn io::Read + 'a>)
                .map_err(|_| invalid_cipher_params())
        }
    }
}

/// Encrypting writer for a container payload
///
/// [`EncryptedWrite::finish`] must be called to write the padded final block.
#[derive(From)]
pub(crate) struct EncryptedWrite<'a, W: 'a + io::Write>(
    Box<dyn BlockCipherWriterExt<'a, io::BufWriter<W>> + 'a>,
);

impl<'a, W> EncryptedWrite<'a, W>
where
    W: 'a + io::Write,
{
    pub(crate) fn finish(mut self) -> io::Result<W> {
        self.0
            .finish()?
            .into_inner()
            .map_err(io::IntoInnerError::into_error)
    }
}

impl<'a, W> io::Write for EncryptedWrite<'a, W>
where
    W: 'a + io::Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

pub(crate) fn write_stream<'a, W: 'a + io::Write>(
    inner: W,
    suite: &CipherSuite,
) -> io::Result<EncryptedWrite<'a, W>> {
    let buffered = io::BufWriter::new(inner);
    let encrypted: Box<dyn BlockCipherWriterExt<'a, io::BufWriter<W>> + 'a> =
        match suite.algorithm() {
            CipherAlgorithm::Pkcs12Sha256Aes256Cbc => {
                BlockCipherWriter::<Aes256, _>::wrap(buffered, &suite.key, &suite.iv)
                    .map(|w| Box::new(w) as Box<dyn BlockCipherWriterExt<'a, _>>)
                    .map_err(|_| invalid_cipher_params())?
            }
        };
    Ok(encrypted.into())
}
