use crate::crypto;
use crate::utils;
use cipher::block_padding::{Padding, Pkcs7};
use cipher::generic_array::GenericArray;
use cipher::{Block, BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use std::io;
use thiserror::Error;

/// The final block of a stream does not carry valid PKCS#7 padding
#[derive(Debug, Error)]
#[error("Bad padding")]
pub(crate) struct BadPadding;

/// Whether `e` came from a failed padding check on the last block
///
/// With the right key this means the ciphertext ended early on a block
/// boundary.
pub(crate) fn is_bad_padding(e: &io::Error) -> bool {
    e.get_ref().map_or(false, |inner| inner.is::<BadPadding>())
}

#[derive(Debug, Error)]
pub(crate) enum BlockCipherError {
    #[error("Invalid length for key or IV")]
    InvalidLength(#[from] cipher::crypto_common::InvalidLength),
}

/// Decrypts a CBC stream one block at a time
///
/// One ciphertext block is always held back so the final block can be
/// recognised and its padding stripped.
pub(crate) struct BlockCipherReader<C, R>
where
    R: io::Read,
    C: BlockCipher + BlockDecryptMut,
{
    inner: R,
    cipher: cbc::Decryptor<C>,
    plain: Block<C>,
    plain_len: usize,
    plain_idx: usize,
    lookahead: Option<Block<C>>,
    started: bool,
}

impl<C, R> BlockCipherReader<C, R>
where
    R: io::Read,
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    pub(crate) fn wrap(
        inner: R,
        key: &crypto::CipherKey,
        iv: &[u8],
    ) -> Result<BlockCipherReader<C, R>, BlockCipherError> {
        Ok(BlockCipherReader {
            inner,
            cipher: cbc::Decryptor::new_from_slices(&key.0, iv)?,
            plain: GenericArray::default(),
            plain_len: 0,
            plain_idx: 0,
            lookahead: None,
            started: false,
        })
    }
}

impl<C, R> BlockCipherReader<C, R>
where
    R: io::Read,
    C: BlockCipher + BlockDecryptMut,
{
    fn read_cipher_block(&mut self) -> io::Result<Option<Block<C>>> {
        let mut block: Block<C> = GenericArray::default();
        let count = utils::read_up_to(&mut self.inner, &mut block)?;
        if count == 0 {
            Ok(None)
        } else if count < block.len() {
            Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Data size not a multiple of block size, {} extra bytes",
                    count
                ),
            ))
        } else {
            Ok(Some(block))
        }
    }

    fn buffer_next_block(&mut self) -> io::Result<usize> {
        if !self.started {
            self.started = true;
            self.lookahead = self.read_cipher_block()?;
        }
        let mut block = match self.lookahead.take() {
            Some(block) => block,
            None => return Ok(0),
        };
        self.lookahead = self.read_cipher_block()?;
        self.cipher.decrypt_block_mut(&mut block);

        self.plain = block;
        self.plain_idx = 0;
        self.plain_len = if self.lookahead.is_none() {
            Pkcs7::unpad(&self.plain)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, BadPadding))?
                .len()
        } else {
            self.plain.len()
        };
        Ok(self.plain_len)
    }
}

impl<C, R> io::Read for BlockCipherReader<C, R>
where
    R: io::Read,
    C: BlockCipher + BlockDecryptMut,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        // A fully padded final block decrypts to zero usable bytes
        while self.plain_idx == self.plain_len {
            if self.buffer_next_block()? == 0 {
                return Ok(0);
            }
        }
        let available = &self.plain[self.plain_idx..self.plain_len];
        let copy_len = usize::min(available.len(), buf.len());
        buf[..copy_len].copy_from_slice(&available[..copy_len]);
        self.plain_idx += copy_len;
        Ok(copy_len)
    }
}

pub(crate) trait BlockCipherWriterExt<'a, W>: io::Write
where
    W: io::Write + 'a,
{
    /// Pad and write the final block, returning the wrapped writer
    fn finish(&mut self) -> io::Result<W>;
}

pub(crate) struct BlockCipherWriter<C, W>
where
    W: io::Write,
    C: BlockCipher + BlockEncryptMut,
{
    inner: Option<W>,
    buffer: Block<C>,
    buf_idx: usize,
    cipher: cbc::Encryptor<C>,
}

impl<C, W> BlockCipherWriter<C, W>
where
    W: io::Write,
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    pub(crate) fn wrap(
        inner: W,
        key: &crypto::CipherKey,
        iv: &[u8],
    ) -> Result<BlockCipherWriter<C, W>, BlockCipherError> {
        Ok(BlockCipherWriter {
            inner: Some(inner),
            cipher: cbc::Encryptor::new_from_slices(&key.0, iv)?,
            buffer: GenericArray::default(),
            buf_idx: 0,
        })
    }
}

impl<C, W> BlockCipherWriter<C, W>
where
    W: io::Write,
    C: BlockCipher + BlockEncryptMut,
{
    fn closed() -> io::Error {
        io::Error::new(io::ErrorKind::BrokenPipe, "Cipher stream already finished")
    }

    fn write_buffer(&mut self) -> io::Result<()> {
        let inner = self.inner.as_mut().ok_or_else(Self::closed)?;
        let mut block = std::mem::take(&mut self.buffer);
        self.cipher.encrypt_block_mut(&mut block);
        inner.write_all(&block)?;
        self.buf_idx = 0;
        Ok(())
    }
}

impl<'a, C, W> BlockCipherWriterExt<'a, W> for BlockCipherWriter<C, W>
where
    W: io::Write + 'a,
    C: BlockCipher + BlockEncryptMut,
{
    fn finish(&mut self) -> io::Result<W> {
        if self.inner.is_none() {
            return Err(Self::closed());
        }
        Pkcs7::pad(&mut self.buffer, self.buf_idx);
        self.write_buffer()?;
        let mut inner = self.inner.take().ok_or_else(Self::closed)?;
        inner.flush()?;
        Ok(inner)
    }
}

impl<C, W> io::Write for BlockCipherWriter<C, W>
where
    W: io::Write,
    C: BlockCipher + BlockEncryptMut,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.inner.is_none() {
            return Err(Self::closed());
        }
        let mut remaining = buf;
        while !remaining.is_empty() {
            let space = self.buffer.len() - self.buf_idx;
            let copy_len = usize::min(space, remaining.len());
            self.buffer[self.buf_idx..self.buf_idx + copy_len]
                .copy_from_slice(&remaining[..copy_len]);
            self.buf_idx += copy_len;
            remaining = &remaining[copy_len..];
            if self.buf_idx == self.buffer.len() {
                self.write_buffer()?;
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(inner) = self.inner.as_mut() {
            inner.flush()?
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::Aes256;
    use std::io::{Read, Write};

    fn key() -> crypto::CipherKey {
        crypto::CipherKey((0u8..32).collect())
    }

    const IV: [u8; 16] = [7; 16];

    fn encrypt(data: &[u8]) -> Vec<u8> {
        let mut writer = BlockCipherWriter::<Aes256, _>::wrap(Vec::new(), &key(), &IV).unwrap();
        writer.write_all(data).unwrap();
        writer.finish().unwrap()
    }

    struct OneByte<R>(R);

    impl<R: Read> Read for OneByte<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = usize::min(1, buf.len());
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn ciphertext_is_padded_to_blocks() {
        assert_eq!(encrypt(&[]).len(), 16);
        assert_eq!(encrypt(&[1; 15]).len(), 16);
        assert_eq!(encrypt(&[1; 16]).len(), 32);
        assert_eq!(encrypt(&[1; 33]).len(), 48);
    }

    #[test]
    fn decrypts_across_block_boundaries() {
        for len in [0usize, 1, 15, 16, 17, 32, 100] {
            let plain: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let encrypted = encrypt(&plain);
            let mut reader =
                BlockCipherReader::<Aes256, _>::wrap(OneByte(&*encrypted), &key(), &IV).unwrap();
            let mut decrypted = Vec::new();
            reader.read_to_end(&mut decrypted).unwrap();
            assert_eq!(decrypted, plain);
        }
    }

    #[test]
    fn partial_block_is_unexpected_eof() {
        let encrypted = encrypt(&[5; 20]);
        let mut reader =
            BlockCipherReader::<Aes256, _>::wrap(&encrypted[..24], &key(), &IV).unwrap();
        let mut decrypted = Vec::new();
        let err = reader.read_to_end(&mut decrypted).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn wrong_key_fails_padding_check() {
        let encrypted = encrypt(b"attack at dawn");
        let wrong = crypto::CipherKey(vec![1; 32]);
        let mut reader = BlockCipherReader::<Aes256, _>::wrap(&*encrypted, &wrong, &IV).unwrap();
        let mut decrypted = Vec::new();
        match reader.read_to_end(&mut decrypted) {
            Err(e) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
            // One in 256 keys leaves a byte that happens to look like padding
            Ok(_) => assert_ne!(decrypted, b"attack at dawn"),
        }
    }

    #[test]
    fn block_aligned_truncation_is_bad_padding() {
        // Byte 47 is the last one kept, and 47 is not a padding length
        let plain: Vec<u8> = (0..70).collect();
        let encrypted = encrypt(&plain);
        let mut reader =
            BlockCipherReader::<Aes256, _>::wrap(&encrypted[..48], &key(), &IV).unwrap();
        let mut decrypted = Vec::new();
        let e = reader.read_to_end(&mut decrypted).unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        assert!(is_bad_padding(&e));
        assert!(!is_bad_padding(&io::Error::from(io::ErrorKind::InvalidData)));
    }

    #[test]
    fn writes_after_finish_fail() {
        let mut writer = BlockCipherWriter::<Aes256, _>::wrap(Vec::new(), &key(), &IV).unwrap();
        writer.finish().unwrap();
        assert!(writer.write(&[1]).is_err());
        assert!(writer.finish().is_err());
    }
}
