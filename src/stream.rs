//! Encryption of the container payload

mod block_cipher;
mod pipeline;

pub(crate) use block_cipher::{
    is_bad_padding, BlockCipherReader, BlockCipherWriter, BlockCipherWriterExt,
};
pub(crate) use pipeline::{read_stream, write_stream};
