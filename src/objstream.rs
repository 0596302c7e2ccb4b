//! Decoding and encoding of the record list inside a decrypted container
//!
//! The originating application stores its secrets as a serialized
//! `java.util.ArrayList` of `Secret` objects. Only that fixed schema is
//! understood: the list, the secret class and its access log entries.
//! Any other class in the stream is rejected.

mod mutf8;
pub(crate) mod parse;
pub(crate) mod serialize;
pub(crate) mod tags;

pub use parse::Error;
pub(crate) use parse::RecordReader;
pub(crate) use serialize::write_records;
