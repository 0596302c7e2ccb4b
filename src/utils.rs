//! Utilities to help working with secrets-rs

use std::fmt::Write;
use std::io;

pub(crate) fn buffer(len: usize) -> Vec<u8> {
    let mut v = Vec::with_capacity(len);
    v.resize_with(len, Default::default);
    v
}

/// Fill as much of `buf` as the reader allows, stopping early only at EOF
///
/// Returns the number of bytes actually read.
pub(crate) fn read_up_to<R: io::Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(count) => filled += count,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Convert a byte array to a hex string
/// e.g. [0xf2, 0xa2, 0x02] => "f2a202"
pub(crate) fn to_hex_string(data: &[u8]) -> String {
    let mut output = String::with_capacity(data.len() * 2);

    for byte in data {
        // Writing into a String cannot fail
        let _ = write!(output, "{:02x}", byte);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Trickle<'a>(&'a [u8]);

    impl<'a> io::Read for Trickle<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn read_up_to_collects_short_reads() {
        let mut reader = Trickle(&[1, 2, 3]);
        let mut buf = [0u8; 5];
        assert_eq!(read_up_to(&mut reader, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn hex_is_zero_padded() {
        assert_eq!(to_hex_string(&[0xf2, 0xa2, 0x02]), "f2a202");
    }
}
