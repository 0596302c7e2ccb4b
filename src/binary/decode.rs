use super::errors::UnlockError;
use super::header;
use crate::crypto::CipherSuite;
use crate::objstream::{self, RecordReader};
use crate::stream;
use crate::types::SecretRecord;
use std::io::{Read, Seek, SeekFrom};
use tracing::debug;

/// Result of trying one candidate cipher against a container
pub(crate) enum Attempt {
    /// The header and stream preamble matched, records follow
    Decoded(Vec<SecretRecord>),
    /// This cipher does not fit the container, try the next one
    Rejected,
}

/// Decode the records of `input` using `suite`
///
/// The input is rewound and the plaintext header read again and compared
/// with the parameters the suite was derived from. A mismatch, or a stream
/// that does not start with the object stream magic, rejects the candidate.
/// Once the magic is accepted any further decode failure is returned as an
/// error.
pub(crate) fn decode_with<R: Read + Seek>(
    input: &mut R,
    suite: &CipherSuite,
) -> Result<Attempt, UnlockError> {
    input.seek(SeekFrom::Start(0))?;
    let recorded = header::scan(input)?.into_salt_and_rounds();
    if recorded.as_ref() != suite.salt_and_rounds() {
        debug!(generation = ?suite.generation(), "Header does not match candidate cipher");
        return Ok(Attempt::Rejected);
    }
    if recorded.is_none() {
        // No header, the whole file is ciphertext
        input.seek(SeekFrom::Start(0))?;
    }

    let decrypted = stream::read_stream(&mut *input, suite)?;
    let mut reader = RecordReader::new(decrypted);
    match reader.read_preamble() {
        Ok(()) => {}
        Err(e @ objstream::Error::UnsupportedVersion(_)) => return Err(e.into()),
        Err(e) => {
            debug!(generation = ?suite.generation(), "Stream preamble rejected: {}", e);
            return Ok(Attempt::Rejected);
        }
    }
    let records = reader.read_records()?;
    debug!(count = records.len(), "Decoded records");
    Ok(Attempt::Decoded(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::{ContainerHeader, SaltAndRounds};
    use crate::crypto::{self, Password};
    use crate::objstream::tags;
    use std::io::{Cursor, Write};

    const PASSWORD: &str = "legacy variant";

    /// A salted container whose plaintext is exactly `payload`
    fn container_with_payload(payload: &[u8]) -> Vec<u8> {
        let header = ContainerHeader::Salted(SaltAndRounds::new(vec![3; 8], 4).unwrap());
        let suite = crypto::writing_candidate(&header).derive(&Password::new(PASSWORD));
        let mut data = Vec::new();
        header.write(&mut data).unwrap();
        let mut encrypted = stream::write_stream(&mut data, &suite).unwrap();
        encrypted.write_all(payload).unwrap();
        encrypted.finish().unwrap();
        data
    }

    fn unlock(data: Vec<u8>) -> Result<Vec<SecretRecord>, UnlockError> {
        let locked = crate::from_reader(Cursor::new(data)).unwrap();
        match locked.unlock(&Password::new(PASSWORD)) {
            Ok(unlocked) => Ok(unlocked.into_records()),
            Err(failed) => Err(failed.into()),
        }
    }

    #[test]
    fn older_stream_version_is_unsupported() {
        let mut payload = tags::STREAM_MAGIC.to_be_bytes().to_vec();
        payload.extend_from_slice(&4u16.to_be_bytes());
        payload.push(tags::TC_NULL);
        match unlock(container_with_payload(&payload)) {
            Err(UnlockError::UnsupportedLegacyVariant(detail)) => {
                assert!(detail.contains('4'), "{}", detail)
            }
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test]
    fn externalized_list_is_unsupported() {
        let mut payload = tags::STREAM_MAGIC.to_be_bytes().to_vec();
        payload.extend_from_slice(&tags::STREAM_VERSION.to_be_bytes());
        payload.push(tags::TC_OBJECT);
        payload.push(tags::TC_CLASSDESC);
        payload.extend_from_slice(&(tags::ARRAY_LIST_CLASS.len() as u16).to_be_bytes());
        payload.extend_from_slice(tags::ARRAY_LIST_CLASS.as_bytes());
        payload.extend_from_slice(&tags::ARRAY_LIST_UID.to_be_bytes());
        payload.push(tags::SC_EXTERNALIZABLE | 0x08);
        payload.extend_from_slice(&0u16.to_be_bytes());
        payload.push(tags::TC_ENDBLOCKDATA);
        payload.push(tags::TC_NULL);
        payload.push(tags::TC_ENDBLOCKDATA);
        assert!(matches!(
            unlock(container_with_payload(&payload)),
            Err(UnlockError::UnsupportedLegacyVariant(_))
        ));
    }

    #[test]
    fn foreign_magic_rejects_every_candidate() {
        let payload = [0xCA, 0xFE, 0x00, 0x05, tags::TC_NULL];
        assert!(matches!(
            unlock(container_with_payload(&payload)),
            Err(UnlockError::IncorrectPassword)
        ));
    }
}
