use super::mutf8;
use super::tags::{self, field};
use crate::types::{AccessKind, AccessLogEntry, SecretRecord};
use std::io::{self, Read};
use std::rc::Rc;
use thiserror::Error;
use tracing::{trace, warn};

#[derive(Debug, Error)]
/// Error encountered decoding the record list
pub enum Error {
    /// The decrypted stream failed or ended early
    #[error("Error reading record data - {0}")]
    Io(#[from] io::Error),
    /// The stream does not start with the object stream magic
    #[error("Not a record stream - bad magic {0:#06x}")]
    BadMagic(u16),
    /// The stream uses an object stream version other than 5
    #[error("Unsupported object stream version {0}")]
    UnsupportedVersion(u16),
    /// A type tag appeared where the schema does not allow it
    #[error("Expected {expected}, found tag {found:#04x}")]
    UnexpectedTag {
        /// What the schema called for at this point
        expected: &'static str,
        /// Tag byte actually present
        found: u8,
    },
    /// The stream contains a class outside the record schema
    #[error("Unexpected class {0}")]
    UnexpectedClass(String),
    /// A known field is stored with a type the schema does not allow
    #[error("Field {field} of {class} has unsupported type {signature}")]
    UnexpectedFieldType {
        /// Class declaring the field
        class: String,
        /// Field name
        field: String,
        /// Declared type signature
        signature: String,
    },
    /// A schema class was written with a custom or externalizable encoding
    #[error("Class {0} uses an encoding that is not supported")]
    UnsupportedClassEncoding(String),
    /// A back-reference points at an unknown or incomplete object
    #[error("Invalid back-reference {0:#x}")]
    InvalidHandle(u32),
    /// A string is not valid modified UTF-8
    #[error("Invalid string data")]
    InvalidString,
    /// A list declared a negative size
    #[error("Invalid list size {0}")]
    InvalidSize(i32),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldType {
    Primitive(u8),
    Object(Rc<str>),
}

#[derive(Debug)]
struct FieldDesc {
    name: String,
    ty: FieldType,
}

#[derive(Debug)]
struct ClassDesc {
    name: String,
    flags: u8,
    fields: Vec<FieldDesc>,
    superclass: Option<Rc<ClassDesc>>,
}

impl ClassDesc {
    fn has_write_method(&self) -> bool {
        self.flags & tags::SC_WRITE_METHOD != 0
    }
}

/// Objects that a later back-reference may point to
#[derive(Debug, Clone)]
enum Handle {
    Pending,
    ClassDesc(Rc<ClassDesc>),
    Str(Rc<str>),
    Secret(SecretRecord),
    SecretList(Vec<SecretRecord>),
    LogEntry(AccessLogEntry),
    AccessLog(Vec<AccessLogEntry>),
}

enum FieldValue {
    Int(i32),
    Long(i64),
    OtherPrimitive,
    Str(Option<Rc<str>>),
    AccessLog(Vec<AccessLogEntry>),
}

/// Reads the record list from a decrypted container stream
pub(crate) struct RecordReader<R: Read> {
    inner: R,
    handles: Vec<Handle>,
}

impl<R: Read> RecordReader<R> {
    pub(crate) fn new(inner: R) -> RecordReader<R> {
        RecordReader {
            inner,
            handles: Vec::new(),
        }
    }

    /// Check the stream magic and version
    ///
    /// Failing the magic check is the expected result of decrypting with
    /// the wrong key.
    pub(crate) fn read_preamble(&mut self) -> Result<()> {
        let magic = self.read_u16()?;
        if magic != tags::STREAM_MAGIC {
            return Err(Error::BadMagic(magic));
        }
        let version = self.read_u16()?;
        if version != tags::STREAM_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        Ok(())
    }

    /// Decode the full list of secrets following the preamble
    pub(crate) fn read_records(&mut self) -> Result<Vec<SecretRecord>> {
        let tag = self.read_tag()?;
        match tag {
            tags::TC_OBJECT => {
                let desc = self.read_class_desc_required()?;
                let handle = self.new_handle();
                let records = self.read_list_data(&desc, Self::read_secret)?;
                self.fill_handle(handle, Handle::SecretList(records.clone()));
                Ok(records)
            }
            tags::TC_REFERENCE => match self.read_reference()? {
                Handle::SecretList(records) => Ok(records),
                _ => Err(Error::UnexpectedClass("non-list top level object".into())),
            },
            found => Err(Error::UnexpectedTag {
                expected: "record list",
                found,
            }),
        }
    }

    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    fn read_i64(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    fn skip(&mut self, len: u64) -> Result<()> {
        let skipped = io::copy(&mut (&mut self.inner).take(len), &mut io::sink())?;
        if skipped < len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(())
    }

    fn read_tag(&mut self) -> Result<u8> {
        loop {
            let tag = self.read_u8()?;
            if tag != tags::TC_RESET {
                return Ok(tag);
            }
            trace!("Object stream reset");
            self.handles.clear();
        }
    }

    fn new_handle(&mut self) -> usize {
        self.handles.push(Handle::Pending);
        self.handles.len() - 1
    }

    /// Completes a handle reserved before its object was read, unless a reset dropped it
    fn fill_handle(&mut self, idx: usize, value: Handle) {
        if let Some(slot) = self.handles.get_mut(idx) {
            *slot = value;
        }
    }

    fn read_reference(&mut self) -> Result<Handle> {
        let wire = self.read_i32()? as u32;
        let handle = wire
            .checked_sub(tags::BASE_WIRE_HANDLE)
            .and_then(|idx| self.handles.get(idx as usize));
        match handle {
            None | Some(Handle::Pending) => Err(Error::InvalidHandle(wire)),
            Some(handle) => Ok(handle.clone()),
        }
    }

    fn read_utf_body(&mut self, len: u64) -> Result<String> {
        let mut bytes = Vec::new();
        (&mut self.inner).take(len).read_to_end(&mut bytes)?;
        if (bytes.len() as u64) < len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        mutf8::decode(&bytes).ok_or(Error::InvalidString)
    }

    fn read_utf(&mut self) -> Result<String> {
        let len = self.read_u16()?;
        self.read_utf_body(len as u64)
    }

    /// String object, a back-reference to one, or null
    fn read_string(&mut self) -> Result<Option<Rc<str>>> {
        let tag = self.read_tag()?;
        let body_len = match tag {
            tags::TC_NULL => return Ok(None),
            tags::TC_REFERENCE => {
                return match self.read_reference()? {
                    Handle::Str(s) => Ok(Some(s)),
                    _ => Err(Error::UnexpectedClass("non-string in string field".into())),
                }
            }
            tags::TC_STRING => self.read_u16()? as u64,
            tags::TC_LONGSTRING => self.read_i64()? as u64,
            found => {
                return Err(Error::UnexpectedTag {
                    expected: "string",
                    found,
                })
            }
        };
        let s: Rc<str> = self.read_utf_body(body_len)?.into();
        self.handles.push(Handle::Str(s.clone()));
        Ok(Some(s))
    }

    fn read_class_desc_required(&mut self) -> Result<Rc<ClassDesc>> {
        let tag = self.read_tag()?;
        self.read_class_desc(tag)?.ok_or(Error::UnexpectedTag {
            expected: "class descriptor",
            found: tags::TC_NULL,
        })
    }

    fn read_class_desc(&mut self, tag: u8) -> Result<Option<Rc<ClassDesc>>> {
        match tag {
            tags::TC_NULL => Ok(None),
            tags::TC_REFERENCE => match self.read_reference()? {
                Handle::ClassDesc(desc) => Ok(Some(desc)),
                _ => Err(Error::UnexpectedTag {
                    expected: "class descriptor reference",
                    found: tag,
                }),
            },
            tags::TC_CLASSDESC => self.read_new_class_desc().map(Some),
            tags::TC_PROXYCLASSDESC => Err(Error::UnexpectedClass("dynamic proxy".into())),
            found => Err(Error::UnexpectedTag {
                expected: "class descriptor",
                found,
            }),
        }
    }

    fn read_new_class_desc(&mut self) -> Result<Rc<ClassDesc>> {
        let handle = self.new_handle();
        let name = self.read_utf()?;
        // Serial version UIDs are not checked
        let uid = self.read_i64()?;
        let flags = self.read_u8()?;
        let field_count = self.read_u16()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            let code = self.read_u8()?;
            let field_name = self.read_utf()?;
            let ty = match code {
                field::OBJECT | field::ARRAY => match self.read_string()? {
                    Some(signature) => FieldType::Object(signature),
                    None => {
                        return Err(Error::UnexpectedTag {
                            expected: "field type name",
                            found: tags::TC_NULL,
                        })
                    }
                },
                field::BYTE
                | field::CHAR
                | field::DOUBLE
                | field::FLOAT
                | field::INT
                | field::LONG
                | field::SHORT
                | field::BOOLEAN => FieldType::Primitive(code),
                found => {
                    return Err(Error::UnexpectedTag {
                        expected: "field type code",
                        found,
                    })
                }
            };
            fields.push(FieldDesc {
                name: field_name,
                ty,
            });
        }
        self.skip_annotation()?;
        let super_tag = self.read_tag()?;
        let superclass = self.read_class_desc(super_tag)?;

        trace!(class = %name, uid, flags, "Read class descriptor");
        let desc = Rc::new(ClassDesc {
            name,
            flags,
            fields,
            superclass,
        });
        self.fill_handle(handle, Handle::ClassDesc(desc.clone()));
        Ok(desc)
    }

    /// Skip primitive block data up to the end marker
    fn skip_annotation(&mut self) -> Result<()> {
        loop {
            match self.read_tag()? {
                tags::TC_ENDBLOCKDATA => return Ok(()),
                tags::TC_BLOCKDATA => {
                    let len = self.read_u8()?;
                    self.skip(len as u64)?;
                }
                tags::TC_BLOCKDATALONG => {
                    let len = self.read_i32()?;
                    self.skip(len as u32 as u64)?;
                }
                found => {
                    return Err(Error::UnexpectedTag {
                        expected: "end of annotation",
                        found,
                    })
                }
            }
        }
    }

    /// Schema classes are plain serializable classes with no serializable parent
    fn check_schema_class(&self, desc: &ClassDesc, expected: &str) -> Result<()> {
        if desc.name != expected {
            return Err(Error::UnexpectedClass(desc.name.clone()));
        }
        if desc.flags & tags::SC_EXTERNALIZABLE != 0 || desc.flags & tags::SC_SERIALIZABLE == 0 {
            return Err(Error::UnsupportedClassEncoding(desc.name.clone()));
        }
        if let Some(parent) = &desc.superclass {
            return Err(Error::UnexpectedClass(parent.name.clone()));
        }
        Ok(())
    }

    fn read_primitive(&mut self, code: u8) -> Result<FieldValue> {
        Ok(match code {
            field::INT => FieldValue::Int(self.read_i32()?),
            field::LONG => FieldValue::Long(self.read_i64()?),
            field::DOUBLE => {
                self.skip(8)?;
                FieldValue::OtherPrimitive
            }
            field::FLOAT => {
                self.skip(4)?;
                FieldValue::OtherPrimitive
            }
            field::CHAR | field::SHORT => {
                self.skip(2)?;
                FieldValue::OtherPrimitive
            }
            _ => {
                self.skip(1)?;
                FieldValue::OtherPrimitive
            }
        })
    }

    /// Read the serialized field values of one class, in descriptor order
    fn read_fields(&mut self, desc: &ClassDesc) -> Result<Vec<(String, FieldValue)>> {
        let mut values = Vec::with_capacity(desc.fields.len());
        for field in &desc.fields {
            let value = match &field.ty {
                FieldType::Primitive(code) => self.read_primitive(*code)?,
                FieldType::Object(signature) => match &**signature {
                    tags::STRING_SIGNATURE => FieldValue::Str(self.read_string()?),
                    tags::ARRAY_LIST_SIGNATURE | tags::LIST_SIGNATURE => {
                        FieldValue::AccessLog(self.read_access_log()?)
                    }
                    other => {
                        return Err(Error::UnexpectedFieldType {
                            class: desc.name.clone(),
                            field: field.name.clone(),
                            signature: other.to_string(),
                        })
                    }
                },
            };
            values.push((field.name.clone(), value));
        }
        Ok(values)
    }

    fn unexpected_type(desc: &ClassDesc, field: &str, value: &FieldValue) -> Error {
        let signature = match value {
            FieldValue::Int(_) => "I",
            FieldValue::Long(_) => "J",
            FieldValue::OtherPrimitive => "primitive",
            FieldValue::Str(_) => tags::STRING_SIGNATURE,
            FieldValue::AccessLog(_) => tags::ARRAY_LIST_SIGNATURE,
        };
        Error::UnexpectedFieldType {
            class: desc.name.clone(),
            field: field.to_string(),
            signature: signature.to_string(),
        }
    }

    /// Body of an `ArrayList`: its `size` field, then capacity and elements
    fn read_list_data<T>(
        &mut self,
        desc: &ClassDesc,
        mut read_item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.check_schema_class(desc, tags::ARRAY_LIST_CLASS)?;
        if !desc.has_write_method() {
            return Err(Error::UnsupportedClassEncoding(desc.name.clone()));
        }
        let mut size = None;
        for (name, value) in self.read_fields(desc)? {
            match (name.as_str(), value) {
                ("size", FieldValue::Int(n)) => size = Some(n),
                ("size", other) => return Err(Self::unexpected_type(desc, "size", &other)),
                (other, _) => warn!(field = other, "Ignoring unknown list field"),
            }
        }
        let size = size.ok_or_else(|| Error::UnexpectedFieldType {
            class: desc.name.clone(),
            field: "size".into(),
            signature: "missing".into(),
        })?;
        if size < 0 {
            return Err(Error::InvalidSize(size));
        }

        // Capacity, written as block data ahead of the elements
        match self.read_tag()? {
            tags::TC_BLOCKDATA => {
                let len = self.read_u8()? as u64;
                self.skip(len)?;
            }
            tags::TC_BLOCKDATALONG => {
                let len = self.read_i32()? as u32 as u64;
                self.skip(len)?;
            }
            found => {
                return Err(Error::UnexpectedTag {
                    expected: "list capacity",
                    found,
                })
            }
        }

        let mut items = Vec::with_capacity(usize::min(size as usize, 1024));
        for _ in 0..size {
            items.push(read_item(self)?);
        }
        self.skip_annotation()?;
        Ok(items)
    }

    fn read_secret(&mut self) -> Result<SecretRecord> {
        let tag = self.read_tag()?;
        match tag {
            tags::TC_OBJECT => {}
            tags::TC_REFERENCE => {
                return match self.read_reference()? {
                    Handle::Secret(record) => Ok(record),
                    _ => Err(Error::UnexpectedClass("non-secret in record list".into())),
                }
            }
            found => {
                return Err(Error::UnexpectedTag {
                    expected: "secret",
                    found,
                })
            }
        }
        let desc = self.read_class_desc_required()?;
        self.check_schema_class(&desc, tags::SECRET_CLASS)?;
        let handle = self.new_handle();

        let mut record = SecretRecord::default();
        for (name, value) in self.read_fields(&desc)? {
            let text = |value: FieldValue| match value {
                FieldValue::Str(s) => Ok(s.map(|s| s.to_string())),
                other => Err(Self::unexpected_type(&desc, &name, &other)),
            };
            match name.as_str() {
                "description" => record.description = text(value)?,
                "username" => record.username = text(value)?,
                "password" => record.password = text(value)?,
                "email" => record.email = text(value)?,
                "note" => record.note = text(value)?,
                "access" => match value {
                    FieldValue::AccessLog(log) => record.access_log = log,
                    other => return Err(Self::unexpected_type(&desc, &name, &other)),
                },
                "timestamp" => match value {
                    FieldValue::Long(millis) => record.last_changed_millis = millis,
                    other => return Err(Self::unexpected_type(&desc, &name, &other)),
                },
                other => warn!(field = other, "Ignoring unknown secret field"),
            }
        }
        if desc.has_write_method() {
            self.skip_annotation()?;
        }

        self.fill_handle(handle, Handle::Secret(record.clone()));
        Ok(record)
    }

    fn read_access_log(&mut self) -> Result<Vec<AccessLogEntry>> {
        let tag = self.read_tag()?;
        match tag {
            tags::TC_NULL => Ok(Vec::new()),
            tags::TC_REFERENCE => match self.read_reference()? {
                Handle::AccessLog(log) => Ok(log),
                _ => Err(Error::UnexpectedClass("non-list in access log field".into())),
            },
            tags::TC_OBJECT => {
                let desc = self.read_class_desc_required()?;
                let handle = self.new_handle();
                let log = self.read_list_data(&desc, Self::read_log_entry)?;
                self.fill_handle(handle, Handle::AccessLog(log.clone()));
                Ok(log)
            }
            found => Err(Error::UnexpectedTag {
                expected: "access log",
                found,
            }),
        }
    }

    fn read_log_entry(&mut self) -> Result<AccessLogEntry> {
        let tag = self.read_tag()?;
        match tag {
            tags::TC_OBJECT => {}
            tags::TC_REFERENCE => {
                return match self.read_reference()? {
                    Handle::LogEntry(entry) => Ok(entry),
                    _ => Err(Error::UnexpectedClass("non-entry in access log".into())),
                }
            }
            found => {
                return Err(Error::UnexpectedTag {
                    expected: "access log entry",
                    found,
                })
            }
        }
        let desc = self.read_class_desc_required()?;
        self.check_schema_class(&desc, tags::LOG_ENTRY_CLASS)?;
        let handle = self.new_handle();

        let mut entry = AccessLogEntry {
            kind: AccessKind::Unknown(0),
            time_millis: 0,
        };
        for (name, value) in self.read_fields(&desc)? {
            match (name.as_str(), value) {
                ("type_", FieldValue::Int(kind)) => entry.kind = kind.into(),
                ("time_", FieldValue::Long(millis)) => entry.time_millis = millis,
                (field @ ("type_" | "time_"), other) => {
                    return Err(Self::unexpected_type(&desc, field, &other))
                }
                (other, _) => warn!(field = other, "Ignoring unknown access log field"),
            }
        }
        if desc.has_write_method() {
            self.skip_annotation()?;
        }

        self.fill_handle(handle, Handle::LogEntry(entry));
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objstream::write_records;

    #[derive(Default)]
    struct Stream(Vec<u8>);

    impl Stream {
        fn new() -> Stream {
            Stream(vec![0xAC, 0xED, 0x00, 0x05])
        }
        fn u8(mut self, value: u8) -> Stream {
            self.0.push(value);
            self
        }
        fn u16(mut self, value: u16) -> Stream {
            self.0.extend_from_slice(&value.to_be_bytes());
            self
        }
        fn i32(mut self, value: i32) -> Stream {
            self.0.extend_from_slice(&value.to_be_bytes());
            self
        }
        fn i64(mut self, value: i64) -> Stream {
            self.0.extend_from_slice(&value.to_be_bytes());
            self
        }
        fn utf(self, value: &str) -> Stream {
            let mut s = self.u16(value.len() as u16);
            s.0.extend_from_slice(value.as_bytes());
            s
        }
        fn reference(self, index: u32) -> Stream {
            self.u8(tags::TC_REFERENCE)
                .i32((tags::BASE_WIRE_HANDLE + index) as i32)
        }
        /// Object header for a list of `size` elements with a fresh class descriptor
        fn list_start(self, flags: u8, size: i32) -> Stream {
            self.u8(tags::TC_OBJECT)
                .u8(tags::TC_CLASSDESC)
                .utf(tags::ARRAY_LIST_CLASS)
                .i64(tags::ARRAY_LIST_UID)
                .u8(flags)
                .u16(1)
                .u8(b'I')
                .utf("size")
                .u8(tags::TC_ENDBLOCKDATA)
                .u8(tags::TC_NULL)
                .i32(size)
                .u8(tags::TC_BLOCKDATA)
                .u8(4)
                .i32(size)
        }
    }

    fn read(data: &[u8]) -> Result<Vec<SecretRecord>> {
        let mut reader = RecordReader::new(data);
        reader.read_preamble()?;
        reader.read_records()
    }

    #[test]
    fn skips_unknown_fields_and_follows_string_references() {
        // Handles: 0 list class, 1 list, 2 secret class, 3 type string, 4 secret, 5 "Bank"
        let stream = Stream::new()
            .list_start(0x03, 1)
            .u8(tags::TC_OBJECT)
            .u8(tags::TC_CLASSDESC)
            .utf(tags::SECRET_CLASS)
            .i64(1)
            .u8(tags::SC_SERIALIZABLE)
            .u16(4)
            .u8(b'J')
            .utf("timestamp")
            .u8(b'Z')
            .utf("archived")
            .u8(b'L')
            .utf("description")
            .u8(tags::TC_STRING)
            .utf(tags::STRING_SIGNATURE)
            .u8(b'L')
            .utf("username")
            .reference(3)
            .u8(tags::TC_ENDBLOCKDATA)
            .u8(tags::TC_NULL)
            .i64(42)
            .u8(1)
            .u8(tags::TC_STRING)
            .utf("Bank")
            .reference(5)
            .u8(tags::TC_ENDBLOCKDATA);

        let records = read(&stream.0).unwrap();
        assert_eq!(
            records,
            vec![SecretRecord {
                description: Some("Bank".into()),
                username: Some("Bank".into()),
                last_changed_millis: 42,
                ..Default::default()
            }]
        );
    }

    #[test]
    fn reset_clears_handles() {
        let stream = Stream::new()
            .u8(tags::TC_RESET)
            .list_start(0x03, 0)
            .u8(tags::TC_ENDBLOCKDATA);
        assert_eq!(read(&stream.0).unwrap(), vec![]);

        let dangling = Stream::new()
            .list_start(0x03, 1)
            .u8(tags::TC_RESET)
            .reference(0);
        assert!(matches!(read(&dangling.0), Err(Error::InvalidHandle(_))));
    }

    #[test]
    fn rejects_bad_preamble() {
        assert!(matches!(read(&[0x12, 0x34, 0, 5]), Err(Error::BadMagic(0x1234))));
        assert!(matches!(
            read(&[0xAC, 0xED, 0, 4]),
            Err(Error::UnsupportedVersion(4))
        ));
    }

    #[test]
    fn rejects_foreign_classes() {
        let stream = Stream::new()
            .list_start(0x03, 1)
            .u8(tags::TC_OBJECT)
            .u8(tags::TC_CLASSDESC)
            .utf("java.lang.Integer")
            .i64(1)
            .u8(tags::SC_SERIALIZABLE)
            .u16(0)
            .u8(tags::TC_ENDBLOCKDATA)
            .u8(tags::TC_NULL);
        match read(&stream.0) {
            Err(Error::UnexpectedClass(name)) => assert_eq!(name, "java.lang.Integer"),
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_object_field_types() {
        let stream = Stream::new()
            .list_start(0x03, 1)
            .u8(tags::TC_OBJECT)
            .u8(tags::TC_CLASSDESC)
            .utf(tags::SECRET_CLASS)
            .i64(1)
            .u8(tags::SC_SERIALIZABLE)
            .u16(1)
            .u8(b'L')
            .utf("expires")
            .u8(tags::TC_STRING)
            .utf("Ljava/util/Date;")
            .u8(tags::TC_ENDBLOCKDATA)
            .u8(tags::TC_NULL)
            .u8(tags::TC_NULL);
        assert!(matches!(
            read(&stream.0),
            Err(Error::UnexpectedFieldType { .. })
        ));
    }

    #[test]
    fn rejects_externalizable_list() {
        let stream = Stream::new().list_start(tags::SC_EXTERNALIZABLE | 0x08, 0);
        assert!(matches!(
            read(&stream.0),
            Err(Error::UnsupportedClassEncoding(_))
        ));
    }

    #[test]
    fn truncated_stream_is_eof() {
        let mut data = Vec::new();
        let records = vec![SecretRecord {
            description: Some("truncate me".into()),
            ..Default::default()
        }];
        write_records(&mut data, &records).unwrap();
        for cut in [5, 30, data.len() - 1] {
            match read(&data[..cut]) {
                Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
                other => panic!("Unexpected result at {}: {:?}", cut, other),
            }
        }
    }
}
