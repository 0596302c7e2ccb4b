use super::mutf8;
use super::tags::{self, field};
use crate::types::{AccessLogEntry, SecretRecord};
use std::collections::HashMap;
use std::io::{self, Write};

struct SchemaClass {
    name: &'static str,
    uid: i64,
    flags: u8,
    /// Type code, name and type signature for object fields, in stream order
    fields: &'static [(u8, &'static str, Option<&'static str>)],
}

const ARRAY_LIST: SchemaClass = SchemaClass {
    name: tags::ARRAY_LIST_CLASS,
    uid: tags::ARRAY_LIST_UID,
    flags: tags::SC_SERIALIZABLE | tags::SC_WRITE_METHOD,
    fields: &[(field::INT, "size", None)],
};

const SECRET: SchemaClass = SchemaClass {
    name: tags::SECRET_CLASS,
    uid: tags::SECRET_UID,
    flags: tags::SC_SERIALIZABLE,
    fields: &[
        (field::LONG, "timestamp", None),
        (field::OBJECT, "access", Some(tags::ARRAY_LIST_SIGNATURE)),
        (field::OBJECT, "description", Some(tags::STRING_SIGNATURE)),
        (field::OBJECT, "email", Some(tags::STRING_SIGNATURE)),
        (field::OBJECT, "note", Some(tags::STRING_SIGNATURE)),
        (field::OBJECT, "password", Some(tags::STRING_SIGNATURE)),
        (field::OBJECT, "username", Some(tags::STRING_SIGNATURE)),
    ],
};

const LOG_ENTRY: SchemaClass = SchemaClass {
    name: tags::LOG_ENTRY_CLASS,
    uid: tags::LOG_ENTRY_UID,
    flags: tags::SC_SERIALIZABLE,
    fields: &[(field::LONG, "time_", None), (field::INT, "type_", None)],
};

struct ObjectWriter<W: Write> {
    output: W,
    next_handle: u32,
    classes: HashMap<&'static str, u32>,
    type_strings: HashMap<&'static str, u32>,
}

impl<W: Write> ObjectWriter<W> {
    fn new(output: W) -> ObjectWriter<W> {
        ObjectWriter {
            output,
            next_handle: tags::BASE_WIRE_HANDLE,
            classes: HashMap::new(),
            type_strings: HashMap::new(),
        }
    }

    fn assign_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.output.write_all(&[value])
    }

    fn write_u16(&mut self, value: u16) -> io::Result<()> {
        self.output.write_all(&value.to_be_bytes())
    }

    fn write_i32(&mut self, value: i32) -> io::Result<()> {
        self.output.write_all(&value.to_be_bytes())
    }

    fn write_i64(&mut self, value: i64) -> io::Result<()> {
        self.output.write_all(&value.to_be_bytes())
    }

    fn write_reference(&mut self, handle: u32) -> io::Result<()> {
        self.write_u8(tags::TC_REFERENCE)?;
        self.output.write_all(&handle.to_be_bytes())
    }

    /// Short string without a tag, as used for class and field names
    fn write_utf(&mut self, value: &str) -> io::Result<()> {
        let bytes = mutf8::encode(value);
        let len = u16::try_from(bytes.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Name too long"))?;
        self.write_u16(len)?;
        self.output.write_all(&bytes)
    }

    fn write_string(&mut self, value: Option<&str>) -> io::Result<()> {
        let value = match value {
            Some(value) => value,
            None => return self.write_u8(tags::TC_NULL),
        };
        let bytes = mutf8::encode(value);
        match u16::try_from(bytes.len()) {
            Ok(len) => {
                self.write_u8(tags::TC_STRING)?;
                self.write_u16(len)?;
            }
            Err(_) => {
                self.write_u8(tags::TC_LONGSTRING)?;
                self.write_i64(bytes.len() as i64)?;
            }
        }
        self.assign_handle();
        self.output.write_all(&bytes)
    }

    fn write_type_string(&mut self, signature: &'static str) -> io::Result<()> {
        if let Some(&handle) = self.type_strings.get(signature) {
            return self.write_reference(handle);
        }
        self.type_strings.insert(signature, self.next_handle);
        self.write_string(Some(signature))
    }

    fn write_class_desc(&mut self, class: &SchemaClass) -> io::Result<()> {
        if let Some(&handle) = self.classes.get(class.name) {
            return self.write_reference(handle);
        }
        self.write_u8(tags::TC_CLASSDESC)?;
        let handle = self.assign_handle();
        self.classes.insert(class.name, handle);
        self.write_utf(class.name)?;
        self.write_i64(class.uid)?;
        self.write_u8(class.flags)?;
        self.write_u16(class.fields.len() as u16)?;
        for &(code, name, signature) in class.fields {
            self.write_u8(code)?;
            self.write_utf(name)?;
            if let Some(signature) = signature {
                self.write_type_string(signature)?;
            }
        }
        self.write_u8(tags::TC_ENDBLOCKDATA)?;
        self.write_u8(tags::TC_NULL)
    }

    fn begin_object(&mut self, class: &SchemaClass) -> io::Result<()> {
        self.write_u8(tags::TC_OBJECT)?;
        self.write_class_desc(class)?;
        self.assign_handle();
        Ok(())
    }

    fn write_list<T>(
        &mut self,
        items: &[T],
        mut write_item: impl FnMut(&mut Self, &T) -> io::Result<()>,
    ) -> io::Result<()> {
        let size = i32::try_from(items.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Too many entries"))?;
        self.begin_object(&ARRAY_LIST)?;
        self.write_i32(size)?;
        // Capacity
        self.write_u8(tags::TC_BLOCKDATA)?;
        self.write_u8(4)?;
        self.write_i32(size)?;
        for item in items {
            write_item(self, item)?;
        }
        self.write_u8(tags::TC_ENDBLOCKDATA)
    }

    fn write_secret(&mut self, record: &SecretRecord) -> io::Result<()> {
        self.begin_object(&SECRET)?;
        self.write_i64(record.last_changed_millis)?;
        self.write_list(&record.access_log, Self::write_log_entry)?;
        self.write_string(record.description.as_deref())?;
        self.write_string(record.email.as_deref())?;
        self.write_string(record.note.as_deref())?;
        self.write_string(record.password.as_deref())?;
        self.write_string(record.username.as_deref())
    }

    fn write_log_entry(&mut self, entry: &AccessLogEntry) -> io::Result<()> {
        self.begin_object(&LOG_ENTRY)?;
        self.write_i64(entry.time_millis)?;
        self.write_i32(entry.kind.into())
    }
}

/// Serialize the records in the layout the originating application reads
pub(crate) fn write_records<W: Write>(output: W, records: &[SecretRecord]) -> io::Result<()> {
    let mut writer = ObjectWriter::new(output);
    writer.write_u16(tags::STREAM_MAGIC)?;
    writer.write_u16(tags::STREAM_VERSION)?;
    writer.write_list(records, ObjectWriter::write_secret)?;
    writer.output.flush()
}
