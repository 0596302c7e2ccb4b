//! Wire constants of the object stream

pub(crate) const STREAM_MAGIC: u16 = 0xACED;
pub(crate) const STREAM_VERSION: u16 = 5;
pub(crate) const BASE_WIRE_HANDLE: u32 = 0x7E_0000;

pub(crate) const TC_NULL: u8 = 0x70;
pub(crate) const TC_REFERENCE: u8 = 0x71;
pub(crate) const TC_CLASSDESC: u8 = 0x72;
pub(crate) const TC_OBJECT: u8 = 0x73;
pub(crate) const TC_STRING: u8 = 0x74;
pub(crate) const TC_BLOCKDATA: u8 = 0x77;
pub(crate) const TC_ENDBLOCKDATA: u8 = 0x78;
pub(crate) const TC_RESET: u8 = 0x79;
pub(crate) const TC_BLOCKDATALONG: u8 = 0x7A;
pub(crate) const TC_LONGSTRING: u8 = 0x7C;
pub(crate) const TC_PROXYCLASSDESC: u8 = 0x7D;

pub(crate) const SC_WRITE_METHOD: u8 = 0x01;
pub(crate) const SC_SERIALIZABLE: u8 = 0x02;
pub(crate) const SC_EXTERNALIZABLE: u8 = 0x04;

pub(crate) const ARRAY_LIST_CLASS: &str = "java.util.ArrayList";
pub(crate) const SECRET_CLASS: &str = "net.tawacentral.roger.secrets.Secret";
pub(crate) const LOG_ENTRY_CLASS: &str = "net.tawacentral.roger.secrets.Secret$LogEntry";

pub(crate) const ARRAY_LIST_UID: i64 = 8_683_452_581_122_892_189;
pub(crate) const SECRET_UID: i64 = -116_450_416_616_138_469;
pub(crate) const LOG_ENTRY_UID: i64 = -9_024_951_856_209_882_415;

pub(crate) const STRING_SIGNATURE: &str = "Ljava/lang/String;";
pub(crate) const ARRAY_LIST_SIGNATURE: &str = "Ljava/util/ArrayList;";
pub(crate) const LIST_SIGNATURE: &str = "Ljava/util/List;";

/// Field type codes
pub(crate) mod field {
    pub(crate) const BYTE: u8 = b'B';
    pub(crate) const CHAR: u8 = b'C';
    pub(crate) const DOUBLE: u8 = b'D';
    pub(crate) const FLOAT: u8 = b'F';
    pub(crate) const INT: u8 = b'I';
    pub(crate) const LONG: u8 = b'J';
    pub(crate) const SHORT: u8 = b'S';
    pub(crate) const BOOLEAN: u8 = b'Z';
    pub(crate) const OBJECT: u8 = b'L';
    pub(crate) const ARRAY: u8 = b'[';
}
