// ANT message layout values shared by the message catalog and the decoders.
pub const ANT_STANDARD_DATA_PAYLOAD_SIZE: usize = 8;
pub const ANT_EXT_MESG_DEVICE_ID_FIELD_SIZE: usize = 4;
pub const ANT_EXT_STRING_SIZE: usize = 19;

// Flag byte announcing a device id extension after the payload.
pub const ANT_EXT_MESG_BITFIELD_DEVICE_ID: u8 = 0x80;

pub const ANT_RECEIVE_CHANNEL: u8 = 0x00;
pub const ANT_PLUS_FREQUENCY: u8 = 0x39;
pub const ANT_INFINITE_SEARCH_TIMEOUT: u8 = 0xFF;

pub const HEART_RATE_DEVICE_TYPE: u8 = 0x78;
pub const HEART_RATE_PERIOD: u16 = 8070;
