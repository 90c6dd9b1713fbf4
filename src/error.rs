use thiserror::Error;
use rusb::Error as USBError;

#[derive(Error, Debug)]
pub enum AntError {
    #[error("{0}")]
    UsbDeviceError(#[from] USBError),
    #[error("Message too short: expected at least {expected} bytes, got {actual}")]
    MessageTooShort { expected: usize, actual: usize },
    #[error("Invalid extended message flag: {0:#04X}")]
    InvalidExtendedFlag(u8),
    #[error("Transport disconnected")]
    Disconnected,
}
