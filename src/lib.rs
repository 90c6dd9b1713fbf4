mod defines;
pub mod device;
mod error;
pub mod message;
pub mod transport;
pub mod usb;

pub type Result<T> = std::result::Result<T, error::AntError>;

pub use crossbeam_channel::unbounded;
pub use device::hrm::{HeartRateScanner, HeartRateSensor, PageState, SensorState};
pub use device::Config;
pub use error::AntError;
pub use transport::Transport;
pub use usb::{Context, UsbDevice};
