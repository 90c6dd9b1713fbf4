/// A UsbContext and UsbDevice for interacting with the physical ANT+ USB stick. Reads are
/// split into frames for the heart rate sessions, writes carry their requests.
use std::time::Duration;

pub use rusb::{Context, UsbContext};
use rusb::{DeviceHandle, Error};

use super::{
    error::AntError,
    message::{Message, ReadBuffer},
    transport::Transport,
    Result,
};
use log::{debug, trace};

// TODO ANT settings are currently hardcoded and work with the test
// USB device, but need to verify if these settings work with other
// ANT+ USB devices.
const VENDOR_ID: u16 = 0x0FCF;
const USB_ANT_INTERFACE: u8 = 0;
const USB_ANT_EP_IN: u8 = 0x81;
const USB_ANT_EP_OUT: u8 = 0x01;
const TX_BUF_SIZE: usize = 255;

/// UsbDevice struct that holds the device handle to the USB device
/// along with a buffer to read data data from.
pub struct UsbDevice<T: UsbContext> {
    handle: DeviceHandle<T>,
    buffer: [u8; TX_BUF_SIZE],
}

impl<T: UsbContext> UsbDevice<T> {
    /// Open the first ANT+ USB stick found and claim its interface.
    pub fn init(ctx: &mut T) -> Result<UsbDevice<T>> {
        for device in ctx.devices()?.iter() {
            let device_desc = device.device_descriptor()?;
            if device_desc.vendor_id() != VENDOR_ID {
                continue;
            }
            let mut handle = device.open()?;
            match handle.reset() {
                Ok(_) => {}
                // Stick re-enumerated during the reset, open it again
                Err(Error::NotFound) => handle = device.open()?,
                Err(e) => return Err(AntError::UsbDeviceError(e)),
            }
            handle.claim_interface(USB_ANT_INTERFACE)?;
            debug!(
                "Opened ANT+ USB device {:04X}:{:04X}",
                VENDOR_ID,
                device_desc.product_id()
            );
            return Ok(UsbDevice {
                handle,
                buffer: [0; TX_BUF_SIZE],
            });
        }
        Err(AntError::UsbDeviceError(Error::NoDevice))
    }

    /// Read from the USB device with a timeout of 10 milliseconds.
    pub fn read(&mut self) -> Result<ReadBuffer> {
        self.read_with_timeout(Duration::from_millis(10))
    }

    /// Read from the USB device with the specified timeout. Iterate the returned buffer
    /// for frames to pass to `decode`.
    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<ReadBuffer> {
        let buffer = &mut self.buffer;
        self.handle
            .read_bulk(USB_ANT_EP_IN, &mut buffer[..], timeout)
            .map(|len| ReadBuffer::new(&buffer[..len]))
            .map_err(AntError::UsbDeviceError)
    }

    /// Write bytes to the USB device with a specified timeout.
    pub fn write_with_timeout(&self, data: &[u8], timeout: Duration) -> Result<usize> {
        self.handle
            .write_bulk(USB_ANT_EP_OUT, data, timeout)
            .map_err(AntError::UsbDeviceError)
    }
}

/// Writes with a timeout of 1 second.
impl<T: UsbContext> Transport for UsbDevice<T> {
    fn write(&mut self, mesg: &Message) -> Result<()> {
        trace!("Writing {:?}", mesg);
        self.write_with_timeout(&mesg.encode(), Duration::from_secs(1))
            .map(|_| ())
    }
}
