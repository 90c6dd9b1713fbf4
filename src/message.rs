/// Message module provides the byte layout of ANT messages, the builders for the requests
/// the heart rate sessions send back to the ANT+ USB device, and a way to split data read
/// from the device into individual frames for decoding.
///
/// A received frame is laid out as
/// `[sync, length, message id, channel, payload(8), extension..]`, with the trailing
/// checksum already stripped by `ReadBuffer`.
use crate::{defines, error::AntError, Result};
use log::trace;
use std::fmt;

pub const MESG_TX_SYNC: u8 = 0xA4;
pub const MESG_RX_SYNC: u8 = 0xA5;
pub const MESG_SYNC_SIZE: usize = 1;
pub const MESG_SIZE_SIZE: usize = 1;
pub const MESG_ID_SIZE: usize = 1;
pub const MESG_CHANNEL_NUM_SIZE: usize = 1;
pub const MESG_EXT_MESG_BF_SIZE: usize = 1;
pub const MESG_CHECKSUM_SIZE: usize = 1;

pub const MESG_ANT_MAX_PAYLOAD_SIZE: usize = defines::ANT_STANDARD_DATA_PAYLOAD_SIZE;
pub const MESG_MAX_EXT_DATA_SIZE: usize =
    defines::ANT_EXT_MESG_DEVICE_ID_FIELD_SIZE + defines::ANT_EXT_STRING_SIZE;
pub const MESG_MAX_DATA_SIZE: usize =
    MESG_ANT_MAX_PAYLOAD_SIZE + MESG_EXT_MESG_BF_SIZE + MESG_MAX_EXT_DATA_SIZE;
pub const MESG_HEADER_SIZE: usize = MESG_SYNC_SIZE + MESG_SIZE_SIZE + MESG_ID_SIZE;
pub const MESG_SIZE_OFFSET: usize = MESG_SYNC_SIZE;
pub const MESG_ID_OFFSET: usize = MESG_SYNC_SIZE + MESG_SIZE_SIZE;
pub const MESG_DATA_OFFSET: usize = MESG_HEADER_SIZE;
pub const MESG_CHANNEL_OFFSET: usize = MESG_DATA_OFFSET;
pub const MESG_PAYLOAD_OFFSET: usize = MESG_CHANNEL_OFFSET + MESG_CHANNEL_NUM_SIZE;
/// Smallest frame carrying a full data payload.
pub const MESG_DATA_FRAME_SIZE: usize = MESG_PAYLOAD_OFFSET + MESG_ANT_MAX_PAYLOAD_SIZE;

pub const MESG_REQUEST: u8 = 0x4D;
pub const MESG_BROADCAST_DATA_ID: u8 = 0x4E;
pub const MESG_ACKNOWLEDGE_DATA_ID: u8 = 0x4F;
pub const MESG_BURST_DATA_ID: u8 = 0x50;
pub const MESG_CHANNEL_ID_ID: u8 = 0x51;

pub const COMMON_DATA_PAGE_70: u8 = 0x46;

/// ReadBuffer walks a buffer read from the ANT+ USB device and yields each frame that
/// starts with a sync byte and carries a valid checksum.
pub struct ReadBuffer {
    index: usize,
    inner: Vec<u8>,
}

impl ReadBuffer {
    pub fn new(buffer: &[u8]) -> Self {
        ReadBuffer {
            index: 0,
            inner: buffer.to_vec(),
        }
    }
}

// Bytes that don't start a frame, frames that run past the end of the buffer, and frames
// with a bad checksum are skipped while searching for the next sync byte.
impl Iterator for ReadBuffer {
    type Item = Vec<u8>;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.index >= self.inner.len() {
                return None;
            }
            let index = self.index;
            if self.inner[index] == MESG_TX_SYNC && index + MESG_SIZE_OFFSET < self.inner.len() {
                // sync + length + id + data + checksum
                let len = index + self.inner[index + MESG_SIZE_OFFSET] as usize + 4;
                if len <= self.inner.len() {
                    let checksum = self.inner[index..len].iter().fold(0, |acc, b| acc ^ b);
                    if checksum == 0 {
                        self.index = len;
                        trace!("Read frame: {:x?}", &self.inner[index..len]);
                        return Some(self.inner[index..len - 1].to_vec());
                    }
                }
            }
            self.index += 1;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AcknowledgeDataMessage([u8; 9]);

impl AcknowledgeDataMessage {
    pub fn new(channel_number: u8, data: &[u8; 8]) -> Self {
        let mut buf: [u8; 9] = [0; 9];
        buf[0] = channel_number;
        buf[1..].copy_from_slice(data);
        Self(buf)
    }

    pub fn channel(&self) -> u8 {
        self.0[0]
    }

    pub fn data(&self) -> &[u8] {
        &self.0[1..]
    }

    pub fn to_message(&self) -> Message {
        Message::new(MESG_ACKNOWLEDGE_DATA_ID, &self.0)
    }
}

#[derive(Clone, PartialEq)]
pub struct Message {
    pub id: u8,
    pub data: Vec<u8>,
}

impl Message {
    pub fn new(id: u8, data: &[u8]) -> Message {
        Message {
            id,
            data: data.to_vec(),
        }
    }

    // Converts a message into something that can be written out
    pub fn encode(&self) -> Vec<u8> {
        let size = self.data.len();
        let total_size = MESG_HEADER_SIZE + size;
        let mut buf: Vec<u8> = vec![0; total_size + MESG_CHECKSUM_SIZE];
        buf[0] = MESG_TX_SYNC;
        buf[MESG_SIZE_OFFSET] = size as u8;
        buf[MESG_ID_OFFSET] = self.id;
        buf[MESG_DATA_OFFSET..total_size].copy_from_slice(&self.data);
        buf[total_size] = buf[..total_size].iter().fold(0, |acc, b| acc ^ b);
        buf
    }

    fn id_as_str(&self) -> &'static str {
        match self.id {
            MESG_REQUEST => "Request (0x4D)",
            MESG_BROADCAST_DATA_ID => "Broadcast Data (0x4E)",
            MESG_ACKNOWLEDGE_DATA_ID => "Acknowledged Data (0x4F)",
            MESG_BURST_DATA_ID => "Burst Data (0x50)",
            MESG_CHANNEL_ID_ID => "Channel ID (0x51)",
            _ => "Unknown message",
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Message ID: {} ", self.id_as_str())?;
        write!(f, "DATA: ")?;
        match self.id {
            MESG_REQUEST if self.data.len() >= 2 => write!(
                f,
                "Channel: {:X} Requested: {:X}",
                self.data[0], self.data[1]
            ),
            MESG_CHANNEL_ID_ID if self.data.len() >= 4 => write!(
                f,
                "Channel: {:X} Device Number: {:?} Device Type: {:?}",
                self.data[0],
                bytes_to_u16(&self.data[1..3]),
                device_type(self.data[3])
            ),
            _ => write!(f, "{:x?}", self.data),
        }
    }
}

fn device_type(device_type: u8) -> &'static str {
    match device_type {
        defines::HEART_RATE_DEVICE_TYPE => "Heartrate monitor",
        _ => "unknown device type",
    }
}

/// Request the channel id (device number, device type, transmission type) of the device
/// paired on a channel. The answer arrives as a `MESG_CHANNEL_ID_ID` message.
pub fn get_channel_id(channel: u8) -> Message {
    Message::new(MESG_REQUEST, &[channel, MESG_CHANNEL_ID_ID])
}

pub fn set_channel_id(
    channel: u8,
    device_id: u16,
    device_type: u8,
    transmission_type: u8,
) -> Message {
    Message::new(
        MESG_CHANNEL_ID_ID,
        &[
            channel,
            (device_id & 0xFF) as u8,
            ((device_id >> 8) & 0xFF) as u8,
            device_type,
            transmission_type,
        ],
    )
}

/// Common data page 70 asking the device to send back `page_number` once, acknowledged.
pub fn request_data_page(channel: u8, page_number: u8) -> AcknowledgeDataMessage {
    AcknowledgeDataMessage::new(
        channel,
        &[
            COMMON_DATA_PAGE_70,
            0xFF,
            0xFF,
            0xFF,
            0xFF,
            0x01,
            page_number,
            0x01,
        ],
    )
}

/// Fails with `MessageTooShort` unless `buf` holds at least `expected` bytes.
pub(crate) fn ensure_len(buf: &[u8], expected: usize) -> Result<()> {
    if buf.len() < expected {
        return Err(AntError::MessageTooShort {
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

// bytes_to_u16 takes a byte slice formatted in [LSB, MSB] and combines the two fields together
// into a single u16.
pub(crate) fn bytes_to_u16(b: &[u8]) -> u16 {
    if b.len() > 2 {
        log::error!("Slice larger than 2. Returning just first two bytes combined");
    }
    match b.len() {
        0 => 0,
        1 => b[0] as u16,
        _ => (b[0] as u16) + ((b[1] as u16) << 8),
    }
}

// bytes_to_u32 takes a byte slice formatted in
// [LSB, MSB], [LSB, DATA ,MSB], or [LSB, DATA, DATA, MSB]
// and returns a combined u32 value.
pub(crate) fn bytes_to_u32(b: &[u8]) -> u32 {
    if b.len() > 4 {
        log::error!("Slice larger than 4. Returning just first four bytes combined");
    }
    b.iter()
        .take(4)
        .enumerate()
        .fold(0, |acc, (i, byte)| acc | ((*byte as u32) << (8 * i)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new() {
        let data = vec![0; 5];
        let m = Message::new(0, &data);
        assert_eq!(m.id, 0);
        assert_eq!(m.data, vec![0; 5]);
    }

    #[test]
    fn encode() {
        let data = vec![1, 0xac, 2, 0x5c, 3];
        let len = data.len();
        let m = Message::new(MESG_BROADCAST_DATA_ID, &data);
        let buf = m.encode();
        assert_eq!(buf.len(), len + 4);
        assert_eq!(buf[0], MESG_TX_SYNC);
        assert_eq!(buf[1], len as u8);
        //MESG_BROADCAST_DATA_ID = 0x4E
        assert_eq!(buf[2], 0x4E);
        assert_eq!(buf[3..8], data[..]);
        // XOR over the whole frame including the checksum is zero
        assert_eq!(buf.iter().fold(0, |acc, b| acc ^ b), 0);
    }

    #[test]
    fn read_buffer() {
        let mesg = Message::new(MESG_BROADCAST_DATA_ID, &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        let mut buffer = mesg.encode();
        buffer.extend_from_slice(&mesg.encode()[..]);
        let mut read_buffer = ReadBuffer::new(&buffer[..]);
        let frame = read_buffer.next().unwrap();
        assert_eq!(frame.len(), MESG_DATA_FRAME_SIZE);
        assert_eq!(frame[MESG_ID_OFFSET], MESG_BROADCAST_DATA_ID);
        assert_eq!(frame[MESG_PAYLOAD_OFFSET..], [1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(read_buffer.next().is_some());
        assert_eq!(read_buffer.next(), None);
    }

    #[test]
    fn read_buffer_with_invalid_data() {
        let mesg = get_channel_id(0);
        let mut buffer = mesg.encode();
        buffer.extend_from_slice(&[0, 1, 2, 3]);
        buffer.extend_from_slice(&mesg.encode()[..]);
        let read_buffer = ReadBuffer::new(&buffer[..]);
        assert_eq!(read_buffer.count(), 2);
    }

    #[test]
    fn read_buffer_with_invalid_mesg() {
        let mesg = get_channel_id(0);
        let mut buffer = mesg.encode();
        buffer.extend_from_slice(&[MESG_TX_SYNC, 1, 2, 0]);
        buffer.extend_from_slice(&mesg.encode()[..]);
        let read_buffer = ReadBuffer::new(&buffer[..]);
        assert_eq!(read_buffer.count(), 2);
    }

    #[test]
    fn read_buffer_with_truncated_mesg() {
        let mut buffer = get_channel_id(0).encode();
        buffer.extend_from_slice(&[MESG_TX_SYNC, 9, MESG_BROADCAST_DATA_ID, 0]);
        let read_buffer = ReadBuffer::new(&buffer[..]);
        assert_eq!(read_buffer.count(), 1);
    }

    // The following tests test message creation. Since we use constants
    // for the ID, we want to assert against the value of the constant.
    // Since these values are part of the ANT+ spec, these values should
    // not change unless there is a breaking change in the ANT+ spec.
    #[test]
    fn get_channel_id_message() {
        let mesg = get_channel_id(3);
        // MESG_REQUEST = 0x4D
        // MESG_CHANNEL_ID_ID = 0x51
        assert_eq!(mesg.id, 0x4D);
        assert_eq!(mesg.data[..], [3, 0x51]);
    }

    #[test]
    fn set_channel_id_message() {
        let mesg = set_channel_id(0, 1000, 0x78, 0);
        // MESG_CHANNEL_ID_ID = 0x51
        assert_eq!(mesg.id, 0x51);
        assert_eq!(mesg.data[0], 0);
        assert_eq!(mesg.data[1], (1000 & 0xFF) as u8);
        assert_eq!(mesg.data[2], ((1000 >> 8) & 0xFF) as u8);
        assert_eq!(mesg.data[3], 0x78);
        assert_eq!(mesg.data[4], 0);
    }

    #[test]
    fn request_data_page_message() {
        let mesg = request_data_page(1, 0x02);
        assert_eq!(mesg.channel(), 1);
        assert_eq!(mesg.data(), [0x46, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x02, 0x01]);
        // MESG_ACKNOWLEDGE_DATA_ID = 0x4F
        assert_eq!(mesg.to_message().id, 0x4F);
        assert_eq!(mesg.to_message().data.len(), 9);
    }

    #[test]
    fn ensure_len_reports_sizes() {
        assert!(ensure_len(&[0; 12], 12).is_ok());
        match ensure_len(&[0; 4], 12) {
            Err(AntError::MessageTooShort { expected, actual }) => {
                assert_eq!(expected, 12);
                assert_eq!(actual, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn combine_bytes() {
        assert_eq!(bytes_to_u16(&[0x34, 0x12]), 0x1234);
        assert_eq!(bytes_to_u16(&[0x34]), 0x34);
        assert_eq!(bytes_to_u32(&[0x0A, 0x00, 0x00]), 10);
        assert_eq!(bytes_to_u32(&[0x01, 0x02, 0x03]), 0x030201);
        assert_eq!(bytes_to_u32(&[0x01, 0x02, 0x03, 0x04]), 0x04030201);
    }
}
