/// Heartrate Monitor device. Every data page carries the default heart rate data in its
/// last four bytes. Legacy devices only send data page 0, newer devices rotate through
/// pages and flip the MSB of the page byte every four messages, which is how the two are
/// told apart: a page byte that never changes means a legacy device.
mod scanner;
mod sensor;

pub use scanner::HeartRateScanner;
pub use sensor::HeartRateSensor;

use crate::message::{
    bytes_to_u16, bytes_to_u32, ensure_len, MESG_DATA_FRAME_SIZE, MESG_PAYLOAD_OFFSET,
};
use crate::Result;
use log::trace;

pub const DEVICE_TYPE: u8 = crate::defines::HEART_RATE_DEVICE_TYPE;

const TOGGLE_MASK: u8 = 0x80;

const PAGE_OPERATING_TIME: u8 = 0x01;
const PAGE_MANUFACTURER_INFO: u8 = 0x02;
const PAGE_PRODUCT_INFO: u8 = 0x03;
const PAGE_PREVIOUS_HEARTBEAT: u8 = 0x04;

/// Latest known reading of a heart rate monitor. Fields fed by the extended data pages
/// stay `None` until the device has sent that page at least once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SensorState {
    device_id: u16,
    beat_time: u16,
    beat_count: u8,
    computed_heart_rate: u8,
    operating_time: Option<u32>,
    manufacturer_id: Option<u8>,
    serial_number: Option<u32>,
    hardware_version: Option<u8>,
    software_version: Option<u8>,
    model_number: Option<u8>,
    previous_beat: Option<u16>,
}

impl SensorState {
    pub fn new(device_id: u16) -> Self {
        SensorState {
            device_id,
            ..Default::default()
        }
    }

    pub fn device_id(&self) -> u16 {
        self.device_id
    }

    /// Time of the last heart beat event in 1/1024 second units. Rolls over every 64s.
    pub fn beat_time(&self) -> u16 {
        self.beat_time
    }

    pub fn beat_time_secs(&self) -> f32 {
        self.beat_time as f32 / 1024.0
    }

    /// Number of heart beat events seen by the device. Rolls over at 255.
    pub fn beat_count(&self) -> u8 {
        self.beat_count
    }

    /// Heart rate computed by the device, in beats per minute.
    pub fn computed_heart_rate(&self) -> u8 {
        self.computed_heart_rate
    }

    /// Cumulative operating time in seconds.
    pub fn operating_time(&self) -> Option<u32> {
        self.operating_time
    }

    pub fn manufacturer_id(&self) -> Option<u8> {
        self.manufacturer_id
    }

    /// Manufacturer of the hardware device
    pub fn manufacturer(&self) -> Option<&'static str> {
        match self.manufacturer_id? {
            1 => Some("Garmin"),
            32 => Some("Wahoo Fitness"),
            _ => None,
        }
    }

    /// Serial number of the device. The low 16 bits are the ANT+ device id.
    pub fn serial_number(&self) -> Option<u32> {
        self.serial_number
    }

    pub fn hardware_version(&self) -> Option<u8> {
        self.hardware_version
    }

    pub fn software_version(&self) -> Option<u8> {
        self.software_version
    }

    pub fn model_number(&self) -> Option<u8> {
        self.model_number
    }

    /// Time of the heart beat event before the last one, in 1/1024 second units.
    pub fn previous_beat(&self) -> Option<u16> {
        self.previous_beat
    }

    pub fn previous_beat_secs(&self) -> Option<f32> {
        self.previous_beat.map(|beat| beat as f32 / 1024.0)
    }

    /// R-R interval in milliseconds between the previous and the last heart beat.
    pub fn rr_interval_ms(&self) -> Option<u32> {
        self.previous_beat.map(|previous| {
            let ticks = self.beat_time.wrapping_sub(previous) as u32;
            ticks * 1000 / 1024
        })
    }

    pub(crate) fn set_device_id(&mut self, device_id: u16) {
        self.device_id = device_id;
    }
}

/// Decode state of a device's page stream. Only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PageState {
    /// Nothing received yet.
    Init,
    /// Page byte unchanged since the first message, decode the default data only.
    Standard,
    /// Page byte has changed at least once, the device sends extended data pages.
    Extended,
}

/// PageTracker decides for each data message whether the page byte should be decoded as
/// an extended data page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageTracker {
    state: PageState,
    last_page: Option<u8>,
}

impl PageTracker {
    pub fn new() -> Self {
        PageTracker {
            state: PageState::Init,
            last_page: None,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    /// Raw page byte, toggle bit included, of the last message seen.
    pub fn last_page(&self) -> Option<u8> {
        self.last_page
    }

    /// Records the raw page byte of a new message and returns true if the page should be
    /// decoded as an extended data page.
    pub fn advance(&mut self, page: u8) -> bool {
        let extended = match self.state {
            // The first page is never decoded, there is nothing to compare it against.
            PageState::Init => {
                self.state = PageState::Standard;
                false
            }
            PageState::Standard if self.last_page != Some(page) => {
                self.state = PageState::Extended;
                true
            }
            PageState::Standard => false,
            PageState::Extended => true,
        };
        self.last_page = Some(page);
        extended
    }
}

impl Default for PageTracker {
    fn default() -> Self {
        PageTracker::new()
    }
}

/// Decode the extended data page in `page`, the page byte followed by three bytes of
/// page content. Unknown pages leave the state untouched.
pub fn decode_extended_page(state: &mut SensorState, page: &[u8]) {
    if page.len() < 4 {
        return;
    }
    match page[0] & !TOGGLE_MASK {
        // Reported in 2 second ticks
        PAGE_OPERATING_TIME => state.operating_time = Some(bytes_to_u32(&page[1..4]) * 2),
        PAGE_MANUFACTURER_INFO => {
            state.manufacturer_id = Some(page[1]);
            state.serial_number =
                Some(state.device_id as u32 | (bytes_to_u16(&page[2..4]) as u32) << 16);
        }
        PAGE_PRODUCT_INFO => {
            state.hardware_version = Some(page[1]);
            state.software_version = Some(page[2]);
            state.model_number = Some(page[3]);
        }
        PAGE_PREVIOUS_HEARTBEAT => state.previous_beat = Some(bytes_to_u16(&page[2..4])),
        _ => {}
    }
}

/// Decode the four bytes of heart rate data every data page ends with.
pub fn decode_default_page(state: &mut SensorState, data: &[u8]) {
    if data.len() < 4 {
        return;
    }
    state.beat_time = bytes_to_u16(&data[0..2]);
    state.beat_count = data[2];
    state.computed_heart_rate = data[3];
}

/// Run a data message frame through the page tracker and both decoders.
pub(crate) fn decode_data_message(
    state: &mut SensorState,
    tracker: &mut PageTracker,
    frame: &[u8],
) -> Result<()> {
    ensure_len(frame, MESG_DATA_FRAME_SIZE)?;
    let payload = &frame[MESG_PAYLOAD_OFFSET..MESG_DATA_FRAME_SIZE];
    if tracker.advance(payload[0]) {
        trace!(
            "Device {}: extended data page {:#04X}",
            state.device_id,
            payload[0]
        );
        decode_extended_page(state, &payload[..4]);
    }
    decode_default_page(state, &payload[4..]);
    Ok(())
}
