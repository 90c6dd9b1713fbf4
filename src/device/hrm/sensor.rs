use crossbeam_channel::Sender;
use log::{debug, warn};

use super::{decode_data_message, PageState, PageTracker, SensorState};
use crate::device::Config;
use crate::message::{
    self, bytes_to_u16, ensure_len, MESG_ACKNOWLEDGE_DATA_ID, MESG_BROADCAST_DATA_ID,
    MESG_BURST_DATA_ID, MESG_CHANNEL_ID_ID, MESG_CHANNEL_OFFSET, MESG_ID_OFFSET,
    MESG_PAYLOAD_OFFSET,
};
use crate::transport::Transport;
use crate::Result;

/// Heart rate monitor bound to a single channel. Messages for other channels are
/// dropped. Until the device id is known every data message also asks the channel for
/// its id.
pub struct HeartRateSensor<T: Transport> {
    channel: u8,
    device_id: u16,
    transmission_type: u8,
    state: SensorState,
    tracker: PageTracker,
    transport: T,
    events: Sender<SensorState>,
}

impl<T: Transport> HeartRateSensor<T> {
    pub fn new(config: Config, transport: T, events: Sender<SensorState>) -> Self {
        HeartRateSensor {
            channel: config.get_channel(),
            device_id: config.get_device_id(),
            transmission_type: config.get_transmission_type(),
            state: SensorState::new(config.get_device_id()),
            tracker: PageTracker::new(),
            transport,
            events,
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Device id of the paired monitor, 0 until resolved.
    pub fn device_id(&self) -> u16 {
        self.device_id
    }

    pub fn transmission_type(&self) -> u8 {
        self.transmission_type
    }

    pub fn state(&self) -> &SensorState {
        &self.state
    }

    pub fn page_state(&self) -> PageState {
        self.tracker.state()
    }

    /// Decode a frame received from the ANT+ USB device. Every accepted data message
    /// sends the updated state to the events channel.
    pub fn decode(&mut self, data: &[u8]) -> Result<()> {
        ensure_len(data, MESG_PAYLOAD_OFFSET)?;
        if data[MESG_CHANNEL_OFFSET] != self.channel {
            return Ok(());
        }
        match data[MESG_ID_OFFSET] {
            MESG_BROADCAST_DATA_ID | MESG_ACKNOWLEDGE_DATA_ID | MESG_BURST_DATA_ID => {
                ensure_len(data, message::MESG_DATA_FRAME_SIZE)?;
                if self.device_id == 0 {
                    self.request_channel_id();
                }
                decode_data_message(&mut self.state, &mut self.tracker, data)?;
                self.emit();
            }
            MESG_CHANNEL_ID_ID => {
                ensure_len(data, MESG_PAYLOAD_OFFSET + 4)?;
                let payload = &data[MESG_PAYLOAD_OFFSET..];
                self.device_id = bytes_to_u16(&payload[0..2]);
                self.transmission_type = payload[3];
                self.state.set_device_id(self.device_id);
                debug!(
                    "Channel {}: paired with device {} (transmission type {:#04X})",
                    self.channel, self.device_id, self.transmission_type
                );
            }
            _ => {}
        }
        Ok(())
    }

    /// Ask the monitor to send a data page, e.g. 0x02 for manufacturer information.
    pub fn request_data_page(&mut self, page_number: u8) -> Result<()> {
        let mesg = message::request_data_page(self.channel, page_number).to_message();
        self.transport.write(&mesg)
    }

    fn request_channel_id(&mut self) {
        debug!("Channel {}: requesting channel id", self.channel);
        if let Err(e) = self.transport.write(&message::get_channel_id(self.channel)) {
            warn!("Channel {}: channel id request failed: {}", self.channel, e);
        }
    }

    fn emit(&self) {
        if self.events.send(self.state.clone()).is_err() {
            debug!("Channel {}: no receiver for heart rate data", self.channel);
        }
    }
}
