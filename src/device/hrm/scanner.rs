use std::collections::HashMap;

use crossbeam_channel::Sender;
use log::{debug, info, warn};

use super::{decode_data_message, PageState, PageTracker, SensorState, DEVICE_TYPE};
use crate::defines::ANT_EXT_MESG_BITFIELD_DEVICE_ID;
use crate::error::AntError;
use crate::message::{
    bytes_to_u16, ensure_len, MESG_ACKNOWLEDGE_DATA_ID, MESG_BROADCAST_DATA_ID,
    MESG_BURST_DATA_ID, MESG_ID_OFFSET, MESG_SIZE_OFFSET,
};
use crate::Result;

// Each device seen keeps its own page tracking.
#[derive(Debug)]
struct Record {
    state: SensorState,
    tracker: PageTracker,
}

/// Heart rate monitors picked up by a channel in scan mode. Scan mode messages carry the
/// device id and device type of the sender after the payload, which is used to keep a
/// state per device. Devices are never forgotten for the lifetime of the scanner.
#[derive(Debug)]
pub struct HeartRateScanner {
    devices: HashMap<u16, Record>,
    events: Sender<SensorState>,
}

impl HeartRateScanner {
    pub fn new(events: Sender<SensorState>) -> Self {
        HeartRateScanner {
            devices: HashMap::new(),
            events,
        }
    }

    pub fn state(&self, device_id: u16) -> Option<&SensorState> {
        self.devices.get(&device_id).map(|record| &record.state)
    }

    pub fn page_state(&self, device_id: u16) -> Option<PageState> {
        self.devices
            .get(&device_id)
            .map(|record| record.tracker.state())
    }

    /// Ids of every heart rate monitor seen so far.
    pub fn devices(&self) -> impl Iterator<Item = u16> + '_ {
        self.devices.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Decode an extended message frame received in scan mode. Frames without the device
    /// id flag are rejected with `InvalidExtendedFlag`, frames from other device types are
    /// dropped.
    pub fn decode(&mut self, data: &[u8]) -> Result<()> {
        ensure_len(data, MESG_ID_OFFSET + 1)?;
        // The flag byte sits two bytes before the declared length, followed by the
        // device number and device type.
        let ext = (data[MESG_SIZE_OFFSET] as usize).saturating_sub(2);
        ensure_len(data, ext + 4)?;
        if data[ext] != ANT_EXT_MESG_BITFIELD_DEVICE_ID {
            warn!("Wrong message format, extended flag {:#04X}", data[ext]);
            return Err(AntError::InvalidExtendedFlag(data[ext]));
        }
        let device_id = bytes_to_u16(&data[ext + 1..ext + 3]);
        let device_type = data[ext + 3];
        if device_type != DEVICE_TYPE {
            debug!("Dropping message from device type {:#04X}", device_type);
            return Ok(());
        }

        let record = self.devices.entry(device_id).or_insert_with(|| {
            info!("Found heart rate monitor {}", device_id);
            Record {
                state: SensorState::new(device_id),
                tracker: PageTracker::new(),
            }
        });

        match data[MESG_ID_OFFSET] {
            MESG_BROADCAST_DATA_ID | MESG_ACKNOWLEDGE_DATA_ID | MESG_BURST_DATA_ID => {
                decode_data_message(&mut record.state, &mut record.tracker, data)?;
                if self.events.send(record.state.clone()).is_err() {
                    debug!("No receiver for heart rate data of device {}", device_id);
                }
            }
            _ => {}
        }
        Ok(())
    }
}
