/// Device profiles decoded by this library along with the channel parameters a host needs
/// to open a channel for them.
pub mod hrm;

use crate::defines;
use crate::message::{self, Message};

/// Channel parameters for a device. A `device_id` of 0 is a wildcard: the channel pairs
/// with the first matching device and the id gets resolved afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    channel: u8,
    device_id: u16,
    device_type: u8,
    channel_type: u8,
    frequency: u8,
    period: u16,
    timeout: u8,
    transmission_type: u8,
}

impl Config {
    pub fn new() -> Self {
        Config {
            channel_type: defines::ANT_RECEIVE_CHANNEL,
            frequency: defines::ANT_PLUS_FREQUENCY,
            timeout: 30,
            ..Default::default()
        }
    }

    /// Heart rate monitor profile defaults: receive channel, 4.06Hz message period and
    /// an infinite search.
    pub fn heart_rate() -> Self {
        Config::new()
            .device_type(defines::HEART_RATE_DEVICE_TYPE)
            .period(defines::HEART_RATE_PERIOD)
            .timeout(defines::ANT_INFINITE_SEARCH_TIMEOUT)
    }

    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    pub fn device_id(mut self, device_id: u16) -> Self {
        self.device_id = device_id;
        self
    }

    pub fn device_type(mut self, device_type: u8) -> Self {
        self.device_type = device_type;
        self
    }

    pub fn channel_type(mut self, channel_type: u8) -> Self {
        self.channel_type = channel_type;
        self
    }

    pub fn frequency(mut self, frequency: u8) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn period(mut self, period: u16) -> Self {
        self.period = period;
        self
    }

    pub fn timeout(mut self, timeout: u8) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn transmission_type(mut self, transmission_type: u8) -> Self {
        self.transmission_type = transmission_type;
        self
    }

    pub fn get_channel(&self) -> u8 {
        self.channel
    }

    pub fn get_device_id(&self) -> u16 {
        self.device_id
    }

    pub fn get_device_type(&self) -> u8 {
        self.device_type
    }

    pub fn get_channel_type(&self) -> u8 {
        self.channel_type
    }

    pub fn get_frequency(&self) -> u8 {
        self.frequency
    }

    pub fn get_period(&self) -> u16 {
        self.period
    }

    pub fn get_timeout(&self) -> u8 {
        self.timeout
    }

    pub fn get_transmission_type(&self) -> u8 {
        self.transmission_type
    }

    /// Set channel id message for hosts that configure the channel themselves.
    pub fn channel_id_message(&self) -> Message {
        message::set_channel_id(
            self.channel,
            self.device_id,
            self.device_type,
            self.transmission_type,
        )
    }
}
