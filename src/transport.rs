/// Transport is the write side of the link to the ANT+ USB device. The heart rate sessions
/// only ever write requests through it, reading is left to the host.
use crossbeam_channel::Sender;

use crate::{error::AntError, message::Message, Result};

pub trait Transport {
    fn write(&mut self, mesg: &Message) -> Result<()>;
}

/// Hands messages over to whichever thread owns the USB device.
impl Transport for Sender<Message> {
    fn write(&mut self, mesg: &Message) -> Result<()> {
        self.send(mesg.clone()).map_err(|_| AntError::Disconnected)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, mesg: &Message) -> Result<()> {
        (**self).write(mesg)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::message::get_channel_id;
    use crossbeam_channel::unbounded;

    #[test]
    fn sender_transport() {
        let (mut tx, rx) = unbounded::<Message>();
        tx.write(&get_channel_id(0)).unwrap();
        assert_eq!(rx.try_recv().unwrap(), get_channel_id(0));
    }

    #[test]
    fn sender_transport_disconnected() {
        let (mut tx, rx) = unbounded::<Message>();
        drop(rx);
        match tx.write(&get_channel_id(0)) {
            Err(AntError::Disconnected) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
