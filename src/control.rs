use crate::buttons::Keypad;
use crate::clock::Clock;
use crate::link::{CommandLink, Heartbeat, ONLINE_PAYLOAD};
use crate::remote::Remote;
use crate::segment::SegmentSensor;

/// The bridge's only thread: synchronize or announce presence, then serve
/// whatever commands arrived. A long navigation holds up everything else.
pub struct ControlLoop<K, S, C, L> {
    remote: Remote<K, S, C>,
    link: L,
    heartbeat: Heartbeat,
}

impl<K: Keypad, S: SegmentSensor, C: Clock, L: CommandLink> ControlLoop<K, S, C, L> {
    pub fn new(remote: Remote<K, S, C>, link: L, heartbeat: Heartbeat) -> Self {
        ControlLoop { remote, link, heartbeat }
    }

    #[cfg(test)]
    pub fn remote_mut(&mut self) -> &mut Remote<K, S, C> {
        &mut self.remote
    }

    #[cfg(test)]
    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
        }
    }

    pub fn tick(&mut self) {
        self.link.maintain();

        if !self.remote.is_known() {
            self.remote.synchronize();
        } else {
            self.announce();
        }

        while let Some(payload) = self.link.receive() {
            let outcome = self.remote.dispatch(&payload);
            log::debug!("{:?} -> {:?}", String::from_utf8_lossy(&payload), outcome);
        }
    }

    fn announce(&mut self) {
        let now = self.remote.now();
        if !self.link.is_connected() || !self.heartbeat.is_due(now) {
            return;
        }
        match self.link.publish(ONLINE_PAYLOAD) {
            Ok(()) => self.heartbeat.sent(now),
            Err(e) => log::warn!("Heartbeat not sent: {}", e),
        }
    }
}
