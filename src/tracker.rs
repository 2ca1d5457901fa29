/// Channel numbers on the remote start at 1.
pub type Channel = u8;

/// The only channel whose leftmost digit can be told apart optically: both
/// segments sampled on a "2" are dark.
pub const SENTINEL_CHANNEL: Channel = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Unknown,
    Known(Channel),
}

/// Which channel the remote is believed to point at.
///
/// Only three transitions exist: the synchronizer anchors an unknown position
/// on the sentinel, navigation moves a known position one press at a time,
/// and a resync command forgets it.
#[derive(Debug)]
pub struct PositionTracker {
    position: Position,
    max_channel: Channel,
}

impl PositionTracker {
    pub fn new(max_channel: Channel) -> Self {
        PositionTracker { position: Position::Unknown, max_channel }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn current(&self) -> Option<Channel> {
        match self.position {
            Position::Known(channel) => Some(channel),
            Position::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.current().is_some()
    }

    pub fn max_channel(&self) -> Channel {
        self.max_channel
    }

    pub fn anchor_on_sentinel(&mut self) {
        if self.position == Position::Unknown {
            log::info!("Synchronized on channel {}", SENTINEL_CHANNEL);
            self.position = Position::Known(SENTINEL_CHANNEL);
        }
    }

    /// Refuses channels outside `1..=max_channel` and moves from an unknown
    /// position, leaving the tracker as it was.
    pub fn moved_to(&mut self, channel: Channel) {
        if !(1..=self.max_channel).contains(&channel) {
            log::warn!("Refusing move to channel {} outside 1..={}", channel, self.max_channel);
            return;
        }
        if !self.is_known() {
            log::warn!("Refusing move to channel {} from an unknown position", channel);
            return;
        }
        self.position = Position::Known(channel);
    }

    pub fn forget(&mut self) {
        if let Position::Known(channel) = self.position {
            log::info!("Forgetting position (was channel {})", channel);
        }
        self.position = Position::Unknown;
    }
}
