use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::Vec3;

use super::gesture::Gesture;
use super::state::{BehaviorState, Expression};

/// Transition notifications. Emitted on state changes only, never per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum AvatarEvent {
    ActionChanged {
        from: BehaviorState,
        to: BehaviorState,
    },
    MovementStarted {
        target: Vec3,
    },
    MovementFinished {
        position: Vec3,
    },
    MovementStopped {
        position: Vec3,
    },
    GestureTriggered {
        gesture: Gesture,
    },
    GestureCleared {
        gesture: Gesture,
    },
    ExpressionChanged {
        expression: Expression,
    },
}

/// Fan-out hub. Each subscriber gets its own unbounded channel; receivers
/// that have been dropped are pruned on the next emit.
#[derive(Debug, Default)]
pub struct EventHub {
    senders: Vec<Sender<AvatarEvent>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<AvatarEvent> {
        let (tx, rx) = unbounded();
        self.senders.push(tx);
        rx
    }

    pub fn emit(&mut self, event: AvatarEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.senders.len()
    }
}
