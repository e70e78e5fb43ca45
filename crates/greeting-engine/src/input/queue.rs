use crate::api::types::{Channel, GestureKind, GestureTarget, PlayResult};

/// Everything the host reports back to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The user clicked or touched `target`.
    Gesture { target: GestureTarget, kind: GestureKind },
    /// A `play()` promise settled for the given request id.
    PlaySettled { channel: Channel, request: u32, result: PlayResult },
    /// A gallery preload finished. `loaded` is false on error.
    ImageSettled { generation: u32, loaded: bool },
}

/// A queue of input events.
/// The bridge pushes events as they happen; the page drains them each tick.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(8),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::Gesture { target: GestureTarget::Overlay, kind: GestureKind::Click });
        q.push(InputEvent::ImageSettled { generation: 2, loaded: false });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn keeps_arrival_order() {
        let mut q = InputQueue::new();
        let settled = InputEvent::PlaySettled {
            channel: Channel::Main,
            request: 4,
            result: PlayResult::Rejected,
        };
        q.push(settled);
        q.push(InputEvent::Gesture { target: GestureTarget::Document, kind: GestureKind::TouchStart });
        assert_eq!(q.iter().next(), Some(&settled));
        match q.drain()[1] {
            InputEvent::Gesture { target, kind } => {
                assert_eq!(target, GestureTarget::Document);
                assert_eq!(kind, GestureKind::TouchStart);
            }
            _ => panic!("Expected Gesture event"),
        }
    }
}
