//! Gesture listener registry.
//!
//! Every registration returns a [`ListenerId`] so it can be disposed. A
//! one-shot listener may cover several gesture kinds; whichever fires first
//! removes the whole registration.

use std::collections::BTreeMap;

use crate::api::types::{GestureKind, GestureTarget, ListenerId};

#[derive(Debug, Clone)]
struct Listener<A> {
    target: GestureTarget,
    kinds: Vec<GestureKind>,
    once: bool,
    action: A,
}

/// Registered listeners, dispatched in registration order.
#[derive(Debug)]
pub struct ListenerRegistry<A> {
    next_id: u32,
    listeners: BTreeMap<ListenerId, Listener<A>>,
}

impl<A: Clone> ListenerRegistry<A> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: BTreeMap::new(),
        }
    }

    /// Register a listener that is removed after its first invocation.
    pub fn add_once(&mut self, target: GestureTarget, kinds: &[GestureKind], action: A) -> ListenerId {
        self.insert(target, kinds, true, action)
    }

    /// Register a listener that stays until removed.
    pub fn add(&mut self, target: GestureTarget, kinds: &[GestureKind], action: A) -> ListenerId {
        self.insert(target, kinds, false, action)
    }

    fn insert(&mut self, target: GestureTarget, kinds: &[GestureKind], once: bool, action: A) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(
            id,
            Listener {
                target,
                kinds: kinds.to_vec(),
                once,
                action,
            },
        );
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Remove every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    /// Listeners a gesture reaches: those on the target itself first, then
    /// those on the document it bubbles to.
    pub fn matching(&self, target: GestureTarget, kind: GestureKind) -> Vec<ListenerId> {
        let hits = |on: GestureTarget| {
            self.listeners
                .iter()
                .filter(move |(_, l)| l.target == on && l.kinds.contains(&kind))
                .map(|(&id, _)| id)
        };

        let mut ids: Vec<ListenerId> = hits(target).collect();
        if target != GestureTarget::Document {
            ids.extend(hits(GestureTarget::Document));
        }
        ids
    }

    /// Fetch a listener's action for dispatch. One-shot listeners are removed.
    /// Returns `None` if the listener was disposed since `matching` ran.
    pub fn take(&mut self, id: ListenerId) -> Option<A> {
        let once = self.listeners.get(&id)?.once;
        if once {
            self.listeners.remove(&id).map(|l| l.action)
        } else {
            self.listeners.get(&id).map(|l| l.action.clone())
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<A: Clone> Default for ListenerRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}
