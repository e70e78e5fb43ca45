use std::collections::{BTreeSet, HashMap};

use crate::core::style::ElementStyle;

/// A style change the host has not applied yet.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleUpdate {
    pub selector: String,
    /// Index into the selector's matches, in document order.
    pub index: usize,
    pub style: ElementStyle,
}

/// Retained styles of every animated element, grouped by CSS selector.
/// Elements are addressed as (selector, index in document order).
/// An unregistered selector behaves as matching nothing.
pub struct Scene {
    groups: HashMap<String, Vec<ElementStyle>>,
    dirty: BTreeSet<(String, usize)>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    /// Register `count` elements for a selector with default styles.
    /// Replaces any earlier registration.
    pub fn register(&mut self, selector: impl Into<String>, count: usize) {
        self.register_with(selector, vec![ElementStyle::default(); count]);
    }

    /// Register a selector with known initial styles.
    pub fn register_with(&mut self, selector: impl Into<String>, styles: Vec<ElementStyle>) {
        let selector = selector.into();
        self.dirty.retain(|(s, _)| *s != selector);
        self.groups.insert(selector, styles);
    }

    /// Number of elements matching a selector (0 if unregistered).
    pub fn count(&self, selector: &str) -> usize {
        self.groups.get(selector).map_or(0, Vec::len)
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.groups.contains_key(selector)
    }

    /// Get an element's style.
    pub fn get(&self, selector: &str, index: usize) -> Option<&ElementStyle> {
        self.groups.get(selector)?.get(index)
    }

    /// Get an element's style mutably. The element is marked dirty.
    pub fn get_mut(&mut self, selector: &str, index: usize) -> Option<&mut ElementStyle> {
        let style = self.groups.get_mut(selector)?.get_mut(index)?;
        self.dirty.insert((selector.to_string(), index));
        Some(style)
    }

    /// Take every style changed since the last drain, in selector/index order.
    pub fn drain_dirty(&mut self) -> Vec<StyleUpdate> {
        let dirty = std::mem::take(&mut self.dirty);
        dirty
            .into_iter()
            .filter_map(|(selector, index)| {
                let style = self.get(&selector, index)?.clone();
                Some(StyleUpdate { selector, index, style })
            })
            .collect()
    }

    /// Registered selectors.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Total number of registered elements.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_count() {
        let mut scene = Scene::new();
        scene.register(".baloons img", 3);
        assert_eq!(scene.count(".baloons img"), 3);
        assert_eq!(scene.count(".missing"), 0);
        assert!(scene.get(".baloons img", 3).is_none());
    }

    #[test]
    fn get_mut_marks_dirty_once() {
        let mut scene = Scene::new();
        scene.register(".one", 1);
        scene.get_mut(".one", 0).unwrap().opacity = 0.0;
        scene.get_mut(".one", 0).unwrap().opacity = 0.5;

        let updates = scene.drain_dirty();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].selector, ".one");
        assert_eq!(updates[0].style.opacity, 0.5);
        assert!(scene.drain_dirty().is_empty());
    }

    #[test]
    fn missing_element_is_not_dirtied() {
        let mut scene = Scene::new();
        assert!(scene.get_mut(".nine p", 0).is_none());
        assert!(scene.drain_dirty().is_empty());
    }

    #[test]
    fn reregister_replaces_group() {
        let mut scene = Scene::new();
        scene.register(".wish-hbd span", 2);
        scene.get_mut(".wish-hbd span", 1);
        scene.register(".wish-hbd span", 5);
        assert_eq!(scene.count(".wish-hbd span"), 5);
        assert!(scene.drain_dirty().is_empty());
        assert_eq!(scene.len(), 5);
    }
}
