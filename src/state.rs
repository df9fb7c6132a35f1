use std::collections::BTreeMap;
use std::sync::Arc;

use crate::types::{IndexRange, Measurement, Rect};

/// The size-feedback capability of a rendered item.
///
/// Tokens are registered per index when an item first materializes and stay valid until the
/// host releases them ([`crate::Engine::release_item`]) or the engine is unmounted. Reports made
/// with a released token are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemToken {
    index: usize,
    id: u64,
}

impl ItemToken {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// One rendered item.
///
/// Equality only looks at `index`, `start`, `size` and `end`. Items that stay equal across
/// updates are handed out again as the same `Arc`.
#[derive(Clone, Debug)]
pub struct VirtualItem {
    pub index: usize,
    pub start: f64,
    pub size: f64,
    pub end: f64,
    token: ItemToken,
}

impl VirtualItem {
    pub fn token(&self) -> ItemToken {
        self.token
    }

    fn matches(&self, index: usize, m: &Measurement) -> bool {
        self.index == index && self.start == m.start && self.size == m.size && self.end == m.end
    }
}

impl PartialEq for VirtualItem {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.start == other.start
            && self.size == other.size
            && self.end == other.end
    }
}

pub type ItemList = Arc<[Arc<VirtualItem>]>;

/// The externally visible render state: total content size plus the items to render.
///
/// `size == 0` with no items is the empty state.
#[derive(Clone, Debug)]
pub struct RenderState {
    size: f64,
    items: ItemList,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            size: 0.0,
            items: Arc::from(Vec::new()),
        }
    }
}

impl RenderState {
    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn items(&self) -> &[Arc<VirtualItem>] {
        &self.items
    }

    /// The shared item list. Unchanged across no-op publishes.
    pub fn item_list(&self) -> &ItemList {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Same size and pairwise equal items (by reference or by value).
    pub fn is_equal(&self, size: f64, items: &[Arc<VirtualItem>]) -> bool {
        self.size == size
            && self.items.len() == items.len()
            && self
                .items
                .iter()
                .zip(items)
                .all(|(a, b)| Arc::ptr_eq(a, b) || **a == **b)
    }

    /// Replaces the state unless it is structurally equal to the candidate.
    ///
    /// Returns `true` when a new state was published.
    pub(crate) fn publish(&mut self, size: f64, items: &[Arc<VirtualItem>]) -> bool {
        if self.is_equal(size, items) {
            return false;
        }
        *self = Self {
            size,
            items: items.iter().cloned().collect(),
        };
        true
    }
}

/// Content size to publish given the previously published one.
///
/// A shrink is held back while the viewport, projected from `scroll_offset`, still reaches past
/// the new end, so the scrollbar does not move under the user.
///
/// Only that case holds it back: a viewport ending inside the shrunken content always gets the
/// measured size, even when it also ends before the previously published one.
pub fn stable_content_size(
    published: f64,
    measured: f64,
    scroll_offset: f64,
    viewport_size: f64,
) -> f64 {
    let projected = (scroll_offset + viewport_size).ceil();
    if measured < published && projected > measured {
        published
    } else {
        measured
    }
}

/// Index-keyed registry of materialized items, used for reuse and for token validation.
#[derive(Debug, Default)]
pub(crate) struct ItemTable {
    items: BTreeMap<usize, Arc<VirtualItem>>,
    next_id: u64,
}

impl ItemTable {
    /// Returns the registered item for `index` if its geometry still matches `m`, otherwise a
    /// fresh item (keeping the index's token when one is registered).
    pub(crate) fn materialize(&mut self, index: usize, m: &Measurement) -> Arc<VirtualItem> {
        let token = match self.items.get(&index) {
            Some(prev) if prev.matches(index, m) => return Arc::clone(prev),
            Some(prev) => prev.token,
            None => {
                let id = self.next_id;
                self.next_id = self.next_id.wrapping_add(1);
                ItemToken { index, id }
            }
        };
        let item = Arc::new(VirtualItem {
            index,
            start: m.start,
            size: m.size,
            end: m.end,
            token,
        });
        self.items.insert(index, Arc::clone(&item));
        item
    }

    /// Revokes every item outside `range` (items that left the rendered window).
    pub(crate) fn retain(&mut self, range: IndexRange) {
        self.items.retain(|&index, _| range.contains(index));
    }

    pub(crate) fn is_live(&self, token: ItemToken) -> bool {
        self.items
            .get(&token.index)
            .is_some_and(|it| it.token == token)
    }

    pub(crate) fn release(&mut self, token: ItemToken) -> bool {
        if self.is_live(token) {
            self.items.remove(&token.index);
            true
        } else {
            false
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

/// A lightweight snapshot of the current scroll state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub offset: f64,
    /// Seed for the next range search (the start of the last resolved range).
    pub anchor_index: usize,
    /// `true` for a couple of frames after a scroll signal.
    pub scrolling: bool,
}

/// Viewport box plus scroll state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameState {
    pub viewport: Rect,
    pub scroll: ScrollState,
}
