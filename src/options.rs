use std::fmt;
use std::sync::Arc;

use crate::error::{Result, check_size};
use crate::events::{ReachEndEvent, ResizeEvent, ScrollEvent};
use crate::state::RenderState;
use crate::tween::{Easing, ScrollDuration};
use crate::types::Rect;

pub type OnResizeCallback = Arc<dyn Fn(&ResizeEvent) + Send + Sync>;
pub type OnScrollCallback = Arc<dyn Fn(&ScrollEvent) + Send + Sync>;
pub type OnReachEndCallback = Arc<dyn Fn(&ReachEndEvent) + Send + Sync>;

/// Fired whenever a new [`RenderState`] is published (never for structurally equal states).
pub type OnChangeCallback = Arc<dyn Fn(&RenderState) + Send + Sync>;

/// Where item sizes come from before an item is measured.
#[derive(Clone)]
pub enum SizePolicy {
    /// The same length for every item.
    Fixed(f64),
    /// A length computed from the item index and the current viewport box.
    Dynamic(Arc<dyn Fn(usize, Rect) -> f64 + Send + Sync>),
}

impl SizePolicy {
    pub fn dynamic(f: impl Fn(usize, Rect) -> f64 + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(f))
    }

    /// Resolves the estimate for `index`, rejecting non-positive lengths.
    pub fn resolve(&self, index: usize, viewport: Rect) -> Result<f64> {
        let size = match self {
            Self::Fixed(size) => *size,
            Self::Dynamic(f) => f(index, viewport),
        };
        check_size(index, size)
    }

    /// Whether two policies are the same source. Closures compare by identity.
    pub fn same_source(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Fixed(a), Self::Fixed(b)) => a == b,
            (Self::Dynamic(a), Self::Dynamic(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<f64> for SizePolicy {
    fn from(size: f64) -> Self {
        Self::Fixed(size)
    }
}

impl fmt::Debug for SizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(size) => f.debug_tuple("Fixed").field(size).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Overrides for smooth scrolling.
#[derive(Clone, Debug, Default)]
pub struct Scrolling {
    pub easing: Easing,
    pub duration: ScrollDuration,
}

/// Configuration for [`crate::Engine`].
///
/// Closures are stored in `Arc`s so adapters can clone the options, tweak a field or two and
/// hand them back through [`crate::Engine::set_options`] cheaply.
#[derive(Clone)]
pub struct Options {
    pub count: usize,
    pub size: SizePolicy,

    /// Extra items rendered beyond each visible edge.
    pub overscan: usize,

    /// Virtualize along the x axis (width / left) instead of the y axis (height / top).
    pub horizontal: bool,

    /// Keep the published content size from shrinking under the user while the viewport still
    /// reaches past the new end. `false` always publishes the measured size.
    pub scrollbar: bool,

    pub scrolling: Scrolling,

    /// Skip the scroll shift for size changes above the viewport while a `scroll_to` /
    /// `scroll_to_item` is driving the offset. The range is re-resolved instead.
    pub suppress_compensation_while_scrolling_to: bool,

    pub on_resize: Option<OnResizeCallback>,
    pub on_scroll: Option<OnScrollCallback>,
    pub on_reach_end: Option<OnReachEndCallback>,
    pub on_change: Option<OnChangeCallback>,
}

impl Options {
    pub fn new(count: usize, size: impl Into<SizePolicy>) -> Self {
        Self {
            count,
            size: size.into(),
            overscan: 10,
            horizontal: false,
            scrollbar: true,
            scrolling: Scrolling::default(),
            suppress_compensation_while_scrolling_to: true,
            on_resize: None,
            on_scroll: None,
            on_reach_end: None,
            on_change: None,
        }
    }

    /// Options whose estimates come from `size(index, viewport)`.
    pub fn with_size_fn(
        count: usize,
        size: impl Fn(usize, Rect) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self::new(count, SizePolicy::dynamic(size))
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    pub fn with_scrollbar(mut self, scrollbar: bool) -> Self {
        self.scrollbar = scrollbar;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.scrolling.easing = easing;
        self
    }

    pub fn with_duration(mut self, duration: ScrollDuration) -> Self {
        self.scrolling.duration = duration;
        self
    }

    pub fn with_suppress_compensation_while_scrolling_to(mut self, suppress: bool) -> Self {
        self.suppress_compensation_while_scrolling_to = suppress;
        self
    }

    pub fn with_on_resize(mut self, f: impl Fn(&ResizeEvent) + Send + Sync + 'static) -> Self {
        self.on_resize = Some(Arc::new(f));
        self
    }

    pub fn with_on_scroll(mut self, f: impl Fn(&ScrollEvent) + Send + Sync + 'static) -> Self {
        self.on_scroll = Some(Arc::new(f));
        self
    }

    pub fn with_on_reach_end(
        mut self,
        f: impl Fn(&ReachEndEvent) + Send + Sync + 'static,
    ) -> Self {
        self.on_reach_end = Some(Arc::new(f));
        self
    }

    pub fn with_on_change(mut self, f: impl Fn(&RenderState) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("count", &self.count)
            .field("size", &self.size)
            .field("overscan", &self.overscan)
            .field("horizontal", &self.horizontal)
            .field("scrollbar", &self.scrollbar)
            .field("scrolling", &self.scrolling)
            .field(
                "suppress_compensation_while_scrolling_to",
                &self.suppress_compensation_while_scrolling_to,
            )
            .finish_non_exhaustive()
    }
}
