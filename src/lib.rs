//! A headless, frame-scheduled virtualization engine for very large lists.
//!
//! Only the items intersecting the viewport (plus an overscan margin) are materialized. Item
//! sizes start as estimates from a [`SizePolicy`] and are replaced by real measurements as the
//! host reports them; the engine keeps the content on screen from jumping while that happens.
//!
//! The engine owns no UI objects and no clock. A host is expected to provide:
//! - a [`ScrollTarget`] the engine can write programmatic offsets to
//! - the scrollable element's box ([`Engine::on_resize`])
//! - scroll offsets ([`Engine::on_scroll`])
//! - observed item sizes ([`Engine::on_item_resize`])
//! - one [`Engine::on_frame`] call per animation frame
//!
//! In return it publishes a [`RenderState`] (content size plus items to render) and fires the
//! resize / scroll / reach-end callbacks configured in [`Options`].
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod engine;
mod error;
mod events;
mod measurement;
mod options;
mod range;
mod scheduler;
mod scroll;
mod state;
mod tween;
mod types;


/// `tracing` target used by every event this crate emits.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) const LOG_TARGET: &str = "virtual_list_engine";

pub use engine::Engine;
pub use error::{ConfigError, Result};
pub use events::{Events, ReachEndEvent, ResizeEvent, ScrollEvent};
pub use measurement::MeasurementCache;
pub use options::{
    OnChangeCallback, OnReachEndCallback, OnResizeCallback, OnScrollCallback, Options, Scrolling,
    SizePolicy,
};
pub use range::{overscan_range, resolve_range};
pub use scheduler::{FrameHandle, FrameScheduler};
pub use scroll::{
    COMPLETION_DELAY_FRAMES, SCROLL_SETTLE_FRAMES, ScrollCallback, ScrollTarget,
    ScrollToItemOptions, ScrollToOptions, item_offset,
};
pub use state::{
    FrameState, ItemList, ItemToken, RenderState, ScrollState, VirtualItem, stable_content_size,
};
pub use tween::{Easing, ScrollDuration, auto_duration};
pub use types::{Align, Axis, IndexRange, Measurement, Rect};
