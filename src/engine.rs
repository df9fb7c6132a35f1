use std::fmt;
use std::mem;
use std::sync::Arc;

use crate::error::{ConfigError, Result, check_size};
use crate::events::{Events, Resolved, emit};
use crate::measurement::MeasurementCache;
use crate::options::{Options, SizePolicy};
use crate::range::{overscan_range, resolve_range};
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::scroll::{
    COMPLETION_DELAY_FRAMES, SCROLL_SETTLE_FRAMES, ScrollCallback, ScrollTarget,
    ScrollToItemOptions, ScrollToOptions, item_offset,
};
use crate::state::{
    FrameState, ItemTable, ItemToken, RenderState, ScrollState, VirtualItem, stable_content_size,
};
use crate::tween::Tween;
use crate::types::{Align, Axis, Rect};

/// Work deferred to a later frame.
enum Task {
    Animate,
    Complete {
        callback: Option<ScrollCallback>,
        follow_up: Option<FollowUp>,
    },
    Settle,
}

/// A `scroll_to_item` waiting to check whether its target moved while it was scrolling.
#[derive(Clone, Copy, Debug)]
struct FollowUp {
    options: ScrollToItemOptions,
    offset: f64,
}

struct Animation {
    tween: Tween,
    callback: Option<ScrollCallback>,
    follow_up: Option<FollowUp>,
}

/// A headless list virtualization engine.
///
/// The engine holds no UI objects. The host drives it with four kinds of signals, each handled
/// synchronously:
/// - [`Engine::on_resize`] when the scrollable element's box changes
/// - [`Engine::on_scroll`] when the element reports a new scroll offset
/// - [`Engine::on_item_resize`] when a rendered item's real size is observed
/// - [`Engine::on_frame`] once per animation frame (smooth scrolling, completion callbacks,
///   scroll settling)
///
/// Every pass runs in the same order: flush pending remeasurement, resolve the visible range,
/// materialize items (reusing unchanged ones), publish the [`RenderState`] if it changed, then
/// fire events.
///
/// Nothing happens until [`Engine::mount`]; after [`Engine::unmount`] every signal is a no-op and
/// every queued frame task is dropped.
pub struct Engine {
    options: Options,
    axis: Axis,
    mounted: bool,
    scrolling: bool,
    scrolling_to: bool,
    /// A size change is waiting for the scroll to settle.
    deferred: bool,
    anchor_index: usize,
    scroll_offset: f64,
    viewport: Rect,

    cache: MeasurementCache,
    items: ItemTable,
    scratch: Vec<Arc<VirtualItem>>,
    state: RenderState,

    scheduler: FrameScheduler<Task>,
    scroll_to_frame: Option<FrameHandle>,
    settle_frame: Option<FrameHandle>,
    animation: Option<Animation>,
    target: Option<Box<dyn ScrollTarget>>,
}

impl Engine {
    /// Creates an unmounted engine.
    ///
    /// Fails if a fixed size policy is not a positive length.
    pub fn new(options: Options) -> Result<Self> {
        validate(&options)?;
        vdebug!(
            count = options.count,
            overscan = options.overscan,
            horizontal = options.horizontal,
            "Engine::new"
        );
        Ok(Self {
            axis: Axis::from_horizontal(options.horizontal),
            options,
            mounted: false,
            scrolling: false,
            scrolling_to: false,
            deferred: false,
            anchor_index: 0,
            scroll_offset: 0.0,
            viewport: Rect::default(),
            cache: MeasurementCache::new(),
            items: ItemTable::default(),
            scratch: Vec::new(),
            state: RenderState::default(),
            scheduler: FrameScheduler::new(),
            scroll_to_frame: None,
            settle_frame: None,
            animation: None,
            target: None,
        })
    }

    /// Attaches the scrollable element and runs a first resolution.
    pub fn mount(&mut self, target: impl ScrollTarget + 'static) -> Result<()> {
        vdebug!(count = self.options.count, "Engine::mount");
        self.target = Some(Box::new(target));
        self.mounted = true;
        self.update(self.scroll_offset, Events::REACH_END)
    }

    /// Detaches from the host. Queued frame tasks are dropped (pending completion callbacks
    /// never run) and item tokens are revoked.
    pub fn unmount(&mut self) {
        vdebug!(pending = self.scheduler.len(), "Engine::unmount");
        self.scheduler.clear();
        self.mounted = false;
        self.scrolling = false;
        self.scrolling_to = false;
        self.deferred = false;
        self.scroll_to_frame = None;
        self.settle_frame = None;
        self.animation = None;
        self.items.clear();
        self.target = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replaces the options, rebuilding only what changed.
    ///
    /// - a different size source clears the measurement cache
    /// - a smaller `count` truncates it, a larger one marks the new tail for measurement
    /// - a different axis re-reads the viewport along the new axis
    ///
    /// On error the previous options stay in effect.
    pub fn set_options(&mut self, options: Options) -> Result<()> {
        validate(&options)?;
        let prev = mem::replace(&mut self.options, options);
        let count = self.options.count;
        let size_changed = !prev.size.same_source(&self.options.size);
        let count_changed = prev.count != count;
        let axis = Axis::from_horizontal(self.options.horizontal);
        let axis_changed = axis != self.axis;
        vtrace!(
            count,
            size_changed,
            count_changed,
            axis_changed,
            "Engine::set_options"
        );

        if size_changed {
            vdebug!("size policy changed, clearing measurements");
            self.cache.clear();
        } else if count < self.cache.len() {
            self.cache.truncate(count);
        } else if count_changed {
            self.cache.invalidate_from(self.cache.len());
        }
        self.anchor_index = self.anchor_index.min(count.saturating_sub(1));
        self.axis = axis;

        if size_changed || count_changed || axis_changed {
            self.update(self.scroll_offset, Events::REACH_END)
        } else {
            Ok(())
        }
    }

    /// Clones the current options, applies `f`, then delegates to [`Self::set_options`].
    pub fn update_options(&mut self, f: impl FnOnce(&mut Options)) -> Result<()> {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next)
    }

    pub fn set_count(&mut self, count: usize) -> Result<()> {
        self.update_options(|o| o.count = count)
    }

    pub fn set_size(&mut self, size: impl Into<SizePolicy>) -> Result<()> {
        let size = size.into();
        self.update_options(|o| o.size = size)
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The last published render state.
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Published content size along the active axis.
    pub fn size(&self) -> f64 {
        self.state.size()
    }

    /// Published items.
    pub fn items(&self) -> &[Arc<VirtualItem>] {
        self.state.items()
    }

    pub fn measurements(&self) -> &MeasurementCache {
        &self.cache
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn viewport_size(&self) -> f64 {
        self.viewport.main(self.axis)
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// `true` between a scroll signal and the moment it settles.
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// `true` while a `scroll_to` / `scroll_to_item` is animating or waiting to complete.
    pub fn is_scrolling_to(&self) -> bool {
        self.scrolling_to
    }

    /// Number of frame tasks waiting to run.
    pub fn pending_frames(&self) -> usize {
        self.scheduler.len()
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            offset: self.scroll_offset,
            anchor_index: self.anchor_index,
            scrolling: self.scrolling,
        }
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            viewport: self.viewport,
            scroll: self.scroll_state(),
        }
    }

    /// Handles a change of the scrollable element's box.
    pub fn on_resize(&mut self, rect: Rect) -> Result<()> {
        if !self.mounted || rect == self.viewport {
            return Ok(());
        }
        vtrace!(width = rect.width, height = rect.height, "Engine::on_resize");
        self.viewport = rect;
        self.update(self.scroll_offset, Events::RESIZE | Events::REACH_END)
    }

    /// Handles a scroll offset reported by the scrollable element.
    ///
    /// Reports of the offset the engine already holds are ignored.
    pub fn on_scroll(&mut self, offset: f64) -> Result<()> {
        if !self.mounted || offset == self.scroll_offset {
            return Ok(());
        }
        vtrace!(offset, prev = self.scroll_offset, "Engine::on_scroll");
        if let Some(handle) = self.settle_frame.take() {
            self.scheduler.cancel(handle);
        }
        self.scrolling = true;
        let result = self.update(offset, Events::SCROLL | Events::REACH_END);
        self.scroll_offset = offset;
        self.settle_frame = Some(self.scheduler.request(SCROLL_SETTLE_FRAMES, Task::Settle));
        result
    }

    /// Handles an observed size for a rendered item.
    ///
    /// When the item starts above the current offset the offset is shifted by the size delta so
    /// the visible content stays put. Otherwise the range is re-resolved, right away or, during a
    /// user scroll, once the scroll settles.
    pub fn on_item_resize(&mut self, token: ItemToken, size: f64) -> Result<()> {
        if !self.mounted {
            return Ok(());
        }
        if !self.items.is_live(token) {
            vwarn!(index = token.index(), "size report for a released item ignored");
            return Ok(());
        }
        let index = token.index();
        let Some(prev) = self.cache.get(index) else {
            return Ok(());
        };
        if !size.is_finite() || size < 0.0 {
            return Err(ConfigError::InvalidSize { index, size });
        }
        if size == prev.size {
            return Ok(());
        }

        if let Ok(initial) = self.options.size.resolve(index, self.viewport) {
            if size < initial {
                vwarn!(
                    index,
                    size,
                    initial,
                    "measured item size is smaller than its initial estimate"
                );
            }
        }

        vtrace!(index, from = prev.size, to = size, "Engine::on_item_resize");
        self.cache.set(index, size);
        self.cache.invalidate_from(index);

        let suppressed = self.scrolling_to && self.options.suppress_compensation_while_scrolling_to;
        if prev.start < self.scroll_offset && !suppressed {
            self.write_offset(self.scroll_offset + size - prev.size)
        } else if !self.scrolling {
            self.update(self.scroll_offset, Events::REACH_END)
        } else {
            self.deferred = true;
            Ok(())
        }
    }

    /// Revokes an item token (the host stopped rendering that item).
    ///
    /// Returns `false` if the token was already dead.
    pub fn release_item(&mut self, token: ItemToken) -> bool {
        self.items.release(token)
    }

    /// Advances one animation frame.
    ///
    /// `now_ms` is the host's frame timestamp; smooth scrolls measure their progress with it.
    pub fn on_frame(&mut self, now_ms: f64) -> Result<()> {
        if !self.mounted {
            return Ok(());
        }
        let due = self.scheduler.advance();
        if !due.is_empty() {
            vtrace!(now_ms, tasks = due.len(), "Engine::on_frame");
        }
        let mut result = Ok(());
        for (handle, task) in due {
            let outcome = match task {
                Task::Animate => self.step_animation(handle, now_ms),
                Task::Complete {
                    callback,
                    follow_up,
                } => self.complete_scroll(handle, callback, follow_up),
                Task::Settle => self.settle(handle),
            };
            if result.is_ok() {
                result = outcome;
            }
        }
        result
    }

    /// Scrolls to an offset, instantly or animated.
    ///
    /// The target is clamped into `[0, content_size - viewport_size]`. Any scroll started
    /// earlier with this method or [`Self::scroll_to_item`] is cancelled (its callback is
    /// dropped). `callback` runs a few frames after the final write.
    pub fn scroll_to(
        &mut self,
        options: impl Into<ScrollToOptions>,
        callback: Option<ScrollCallback>,
    ) -> Result<()> {
        self.start_scroll(options.into(), callback, None)
    }

    /// Scrolls so that an item is shown with the requested alignment.
    ///
    /// Once the scroll completes, the target offset is recomputed from the (possibly corrected)
    /// measurements and the scroll is re-issued until the offset stops moving. `callback` runs
    /// after the final pass. Nothing happens when no item is measured.
    pub fn scroll_to_item(
        &mut self,
        options: impl Into<ScrollToItemOptions>,
        callback: Option<ScrollCallback>,
    ) -> Result<()> {
        if !self.mounted {
            return Ok(());
        }
        let options = options.into();
        let Some(offset) = self.item_offset(options.index, options.align)? else {
            return Ok(());
        };
        vtrace!(index = options.index, offset, "Engine::scroll_to_item");
        self.start_scroll(
            ScrollToOptions {
                offset,
                smooth: options.smooth,
            },
            callback,
            Some(FollowUp { options, offset }),
        )
    }

    /// Cancels an in-flight `scroll_to` / `scroll_to_item` without running its callback.
    pub fn cancel_scroll_to(&mut self) {
        if let Some(handle) = self.scroll_to_frame.take() {
            self.scheduler.cancel(handle);
        }
        self.animation = None;
        self.scrolling_to = false;
    }

    fn start_scroll(
        &mut self,
        options: ScrollToOptions,
        callback: Option<ScrollCallback>,
        follow_up: Option<FollowUp>,
    ) -> Result<()> {
        self.cancel_scroll_to();
        if !self.mounted {
            return Ok(());
        }

        self.flush()?;
        let offset = self.cache.clamp_offset(self.viewport_size(), options.offset);

        if options.smooth {
            let from = self.scroll_offset;
            let duration = self.options.scrolling.duration.resolve(offset - from)?;
            vdebug!(from, to = offset, duration, "smooth scroll");
            self.animation = Some(Animation {
                tween: Tween::new(from, offset, duration, self.options.scrolling.easing.clone()),
                callback,
                follow_up,
            });
            self.scrolling_to = true;
            self.scroll_to_frame = Some(self.scheduler.request(1, Task::Animate));
            Ok(())
        } else {
            self.scrolling_to = true;
            let result = self.write_offset(offset);
            self.schedule_completion(callback, follow_up);
            result
        }
    }

    fn step_animation(&mut self, handle: FrameHandle, now_ms: f64) -> Result<()> {
        if self.scroll_to_frame != Some(handle) {
            return Ok(());
        }
        let (offset, done) = match self.animation.as_mut() {
            Some(animation) => animation.tween.sample(now_ms),
            None => return Ok(()),
        };

        if !done {
            self.scroll_to_frame = Some(self.scheduler.request(1, Task::Animate));
            return self.write_offset(offset);
        }

        vtrace!(offset, "smooth scroll finished");
        let (callback, follow_up) = match self.animation.take() {
            Some(a) => (a.callback, a.follow_up),
            None => (None, None),
        };
        let result = self.write_offset(offset);
        self.schedule_completion(callback, follow_up);
        result
    }

    fn schedule_completion(
        &mut self,
        callback: Option<ScrollCallback>,
        follow_up: Option<FollowUp>,
    ) {
        self.scroll_to_frame = Some(self.scheduler.request(
            COMPLETION_DELAY_FRAMES,
            Task::Complete {
                callback,
                follow_up,
            },
        ));
    }

    fn complete_scroll(
        &mut self,
        handle: FrameHandle,
        callback: Option<ScrollCallback>,
        follow_up: Option<FollowUp>,
    ) -> Result<()> {
        if self.scroll_to_frame != Some(handle) {
            return Ok(());
        }
        self.scroll_to_frame = None;
        self.scrolling_to = false;

        if let Some(follow_up) = follow_up {
            let FollowUp { options, offset } = follow_up;
            if let Some(next) = self.item_offset(options.index, options.align)? {
                if next != offset {
                    vdebug!(
                        index = options.index,
                        expected = offset,
                        next,
                        "item moved while scrolling, re-issuing"
                    );
                    return self.scroll_to_item(options, callback);
                }
            }
        }

        if let Some(callback) = callback {
            callback();
        }
        Ok(())
    }

    fn settle(&mut self, handle: FrameHandle) -> Result<()> {
        if self.settle_frame != Some(handle) {
            return Ok(());
        }
        self.settle_frame = None;
        self.scrolling = false;
        if self.deferred || self.cache.is_stale() {
            self.update(self.scroll_offset, Events::empty())
        } else {
            Ok(())
        }
    }

    /// Programmatic write: moves the real element, then handles the new offset as a scroll
    /// signal.
    fn write_offset(&mut self, offset: f64) -> Result<()> {
        vtrace!(offset, "write_offset");
        if let Some(target) = self.target.as_mut() {
            target.scroll_to(self.axis, offset);
        }
        self.on_scroll(offset)
    }

    fn item_offset(&mut self, index: usize, align: Align) -> Result<Option<f64>> {
        self.flush()?;
        Ok(item_offset(
            &self.cache,
            self.viewport_size(),
            self.scroll_offset,
            index,
            align,
        ))
    }

    fn update(&mut self, scroll_offset: f64, events: Events) -> Result<()> {
        if !self.mounted {
            return Ok(());
        }
        let viewport_size = self.viewport_size();
        if viewport_size <= 0.0 {
            self.scratch.clear();
            self.items.clear();
            self.publish(0.0);
            emit(&self.options, events, self.viewport, viewport_size, Resolved::Empty);
            return Ok(());
        }
        self.flush()?;
        self.deferred = false;

        let offset = self.cache.clamp_offset(viewport_size, scroll_offset);
        let measurements = self.cache.as_slice();
        self.scratch.clear();

        let resolved = match resolve_range(measurements, viewport_size, offset, self.anchor_index) {
            Some(visible) => {
                let max_index = measurements.len() - 1;
                let items = overscan_range(visible, self.options.overscan, max_index);
                self.anchor_index = visible.start;

                for index in items.start..=items.end {
                    let item = self.items.materialize(index, &measurements[index]);
                    self.scratch.push(item);
                }
                self.items.retain(items);

                let content_size = self.cache.content_size();
                let size = if self.options.scrollbar {
                    stable_content_size(
                        self.state.size(),
                        content_size,
                        scroll_offset,
                        viewport_size,
                    )
                } else {
                    content_size
                };
                self.publish(size);

                Resolved::Range {
                    visible,
                    items,
                    offset,
                    delta: offset - self.scroll_offset,
                    content_size,
                    max_index,
                }
            }
            None => {
                self.items.clear();
                self.publish(0.0);
                Resolved::Empty
            }
        };

        emit(&self.options, events, self.viewport, viewport_size, resolved);
        Ok(())
    }

    /// Flushes pending remeasurement. Estimates wait for a non-empty viewport, so size policies
    /// never see a zero box.
    fn flush(&mut self) -> Result<()> {
        if self.viewport_size() <= 0.0 {
            return Ok(());
        }
        self.cache
            .flush(self.options.count, &self.options.size, self.viewport)
    }

    fn publish(&mut self, size: f64) {
        if !self.state.publish(size, &self.scratch) {
            return;
        }
        vdebug!(
            size,
            items = self.state.items().len(),
            "render state published"
        );
        if let Some(on_change) = &self.options.on_change {
            on_change(&self.state);
        }
    }
}

fn validate(options: &Options) -> Result<()> {
    if let SizePolicy::Fixed(size) = options.size {
        check_size(0, size)?;
    }
    Ok(())
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("axis", &self.axis)
            .field("mounted", &self.mounted)
            .field("scrolling", &self.scrolling)
            .field("scrolling_to", &self.scrolling_to)
            .field("anchor_index", &self.anchor_index)
            .field("scroll_offset", &self.scroll_offset)
            .field("viewport", &self.viewport)
            .field("measured", &self.cache.len())
            .field("live_items", &self.items.len())
            .field("pending_frames", &self.scheduler.len())
            .finish_non_exhaustive()
    }
}
