use bitflags::bitflags;

use crate::options::Options;
use crate::types::{IndexRange, Rect};

bitflags! {
    /// Which notifications an update pass may fire.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Events: u8 {
        const RESIZE    = 1 << 0;
        const SCROLL    = 1 << 1;
        const REACH_END = 1 << 2;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResizeEvent {
    pub width: f64,
    pub height: f64,
    /// Strictly visible indexes.
    pub visible: IndexRange,
    /// Rendered indexes (visible plus overscan).
    pub items: IndexRange,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollEvent {
    pub offset: f64,
    /// `offset` minus the offset of the previous scroll signal.
    pub delta: f64,
    pub visible: IndexRange,
    pub items: IndexRange,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReachEndEvent {
    /// The last index of the list (0 for an empty list).
    pub index: usize,
    pub offset: f64,
    pub visible: IndexRange,
    pub items: IndexRange,
}

/// The outcome of one range resolution, as far as event sinks are concerned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Resolved {
    Empty,
    Range {
        visible: IndexRange,
        items: IndexRange,
        offset: f64,
        delta: f64,
        content_size: f64,
        max_index: usize,
    },
}

/// Forwards the notifications enabled by `events` to the sinks configured in `options`.
pub(crate) fn emit(
    options: &Options,
    events: Events,
    viewport: Rect,
    viewport_size: f64,
    resolved: Resolved,
) {
    match resolved {
        Resolved::Empty => {
            let none = IndexRange::default();
            if events.contains(Events::RESIZE) {
                if let Some(f) = &options.on_resize {
                    f(&ResizeEvent {
                        width: viewport.width,
                        height: viewport.height,
                        visible: none,
                        items: none,
                    });
                }
            }
            // Nothing to render but room to render it: the list is at its end.
            if viewport_size > 0.0 && events.contains(Events::REACH_END) {
                if let Some(f) = &options.on_reach_end {
                    f(&ReachEndEvent {
                        index: 0,
                        offset: 0.0,
                        visible: none,
                        items: none,
                    });
                }
            }
        }
        Resolved::Range {
            visible,
            items,
            offset,
            delta,
            content_size,
            max_index,
        } => {
            if events.contains(Events::RESIZE) {
                if let Some(f) = &options.on_resize {
                    f(&ResizeEvent {
                        width: viewport.width,
                        height: viewport.height,
                        visible,
                        items,
                    });
                }
            }
            if events.contains(Events::SCROLL) {
                if let Some(f) = &options.on_scroll {
                    f(&ScrollEvent {
                        offset,
                        delta,
                        visible,
                        items,
                    });
                }
            }
            if events.contains(Events::REACH_END)
                && visible.end == max_index
                && (offset + viewport_size).ceil() >= content_size
            {
                vtrace!(offset, content_size, "reach end");
                if let Some(f) = &options.on_reach_end {
                    f(&ReachEndEvent {
                        index: max_index,
                        offset,
                        visible,
                        items,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    fn recording_options() -> (Options, Arc<Mutex<Vec<&'static str>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));
        let options = Options::new(10, 10.0)
            .with_on_resize(move |_| a.lock().unwrap().push("resize"))
            .with_on_scroll(move |_| b.lock().unwrap().push("scroll"))
            .with_on_reach_end(move |_| c.lock().unwrap().push("end"));
        (options, log)
    }

    fn range(end: usize, offset: f64) -> Resolved {
        Resolved::Range {
            visible: IndexRange::new(0, end),
            items: IndexRange::new(0, end),
            offset,
            delta: 0.0,
            content_size: 100.0,
            max_index: 9,
        }
    }

    #[test]
    fn only_enabled_causes_fire() {
        let (options, log) = recording_options();
        emit(&options, Events::SCROLL, Rect::new(0.0, 50.0), 50.0, range(4, 0.0));
        assert_eq!(*log.lock().unwrap(), vec!["scroll"]);
    }

    #[test]
    fn reach_end_requires_trailing_edge_in_view() {
        let (options, log) = recording_options();
        emit(&options, Events::REACH_END, Rect::new(0.0, 50.0), 50.0, range(4, 0.0));
        assert!(log.lock().unwrap().is_empty());

        emit(&options, Events::REACH_END, Rect::new(0.0, 50.0), 50.0, range(9, 50.0));
        assert_eq!(*log.lock().unwrap(), vec!["end"]);
    }

    #[test]
    fn empty_resolution_reports_zero_intervals() {
        let (options, log) = recording_options();
        emit(&options, Events::all(), Rect::new(0.0, 0.0), 0.0, Resolved::Empty);
        assert_eq!(*log.lock().unwrap(), vec!["resize"]);

        log.lock().unwrap().clear();
        emit(&options, Events::all(), Rect::new(0.0, 30.0), 30.0, Resolved::Empty);
        assert_eq!(*log.lock().unwrap(), vec!["resize", "end"]);
    }
}
