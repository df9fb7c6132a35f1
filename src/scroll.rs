use crate::measurement::MeasurementCache;
use crate::types::{Align, Axis};

/// Frames to wait after the final write of a programmatic scroll before reporting completion,
/// so the consumer's re-render can settle.
pub const COMPLETION_DELAY_FRAMES: u32 = 6;

/// Frames without a new scroll signal after which a user scroll counts as settled.
pub const SCROLL_SETTLE_FRAMES: u32 = 2;

/// The scrollable element the engine observes and scrolls.
///
/// The engine calls [`ScrollTarget::scroll_to`] for every programmatic write (instant scrolls,
/// animation frames, jump compensation) and immediately treats the written offset as the new
/// scroll position. A host that echoes the write back through [`crate::Engine::on_scroll`] is
/// fine: signals reporting the offset the engine already holds are ignored.
pub trait ScrollTarget {
    fn scroll_to(&mut self, axis: Axis, offset: f64);
}

impl<F: FnMut(Axis, f64)> ScrollTarget for F {
    fn scroll_to(&mut self, axis: Axis, offset: f64) {
        self(axis, offset)
    }
}

/// Called once a programmatic scroll has completed and settled.
pub type ScrollCallback = Box<dyn FnOnce() + Send>;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollToOptions {
    pub offset: f64,
    pub smooth: bool,
}

impl ScrollToOptions {
    pub fn smooth(offset: f64) -> Self {
        Self {
            offset,
            smooth: true,
        }
    }
}

impl From<f64> for ScrollToOptions {
    fn from(offset: f64) -> Self {
        Self {
            offset,
            smooth: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollToItemOptions {
    pub index: usize,
    pub align: Align,
    pub smooth: bool,
}

impl ScrollToItemOptions {
    pub fn new(index: usize, align: Align) -> Self {
        Self {
            index,
            align,
            smooth: false,
        }
    }

    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }
}

impl From<usize> for ScrollToItemOptions {
    fn from(index: usize) -> Self {
        Self::new(index, Align::Auto)
    }
}

/// The clamped offset that shows `index` with `align`, given the current offset.
///
/// `cache` must be flushed. Returns `None` when nothing is measured.
pub fn item_offset(
    cache: &MeasurementCache,
    viewport_size: f64,
    current_offset: f64,
    index: usize,
    align: Align,
) -> Option<f64> {
    let max_index = cache.len().checked_sub(1)?;
    let m = cache.get(index.min(max_index))?;

    let target = match align {
        Align::Start => m.start,
        Align::Center => m.start + m.size / 2.0 - viewport_size / 2.0,
        Align::End => m.end - viewport_size,
        Align::Auto => {
            if m.end <= current_offset {
                m.start
            } else if m.start >= current_offset + viewport_size {
                m.end - viewport_size
            } else {
                current_offset
            }
        }
    };

    Some(cache.clamp_offset(viewport_size, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SizePolicy;
    use crate::types::Rect;

    fn cache(count: usize, size: f64) -> MeasurementCache {
        let mut c = MeasurementCache::new();
        c.flush(count, &SizePolicy::Fixed(size), Rect::default())
            .unwrap();
        c
    }

    #[test]
    fn explicit_alignments() {
        let c = cache(1000, 50.0);
        assert_eq!(item_offset(&c, 500.0, 0.0, 500, Align::Start), Some(25_000.0));
        assert_eq!(item_offset(&c, 500.0, 0.0, 500, Align::End), Some(24_550.0));
        assert_eq!(
            item_offset(&c, 500.0, 0.0, 500, Align::Center),
            Some(25_000.0 + 25.0 - 250.0)
        );
    }

    #[test]
    fn auto_keeps_visible_items_in_place() {
        let c = cache(100, 10.0);
        // Viewport [300, 350): item 32 is fully visible, item 29 straddles the top edge.
        assert_eq!(item_offset(&c, 50.0, 300.0, 32, Align::Auto), Some(300.0));
        assert_eq!(item_offset(&c, 50.0, 295.0, 29, Align::Auto), Some(295.0));
        // Above: align start. Below: align end.
        assert_eq!(item_offset(&c, 50.0, 300.0, 10, Align::Auto), Some(100.0));
        assert_eq!(item_offset(&c, 50.0, 300.0, 40, Align::Auto), Some(360.0));
    }

    #[test]
    fn index_and_offset_are_clamped() {
        let c = cache(10, 10.0);
        assert_eq!(item_offset(&c, 30.0, 0.0, 99, Align::Start), Some(70.0));
        assert_eq!(item_offset(&c, 30.0, 0.0, 0, Align::End), Some(0.0));
        assert_eq!(item_offset(&MeasurementCache::new(), 30.0, 0.0, 0, Align::Start), None);
    }
}
