use crate::error::Result;
use crate::options::SizePolicy;
use crate::types::{Measurement, Rect};

/// Per-index start/size/end records along the active axis.
///
/// Size corrections are cheap: [`MeasurementCache::invalidate_from`] only lowers a watermark and
/// the O(n) recompute of downstream offsets is paid once by the next
/// [`MeasurementCache::flush`], however many indexes were invalidated in between. Every read
/// that depends on absolute offsets must be preceded by a flush.
#[derive(Clone, Debug)]
pub struct MeasurementCache {
    measurements: Vec<Measurement>,
    remeasure_index: Option<usize>,
}

impl Default for MeasurementCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementCache {
    /// An empty cache, stale from index 0.
    pub fn new() -> Self {
        Self {
            measurements: Vec::new(),
            remeasure_index: Some(0),
        }
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Measurement> {
        self.measurements.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn remeasure_index(&self) -> Option<usize> {
        self.remeasure_index
    }

    pub fn is_stale(&self) -> bool {
        self.remeasure_index.is_some()
    }

    /// End of the last cached item, or 0 when empty.
    pub fn content_size(&self) -> f64 {
        self.measurements.last().map_or(0.0, |m| m.end)
    }

    /// The cached size at `index`, or the policy's estimate when nothing is cached yet.
    pub fn estimate(&self, index: usize, policy: &SizePolicy, viewport: Rect) -> Result<f64> {
        match self.measurements.get(index) {
            Some(m) => Ok(m.size),
            None => policy.resolve(index, viewport),
        }
    }

    /// Writes `index` right after the current end of `index - 1`.
    ///
    /// Other records are left untouched, so later offsets may go stale; pair with
    /// [`Self::invalidate_from`] when `index` is not the last record.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()` (records are dense).
    pub fn set(&mut self, index: usize, size: f64) {
        let start = match index {
            0 => 0.0,
            _ => self.measurements[index - 1].end,
        };
        let m = Measurement::new(start, size);
        if index == self.measurements.len() {
            self.measurements.push(m);
        } else {
            self.measurements[index] = m;
        }
    }

    pub fn invalidate_from(&mut self, index: usize) {
        self.remeasure_index = Some(match self.remeasure_index {
            Some(current) => current.min(index),
            None => index,
        });
    }

    /// Recomputes every record in `[watermark, upper_bound)` in ascending order and clears the
    /// watermark. A no-op when the cache is clean.
    ///
    /// On error the watermark is kept, so a later flush retries from the same place.
    pub fn flush(&mut self, upper_bound: usize, policy: &SizePolicy, viewport: Rect) -> Result<()> {
        let Some(from) = self.remeasure_index else {
            return Ok(());
        };
        let from = from.min(self.measurements.len());
        vtrace!(from, upper_bound, "MeasurementCache::flush");
        for index in from..upper_bound {
            let size = self.estimate(index, policy, viewport)?;
            self.set(index, size);
        }
        self.measurements.truncate(upper_bound);
        self.remeasure_index = None;
        Ok(())
    }

    pub fn truncate(&mut self, len: usize) {
        self.measurements.truncate(len);
    }

    /// Drops every record (e.g. after the size source changed).
    pub fn clear(&mut self) {
        self.measurements.clear();
        self.remeasure_index = Some(0);
    }

    /// Clamps `offset` into `[0, content_size - viewport_size]`.
    pub fn clamp_offset(&self, viewport_size: f64, offset: f64) -> f64 {
        let max = (self.content_size() - viewport_size).max(0.0);
        offset.min(max).max(0.0)
    }
}
