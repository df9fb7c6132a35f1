use std::mem;

/// A cancellation handle for a task queued on a [`FrameScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: FrameHandle,
    frames_left: u32,
    task: T,
}

/// Queues tasks to run a number of frames from now.
///
/// The scheduler has no notion of real time: whoever owns it calls [`FrameScheduler::advance`]
/// once per frame and runs whatever comes back. Tasks queued while handling a frame are due no
/// earlier than the next one.
#[derive(Debug)]
pub struct FrameScheduler<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Queues `task` to become due after `frames` frames (at least one).
    pub fn request(&mut self, frames: u32, task: T) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.push(Pending {
            handle,
            frames_left: frames.max(1),
            task,
        });
        handle
    }

    /// Removes a queued task. Returns it if it had not fired yet.
    pub fn cancel(&mut self, handle: FrameHandle) -> Option<T> {
        let pos = self.pending.iter().position(|p| p.handle == handle)?;
        Some(self.pending.remove(pos).task)
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every queued task. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    /// Advances one frame and returns the tasks that became due, in request order.
    pub fn advance(&mut self) -> Vec<(FrameHandle, T)> {
        for p in &mut self.pending {
            p.frames_left -= 1;
        }
        let (due, waiting): (Vec<_>, Vec<_>) = mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.frames_left == 0);
        self.pending = waiting;
        due.into_iter().map(|p| (p.handle, p.task)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_fire_after_requested_frames() {
        let mut s = FrameScheduler::new();
        s.request(2, "b");
        s.request(1, "a");
        assert_eq!(
            s.advance().into_iter().map(|(_, t)| t).collect::<Vec<_>>(),
            vec!["a"]
        );
        assert_eq!(
            s.advance().into_iter().map(|(_, t)| t).collect::<Vec<_>>(),
            vec!["b"]
        );
        assert!(s.advance().is_empty());
    }

    #[test]
    fn zero_frames_means_next_frame() {
        let mut s = FrameScheduler::new();
        let h = s.request(0, ());
        assert!(s.is_pending(h));
        assert_eq!(s.advance().len(), 1);
        assert!(!s.is_pending(h));
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut s = FrameScheduler::new();
        let h = s.request(3, 7);
        assert_eq!(s.cancel(h), Some(7));
        assert_eq!(s.cancel(h), None);
        for _ in 0..4 {
            assert!(s.advance().is_empty());
        }
    }

    #[test]
    fn clear_drops_everything() {
        let mut s = FrameScheduler::new();
        s.request(1, 1);
        s.request(6, 2);
        assert_eq!(s.clear(), 2);
        assert!(s.is_empty());
    }
}
