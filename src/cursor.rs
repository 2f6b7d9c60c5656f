//! Cursor state and cross-thread position sharing.
//!
//! The cursor lives on the input-processing thread and is mutated only
//! through its clamping setter, so its position can never leave the buffer
//! bounds. Readers on other threads (a UI, automation waiting for the
//! cursor to land somewhere) use [`CursorWatch`], a shared snapshot updated
//! on every change with a condition variable for blocking waits.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Cursor position and visibility, confined to `[0,rows) x [0,cols)`.
#[derive(Clone, Debug)]
pub struct Cursor {
    row: u16,
    col: u16,
    rows: u16,
    cols: u16,
    pub visible: bool,
}

impl Cursor {
    pub fn new(rows: u16, cols: u16) -> Self {
        assert!(rows > 0 && cols > 0, "cursor needs a non-empty grid");
        Self {
            row: 0,
            col: 0,
            rows,
            cols,
            visible: true,
        }
    }

    pub fn row(&self) -> u16 {
        self.row
    }

    pub fn col(&self) -> u16 {
        self.col
    }

    /// The only mutation path: clamps into bounds unconditionally.
    pub fn set(&mut self, row: u16, col: u16) {
        self.row = row.min(self.rows - 1);
        self.col = col.min(self.cols - 1);
    }
}

/// A published cursor snapshot: `(row, col, visible)`.
pub type CursorSnapshot = (u16, u16, bool);

struct WatchInner {
    snapshot: Mutex<CursorSnapshot>,
    changed: Condvar,
}

/// Cloneable handle to the cursor snapshot. Reads are synchronized against
/// the writer; `wait_for` blocks until the cursor reaches a coordinate.
#[derive(Clone)]
pub struct CursorWatch {
    inner: Arc<WatchInner>,
}

impl CursorWatch {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(WatchInner {
                snapshot: Mutex::new((0, 0, true)),
                changed: Condvar::new(),
            }),
        }
    }

    /// Current `(row, col, visible)`.
    pub fn position(&self) -> CursorSnapshot {
        *self.inner.snapshot.lock().expect("cursor watch poisoned")
    }

    /// Publish a new snapshot; wakes all waiters when it changed.
    pub(crate) fn publish(&self, row: u16, col: u16, visible: bool) {
        let mut guard = self.inner.snapshot.lock().expect("cursor watch poisoned");
        if *guard != (row, col, visible) {
            *guard = (row, col, visible);
            self.inner.changed.notify_all();
        }
    }

    /// Block until the cursor sits at `(row, col)` or the timeout elapses.
    /// Returns `true` if the position was reached.
    pub fn wait_for(&self, row: u16, col: u16, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.inner.snapshot.lock().expect("cursor watch poisoned");
        loop {
            if guard.0 == row && guard.1 == col {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (g, timed_out) = self
                .inner
                .changed
                .wait_timeout(guard, deadline - now)
                .expect("cursor watch poisoned");
            guard = g;
            if timed_out.timed_out() && !(guard.0 == row && guard.1 == col) {
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn setter_clamps_into_bounds() {
        let mut cursor = Cursor::new(24, 80);
        cursor.set(100, 200);
        assert_eq!((cursor.row(), cursor.col()), (23, 79));

        cursor.set(5, 10);
        assert_eq!((cursor.row(), cursor.col()), (5, 10));
    }

    #[test]
    fn watch_reports_published_position() {
        let watch = CursorWatch::new();
        watch.publish(3, 7, false);
        assert_eq!(watch.position(), (3, 7, false));
    }

    #[test]
    fn wait_for_times_out_when_never_reached() {
        let watch = CursorWatch::new();
        assert!(!watch.wait_for(9, 9, Duration::from_millis(20)));
    }

    #[test]
    fn wait_for_wakes_on_publish() {
        let watch = CursorWatch::new();
        let reader = watch.clone();
        let handle = thread::spawn(move || reader.wait_for(4, 2, Duration::from_secs(5)));

        // Give the waiter a moment to block, then move the cursor there.
        thread::sleep(Duration::from_millis(10));
        watch.publish(4, 2, true);

        assert!(handle.join().unwrap());
    }
}
