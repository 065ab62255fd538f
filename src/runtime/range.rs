//! Integer ranges produced by the `range` native.

use std::fmt;

/// A half-open integer range `[start, stop)` walked in steps of `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZrRange {
    start: i64,
    stop: i64,
    step: i64,
}

impl ZrRange {
    /// A range counting up from `start`, or down when `stop < start`.
    pub fn new(start: i64, stop: i64) -> Self {
        let step = if stop < start { -1 } else { 1 };
        Self { start, stop, step }
    }

    /// A range with an explicit step. Returns `None` for a zero step.
    pub fn with_step(start: i64, stop: i64, step: i64) -> Option<Self> {
        (step != 0).then_some(Self { start, stop, step })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn stop(&self) -> i64 {
        self.stop
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Number of values the range yields, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        let (start, stop) = (i128::from(self.start), i128::from(self.stop));
        let span = if self.step > 0 { stop - start } else { start - stop };
        if span <= 0 {
            return 0;
        }
        let count = (span as u128).div_ceil(u128::from(self.step.unsigned_abs()));
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A fresh cursor from the start of the range.
    pub fn iter(&self) -> ZrRangeIter {
        ZrRangeIter {
            range: *self,
            current: self.start,
        }
    }
}

impl fmt::Display for ZrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == 1 || (self.step == -1 && self.stop < self.start) {
            write!(f, "range({}, {})", self.start, self.stop)
        } else {
            write!(f, "range({}, {}, {})", self.start, self.stop, self.step)
        }
    }
}

impl IntoIterator for &ZrRange {
    type Item = i64;
    type IntoIter = ZrRangeIter;

    fn into_iter(self) -> ZrRangeIter {
        self.iter()
    }
}

/// Cursor over a [`ZrRange`].
#[derive(Debug, Clone)]
pub struct ZrRangeIter {
    range: ZrRange,
    current: i64,
}

impl ZrRangeIter {
    pub fn has_next(&self) -> bool {
        if self.range.step > 0 {
            self.current < self.range.stop
        } else {
            self.current > self.range.stop
        }
    }
}

impl Iterator for ZrRangeIter {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if !self.has_next() {
            return None;
        }
        let value = self.current;
        self.current = self.current.saturating_add(self.range.step);
        Some(value)
    }
}
