//! Amortized row scheduler
//!
//! Ticking every tile every frame is too expensive to hold a steady frame
//! budget, so each scheduling step ticks only a few tile rows and a full sweep
//! is spread over several steps. The cursor is a plain round-robin and never
//! looks at tile content.

use serde::{Deserialize, Serialize};

/// Round-robin cursor over `rows` tile rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowScheduler {
    rows: usize,
    rows_per_step: usize,
    next_row: usize,
}

impl RowScheduler {
    /// `rows_per_step` is clamped to `1..=rows` so a step never visits a row twice.
    pub fn new(rows: usize, rows_per_step: usize) -> Self {
        debug_assert!(rows > 0);
        Self {
            rows,
            rows_per_step: rows_per_step.clamp(1, rows.max(1)),
            next_row: 0,
        }
    }

    pub fn next_row(&self) -> usize {
        self.next_row
    }

    pub fn rows_per_step(&self) -> usize {
        self.rows_per_step
    }

    /// Steps needed to visit every row once: `ceil(rows / rows_per_step)`
    pub fn sweep_len(&self) -> usize {
        self.rows.div_ceil(self.rows_per_step)
    }

    /// Rows for the next step, in visiting order, and advance the cursor.
    pub fn advance(&mut self) -> impl Iterator<Item = usize> {
        let (start, rows) = (self.next_row, self.rows);
        self.next_row = (self.next_row + self.rows_per_step) % self.rows;
        (0..self.rows_per_step).map(move |k| (start + k) % rows)
    }

    /// Rewind to row zero
    pub fn reset(&mut self) {
        self.next_row = 0;
    }
}
