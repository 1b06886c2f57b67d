//! Grid shape and slot arithmetic
//!
//! A grid is (rows, cols); selected slides fill slots in row-major order,
//! top row first, left to right. Slot coordinates are computed against a
//! bottom-left origin page, so row 0 sits at the top of the page.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid dimensions must be at least 1 (got {rows}x{cols})")]
    ZeroDimension { rows: u32, cols: u32 },
}

/// Validated grid dimensions. Construction rejects zero rows or columns,
/// so slot arithmetic can never divide by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    rows: u32,
    cols: u32,
}

/// Placement rectangle for one slot, in page points (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl GridShape {
    pub fn new(rows: u32, cols: u32) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::ZeroDimension { rows, cols });
        }
        Ok(GridShape { rows, cols })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Slots available on one output page.
    pub fn slots_per_page(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// (row, col) for the i-th selection entry (0-based, counted across
    /// the whole selection, not per page).
    pub fn slot_position(&self, index: usize) -> (u32, u32) {
        let within_page = index % self.slots_per_page();
        let row = (within_page / self.cols as usize) as u32;
        let col = (within_page % self.cols as usize) as u32;
        (row, col)
    }

    /// Placement rectangle for the i-th selection entry on a page of the
    /// given size. Slots stretch to fill their cell exactly.
    pub fn slot_rect(&self, index: usize, page_width: f32, page_height: f32) -> SlotRect {
        let (row, col) = self.slot_position(index);
        let width = page_width / self.cols as f32;
        let height = page_height / self.rows as f32;
        SlotRect {
            x: col as f32 * width,
            y: page_height - (row + 1) as f32 * height,
            width,
            height,
        }
    }

    /// Output pages needed for a selection of the given length.
    pub fn page_count_for(&self, selection_len: usize) -> usize {
        selection_len.div_ceil(self.slots_per_page())
    }
}
