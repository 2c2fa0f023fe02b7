//! Dense, rectangular views of worksheet values

use std::ops::{Index, IndexMut};

use crate::errors::Error;

/// Maximum number of cells of a dense view
pub const MAX_RANGE_CELLS: u64 = 1 << 27;

/// Number of cells between two corners, `start` <= `end`
fn dense_len(start: (u32, u32), end: (u32, u32)) -> Result<usize, Error> {
    let rows = (end.0 - start.0) as u64 + 1;
    let columns = (end.1 - start.1) as u64 + 1;
    match rows.checked_mul(columns) {
        Some(len) if len <= MAX_RANGE_CELLS => Ok(len as usize),
        _ => Err(Error::RangeTooLarge { rows, columns }),
    }
}

/// A trait to constrain cells
pub trait CellType: Default + Clone + PartialEq {}
impl<T: Default + Clone + PartialEq> CellType for T {}

/// A struct which represents a squared selection of cells
///
/// Positions are the worksheet (row, column), both 1 based.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Range<T: CellType> {
    start: (u32, u32),
    end: (u32, u32),
    inner: Vec<T>,
}

impl<T: CellType> Range<T> {
    /// Creates a new `Range` filled with default values
    ///
    /// Fails when the range would hold more than [`MAX_RANGE_CELLS`] cells.
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Result<Range<T>, Error> {
        if start.0 > end.0 || start.1 > end.1 {
            return Ok(Range::empty());
        }
        Ok(Range {
            start,
            end,
            inner: vec![T::default(); dense_len(start, end)?],
        })
    }

    /// Creates an empty `Range`
    pub fn empty() -> Range<T> {
        Range {
            start: (1, 1),
            end: (0, 0),
            inner: Vec::new(),
        }
    }

    /// Get top left cell position (row, column)
    pub fn start(&self) -> Option<(u32, u32)> {
        if self.is_empty() {
            None
        } else {
            Some(self.start)
        }
    }

    /// Get bottom right cell position (row, column)
    pub fn end(&self) -> Option<(u32, u32)> {
        if self.is_empty() {
            None
        } else {
            Some(self.end)
        }
    }

    /// Get column width
    pub fn width(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end.1 - self.start.1 + 1) as usize
        }
    }

    /// Get row height
    pub fn height(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end.0 - self.start.0 + 1) as usize
        }
    }

    /// Get size in (height, width) format
    pub fn get_size(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    /// Is range empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Creates a `Range` from a coo sparse vector of cells
    ///
    /// cells: ((row, column), value) of non empty cells, sorted by row
    pub(crate) fn from_sparse(cells: Vec<((u32, u32), T)>) -> Result<Range<T>, Error> {
        let (row_start, row_end) = match (cells.first(), cells.last()) {
            (Some(first), Some(last)) => (first.0 .0, last.0 .0),
            _ => return Ok(Range::empty()),
        };
        // search bounds
        let mut col_start = u32::MAX;
        let mut col_end = 0;
        for c in cells.iter().map(|c| c.0 .1) {
            col_start = col_start.min(c);
            col_end = col_end.max(c);
        }
        let start = (row_start, col_start);
        let end = (row_end, col_end);
        let width = (col_end - col_start) as usize + 1;
        let mut v = vec![T::default(); dense_len(start, end)?];
        for ((row, col), val) in cells {
            let idx = (row - row_start) as usize * width + (col - col_start) as usize;
            v[idx] = val;
        }
        Ok(Range {
            start,
            end,
            inner: v,
        })
    }

    /// Get cell value from absolute position
    ///
    /// The coordinate format is (row, column). For relative positions, use Index trait
    ///
    /// Returns `None` if the position is out of range bounds
    pub fn get_value(&self, absolute_position: (u32, u32)) -> Option<&T> {
        let (row, col) = absolute_position;
        if self.is_empty()
            || row < self.start.0
            || row > self.end.0
            || col < self.start.1
            || col > self.end.1
        {
            return None;
        }
        let idx = (row - self.start.0) as usize * self.width() + (col - self.start.1) as usize;
        self.inner.get(idx)
    }

    /// Get an iterator over inner rows
    pub fn rows(&self) -> Rows<'_, T> {
        if self.inner.is_empty() {
            Rows { inner: None }
        } else {
            let width = self.width();
            Rows {
                inner: Some(self.inner.chunks(width)),
            }
        }
    }

    /// Get an iterator over used cells only, with positions relative to `start`
    pub fn used_cells(&self) -> UsedCells<'_, T> {
        UsedCells {
            width: self.width(),
            inner: self.inner.iter().enumerate(),
        }
    }
}

impl<T: CellType> Index<usize> for Range<T> {
    type Output = [T];
    fn index(&self, index: usize) -> &[T] {
        let width = self.width();
        &self.inner[index * width..(index + 1) * width]
    }
}

impl<T: CellType> Index<(usize, usize)> for Range<T> {
    type Output = T;
    fn index(&self, index: (usize, usize)) -> &T {
        let width = self.width();
        &self.inner[index.0 * width + index.1]
    }
}

impl<T: CellType> IndexMut<usize> for Range<T> {
    fn index_mut(&mut self, index: usize) -> &mut [T] {
        let width = self.width();
        &mut self.inner[index * width..(index + 1) * width]
    }
}

impl<T: CellType> IndexMut<(usize, usize)> for Range<T> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut T {
        let width = self.width();
        &mut self.inner[index.0 * width + index.1]
    }
}

/// A struct to iterate over used cells
#[derive(Debug)]
pub struct UsedCells<'a, T: CellType> {
    width: usize,
    inner: std::iter::Enumerate<std::slice::Iter<'a, T>>,
}

impl<'a, T: 'a + CellType> Iterator for UsedCells<'a, T> {
    type Item = (usize, usize, &'a T);
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .by_ref()
            .find(|&(_, v)| v != &T::default())
            .map(|(i, v)| {
                let row = i / self.width;
                let col = i % self.width;
                (row, col, v)
            })
    }
}

/// An iterator to read `Range` struct row by row
#[derive(Debug)]
pub struct Rows<'a, T: CellType> {
    inner: Option<std::slice::Chunks<'a, T>>,
}

impl<'a, T: 'a + CellType> Iterator for Rows<'a, T> {
    type Item = &'a [T];
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut().and_then(|c| c.next())
    }
}
