/// The codebox: an immutable, possibly ragged table of cells.
///
/// One `char` (Unicode scalar value) is one cell, so a multi-byte UTF-8
/// character occupies a single cell. Rows are split on `\n` and a trailing
/// `\r` is dropped. Cells past the end of a stored row read as a space.
/// An empty source still yields a 1x1 grid so that wraparound is defined.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<Vec<char>>,
    width: usize,
    height: usize,
}

/// Returned for every cell that is not stored.
pub const BLANK: char = ' ';

impl Grid {
    pub fn new(source: &str) -> Self {
        let mut rows: Vec<Vec<char>> = source
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).chars().collect())
            .collect();
        // A trailing newline does not start a new row.
        if rows.len() > 1 && rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let height = rows.len().max(1);
        Self { rows, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Never fails: anything outside the stored rows reads as `BLANK`.
    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.stored(x, y).unwrap_or(BLANK)
    }

    /// The cell at `(x, y)` only if the source actually wrote one there.
    pub fn stored(&self, x: usize, y: usize) -> Option<char> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Wrap a signed coordinate pair onto the torus.
    pub fn wrap(&self, x: i64, y: i64) -> (usize, usize) {
        (
            x.rem_euclid(self.width as i64) as usize,
            y.rem_euclid(self.height as i64) as usize,
        )
    }
}
