//! Hit-miss edge smoothing for 1-bit images
//!
//! A pattern is a small grid of cells, each one a constraint on the pixel
//! below it and optionally a replacement:
//!
//! | char | must be | becomes |
//! |------|---------|---------|
//! | `X`  | black   |         |
//! | ` `  | white   |         |
//! | `-`  | black   | white   |
//! | `+`  | white   | black   |
//! | `?`  | anything|         |
//!
//! Every pattern is tried in its four orthogonal orientations. Each
//! orientation pass matches against a snapshot of the image taken before
//! the pass, so replacements made during a pass never feed later matches
//! of the same pass. Pixels outside the image are white, and a pattern may
//! hang over the border.

use crate::error::{MorphError, MorphResult};
use scanraster_core::{PixelFormat, RasterBuffer};

/// Smoothing patterns, applied in order.
///
/// Small black bumps are removed first, then notches are filled.
const SMOOTHING_PATTERNS: [&[&str]; 6] = [
    // one-pixel bump on a straight edge
    &["XXX", " - ", "   "],
    // two-pixel bump
    &["X ?", "X  ", "X- ", "X- ", "X  ", "X ?"],
    // three-pixel bump
    &["X ?", "X ?", "X  ", "X- ", "X- ", "X- ", "X  ", "X ?", "X ?"],
    // three-pixel notch
    &["XX?", "XX?", "XX ", "X+ ", "X+ ", "X+ ", "XX ", "XX?", "XX?"],
    // two-pixel notch
    &["XX?", "XX ", "X+ ", "X+ ", "XX ", "XX?"],
    // one-pixel notch
    &["   ", "X+X", "XXX"],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Any,
    Black,
    White,
    /// Black pixel turned white
    Erase,
    /// White pixel turned black
    Fill,
}

impl Cell {
    fn from_char(c: char) -> Self {
        match c {
            'X' => Cell::Black,
            ' ' => Cell::White,
            '-' => Cell::Erase,
            '+' => Cell::Fill,
            _ => Cell::Any,
        }
    }

    #[inline]
    fn accepts(self, black: bool) -> bool {
        match self {
            Cell::Any => true,
            Cell::Black | Cell::Erase => black,
            Cell::White | Cell::Fill => !black,
        }
    }
}

/// A hit-miss pattern with replacement cells
#[derive(Debug, Clone)]
struct HitMissPattern {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl HitMissPattern {
    /// Build a pattern from equal-length rows
    fn from_rows(rows: &[&str]) -> Self {
        let width = rows.first().map_or(0, |r| r.chars().count());
        let cells = rows
            .iter()
            .flat_map(|row| {
                row.chars()
                    .chain(std::iter::repeat('?'))
                    .take(width)
                    .map(Cell::from_char)
            })
            .collect();
        Self {
            width,
            height: rows.len(),
            cells,
        }
    }

    /// The pattern rotated 90 degrees clockwise
    fn rotate_cw(&self) -> Self {
        let (w, h) = (self.height, self.width);
        let mut cells = vec![Cell::Any; w * h];
        for y in 0..self.height {
            for x in 0..self.width {
                let nx = self.height - 1 - y;
                let ny = x;
                cells[ny * w + nx] = self.cells[y * self.width + x];
            }
        }
        Self {
            width: w,
            height: h,
            cells,
        }
    }

    /// Does the pattern match with its top-left cell at `(ax, ay)`?
    fn matches(&self, src: &[u32], w: i64, h: i64, ax: i64, ay: i64) -> bool {
        self.cells.iter().enumerate().all(|(i, &cell)| {
            if cell == Cell::Any {
                return true;
            }
            let x = ax + (i % self.width) as i64;
            let y = ay + (i / self.width) as i64;
            let black = x >= 0 && y >= 0 && x < w && y < h && src[(y * w + x) as usize] != 0;
            cell.accepts(black)
        })
    }

    /// Apply one orientation of the pattern everywhere it matches.
    ///
    /// Returns the number of pixels changed.
    fn replace_in_place(&self, data: &mut [u32], width: u32, height: u32) -> usize {
        let (w, h) = (width as i64, height as i64);
        let snapshot = data.to_vec();
        let mut changed = 0;

        for ay in -(self.height as i64 - 1)..h {
            for ax in -(self.width as i64 - 1)..w {
                if !self.matches(&snapshot, w, h, ax, ay) {
                    continue;
                }
                for (i, &cell) in self.cells.iter().enumerate() {
                    let value = match cell {
                        Cell::Erase => 0,
                        Cell::Fill => 1,
                        _ => continue,
                    };
                    let x = ax + (i % self.width) as i64;
                    let y = ay + (i / self.width) as i64;
                    if x >= 0 && y >= 0 && x < w && y < h {
                        let px = &mut data[(y * w + x) as usize];
                        if *px != value {
                            *px = value;
                            changed += 1;
                        }
                    }
                }
            }
        }
        changed
    }
}

/// Remove small bumps and fill small notches along the edges of a
/// binarized image.
///
/// # Errors
///
/// Returns [`MorphError::UnsupportedFormat`] unless the image is 1-bit.
pub fn smooth_edges(image: &RasterBuffer) -> MorphResult<RasterBuffer> {
    if image.format() != PixelFormat::Bit1 {
        return Err(MorphError::UnsupportedFormat {
            expected: "1-bit",
            actual: image.format().name(),
        });
    }

    let (width, height) = (image.width(), image.height());
    let mut out = image.to_mut();
    let data = out.data_mut();
    let mut changed = 0;

    for rows in SMOOTHING_PATTERNS {
        let mut pattern = HitMissPattern::from_rows(rows);
        for _ in 0..4 {
            changed += pattern.replace_in_place(data, width, height);
            pattern = pattern.rotate_cw();
        }
    }

    tracing::debug!(width, height, changed, "edges smoothed");
    Ok(out.into())
}
