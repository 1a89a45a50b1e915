//! Connected component labeling
//!
//! Two-pass labeling with a union-find (disjoint set) table:
//!
//! 1. Raster scan; each set pixel takes the smallest provisional label of
//!    its already-visited neighbors and records equivalences between them.
//! 2. Resolve every provisional label to its root and renumber roots in
//!    order of first appearance.
//!
//! Components are therefore numbered `1..=n` in raster order of their
//! first pixel. Label 0 means "not part of any component".

use crate::error::{RegionError, RegionResult};
use scanraster_core::{ConnectivityType, Mask, PixelFormat, RasterBuffer, Rect};

/// Disjoint set over provisional labels
struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new() -> Self {
        // index 0 is the background label
        Self { parent: vec![0] }
    }

    fn make_set(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        label
    }

    fn find(&mut self, mut x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Path compression
        while self.parent[x as usize] != root {
            let next = self.parent[x as usize];
            self.parent[x as usize] = root;
            x = next;
        }
        root
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Keep the smaller label as root so roots follow raster order
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi as usize] = lo;
        }
    }
}

/// A connected component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedComponent {
    /// Label in `1..=n`
    pub label: u32,
    /// Number of pixels in this component
    pub pixel_count: u32,
    /// Bounding box of this component
    pub bounds: Rect,
}

/// Label image plus per-component summaries
#[derive(Debug, Clone)]
pub struct Labeling {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    components: Vec<ConnectedComponent>,
}

impl Labeling {
    /// Image width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Label at (x, y); 0 outside any component or outside the image
    pub fn label_at(&self, x: u32, y: u32) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Row-major label image
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Components ordered by label
    pub fn components(&self) -> &[ConnectedComponent] {
        &self.components
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if there are no components
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Label the set pixels of a mask
pub fn label_mask(mask: &Mask, connectivity: ConnectivityType) -> Labeling {
    let w = mask.width() as i32;
    let h = mask.height() as i32;
    let bits = mask.bits();
    let mut provisional = vec![0u32; bits.len()];
    let mut uf = UnionFind::new();
    let offsets = connectivity.causal_offsets();

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if !bits[idx] {
                continue;
            }
            let mut current = 0u32;
            for &(dx, dy) in offsets {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= w {
                    continue;
                }
                let n = provisional[(ny * w + nx) as usize];
                if n == 0 {
                    continue;
                }
                if current == 0 {
                    current = n;
                } else if n != current {
                    uf.union(current, n);
                }
            }
            provisional[idx] = if current == 0 { uf.make_set() } else { current };
        }
    }

    // Resolve roots and renumber in first-appearance order
    let mut final_label = vec![0u32; uf.parent.len()];
    let mut components: Vec<ConnectedComponent> = Vec::new();
    let mut labels = vec![0u32; bits.len()];

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            let p = provisional[idx];
            if p == 0 {
                continue;
            }
            let root = uf.find(p) as usize;
            if final_label[root] == 0 {
                components.push(ConnectedComponent {
                    label: components.len() as u32 + 1,
                    pixel_count: 0,
                    bounds: Rect::new_unchecked(x, y, 1, 1),
                });
                final_label[root] = components.len() as u32;
            }
            let label = final_label[root];
            labels[idx] = label;

            let comp = &mut components[label as usize - 1];
            comp.pixel_count += 1;
            comp.bounds = comp.bounds.union(&Rect::new_unchecked(x, y, 1, 1));
        }
    }

    Labeling {
        width: mask.width(),
        height: mask.height(),
        labels,
        components,
    }
}

/// Label the black pixels of a 1-bit image
///
/// # Errors
///
/// Returns an error if the image is not 1-bit.
pub fn label_binary(image: &RasterBuffer, connectivity: ConnectivityType) -> RegionResult<Labeling> {
    if image.format() != PixelFormat::Bit1 {
        return Err(RegionError::UnsupportedFormat {
            expected: "1-bit",
            actual: image.format().name(),
        });
    }
    Ok(label_mask(&image.to_mask()?, connectivity))
}
