/// Row-major 2D pixel buffer
///
/// Used for raw scanner samples (`u16`), calibrated optical density (`f64`)
/// and display intensities (`u8`).
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// Raw decompressed scanner samples
pub type RawImage = PixelGrid<u16>;

/// Calibrated optical density image
pub type DensityImage = PixelGrid<f64>;

/// 8-bit display image
pub type DisplayImage = PixelGrid<u8>;

impl<T> PixelGrid<T> {
    /// Wraps a row-major buffer
    ///
    /// Returns `None` when the buffer length is not `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if width.checked_mul(height) != Some(data.len()) {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major samples
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Sample at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    /// Iterates over rows
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.data.chunks_exact(self.width.max(1))
    }

    /// Applies `f` element-wise, keeping the shape
    pub fn map<U, F>(&self, f: F) -> PixelGrid<U>
    where
        F: Fn(&T) -> U,
    {
        PixelGrid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Applies `f` element-wise in parallel, one task per row
    pub fn par_map<U, F>(&self, f: F) -> PixelGrid<U>
    where
        T: Sync,
        U: Send + Default + Clone,
        F: Fn(&T) -> U + Sync,
    {
        use rayon::prelude::*;

        let mut data = vec![U::default(); self.data.len()];
        let row_len = self.width.max(1);
        data.par_chunks_mut(row_len)
            .zip(self.data.par_chunks(row_len))
            .for_each(|(out, row)| {
                for (o, v) in out.iter_mut().zip(row) {
                    *o = f(v);
                }
            });
        PixelGrid {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

impl<T: Copy + PartialOrd> PixelGrid<T> {
    /// Smallest and largest sample, or `None` for an empty grid
    pub fn min_max(&self) -> Option<(T, T)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| {
            (
                if v < lo { v } else { lo },
                if v > hi { v } else { hi },
            )
        }))
    }
}
