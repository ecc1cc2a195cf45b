//! Runtime-sized 2-D sample grid shared by frames, slit images and filter
//! responses.
//!
//! Storage is row-major and tightly packed (no stride padding): sample
//! `(x, y)` lives at `y * width + x`. Shapes are reported as
//! `(rows, cols)` = `(height, width)`.

use std::fmt;

use stfilter_common::{StfilterError, StfilterResult};

/// Types that can be stored in a [`Plane`].
pub trait Sample: Copy + Default + Send + Sync + PartialOrd + 'static {
    /// Raw value as f32 (not normalized to [0, 1]).
    fn to_f32(self) -> f32;

    /// Construct from an f32, saturating and rounding where needed.
    fn from_f32(v: f32) -> Self;
}

impl Sample for u8 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v.clamp(0.0, 255.0).round_ties_even() as u8
    }
}

impl Sample for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }
}

/// A decoded single-channel video frame.
pub type Frame = Plane<u8>;

/// A 2-D grid of samples with runtime dimensions.
#[derive(Clone, PartialEq)]
pub struct Plane<T: Sample> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Sample> Plane<T> {
    /// Zero-initialized plane.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    /// Plane with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Wrap an existing row-major buffer.
    ///
    /// Fails with a validation error if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> StfilterResult<Self> {
        if data.len() != width * height {
            return Err(StfilterError::validation(format!(
                "plane buffer holds {} samples, expected {width}x{height} = {}",
                data.len(),
                width * height
            )));
        }
        Ok(Self::from_parts(width, height, data))
    }

    /// Build a plane from nested rows. All rows must share one length.
    pub fn from_rows(rows: &[&[T]]) -> StfilterResult<Self> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != width) {
            return Err(StfilterError::validation("rows have unequal lengths"));
        }
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Ok(Self::from_parts(width, rows.len(), data))
    }

    /// Infallible constructor for buffers sized by the caller.
    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            data,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Sample at column `x`, row `y`.
    ///
    /// # Panics
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.bounds_check(x, y);
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.bounds_check(x, y);
        self.data[y * self.width + x] = value;
    }

    /// Borrow row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        // chunks_exact panics on 0; a zero-width plane has no samples anyway.
        self.data.chunks(self.width.max(1)).take(self.height)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Apply `f` to every sample, producing a plane of the same shape.
    pub fn map<U: Sample>(&self, f: impl Fn(T) -> U) -> Plane<U> {
        Plane::from_parts(self.width, self.height, self.data.iter().map(|&v| f(v)).collect())
    }

    /// Smallest and largest sample, or `None` for an empty plane.
    pub fn min_max(&self) -> Option<(T, T)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| {
            (if v < lo { v } else { lo }, if v > hi { v } else { hi })
        }))
    }

    #[inline]
    fn bounds_check(&self, x: usize, y: usize) {
        assert!(
            x < self.width && y < self.height,
            "sample ({x},{y}) out of bounds for plane {}×{}",
            self.width,
            self.height,
        );
    }
}

impl<T: Sample + fmt::Debug> fmt::Debug for Plane<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Plane<{}> {{ {}×{} }}",
            std::any::type_name::<T>(),
            self.width,
            self.height,
        )?;
        for y in 0..self.height.min(8) {
            write!(f, "  row {y}: [")?;
            for x in 0..self.width.min(16) {
                if x > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", self.get(x, y))?;
            }
            if self.width > 16 {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if self.height > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}
