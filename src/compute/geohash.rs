//! Planar geohash: coordinate ↔ cell-code conversion.
//!
//! Unlike the base32 geographic geohash, codes here are plain interleaved
//! integers over a bounded plane. A code of precision `step` splits each axis
//! into `2^step` slices, so it occupies `2 * step` bits.
//!
//! ```rust
//! use zgeo::compute::geohash::{self, Direction};
//!
//! let hash = geohash::encode(8750.0, 10.0, 16).unwrap();
//! let cell = geohash::decode(hash);
//! assert!(cell.x_min <= 8750.0 && 8750.0 < cell.x_max);
//!
//! let lattice = hash.neighbors();
//! assert_eq!(lattice[Direction::Center.index()], hash);
//! ```

use super::bits::{deinterleave64, interleave64, move_x, move_y};
use crate::config::PlaneBounds;
use crate::error::{Result, ZSetError};
use geo::{Point, Rect, coord};
use serde::{Deserialize, Serialize};

/// Number of score bits an aligned geohash occupies.
pub const SCORE_BITS: u32 = 52;

/// An interleaved cell code together with its precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoHashBits {
    bits: u64,
    step: u8,
}

impl GeoHashBits {
    /// Wrap a raw code. Returns `None` if `step` is not in `1..=32` or `bits`
    /// does not fit in `2 * step` bits.
    pub fn new(bits: u64, step: u8) -> Option<Self> {
        if step == 0 || step > GeoPlane::MAX_STEP {
            return None;
        }
        let width = u32::from(step) * 2;
        if width < 64 && bits >> width != 0 {
            return None;
        }
        Some(Self { bits, step })
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    /// The neighboring cell `d` steps along x, without decoding.
    pub fn move_x(self, d: i8) -> Self {
        Self {
            bits: move_x(self.bits, self.step, d),
            step: self.step,
        }
    }

    /// The neighboring cell `d` steps along y, without decoding.
    pub fn move_y(self, d: i8) -> Self {
        Self {
            bits: move_y(self.bits, self.step, d),
            step: self.step,
        }
    }

    /// This cell and its eight neighbors, indexed by [`Direction`].
    ///
    /// ```text
    /// -------------
    /// | 2 | 5 | 8 |
    /// -------------
    /// | 1 | 4 | 7 |
    /// -------------
    /// | 0 | 3 | 6 |
    /// -------------
    /// ```
    pub fn neighbors(self) -> [GeoHashBits; 9] {
        let mut lattice = [self; 9];
        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            lattice[direction.index()] = self.move_x(dx).move_y(dy);
        }
        lattice
    }

    /// Shift the code into the top of the 52-bit score space, so codes of
    /// different precision order the same way their cells do on the curve.
    pub fn align_52bits(&self) -> u64 {
        align_raw(u128::from(self.bits), self.step)
    }

    /// Inclusive score range covered by this cell: from the aligned code to
    /// the aligned code of the next cell on the curve.
    pub fn score_range(&self) -> (i64, i64) {
        let min = align_raw(u128::from(self.bits), self.step);
        let max = align_raw(u128::from(self.bits) + 1, self.step);
        (min as i64, max as i64)
    }
}

fn align_raw(bits: u128, step: u8) -> u64 {
    let width = u32::from(step) * 2;
    if width <= SCORE_BITS {
        (bits << (SCORE_BITS - width)) as u64
    } else {
        (bits >> (width - SCORE_BITS)) as u64
    }
}

/// Position of a cell inside a 3×3 neighbor lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    SouthWest = 0,
    West = 1,
    NorthWest = 2,
    South = 3,
    Center = 4,
    North = 5,
    SouthEast = 6,
    East = 7,
    NorthEast = 8,
}

impl Direction {
    /// Lattice order: SW, W, NW, S, CENTER, N, SE, E, NE.
    pub const ALL: [Direction; 9] = [
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::South,
        Direction::Center,
        Direction::North,
        Direction::SouthEast,
        Direction::East,
        Direction::NorthEast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// `(dx, dy)` of this position relative to the center.
    pub fn offset(self) -> (i8, i8) {
        let i = self as i8;
        (i / 3 - 1, i % 3 - 1)
    }
}

/// The decoded extent of a cell. Cells are half-open: `[min, max)` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl CellBox {
    pub fn center(&self) -> Point<f64> {
        Point::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Half-open containment test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.x_min..self.x_max).contains(&x) && (self.y_min..self.y_max).contains(&y)
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.x_min, y: self.y_min },
            coord! { x: self.x_max, y: self.y_max },
        )
    }
}

/// Geohash parameters for one plane.
///
/// | step | cell edge on the default plane |
/// |------|--------------------------------|
/// | 1    | 10000                          |
/// | 4    | 1250                           |
/// | 8    | 78.125                         |
/// | 12   | 4.8828125                      |
/// | 16   | 0.30517578125                  |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPlane {
    pub bounds: PlaneBounds,
    /// Precision used for element scores and for zero-radius queries
    pub step_max: u8,
    /// Radius at which radius estimation stops refining
    pub reference_radius: f64,
}

impl GeoPlane {
    /// Highest precision a code can carry (32 bits per axis).
    pub const MAX_STEP: u8 = 32;

    /// Highest precision whose aligned code still fits the score space.
    pub const MAX_SCORE_STEP: u8 = 26;

    pub const DEFAULT: GeoPlane = GeoPlane {
        bounds: PlaneBounds::DEFAULT,
        step_max: 16,
        reference_radius: 10000.0,
    };

    pub fn new(bounds: PlaneBounds, step_max: u8, reference_radius: f64) -> Result<Self> {
        if !(1..=Self::MAX_SCORE_STEP).contains(&step_max) {
            return Err(ZSetError::InvalidStep(step_max));
        }
        if !reference_radius.is_finite() || reference_radius <= 0.0 {
            return Err(ZSetError::InvalidInput(format!(
                "Reference radius must be positive, got {}",
                reference_radius
            )));
        }
        let bounds = PlaneBounds::new(bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max)?;
        Ok(Self {
            bounds,
            step_max,
            reference_radius,
        })
    }

    /// Encode `(x, y)` at precision `step`.
    ///
    /// Returns `None` if `step` is not in `1..=32` or the point lies outside
    /// the plane. A coordinate on the upper plane edge falls in the last cell.
    pub fn encode(&self, x: f64, y: f64, step: u8) -> Option<GeoHashBits> {
        if step == 0 || step > Self::MAX_STEP {
            return None;
        }
        if !self.bounds.contains(x, y) {
            return None;
        }

        let x_offset = (x - self.bounds.x_min) / self.bounds.width();
        let y_offset = (y - self.bounds.y_min) / self.bounds.height();

        let cells = 1u64 << step;
        let last = cells - 1;
        let xlo = ((x_offset * cells as f64) as u64).min(last) as u32;
        let ylo = ((y_offset * cells as f64) as u64).min(last) as u32;

        Some(GeoHashBits {
            bits: interleave64(xlo, ylo),
            step,
        })
    }

    /// Decode a cell code into the box it covers.
    pub fn decode(&self, hash: GeoHashBits) -> CellBox {
        let (ix, iy) = deinterleave64(hash.bits);
        let cells = (1u64 << hash.step) as f64;
        let x_scale = self.bounds.width();
        let y_scale = self.bounds.height();

        CellBox {
            x_min: self.bounds.x_min + (f64::from(ix) / cells) * x_scale,
            x_max: self.bounds.x_min + ((f64::from(ix) + 1.0) / cells) * x_scale,
            y_min: self.bounds.y_min + (f64::from(iy) / cells) * y_scale,
            y_max: self.bounds.y_min + ((f64::from(iy) + 1.0) / cells) * y_scale,
        }
    }

    /// Pick the coarsest precision whose cells are not smaller than `radius`.
    ///
    /// A zero radius asks for the finest precision. Every non-zero radius
    /// gets at least one bit per axis.
    pub fn estimate_steps_by_radius(&self, radius: f64) -> u8 {
        if radius == 0.0 {
            return self.step_max;
        }

        let mut range = radius;
        let mut step = 0;
        while range < self.reference_radius && step < self.step_max {
            range *= 2.0;
            step += 1;
        }

        step.max(1)
    }

    /// Score of a point: its code at full precision, aligned to 52 bits.
    pub fn calc_score(&self, x: f64, y: f64) -> Option<i64> {
        self.encode(x, y, self.step_max)
            .map(|hash| hash.align_52bits() as i64)
    }
}

impl Default for GeoPlane {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// [`GeoPlane::encode`] on the default plane.
pub fn encode(x: f64, y: f64, step: u8) -> Option<GeoHashBits> {
    GeoPlane::DEFAULT.encode(x, y, step)
}

/// [`GeoPlane::decode`] on the default plane.
pub fn decode(hash: GeoHashBits) -> CellBox {
    GeoPlane::DEFAULT.decode(hash)
}

/// [`GeoPlane::estimate_steps_by_radius`] on the default plane.
pub fn estimate_steps_by_radius(radius: f64) -> u8 {
    GeoPlane::DEFAULT.estimate_steps_by_radius(radius)
}

/// [`GeoPlane::calc_score`] on the default plane.
pub fn calc_score(x: f64, y: f64) -> Option<i64> {
    GeoPlane::DEFAULT.calc_score(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<(f64, f64)> {
        let mut points = Vec::new();
        let mut v = -10000.0;
        while v <= 10000.0 {
            points.push(v);
            v += 1234.5;
        }
        points.extend([-10000.0, -0.001, 0.0, 0.3, 9999.999, 10000.0]);

        let mut out = Vec::new();
        for &x in &points {
            for &y in &points {
                out.push((x, y));
            }
        }
        out
    }

    #[test]
    fn test_encode_rejects_invalid_input() {
        assert!(encode(0.0, 0.0, 0).is_none());
        assert!(encode(0.0, 0.0, 33).is_none());
        assert!(encode(10000.1, 0.0, 16).is_none());
        assert!(encode(0.0, -10000.1, 16).is_none());
        assert!(encode(f64::NAN, 0.0, 16).is_none());
        assert!(encode(0.0, f64::INFINITY, 16).is_none());
        assert!(encode(0.0, 0.0, 32).is_some());
    }

    #[test]
    fn test_encode_known_values() {
        // Origin is the first cell of the upper half on both axes.
        let hash = encode(0.0, 0.0, 1).unwrap();
        assert_eq!(hash.bits(), 0b11);

        let hash = encode(-10000.0, -10000.0, 16).unwrap();
        assert_eq!(hash.bits(), 0);

        let hash = encode(10000.0, 10000.0, 16).unwrap();
        assert_eq!(hash.bits(), u64::from(u32::MAX));

        let hash = encode(9999.0, -10000.0, 2).unwrap();
        assert_eq!(hash.bits(), 0b0101);
    }

    #[test]
    fn test_decode_roundtrip_contains_point() {
        for step in [1u8, 8, 16] {
            for (x, y) in grid() {
                let hash = encode(x, y, step).unwrap();
                let cell = decode(hash);
                assert!(
                    cell.x_min <= x && x <= cell.x_max,
                    "x {} outside [{}, {}] at step {}",
                    x,
                    cell.x_min,
                    cell.x_max,
                    step
                );
                assert!(
                    cell.y_min <= y && y <= cell.y_max,
                    "y {} outside [{}, {}] at step {}",
                    y,
                    cell.y_min,
                    cell.y_max,
                    step
                );
                // Only the upper plane edge may land on a cell's max side.
                if x < 10000.0 && y < 10000.0 {
                    assert!(cell.contains(x, y));
                }
            }
        }
    }

    #[test]
    fn test_decode_cell_size() {
        let cell = decode(encode(0.0, 0.0, 16).unwrap());
        assert!((cell.width() - 0.30517578125).abs() < 1e-9);
        assert!((cell.height() - 0.30517578125).abs() < 1e-9);
        assert_eq!(cell.x_min, 0.0);
        assert_eq!(cell.y_min, 0.0);
    }

    #[test]
    fn test_neighbor_cells_share_edges() {
        for step in [2u8, 8, 16] {
            for (x, y) in grid() {
                let hash = encode(x, y, step).unwrap();
                let cell = decode(hash);

                if cell.x_max < 10000.0 {
                    let east = decode(hash.move_x(1));
                    assert_eq!(east.x_min, cell.x_max);
                    assert_eq!(east.y_min, cell.y_min);
                }
                if cell.x_min > -10000.0 {
                    let west = decode(hash.move_x(-1));
                    assert_eq!(west.x_max, cell.x_min);
                }
                if cell.y_max < 10000.0 {
                    let north = decode(hash.move_y(1));
                    assert_eq!(north.y_min, cell.y_max);
                    assert_eq!(north.x_min, cell.x_min);
                }
                if cell.y_min > -10000.0 {
                    let south = decode(hash.move_y(-1));
                    assert_eq!(south.y_max, cell.y_min);
                }
            }
        }
    }

    #[test]
    fn test_neighbors_order() {
        let hash = encode(100.0, 100.0, 8).unwrap();
        let lattice = hash.neighbors();
        let cell = decode(hash);
        let w = cell.width();

        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            let neighbor = decode(lattice[direction.index()]);
            assert!((neighbor.x_min - (cell.x_min + f64::from(dx) * w)).abs() < 1e-9);
            assert!((neighbor.y_min - (cell.y_min + f64::from(dy) * w)).abs() < 1e-9);
        }
        assert_eq!(lattice[Direction::Center.index()], hash);
        assert_eq!(Direction::SouthWest.offset(), (-1, -1));
        assert_eq!(Direction::North.offset(), (0, 1));
        assert_eq!(Direction::East.offset(), (1, 0));
    }

    #[test]
    fn test_estimate_steps_by_radius() {
        assert_eq!(estimate_steps_by_radius(0.0), 16);
        assert_eq!(estimate_steps_by_radius(10000.0), 1);
        assert_eq!(estimate_steps_by_radius(50000.0), 1);
        assert_eq!(estimate_steps_by_radius(5000.0), 1);
        assert_eq!(estimate_steps_by_radius(4999.0), 2);
        assert_eq!(estimate_steps_by_radius(1.0), 14);
        assert_eq!(estimate_steps_by_radius(0.001), 16);
    }

    #[test]
    fn test_estimated_cells_not_smaller_than_radius() {
        for radius in [0.5, 3.0, 17.0, 250.0, 1200.0, 4000.0] {
            let step = estimate_steps_by_radius(radius);
            let cell = decode(encode(0.0, 0.0, step).unwrap());
            assert!(cell.width() >= radius, "radius {} step {}", radius, step);
        }
    }

    #[test]
    fn test_align_and_score_range() {
        let hash = GeoHashBits::new(0b1011, 2).unwrap();
        assert_eq!(hash.align_52bits(), 0b1011 << 48);

        let (min, max) = hash.score_range();
        assert_eq!(min, 0b1011 << 48);
        assert_eq!(max, 0b1100 << 48);

        // The last cell ends exactly at the top of the score space.
        let last = GeoHashBits::new(0xF, 2).unwrap();
        assert_eq!(last.score_range().1, 1i64 << 52);
    }

    #[test]
    fn test_aligned_codes_nest_across_precisions() {
        let fine = encode(1234.0, -4321.0, 16).unwrap();
        let fine_score = fine.align_52bits() as i64;
        for step in 1..16 {
            let coarse = encode(1234.0, -4321.0, step).unwrap();
            let (min, max) = coarse.score_range();
            assert!(min <= fine_score && fine_score < max, "step {}", step);
        }
    }

    #[test]
    fn test_align_above_score_precision() {
        let hash = GeoHashBits::new(u64::MAX, 32).unwrap();
        assert_eq!(hash.align_52bits(), (1u64 << 52) - 1);
        assert_eq!(hash.score_range().1, 1i64 << 52);
    }

    #[test]
    fn test_geohash_bits_new_validates() {
        assert!(GeoHashBits::new(0, 0).is_none());
        assert!(GeoHashBits::new(0, 33).is_none());
        assert!(GeoHashBits::new(0b10000, 2).is_none());
        assert!(GeoHashBits::new(0b1111, 2).is_some());
        assert!(GeoHashBits::new(u64::MAX, 32).is_some());
    }

    #[test]
    fn test_calc_score() {
        let score = calc_score(0.0, 0.0).unwrap();
        let hash = encode(0.0, 0.0, 16).unwrap();
        assert_eq!(score, (hash.bits() << 20) as i64);
        assert!(calc_score(20000.0, 0.0).is_none());
    }

    #[test]
    fn test_custom_plane() {
        let plane = GeoPlane::new(PlaneBounds::new(0.0, 100.0, 0.0, 50.0).unwrap(), 8, 50.0)
            .unwrap();
        let hash = plane.encode(99.0, 49.0, 8).unwrap();
        let cell = plane.decode(hash);
        assert!(cell.contains(99.0, 49.0));
        assert!(plane.encode(-1.0, 0.0, 8).is_none());

        assert!(GeoPlane::new(PlaneBounds::DEFAULT, 0, 1.0).is_err());
        assert!(GeoPlane::new(PlaneBounds::DEFAULT, 27, 1.0).is_err());
        assert!(GeoPlane::new(PlaneBounds::DEFAULT, 16, -1.0).is_err());
    }

    #[test]
    fn test_cell_box_to_rect() {
        let cell = decode(encode(0.0, 0.0, 1).unwrap());
        let rect = cell.to_rect();
        assert_eq!(rect.min().x, 0.0);
        assert_eq!(rect.max().x, 10000.0);
        assert_eq!(cell.center(), Point::new(5000.0, 5000.0));
    }
}
