//! Planning of the cells a radius search has to visit.
//!
//! A search covers the 3×3 lattice around the cell holding the center. The
//! precision is chosen so a cell is at least as large as the radius, lowered
//! once more if the center sits so close to the lattice edge that the search
//! circle would leak past it, and finally the lattice rows and columns that
//! lie entirely outside the search's bounding box are dropped.

use super::geohash::{CellBox, Direction, GeoHashBits, GeoPlane};
use geo::{Distance, Euclidean, Point};
use serde::{Deserialize, Serialize};

/// Cells to scan for one radius query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoArea {
    /// Precision of every cell in the lattice
    pub step: u8,
    /// Cell containing the search center
    pub hash: GeoHashBits,
    /// Extent of the center cell
    pub area: CellBox,
    /// Lattice in [`Direction`] order; `None` marks a pruned cell
    pub neighbors: [Option<GeoHashBits>; 9],
}

impl GeoArea {
    /// The cells that will actually be scanned, in lattice order.
    pub fn cells(&self) -> impl Iterator<Item = GeoHashBits> + '_ {
        self.neighbors.iter().flatten().copied()
    }

    pub fn neighbor(&self, direction: Direction) -> Option<GeoHashBits> {
        self.neighbors[direction.index()]
    }
}

/// Planar Euclidean distance between two points.
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    Euclidean.distance(Point::new(x1, y1), Point::new(x2, y2))
}

/// Axis-aligned box enclosing the search circle.
pub fn bounding_box(x: f64, y: f64, radius: f64) -> CellBox {
    CellBox {
        x_min: x - radius,
        x_max: x + radius,
        y_min: y - radius,
        y_max: y + radius,
    }
}

impl GeoPlane {
    /// Compute the cells covering a circle of `radius` around `(x, y)`.
    ///
    /// Returns `None` if the center does not lie on the plane. The cells are
    /// a conservative cover: points found in them can be farther than
    /// `radius` from the center.
    pub fn areas_by_radius(&self, x: f64, y: f64, radius: f64) -> Option<GeoArea> {
        let bounds = bounding_box(x, y, radius);
        let mut step = self.estimate_steps_by_radius(radius);

        let mut hash = self.encode(x, y, step)?;
        let mut lattice = hash.neighbors();
        let mut area = self.decode(hash);

        if step > 1 && self.lattice_too_small(x, y, radius, &lattice) {
            step -= 1;
            hash = self.encode(x, y, step)?;
            lattice = hash.neighbors();
            area = self.decode(hash);
        }

        let mut neighbors = lattice.map(Some);

        if step >= 2 {
            let mut exclude = |directions: [Direction; 3]| {
                for direction in directions {
                    neighbors[direction.index()] = None;
                }
            };

            if area.x_min < bounds.x_min {
                exclude([Direction::SouthWest, Direction::West, Direction::NorthWest]);
            }
            if area.x_max > bounds.x_max {
                exclude([Direction::SouthEast, Direction::East, Direction::NorthEast]);
            }
            if area.y_min < bounds.y_min {
                exclude([Direction::SouthWest, Direction::South, Direction::SouthEast]);
            }
            if area.y_max > bounds.y_max {
                exclude([Direction::NorthWest, Direction::North, Direction::NorthEast]);
            }
        }

        Some(GeoArea {
            step,
            hash,
            area,
            neighbors,
        })
    }

    /// Whether the search circle reaches past the far edge of a cardinal
    /// neighbor at the current precision.
    fn lattice_too_small(&self, x: f64, y: f64, radius: f64, lattice: &[GeoHashBits; 9]) -> bool {
        let north = self.decode(lattice[Direction::North.index()]);
        let south = self.decode(lattice[Direction::South.index()]);
        let east = self.decode(lattice[Direction::East.index()]);
        let west = self.decode(lattice[Direction::West.index()]);

        distance(x, y, x, north.y_max) < radius
            || distance(x, y, x, south.y_min) < radius
            || distance(x, y, east.x_max, y) < radius
            || distance(x, y, west.x_min, y) < radius
    }
}

/// [`GeoPlane::areas_by_radius`] on the default plane.
pub fn areas_by_radius(x: f64, y: f64, radius: f64) -> Option<GeoArea> {
    GeoPlane::DEFAULT.areas_by_radius(x, y, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::geohash;

    #[test]
    fn test_distance() {
        assert_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_eq!(distance(1.0, 1.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_center_outside_plane() {
        assert!(areas_by_radius(10001.0, 0.0, 10.0).is_none());
        assert!(areas_by_radius(0.0, f64::NAN, 10.0).is_none());
    }

    #[test]
    fn test_area_contains_center() {
        let area = areas_by_radius(8750.0, 10.0, 8000.0).unwrap();
        assert!(area.area.contains(8750.0, 10.0));
        assert_eq!(area.neighbor(Direction::Center), Some(area.hash));
        assert_eq!(area.hash.step(), area.step);
    }

    #[test]
    fn test_default_plane_keeps_estimated_step() {
        // A cell is always wider than the radius it was estimated for, so the
        // cardinal neighbors' far edges are out of reach on the default plane.
        for (x, y, radius) in [
            (0.0, 0.0, 1.2),
            (0.61, 0.61, 1.2),
            (-9999.0, -9999.0, 4999.0),
            (2500.0, 2500.0, 4999.0),
            (9999.9, 0.0, 3.0),
        ] {
            let area = areas_by_radius(x, y, radius).unwrap();
            assert_eq!(area.step, geohash::estimate_steps_by_radius(radius));
        }
    }

    #[test]
    fn test_step_decrease_is_single_retry() {
        // With a reference radius larger than the plane, radius 100 estimates
        // step 9 whose cells (~39 wide) cannot reach 100 units out. The step
        // is lowered exactly once, to 8 (~78 wide), even though that is still
        // not enough.
        let plane = GeoPlane {
            reference_radius: 40000.0,
            ..GeoPlane::DEFAULT
        };
        assert_eq!(plane.estimate_steps_by_radius(100.0), 9);

        let area = plane.areas_by_radius(0.0, 0.0, 100.0).unwrap();
        assert_eq!(area.step, 8);
        assert_eq!(area.hash, plane.encode(0.0, 0.0, 8).unwrap());
        assert_eq!(area.area, plane.decode(area.hash));
    }

    #[test]
    fn test_zero_radius_uses_finest_cells() {
        let area = areas_by_radius(123.0, 456.0, 0.0).unwrap();
        assert_eq!(area.step, 16);
        // The search box is a single point strictly inside the center cell,
        // so every outer row and column is pruned.
        let remaining: Vec<_> = area.cells().collect();
        assert_eq!(remaining, vec![area.hash]);
    }

    #[test]
    fn test_pruning_matches_center_cell_position() {
        // Step 11 cells are 9.765625 wide; the center cell of (100, 100) is
        // [97.65625, 107.421875) on both axes, which overhangs the search box
        // [95, 105] only on the east and north sides.
        let area = areas_by_radius(100.0, 100.0, 5.0).unwrap();
        assert_eq!(area.step, 11);
        assert_eq!(area.area.x_min, 97.65625);
        assert_eq!(area.area.x_max, 107.421875);

        for d in [
            Direction::SouthEast,
            Direction::East,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::North,
        ] {
            assert!(area.neighbor(d).is_none(), "{:?} should be pruned", d);
        }
        for d in [
            Direction::SouthWest,
            Direction::West,
            Direction::South,
            Direction::Center,
        ] {
            assert!(area.neighbor(d).is_some(), "{:?} should be kept", d);
        }
        assert_eq!(area.cells().count(), 4);
    }

    #[test]
    fn test_no_pruning_at_step_one() {
        let area = areas_by_radius(0.0, 0.0, 9000.0).unwrap();
        assert_eq!(area.step, 1);
        assert!(area.neighbors.iter().all(Option::is_some));
    }
}
