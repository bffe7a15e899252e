//! # Point clouds
//!
//! The minimal point cloud capability the row alignment corrector needs: cropping to a box
//! and taking the centroid. Acquisition and filtering of the cloud happen elsewhere.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A cloud of 3D points in the map frame.
pub trait PointCloud {
    /// Get the points which lie inside the box, boundary included.
    fn crop_box(&self, bounds: &CropBox) -> VecCloud;

    /// Get the mean of all points, or `None` if the cloud is empty.
    fn centroid(&self) -> Option<Point3<f64>>;

    fn num_points(&self) -> usize;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An axis aligned box, `min` being componentwise less than or equal to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

/// A point cloud held in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VecCloud {
    pub points: Vec<Point3<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CropBox {
    /// Smallest box containing all of the points, grown by `inflation` on each side.
    ///
    /// Returns `None` if there are no points.
    pub fn enclosing<I>(points: I, inflation: Vector3<f64>) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;

        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (min.inf(&p), max.sup(&p))
        });

        Some(Self {
            min: min - inflation,
            max: max + inflation,
        })
    }

    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }
}

impl From<Vec<Point3<f64>>> for VecCloud {
    fn from(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }
}

impl PointCloud for VecCloud {
    fn crop_box(&self, bounds: &CropBox) -> VecCloud {
        self.points
            .iter()
            .filter(|p| bounds.contains(p))
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }

    fn centroid(&self) -> Option<Point3<f64>> {
        if self.points.is_empty() {
            return None;
        }

        let sum = self
            .points
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);

        Some(Point3::from(sum / self.points.len() as f64))
    }

    fn num_points(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_enclosing_box() {
        let points = vec![
            Point3::new(3.0, -1.0, 0.0),
            Point3::new(-2.0, 0.5, 0.2),
            Point3::new(1.0, 0.0, -0.4),
        ];

        let bounds = CropBox::enclosing(points, Vector3::new(0.0, 0.3, 0.3)).unwrap();
        assert_eq!(bounds.min, Point3::new(-2.0, -1.3, -0.7));
        assert_eq!(bounds.max, Point3::new(3.0, 0.8, 0.5));

        assert!(CropBox::enclosing(Vec::new(), Vector3::zeros()).is_none());
    }

    #[test]
    fn test_crop_and_centroid() {
        let cloud: VecCloud = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 1.0),
            Point3::new(10.0, 0.0, 0.0),
        ]
        .into();

        let bounds = CropBox {
            min: Point3::new(0.0, 0.0, 0.0),
            max: Point3::new(2.0, 2.0, 1.0),
        };

        let cropped = cloud.crop_box(&bounds);
        assert_eq!(cropped.num_points(), 3);
        assert_eq!(cropped.centroid(), Some(Point3::new(1.0, 1.0, 1.0 / 3.0)));

        assert_eq!(VecCloud::default().centroid(), None);
    }
}
