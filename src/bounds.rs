#[derive(Clone, Copy, PartialEq, Debug)]
/// 3D bounding box as declared by a point cloud header
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) -> Bounds {
        Bounds {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }
    }

    /// `[min_x, min_y, min_z, max_x, max_y, max_z]` narrowed to `f32`
    pub fn to_f32_array(&self) -> [f32; 6] {
        [
            self.min_x as f32,
            self.min_y as f32,
            self.min_z as f32,
            self.max_x as f32,
            self.max_y as f32,
            self.max_z as f32,
        ]
    }

    /// Whether every min is at most its max. Headers are not required to satisfy this.
    pub fn is_ordered(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y && self.min_z <= self.max_z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_min_then_max() {
        let bounds = Bounds::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(bounds.to_f32_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn ordering_is_checked_per_axis() {
        assert!(Bounds::new(0.0, 0.0, 0.0, 0.0, 1.0, 1.0).is_ordered());
        assert!(!Bounds::new(0.0, 2.0, 0.0, 1.0, 1.0, 1.0).is_ordered());
    }
}
