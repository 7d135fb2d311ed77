//! Fixed-point to real-world coordinate conversion.

use crate::session::{RawPointRecord, StreamHeader};

/// Converts raw fixed-point coordinates to `f32` using `raw * scale + offset`.
///
/// The product and sum are computed in `f64` and only the result is narrowed,
/// large offsets (UTM-scale) would otherwise lose precision. Nothing is clamped.
#[inline]
pub fn transform(raw: [i32; 3], scale: [f64; 3], offset: [f64; 3]) -> [f32; 3] {
    [
        (f64::from(raw[0]) * scale[0] + offset[0]) as f32,
        (f64::from(raw[1]) * scale[1] + offset[1]) as f32,
        (f64::from(raw[2]) * scale[2] + offset[2]) as f32,
    ]
}

/// Per-axis scale and offset taken from a header.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisTransforms {
    pub scale: [f64; 3],
    pub offset: [f64; 3],
}

impl AxisTransforms {
    pub fn from_header(header: &StreamHeader) -> AxisTransforms {
        AxisTransforms {
            scale: header.scale,
            offset: header.offset,
        }
    }

    #[inline]
    pub fn apply(&self, record: &RawPointRecord) -> [f32; 3] {
        transform([record.x, record.y, record.z], self.scale, self.offset)
    }
}
