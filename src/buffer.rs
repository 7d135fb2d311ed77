//! The single output allocation holding positions and colors.
//!
//! Layout: `point_count * 3` little-endian `f32` positions occupy
//! `[0, position_bytes)`, packed colors (six bytes per point) follow directly.

use crate::color::COLOR_BYTES_PER_POINT;
use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Bytes per position: three `f32`.
pub const POSITION_BYTES_PER_POINT: usize = 3 * 4;

/// How the size of the color section is reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSizeReport {
    /// Six bytes per point, the size actually written.
    #[default]
    Actual,
    /// Three bytes per point. Six are still written and allocated, only the
    /// reported size is understated, as consumers of older decoders expect.
    Legacy,
}

impl ColorSizeReport {
    pub fn bytes_per_point(self) -> usize {
        match self {
            ColorSizeReport::Actual => COLOR_BYTES_PER_POINT,
            ColorSizeReport::Legacy => 3,
        }
    }
}

/// Section sizes of an output buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferSizes {
    pub position_bytes: usize,
    /// Bytes reserved and written for colors
    pub color_bytes_written: usize,
    /// Bytes reported for colors
    pub color_bytes_declared: usize,
}

impl BufferSizes {
    pub fn total(&self) -> usize {
        self.position_bytes + self.color_bytes_written
    }
}

/// Computes section sizes for `point_count` points.
pub fn precompute_sizes(
    point_count: u64,
    want_color: bool,
    report: ColorSizeReport,
) -> Result<BufferSizes> {
    let overflow = || Error::AllocFailed {
        requested: u64::MAX,
    };
    let count = usize::try_from(point_count).map_err(|_| overflow())?;
    let bytes = |per_point: usize| count.checked_mul(per_point).ok_or_else(overflow);

    let position_bytes = bytes(POSITION_BYTES_PER_POINT)?;
    let (color_bytes_written, color_bytes_declared) = if want_color {
        (
            bytes(COLOR_BYTES_PER_POINT)?,
            bytes(report.bytes_per_point())?,
        )
    } else {
        (0, 0)
    };
    position_bytes
        .checked_add(color_bytes_written)
        .ok_or_else(overflow)?;

    Ok(BufferSizes {
        position_bytes,
        color_bytes_written,
        color_bytes_declared,
    })
}

/// Decoded positions followed by packed colors, in one allocation.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
    sizes: BufferSizes,
}

impl OutputBuffer {
    /// Performs the single zero-filled allocation.
    ///
    /// `limit` caps the total size in bytes.
    pub fn allocate(sizes: BufferSizes, limit: Option<usize>) -> Result<OutputBuffer> {
        let total = sizes.total();
        if let Some(limit) = limit {
            if total > limit {
                return Err(Error::BufferLimitExceeded {
                    requested: total as u64,
                    limit: limit as u64,
                });
            }
        }

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(total)
            .map_err(|_| Error::AllocFailed {
                requested: total as u64,
            })?;
        bytes.resize(total, 0);
        Ok(OutputBuffer { bytes, sizes })
    }

    #[inline]
    pub fn write_position(&mut self, index: usize, xyz: [f32; 3]) {
        let start = index * POSITION_BYTES_PER_POINT;
        let dst = &mut self.bytes[start..start + POSITION_BYTES_PER_POINT];
        LittleEndian::write_f32_into(&xyz, dst);
    }

    #[inline]
    pub fn write_color(&mut self, index: usize, packed: [u8; COLOR_BYTES_PER_POINT]) {
        let start = self.sizes.position_bytes + index * COLOR_BYTES_PER_POINT;
        self.bytes[start..start + COLOR_BYTES_PER_POINT].copy_from_slice(&packed);
    }

    pub fn sizes(&self) -> BufferSizes {
        self.sizes
    }

    pub fn position_bytes(&self) -> usize {
        self.sizes.position_bytes
    }

    /// Reported size of the color section, see [ColorSizeReport].
    pub fn color_bytes(&self) -> usize {
        self.sizes.color_bytes_declared
    }

    pub fn has_color(&self) -> bool {
        self.sizes.color_bytes_written > 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Positions decoded back to `x, y, z` triples flattened into one vector.
    pub fn positions(&self) -> Vec<f32> {
        let mut out = vec![0f32; self.sizes.position_bytes / 4];
        LittleEndian::read_f32_into(&self.bytes[..self.sizes.position_bytes], &mut out);
        out
    }

    /// The packed color section, as written.
    pub fn colors(&self) -> &[u8] {
        &self.bytes[self.sizes.position_bytes..]
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_without_color() {
        let sizes = precompute_sizes(10, false, ColorSizeReport::Actual).unwrap();
        assert_eq!(sizes.position_bytes, 120);
        assert_eq!(sizes.color_bytes_written, 0);
        assert_eq!(sizes.color_bytes_declared, 0);
        assert_eq!(sizes.total(), 120);
    }

    #[test]
    fn legacy_report_understates_color_size() {
        let actual = precompute_sizes(10, true, ColorSizeReport::Actual).unwrap();
        let legacy = precompute_sizes(10, true, ColorSizeReport::Legacy).unwrap();
        assert_eq!(actual.color_bytes_declared, 60);
        assert_eq!(legacy.color_bytes_declared, 30);
        assert_eq!(actual.color_bytes_written, 60);
        assert_eq!(legacy.color_bytes_written, 60);
        assert_eq!(legacy.total(), 180);
    }

    #[test]
    fn overflowing_sizes_fail() {
        let err = precompute_sizes(u64::MAX, true, ColorSizeReport::Actual).unwrap_err();
        assert!(err.is_alloc_failure());
    }

    #[test]
    fn allocation_is_zeroed() {
        let sizes = precompute_sizes(4, true, ColorSizeReport::Actual).unwrap();
        let buffer = OutputBuffer::allocate(sizes, None).unwrap();
        assert_eq!(buffer.as_bytes().len(), 72);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn limit_is_enforced() {
        let sizes = precompute_sizes(4, false, ColorSizeReport::Actual).unwrap();
        assert!(matches!(
            OutputBuffer::allocate(sizes, Some(47)),
            Err(Error::BufferLimitExceeded {
                requested: 48,
                limit: 47
            })
        ));
        assert!(OutputBuffer::allocate(sizes, Some(48)).is_ok());
    }

    #[test]
    fn writes_land_at_their_offsets() {
        let sizes = precompute_sizes(2, true, ColorSizeReport::Actual).unwrap();
        let mut buffer = OutputBuffer::allocate(sizes, None).unwrap();
        buffer.write_position(1, [1.0, 2.0, 3.0]);
        buffer.write_color(1, [1, 2, 3, 4, 5, 6]);

        assert_eq!(buffer.positions(), vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(&buffer.as_bytes()[12..16], &1.0f32.to_le_bytes());
        assert_eq!(buffer.colors(), &[0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(&buffer.as_bytes()[24 + 6..], &[1, 2, 3, 4, 5, 6]);
    }
}
