//! Packing of 16-bit RGB channels into byte output.

/// Bytes written per point: three channels, two bytes each.
pub const COLOR_BYTES_PER_POINT: usize = 6;

/// Splits each channel into its low and high byte, in channel order.
#[inline]
pub fn pack(channels: [u16; 3]) -> [u8; COLOR_BYTES_PER_POINT] {
    let [r, g, b] = channels;
    let [r0, r1] = r.to_le_bytes();
    let [g0, g1] = g.to_le_bytes();
    let [b0, b1] = b.to_le_bytes();
    [r0, r1, g0, g1, b0, b1]
}

/// Inverse of [pack].
#[inline]
pub fn unpack(bytes: [u8; COLOR_BYTES_PER_POINT]) -> [u16; 3] {
    [
        u16::from_le_bytes([bytes[0], bytes[1]]),
        u16::from_le_bytes([bytes[2], bytes[3]]),
        u16::from_le_bytes([bytes[4], bytes[5]]),
    ]
}

/// Maps a 16-bit channel to `[0, 1]`.
#[inline]
pub fn normalize(channel: u16) -> f32 {
    f32::from(channel) / f32::from(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_byte_first() {
        assert_eq!(pack([0x1234, 0, 0])[..2], [0x34, 0x12]);
    }

    #[test]
    fn channels_keep_their_order() {
        assert_eq!(
            pack([0x0102, 0x0304, 0xA0B0]),
            [0x02, 0x01, 0x04, 0x03, 0xB0, 0xA0]
        );
    }

    #[test]
    fn extremes() {
        assert_eq!(pack([u16::MAX, 0, 0x00FF]), [0xFF, 0xFF, 0, 0, 0xFF, 0]);
        assert_eq!(unpack(pack([u16::MAX, 1, 256])), [u16::MAX, 1, 256]);
    }

    #[test]
    fn normalizes_to_unit_range() {
        assert_eq!(normalize(0), 0.0);
        assert_eq!(normalize(u16::MAX), 1.0);
        assert!((normalize(32768) - 0.5).abs() < 1e-4);
    }
}
