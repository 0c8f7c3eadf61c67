//! Float to integer PCM conversion for the WAV sink.

/// Largest positive integer representable at `bits_per_sample`.
pub fn full_scale(bits_per_sample: u16) -> i64 {
    (1i64 << (bits_per_sample - 1)) - 1
}

/// Convert an `f32` sample in `[-1.0, 1.0]` to integer PCM.
///
/// Out-of-range values are clamped. The result is symmetric: `-1.0` maps to
/// `-full_scale`, not to the most negative integer.
pub fn quantize(sample: f32, bits_per_sample: u16) -> i32 {
    let clamped = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
    (clamped as f64 * full_scale(bits_per_sample) as f64).round() as i32
}

/// Largest round-trip error introduced by [`quantize`] at this bit depth.
pub fn quantization_step(bits_per_sample: u16) -> f32 {
    1.0 / full_scale(bits_per_sample) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_per_depth() {
        assert_eq!(full_scale(16), i16::MAX as i64);
        assert_eq!(full_scale(24), 8_388_607);
        assert_eq!(full_scale(32), i32::MAX as i64);
    }

    #[test]
    fn quantize_16_bit() {
        assert_eq!(quantize(0.0, 16), 0);
        assert_eq!(quantize(1.0, 16), i16::MAX as i32);
        assert_eq!(quantize(-1.0, 16), -(i16::MAX as i32));
        assert_eq!(quantize(0.5, 16), 16384);
    }

    #[test]
    fn quantize_clamps() {
        assert_eq!(quantize(2.0, 16), i16::MAX as i32);
        assert_eq!(quantize(-2.0, 24), -8_388_607);
        assert_eq!(quantize(f32::NAN, 16), 0);
    }

    #[test]
    fn quantize_32_bit_stays_in_range() {
        assert_eq!(quantize(1.0, 32), i32::MAX);
        assert_eq!(quantize(-1.0, 32), -i32::MAX);
    }
}
