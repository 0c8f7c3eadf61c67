/// Smoothed RMS that fills the whole bar.
pub const FULL_SCALE: f32 = 0.07;
pub const WIDTH: usize = 40;

/// Text bar for a smoothed volume level.
pub fn bar(level: f32) -> String {
    let fraction = if level.is_finite() {
        (level / FULL_SCALE).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (fraction * WIDTH as f32).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_empty() {
        assert_eq!(bar(0.0), format!("[{}]", " ".repeat(WIDTH)));
    }

    #[test]
    fn loud_input_saturates() {
        assert_eq!(bar(0.5), format!("[{}]", "#".repeat(WIDTH)));
        assert_eq!(bar(FULL_SCALE), bar(1.0));
    }

    #[test]
    fn half_scale_fills_half() {
        let b = bar(FULL_SCALE / 2.0);
        assert_eq!(b.matches('#').count(), WIDTH / 2);
    }

    #[test]
    fn nan_reads_as_silence() {
        assert_eq!(bar(f32::NAN), bar(0.0));
    }
}
