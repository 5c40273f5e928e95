/// Iterative intermeans threshold of an 8-bit histogram.
///
/// The extreme bins 0 and 255 are ignored (saturated pixels would otherwise
/// dominate). The split point advances until it passes the mean of the two
/// class means. Returns `None` when fewer than two distinct levels remain.
pub fn isodata_level(histogram: &[u64; 256]) -> Option<u8> {
    let mut data = *histogram;
    data[0] = 0;
    data[255] = 0;

    let min = data.iter().position(|&count| count > 0)?;
    let max = data.iter().rposition(|&count| count > 0)?;
    if min >= max {
        return None;
    }

    let class_mean = |range: std::ops::RangeInclusive<usize>| {
        let (mut weighted, mut total) = (0.0f64, 0.0f64);
        for i in range {
            weighted += i as f64 * data[i] as f64;
            total += data[i] as f64;
        }
        weighted / total
    };

    let mut moving = min;
    loop {
        let result = (class_mean(min..=moving) + class_mean(moving + 1..=max)) / 2.0;
        moving += 1;
        if (moving + 1) as f64 > result || moving >= max - 1 {
            return Some(result.round().clamp(0.0, 255.0) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bimodal_split_is_between_modes() {
        let mut histogram = [0u64; 256];
        histogram[60] = 1000;
        histogram[230] = 100;
        assert_eq!(isodata_level(&histogram), Some(145));
    }

    #[test]
    fn test_single_level_has_no_threshold() {
        let mut histogram = [0u64; 256];
        histogram[100] = 50;
        assert_eq!(isodata_level(&histogram), None);
    }

    #[test]
    fn test_extreme_bins_are_ignored() {
        let mut histogram = [0u64; 256];
        histogram[0] = 10_000;
        histogram[255] = 10_000;
        histogram[40] = 10;
        histogram[80] = 10;
        assert_eq!(isodata_level(&histogram), Some(60));
    }
}
