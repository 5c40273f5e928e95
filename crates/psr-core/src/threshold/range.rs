use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// An inclusive `[lower, upper]` range over an 8-bit channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub lower: u8,
    pub upper: u8,
}

impl ChannelRange {
    pub fn new(lower: u8, upper: u8) -> Self {
        Self { lower, upper }
    }

    pub fn validate(&self, channel: &'static str) -> Result<(), PipelineError> {
        if self.lower > self.upper {
            return Err(PipelineError::InvalidRange {
                channel,
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, value: u8) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

fn default_pass() -> bool {
    true
}

/// An inclusive range with polarity.
///
/// `pass = true` selects values inside the range, `false` selects values
/// outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandFilter {
    pub lower: u8,
    pub upper: u8,
    #[serde(default = "default_pass")]
    pub pass: bool,
}

impl BandFilter {
    pub fn pass(lower: u8, upper: u8) -> Self {
        Self {
            lower,
            upper,
            pass: true,
        }
    }

    pub fn stop(lower: u8, upper: u8) -> Self {
        Self {
            lower,
            upper,
            pass: false,
        }
    }

    pub fn validate(&self, channel: &'static str) -> Result<(), PipelineError> {
        ChannelRange::new(self.lower, self.upper).validate(channel)
    }

    /// Classify a value of an ordered channel.
    #[inline]
    pub fn matches(&self, value: u8) -> bool {
        let inside = (self.lower..=self.upper).contains(&value);
        inside == self.pass
    }

    /// Classify a value of a circular channel; `lower > upper` wraps through 255.
    #[inline]
    pub fn matches_wrapping(&self, value: u8) -> bool {
        let inside = if self.lower <= self.upper {
            (self.lower..=self.upper).contains(&value)
        } else {
            value >= self.lower || value <= self.upper
        };
        inside == self.pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_range_is_inclusive() {
        let range = ChannelRange::new(10, 20);
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(21));
    }

    #[test]
    fn test_stop_band_inverts() {
        let band = BandFilter::stop(10, 20);
        assert!(!band.matches(15));
        assert!(band.matches(9));
        assert!(band.matches(200));
    }

    #[test]
    fn test_pass_defaults_to_true_when_deserialized() {
        use serde::de::value::{Error, MapDeserializer};
        let entries = vec![("lower", 1u8), ("upper", 9u8)];
        let de: MapDeserializer<'_, _, Error> = MapDeserializer::new(entries.into_iter());
        let band = BandFilter::deserialize(de).unwrap();
        assert_eq!(band, BandFilter::pass(1, 9));
    }
}
