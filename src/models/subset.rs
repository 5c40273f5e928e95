//! Image subset selection ("1-3,7,10-12").

use std::ops::RangeInclusive;

use regex::Regex;

use crate::error::ConfigError;

/// 1-based indices and inclusive ranges into the sorted list of input images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSubset {
    spec: String,
    ranges: Vec<RangeInclusive<usize>>,
}

const ITEM_PATTERN: &str = r"^\s*(\d+)\s*(?:-\s*(\d+)\s*)?$";

impl ImageSubset {
    /// Parse comma-separated indices and inclusive ranges.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidSubset {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let pattern = Regex::new(ITEM_PATTERN).map_err(|e| invalid(&e.to_string()))?;
        let mut ranges = Vec::new();
        for item in spec.split(',') {
            let caps = pattern
                .captures(item)
                .ok_or_else(|| invalid(&format!("'{}' is not an index or range", item.trim())))?;
            let start: usize = caps[1]
                .parse()
                .map_err(|_| invalid("index too large"))?;
            let end: usize = match caps.get(2) {
                Some(m) => m.as_str().parse().map_err(|_| invalid("index too large"))?,
                None => start,
            };
            if start == 0 {
                return Err(invalid("indices start at 1"));
            }
            if end < start {
                return Err(invalid("descending range"));
            }
            ranges.push(start..=end);
        }

        Ok(Self {
            spec: spec.to_string(),
            ranges,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.spec
    }

    /// Keep the selected items, preserving their order.
    pub fn select<T>(&self, items: Vec<T>) -> Result<Vec<T>, ConfigError> {
        let count = items.len();
        if let Some(index) = self.ranges.iter().map(|r| *r.end()).max().filter(|&i| i > count) {
            return Err(ConfigError::SubsetOutOfRange { index, count });
        }
        Ok(items
            .into_iter()
            .enumerate()
            .filter(|(i, _)| self.ranges.iter().any(|r| r.contains(&(i + 1))))
            .map(|(_, item)| item)
            .collect())
    }
}
