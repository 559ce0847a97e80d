//! Numeric readouts shown next to a simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One labelled value with a fixed display precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    /// Label, e.g. "Period".
    pub label: String,
    /// Raw value.
    pub value: f64,
    /// Unit suffix, e.g. "s". Empty for dimensionless values.
    pub unit: String,
    /// Decimal places shown.
    pub precision: usize,
}

impl Readout {
    /// Create a readout.
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64, unit: impl Into<String>, precision: usize) -> Self {
        Self {
            label: label.into(),
            value,
            unit: unit.into(),
            precision,
        }
    }

    /// Value formatted to the readout's precision, without the unit.
    #[must_use]
    pub fn formatted_value(&self) -> String {
        format!("{:.*}", self.precision, self.value)
    }

    /// Value with unit, e.g. "2.46 s".
    #[must_use]
    pub fn display_value(&self) -> String {
        if self.unit.is_empty() {
            self.formatted_value()
        } else if self.unit == "°" {
            format!("{}°", self.formatted_value())
        } else {
            format!("{} {}", self.formatted_value(), self.unit)
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.display_value())
    }
}

/// Find a readout by label.
#[must_use]
pub fn find<'a>(readouts: &'a [Readout], label: &str) -> Option<&'a Readout> {
    readouts.iter().find(|r| r.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readout_display() {
        let r = Readout::new("Period", 2.458_16, "s", 2);
        assert_eq!(r.to_string(), "Period: 2.46 s");
    }

    #[test]
    fn test_readout_degrees_have_no_space() {
        let r = Readout::new("Angle", 45.0, "°", 1);
        assert_eq!(r.display_value(), "45.0°");
    }

    #[test]
    fn test_readout_dimensionless() {
        let r = Readout::new("Phase", 3.141_59, "", 3);
        assert_eq!(r.display_value(), "3.142");
    }

    #[test]
    fn test_find_by_label() {
        let readouts = vec![
            Readout::new("Range", 255.1, "m", 1),
            Readout::new("Max height", 63.78, "m", 2),
        ];
        assert!(find(&readouts, "Range").is_some());
        assert!(find(&readouts, "Flight time").is_none());
    }
}
