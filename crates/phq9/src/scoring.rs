//! Total score and severity bands.
//!
//! The band table is fixed by the instrument:
//!
//! | Score  | Severity          |
//! |--------|-------------------|
//! | 0–4    | Minimal           |
//! | 5–9    | Mild              |
//! | 10–14  | Moderate          |
//! | 15–19  | Moderately Severe |
//! | 20–27  | Severe            |

use crate::{Phq9Error, Phq9Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// A PHQ-9 total score, guaranteed to be in `0..=27`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 27;

    /// # Errors
    ///
    /// Returns [`Phq9Error::ScoreOutOfRange`] if `value > 27`.
    pub fn new(value: u32) -> Phq9Result<Self> {
        if value <= Self::MAX as u32 {
            Ok(Self(value as u8))
        } else {
            Err(Phq9Error::ScoreOutOfRange(value))
        }
    }

    pub(crate) fn saturating(value: u32) -> Self {
        Self(value.min(Self::MAX as u32) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn severity(self) -> Severity {
        severity(self)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Score::new(value).map_err(serde::de::Error::custom)
    }
}

/// Depression severity band derived from a [`Score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Minimal,
    Mild,
    Moderate,
    #[serde(rename = "Moderately Severe")]
    ModeratelySevere,
    Severe,
}

impl Severity {
    /// All bands in ascending order.
    pub const ALL: [Severity; 5] = [
        Severity::Minimal,
        Severity::Mild,
        Severity::Moderate,
        Severity::ModeratelySevere,
        Severity::Severe,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Minimal => "Minimal",
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::ModeratelySevere => "Moderately Severe",
            Severity::Severe => "Severe",
        }
    }

    /// Style class used for history table rows.
    pub fn row_class(self) -> &'static str {
        match self {
            Severity::Minimal => "row-minimal",
            Severity::Mild => "row-mild",
            Severity::Moderate => "row-moderate",
            Severity::ModeratelySevere => "row-moderately-severe",
            Severity::Severe => "row-severe",
        }
    }

    /// Inclusive score range covered by this band.
    pub fn range(self) -> RangeInclusive<u8> {
        match self {
            Severity::Minimal => 0..=4,
            Severity::Mild => 5..=9,
            Severity::Moderate => 10..=14,
            Severity::ModeratelySevere => 15..=19,
            Severity::Severe => 20..=27,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a score into its severity band.
pub fn severity(score: Score) -> Severity {
    match score.value() {
        0..=4 => Severity::Minimal,
        5..=9 => Severity::Mild,
        10..=14 => Severity::Moderate,
        15..=19 => Severity::ModeratelySevere,
        _ => Severity::Severe,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(v: u32) -> Score {
        Score::new(v).expect("valid score")
    }

    #[test]
    fn every_score_lands_in_the_expected_band() {
        for v in 0..=27u32 {
            let expected = match v {
                0..=4 => Severity::Minimal,
                5..=9 => Severity::Mild,
                10..=14 => Severity::Moderate,
                15..=19 => Severity::ModeratelySevere,
                _ => Severity::Severe,
            };
            assert_eq!(severity(score(v)), expected, "score {v}");
        }
    }

    #[test]
    fn boundaries_classify_on_each_side() {
        let pairs = [
            (4, Severity::Minimal, 5, Severity::Mild),
            (9, Severity::Mild, 10, Severity::Moderate),
            (14, Severity::Moderate, 15, Severity::ModeratelySevere),
            (19, Severity::ModeratelySevere, 20, Severity::Severe),
        ];
        for (lo, lo_band, hi, hi_band) in pairs {
            assert_eq!(score(lo).severity(), lo_band);
            assert_eq!(score(hi).severity(), hi_band);
        }
    }

    #[test]
    fn band_ranges_are_contiguous_and_exhaustive() {
        let mut next = 0u8;
        for band in Severity::ALL {
            let range = band.range();
            assert_eq!(*range.start(), next, "{band} starts where previous ended");
            for v in range.clone() {
                assert_eq!(severity(score(v as u32)), band);
            }
            next = range.end() + 1;
        }
        assert_eq!(next, Score::MAX + 1);
    }

    #[test]
    fn score_rejects_values_above_27() {
        assert_eq!(Score::new(28).unwrap_err(), Phq9Error::ScoreOutOfRange(28));
        assert!(serde_json::from_str::<Score>("30").is_err());
    }

    #[test]
    fn severity_serialises_as_label() {
        let json = serde_json::to_string(&Severity::ModeratelySevere).expect("serialise");
        assert_eq!(json, "\"Moderately Severe\"");
        assert_eq!(Severity::ModeratelySevere.row_class(), "row-moderately-severe");
    }
}
