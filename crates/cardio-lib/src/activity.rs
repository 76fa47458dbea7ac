use crate::error::{CardioError, Result};
use serde::{Deserialize, Serialize};

/// Minimum span of a labelled activity segment (ms).
pub const MIN_SEGMENT_MS: i64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Rest,
    Walk,
    Run,
}

/// Scale factors applied to the baseline deltas for one activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityMultipliers {
    pub heart_rate_recovery: f64,
    pub st_deviation: f64,
}

impl ActivityMultipliers {
    pub const NEUTRAL: Self = Self {
        heart_rate_recovery: 1.0,
        st_deviation: 1.0,
    };
}

impl ActivityType {
    pub fn multipliers(self) -> ActivityMultipliers {
        match self {
            ActivityType::Rest => ActivityMultipliers::NEUTRAL,
            ActivityType::Walk => ActivityMultipliers {
                heart_rate_recovery: 1.5,
                st_deviation: 1.2,
            },
            ActivityType::Run => ActivityMultipliers {
                heart_rate_recovery: 2.0,
                st_deviation: 1.5,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Rest => "rest",
            ActivityType::Walk => "walk",
            ActivityType::Run => "run",
        }
    }
}

/// A labelled span `[start, end)` of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySegment {
    #[serde(rename = "type")]
    pub activity: ActivityType,
    pub start: i64,
    pub end: i64,
}

impl ActivitySegment {
    pub fn new(activity: ActivityType, start: i64, end: i64) -> Self {
        Self {
            activity,
            start,
            end,
        }
    }

    pub fn contains(&self, instant: i64) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn span(&self) -> i64 {
        self.end - self.start
    }

    fn overlaps(&self, other: &ActivitySegment) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The segment containing `instant`, if any.
pub fn active_segment(segments: &[ActivitySegment], instant: i64) -> Option<&ActivitySegment> {
    segments.iter().find(|s| s.contains(instant))
}

/// Check the invariants the segment editor guarantees: non-empty spans of at
/// least [`MIN_SEGMENT_MS`] with no overlap between segments.
pub fn validate_segments(segments: &[ActivitySegment]) -> Result<()> {
    for (index, seg) in segments.iter().enumerate() {
        if seg.start >= seg.end {
            return Err(CardioError::EmptySegment {
                index,
                start: seg.start,
                end: seg.end,
            });
        }
        if seg.span() < MIN_SEGMENT_MS {
            return Err(CardioError::SegmentTooShort {
                index,
                span: seg.span(),
                min: MIN_SEGMENT_MS,
            });
        }
    }
    for (first, a) in segments.iter().enumerate() {
        for (offset, b) in segments[first + 1..].iter().enumerate() {
            if a.overlaps(b) {
                return Err(CardioError::OverlappingSegments {
                    first,
                    second: first + 1 + offset,
                });
            }
        }
    }
    Ok(())
}
