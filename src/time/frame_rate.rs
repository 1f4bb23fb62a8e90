//! Video frame rates supported by FCPXML
//!
//! The set is closed: a `format` resource's `frameDuration` must map to one of
//! these, with the drop-frame flag taken from the nearest `tcFormat` attribute.

use super::{errors::TimeError, format_time, Fraction};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameRate {
    Fps23_976,
    Fps24,
    Fps25,
    Fps29_97,
    Fps29_97Drop,
    Fps30,
    Fps30Drop,
    Fps47_952,
    Fps48,
    Fps50,
    Fps59_94,
    Fps59_94Drop,
    Fps60,
    Fps60Drop,
    Fps100,
    Fps119_88,
    Fps119_88Drop,
    Fps120,
    Fps120Drop,
}

impl FrameRate {
    pub const ALL: [FrameRate; 19] = [
        FrameRate::Fps23_976,
        FrameRate::Fps24,
        FrameRate::Fps25,
        FrameRate::Fps29_97,
        FrameRate::Fps29_97Drop,
        FrameRate::Fps30,
        FrameRate::Fps30Drop,
        FrameRate::Fps47_952,
        FrameRate::Fps48,
        FrameRate::Fps50,
        FrameRate::Fps59_94,
        FrameRate::Fps59_94Drop,
        FrameRate::Fps60,
        FrameRate::Fps60Drop,
        FrameRate::Fps100,
        FrameRate::Fps119_88,
        FrameRate::Fps119_88Drop,
        FrameRate::Fps120,
        FrameRate::Fps120Drop,
    ];

    /// Nominal whole frames per timecode second
    pub fn timebase(self) -> u32 {
        match self {
            FrameRate::Fps23_976 | FrameRate::Fps24 => 24,
            FrameRate::Fps25 => 25,
            FrameRate::Fps29_97
            | FrameRate::Fps29_97Drop
            | FrameRate::Fps30
            | FrameRate::Fps30Drop => 30,
            FrameRate::Fps47_952 | FrameRate::Fps48 => 48,
            FrameRate::Fps50 => 50,
            FrameRate::Fps59_94
            | FrameRate::Fps59_94Drop
            | FrameRate::Fps60
            | FrameRate::Fps60Drop => 60,
            FrameRate::Fps100 => 100,
            FrameRate::Fps119_88
            | FrameRate::Fps119_88Drop
            | FrameRate::Fps120
            | FrameRate::Fps120Drop => 120,
        }
    }

    /// NTSC-fractional rates run at timebase × 1000/1001
    pub fn is_ntsc(self) -> bool {
        matches!(
            self,
            FrameRate::Fps23_976
                | FrameRate::Fps29_97
                | FrameRate::Fps29_97Drop
                | FrameRate::Fps47_952
                | FrameRate::Fps59_94
                | FrameRate::Fps59_94Drop
                | FrameRate::Fps119_88
                | FrameRate::Fps119_88Drop
        )
    }

    pub fn is_drop(self) -> bool {
        matches!(
            self,
            FrameRate::Fps29_97Drop
                | FrameRate::Fps30Drop
                | FrameRate::Fps59_94Drop
                | FrameRate::Fps60Drop
                | FrameRate::Fps119_88Drop
                | FrameRate::Fps120Drop
        )
    }

    /// Frame numbers skipped at each non-tenth minute in drop-frame counting
    pub fn dropped_frames_per_minute(self) -> u32 {
        if self.is_drop() {
            self.timebase() / 15
        } else {
            0
        }
    }

    /// Exact duration of one frame in seconds
    pub fn frame_duration(self) -> Fraction {
        let timebase = i64::from(self.timebase());
        if self.is_ntsc() {
            Fraction::new(1001, timebase * 1000)
        } else {
            Fraction::new(1, timebase)
        }
    }

    /// Exact frames per second
    pub fn fps(self) -> Fraction {
        self.frame_duration().recip()
    }

    /// Same rate with the drop-frame flag set or cleared, if such a rate exists
    pub fn with_drop(self, drop: bool) -> Option<FrameRate> {
        Self::ALL.iter().copied().find(|candidate| {
            candidate.frame_duration() == self.frame_duration() && candidate.is_drop() == drop
        })
    }

    /// Match a `format` resource's `frameDuration`
    pub fn from_frame_duration(duration: Fraction, drop: bool) -> Option<FrameRate> {
        Self::ALL
            .iter()
            .copied()
            .find(|rate| rate.frame_duration() == duration && rate.is_drop() == drop)
            // Drop frame is only defined for some rates; fall back to the non-drop rate
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|rate| rate.frame_duration() == duration && !rate.is_drop())
            })
    }

    pub fn try_from_frame_duration(duration: Fraction, drop: bool) -> Result<FrameRate, TimeError> {
        Self::from_frame_duration(duration, drop)
            .ok_or_else(|| TimeError::UnsupportedFrameDuration(format_time(duration)))
    }

    /// Short label such as `29.97d`
    pub fn label(self) -> &'static str {
        match self {
            FrameRate::Fps23_976 => "23.976",
            FrameRate::Fps24 => "24",
            FrameRate::Fps25 => "25",
            FrameRate::Fps29_97 => "29.97",
            FrameRate::Fps29_97Drop => "29.97d",
            FrameRate::Fps30 => "30",
            FrameRate::Fps30Drop => "30d",
            FrameRate::Fps47_952 => "47.952",
            FrameRate::Fps48 => "48",
            FrameRate::Fps50 => "50",
            FrameRate::Fps59_94 => "59.94",
            FrameRate::Fps59_94Drop => "59.94d",
            FrameRate::Fps60 => "60",
            FrameRate::Fps60Drop => "60d",
            FrameRate::Fps100 => "100",
            FrameRate::Fps119_88 => "119.88",
            FrameRate::Fps119_88Drop => "119.88d",
            FrameRate::Fps120 => "120",
            FrameRate::Fps120Drop => "120d",
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        FrameRate::Fps30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fps", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_duration_ntsc() {
        assert_eq!(FrameRate::Fps29_97.frame_duration(), Fraction::new(1001, 30000));
        assert_eq!(FrameRate::Fps23_976.frame_duration(), Fraction::new(1001, 24000));
        assert_eq!(FrameRate::Fps25.frame_duration(), Fraction::new(1, 25));
    }

    #[test]
    fn test_from_frame_duration() {
        assert_eq!(
            FrameRate::from_frame_duration(Fraction::new(1001, 30000), false),
            Some(FrameRate::Fps29_97)
        );
        assert_eq!(
            FrameRate::from_frame_duration(Fraction::new(1001, 30000), true),
            Some(FrameRate::Fps29_97Drop)
        );
        assert_eq!(
            FrameRate::from_frame_duration(Fraction::new(100, 2500), false),
            Some(FrameRate::Fps25)
        );
        assert_eq!(FrameRate::from_frame_duration(Fraction::new(1, 7), false), None);
    }

    #[test]
    fn test_drop_flag_ignored_for_non_drop_rates() {
        // 25 fps has no drop-frame variant
        assert_eq!(
            FrameRate::from_frame_duration(Fraction::new(1, 25), true),
            Some(FrameRate::Fps25)
        );
    }

    #[test]
    fn test_dropped_frames_per_minute() {
        assert_eq!(FrameRate::Fps29_97Drop.dropped_frames_per_minute(), 2);
        assert_eq!(FrameRate::Fps59_94Drop.dropped_frames_per_minute(), 4);
        assert_eq!(FrameRate::Fps119_88Drop.dropped_frames_per_minute(), 8);
        assert_eq!(FrameRate::Fps29_97.dropped_frames_per_minute(), 0);
    }

    #[test]
    fn test_with_drop() {
        assert_eq!(FrameRate::Fps29_97.with_drop(true), Some(FrameRate::Fps29_97Drop));
        assert_eq!(FrameRate::Fps24.with_drop(true), None);
    }
}
