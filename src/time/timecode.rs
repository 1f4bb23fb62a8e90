//! SMPTE-style timecode at a video frame rate
//!
//! Conversion between rational seconds and `HH:MM:SS:FF(.SF)` is exact,
//! including drop-frame counting, where frame numbers 0..n are skipped at the
//! start of every minute except each tenth minute.

use super::{errors::TimecodeError, frame_rate::FrameRate, is_negative, Fraction};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static TIMECODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3}):(\d{2}):(\d{2})([:;])(\d{2,3})(?:\.(\d{1,2}))?$")
        .expect("valid timecode regex")
});

/// Number of sub-frame divisions per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SubFramesBase {
    #[default]
    Max80,
    Max100,
}

impl SubFramesBase {
    pub fn value(self) -> u32 {
        match self {
            SubFramesBase::Max80 => 80,
            SubFramesBase::Max100 => 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timecode {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
    pub subframes: u32,
    pub rate: FrameRate,
    pub subframes_base: SubFramesBase,
}

impl Timecode {
    /// `00:00:00:00` at the given rate
    pub fn zero(rate: FrameRate, subframes_base: SubFramesBase) -> Self {
        Self {
            hours: 0,
            minutes: 0,
            seconds: 0,
            frames: 0,
            subframes: 0,
            rate,
            subframes_base,
        }
    }

    /// Build from components, validating each against the rate
    pub fn from_components(
        hours: u32,
        minutes: u32,
        seconds: u32,
        frames: u32,
        subframes: u32,
        rate: FrameRate,
        subframes_base: SubFramesBase,
    ) -> Result<Self, TimecodeError> {
        if minutes > 59 {
            return Err(TimecodeError::InvalidComponent(format!("minutes {}", minutes)));
        }
        if seconds > 59 {
            return Err(TimecodeError::InvalidComponent(format!("seconds {}", seconds)));
        }
        if frames >= rate.timebase() {
            return Err(TimecodeError::InvalidComponent(format!(
                "frames {} at {}",
                frames, rate
            )));
        }
        if subframes >= subframes_base.value() {
            return Err(TimecodeError::InvalidComponent(format!(
                "subframes {} (base {})",
                subframes,
                subframes_base.value()
            )));
        }
        let dropped = rate.dropped_frames_per_minute();
        if dropped > 0 && seconds == 0 && minutes % 10 != 0 && frames < dropped {
            return Err(TimecodeError::InvalidComponent(format!(
                "frame {} does not exist at {:02}:{:02}:00 in drop-frame",
                frames, hours, minutes
            )));
        }

        Ok(Self {
            hours,
            minutes,
            seconds,
            frames,
            subframes,
            rate,
            subframes_base,
        })
    }

    /// Build from an absolute frame count (frames elapsed since `00:00:00:00`)
    pub fn from_frame_count(
        frame_count: u64,
        subframes: u32,
        rate: FrameRate,
        subframes_base: SubFramesBase,
    ) -> Self {
        let timebase = u64::from(rate.timebase());
        let dropped = u64::from(rate.dropped_frames_per_minute());

        let mut label = frame_count;
        if dropped > 0 {
            let per_ten_minutes = timebase * 600 - dropped * 9;
            let per_minute = timebase * 60 - dropped;
            let tens = frame_count / per_ten_minutes;
            let remainder = frame_count % per_ten_minutes;
            label += dropped * 9 * tens;
            if remainder > dropped {
                label += dropped * ((remainder - dropped) / per_minute);
            }
        }

        Self {
            hours: (label / (timebase * 3600)) as u32,
            minutes: ((label / (timebase * 60)) % 60) as u32,
            seconds: ((label / timebase) % 60) as u32,
            frames: (label % timebase) as u32,
            subframes,
            rate,
            subframes_base,
        }
    }

    /// Frames elapsed since `00:00:00:00`, ignoring sub-frames
    pub fn to_frame_count(&self) -> u64 {
        let timebase = u64::from(self.rate.timebase());
        let dropped = u64::from(self.rate.dropped_frames_per_minute());
        let total_minutes = u64::from(self.hours) * 60 + u64::from(self.minutes);
        let nominal = (total_minutes * 60 + u64::from(self.seconds)) * timebase
            + u64::from(self.frames);
        nominal - dropped * (total_minutes - total_minutes / 10)
    }

    /// Quantize rational seconds down to the containing frame and sub-frame
    pub fn from_seconds(
        seconds: Fraction,
        rate: FrameRate,
        subframes_base: SubFramesBase,
    ) -> Result<Self, TimecodeError> {
        if is_negative(seconds) {
            return Err(TimecodeError::Negative(super::format_time(seconds)));
        }

        let frames = seconds / rate.frame_duration();
        let whole = frames.floor();
        let subframes = ((frames - whole) * Fraction::from_integer(i64::from(subframes_base.value())))
            .floor()
            .to_integer();

        Ok(Self::from_frame_count(
            whole.to_integer() as u64,
            subframes as u32,
            rate,
            subframes_base,
        ))
    }

    /// Exact rational seconds at the start of this frame/sub-frame
    pub fn to_seconds(&self) -> Fraction {
        let frames = Fraction::from_integer(self.to_frame_count() as i64)
            + Fraction::new(
                i64::from(self.subframes),
                i64::from(self.subframes_base.value()),
            );
        frames * self.rate.frame_duration()
    }

    /// Parse `HH:MM:SS:FF`, `HH:MM:SS;FF` or either with a `.SF` sub-frame suffix
    pub fn parse(
        value: &str,
        rate: FrameRate,
        subframes_base: SubFramesBase,
    ) -> Result<Self, TimecodeError> {
        let captures = TIMECODE_PATTERN
            .captures(value.trim())
            .ok_or_else(|| TimecodeError::Malformed(value.to_string()))?;

        let number = |index: usize| -> Result<u32, TimecodeError> {
            captures
                .get(index)
                .map(|m| m.as_str().parse::<u32>())
                .transpose()
                .map_err(|_| TimecodeError::Malformed(value.to_string()))
                .map(|n| n.unwrap_or(0))
        };

        Self::from_components(
            number(1)?,
            number(2)?,
            number(3)?,
            number(5)?,
            number(6)?,
            rate,
            subframes_base,
        )
    }

    /// Shift by a signed amount of rational seconds
    pub fn offset_by(&self, delta: Fraction) -> Result<Self, TimecodeError> {
        Self::from_seconds(self.to_seconds() + delta, self.rate, self.subframes_base)
    }

    /// Shift by a signed number of whole frames
    pub fn adding_frames(&self, delta: i64) -> Result<Self, TimecodeError> {
        let target = self.to_frame_count() as i64 + delta;
        if target < 0 {
            return Err(TimecodeError::Negative(format!("{} frames", target)));
        }
        Ok(Self::from_frame_count(
            target as u64,
            self.subframes,
            self.rate,
            self.subframes_base,
        ))
    }

    /// Same position expressed at another rate (quantized to that rate's frames)
    pub fn converted(&self, rate: FrameRate) -> Result<Self, TimecodeError> {
        Self::from_seconds(self.to_seconds(), rate, self.subframes_base)
    }

    /// Timecode string including sub-frames, e.g. `01:00:00:12.40`
    pub fn to_string_with_subframes(&self) -> String {
        format!("{}.{:02}", self, self.subframes)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.rate.is_drop() { ';' } else { ':' };
        if self.rate.timebase() > 99 {
            write!(
                f,
                "{:02}:{:02}:{:02}{}{:03}",
                self.hours, self.minutes, self.seconds, separator, self.frames
            )
        } else {
            write!(
                f,
                "{:02}:{:02}:{:02}{}{:02}",
                self.hours, self.minutes, self.seconds, separator, self.frames
            )
        }
    }
}
