//! Shared DAW marker representation
//!
//! Format adapters (session text, track archives, subtitle and MIDI files)
//! exchange markers through [`DawMarker`]. Each adapter stores time in its own
//! way, so a marker carries one of three [`MarkerTime`] forms and can be
//! re-expressed as a timecode or as real seconds against a timeline start.

use crate::fcpxml::annotations::{Annotation, MarkerKind};
use crate::fcpxml::extraction::ExtractedAnnotation;
use crate::time::{to_f64, FrameRate, Fraction, SubFramesBase, Timecode, TimecodeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("Timecode error: {0}")]
    Timecode(#[from] TimecodeError),

    #[error("Real time {0} is not a finite, non-negative number of seconds")]
    InvalidRealTime(f64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DawMarkerKind {
    Comment,
    Chapter,
    ToDo,
}

/// Marker position as stored by an adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarkerTime {
    /// Seconds from the timeline start
    RealTimeRelativeToStart(f64),
    /// Absolute timecode string (`01:00:07:00.40`, `;` for drop frame)
    AbsoluteTimecode(String),
    /// Exact seconds from the timeline start
    RationalRelativeToStart(Fraction),
}

/// Which [`MarkerTime`] form to produce when converting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerTimeStyle {
    RealTime,
    #[default]
    Timecode,
    Rational,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DawMarker {
    pub kind: DawMarkerKind,
    pub name: String,
    pub comment: Option<String>,
    pub time: MarkerTime,
    pub frame_rate: FrameRate,
    pub subframes_base: SubFramesBase,
}

impl DawMarker {
    /// Convert an extracted annotation. `timeline_start` is the absolute start
    /// of the timeline the relative forms are measured from (a project's
    /// `tcStart`).
    pub fn from_extracted(
        extracted: &ExtractedAnnotation,
        timeline_start: Fraction,
        style: MarkerTimeStyle,
    ) -> Result<Self, InterchangeError> {
        let subframes_base = extracted
            .timecode
            .map(|timecode| timecode.subframes_base)
            .unwrap_or_default();
        let relative = extracted.absolute_start - timeline_start;

        let time = match style {
            MarkerTimeStyle::RealTime => MarkerTime::RealTimeRelativeToStart(to_f64(relative)),
            MarkerTimeStyle::Rational => MarkerTime::RationalRelativeToStart(relative),
            MarkerTimeStyle::Timecode => {
                let timecode = match extracted.timecode {
                    Some(timecode) => timecode,
                    None => Timecode::from_seconds(extracted.absolute_start, extracted.frame_rate, subframes_base)?,
                };
                MarkerTime::AbsoluteTimecode(timecode.to_string_with_subframes())
            }
        };

        let kind = match &extracted.annotation {
            Annotation::Marker(marker) => match marker.kind {
                MarkerKind::Standard => DawMarkerKind::Comment,
                MarkerKind::Chapter { .. } => DawMarkerKind::Chapter,
                MarkerKind::ToDo { .. } => DawMarkerKind::ToDo,
            },
            Annotation::Keyword(_) | Annotation::Caption(_) => DawMarkerKind::Comment,
        };

        Ok(Self {
            kind,
            name: extracted.name(),
            comment: extracted.annotation.note().map(str::to_string),
            time,
            frame_rate: extracted.frame_rate,
            subframes_base,
        })
    }

    /// Absolute timecode of this marker on a timeline starting at `start`
    pub fn resolve_timecode(&self, start: Fraction) -> Result<Timecode, InterchangeError> {
        match &self.time {
            MarkerTime::RealTimeRelativeToStart(seconds) => {
                let absolute = to_f64(start) + seconds;
                if !absolute.is_finite() || absolute < 0.0 {
                    return Err(InterchangeError::InvalidRealTime(*seconds));
                }
                // Quantize down at sub-frame resolution; the epsilon absorbs float
                // error just below a boundary
                let base = u64::from(self.subframes_base.value());
                let total = (absolute * to_f64(self.frame_rate.fps()) * base as f64 + 1e-6).floor() as u64;
                Ok(Timecode::from_frame_count(
                    total / base,
                    (total % base) as u32,
                    self.frame_rate,
                    self.subframes_base,
                ))
            }
            MarkerTime::RationalRelativeToStart(relative) => {
                Ok(Timecode::from_seconds(start + relative, self.frame_rate, self.subframes_base)?)
            }
            MarkerTime::AbsoluteTimecode(text) => Ok(Timecode::parse(text, self.frame_rate, self.subframes_base)?),
        }
    }

    /// Seconds from `start` to this marker
    pub fn real_time_seconds(&self, start: Fraction) -> Result<f64, InterchangeError> {
        match &self.time {
            MarkerTime::RealTimeRelativeToStart(seconds) => Ok(*seconds),
            MarkerTime::RationalRelativeToStart(relative) => Ok(to_f64(*relative)),
            MarkerTime::AbsoluteTimecode(text) => {
                let timecode = Timecode::parse(text, self.frame_rate, self.subframes_base)?;
                Ok(to_f64(timecode.to_seconds() - start))
            }
        }
    }
}

/// Convert every extracted annotation, stopping at the first failure
pub fn markers_from_extracted<'a>(
    annotations: impl IntoIterator<Item = &'a ExtractedAnnotation>,
    timeline_start: Fraction,
    style: MarkerTimeStyle,
) -> Result<Vec<DawMarker>, InterchangeError> {
    annotations
        .into_iter()
        .map(|annotation| DawMarker::from_extracted(annotation, timeline_start, style))
        .collect()
}

pub fn to_json(markers: &[DawMarker]) -> Result<String, InterchangeError> {
    Ok(serde_json::to_string_pretty(markers)?)
}

pub fn from_json(json: &str) -> Result<Vec<DawMarker>, InterchangeError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::seconds;

    fn marker(time: MarkerTime) -> DawMarker {
        DawMarker {
            kind: DawMarkerKind::Comment,
            name: "m".to_string(),
            comment: None,
            time,
            frame_rate: FrameRate::Fps25,
            subframes_base: SubFramesBase::Max80,
        }
    }

    #[test]
    fn test_resolve_timecode_from_each_form() {
        let start = seconds(3600);
        let real = marker(MarkerTime::RealTimeRelativeToStart(7.5));
        assert_eq!(real.resolve_timecode(start).unwrap().to_string(), "01:00:07:12");

        let rational = marker(MarkerTime::RationalRelativeToStart(Fraction::new(15, 2)));
        assert_eq!(rational.resolve_timecode(start).unwrap().to_string(), "01:00:07:12");

        let absolute = marker(MarkerTime::AbsoluteTimecode("01:00:07:12".to_string()));
        assert_eq!(absolute.resolve_timecode(start).unwrap().to_string(), "01:00:07:12");
        assert_eq!(absolute.real_time_seconds(start).unwrap(), 7.48);
    }

    #[test]
    fn test_real_time_lands_on_frame_boundaries() {
        let ntsc = DawMarker {
            frame_rate: FrameRate::Fps29_97,
            ..marker(MarkerTime::RealTimeRelativeToStart(1001.0 / 30000.0 * 10.0))
        };
        let timecode = ntsc.resolve_timecode(seconds(0)).unwrap();
        assert_eq!(timecode.to_string(), "00:00:00:10");
        assert_eq!(timecode.subframes, 0);
    }

    #[test]
    fn test_negative_real_time_is_rejected() {
        let early = marker(MarkerTime::RealTimeRelativeToStart(-1.0));
        assert!(matches!(
            early.resolve_timecode(seconds(0)),
            Err(InterchangeError::InvalidRealTime(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let markers = vec![marker(MarkerTime::RationalRelativeToStart(Fraction::new(1001, 30000)))];
        let json = to_json(&markers).unwrap();
        assert!(json.contains("RationalRelativeToStart"));
        assert_eq!(from_json(&json).unwrap(), markers);
    }
}
