//! Exact rational time and frame-based timecode
//!
//! All time values inside the crate are exact rational seconds
//! (`Fraction`). Conversion to frame-quantized timecode happens only at the
//! edges, through [`Timecode`].
//!
//! FCPXML expresses time as `"<seconds>s"` or `"<numerator>/<denominator>s"`,
//! e.g. `"3600s"` or `"1001/30000s"`.

pub mod errors;
pub mod frame_rate;
pub mod timecode;

pub use errors::{TimeError, TimecodeError};
pub use frame_rate::FrameRate;
pub use timecode::{SubFramesBase, Timecode};

use num_rational::Ratio;
use once_cell::sync::Lazy;
use regex::Regex;

/// Exact rational seconds
pub type Fraction = Ratio<i64>;

static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+)(?:/(\d+))?s$").expect("valid time regex"));

/// Zero seconds
pub fn zero() -> Fraction {
    Fraction::from_integer(0)
}

/// Whole seconds as a fraction
pub fn seconds(value: i64) -> Fraction {
    Fraction::from_integer(value)
}

/// Parse an FCPXML time string into exact rational seconds.
///
/// ```
/// use daw_interchange::time::{parse_time, Fraction};
/// assert_eq!(parse_time("1001/30000s").unwrap(), Fraction::new(1001, 30000));
/// assert_eq!(parse_time("3600s").unwrap(), Fraction::from_integer(3600));
/// ```
pub fn parse_time(value: &str) -> Result<Fraction, TimeError> {
    let trimmed = value.trim();
    let captures = TIME_PATTERN
        .captures(trimmed)
        .ok_or_else(|| TimeError::Malformed(value.to_string()))?;

    let numerator: i64 = captures[1]
        .parse()
        .map_err(|_| TimeError::Malformed(value.to_string()))?;

    let denominator: i64 = match captures.get(2) {
        Some(d) => d
            .as_str()
            .parse()
            .map_err(|_| TimeError::Malformed(value.to_string()))?,
        None => 1,
    };

    if denominator == 0 {
        return Err(TimeError::ZeroDenominator(value.to_string()));
    }

    Ok(Fraction::new(numerator, denominator))
}

/// Format rational seconds as an FCPXML time string (reduced form)
pub fn format_time(value: Fraction) -> String {
    let value = value.reduced();
    if value.is_integer() {
        format!("{}s", value.numer())
    } else {
        format!("{}/{}s", value.numer(), value.denom())
    }
}

/// Lossy conversion for display and for interchange formats that store real seconds
pub fn to_f64(value: Fraction) -> f64 {
    *value.numer() as f64 / *value.denom() as f64
}

/// Round to 8 decimal places, used when comparing range bounds
pub fn rounded(value: Fraction) -> f64 {
    (to_f64(value) * 1e8).round() / 1e8
}

pub fn is_negative(value: Fraction) -> bool {
    value < zero()
}
