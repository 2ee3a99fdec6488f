//! Axis calibration: the (minimum, maximum, resolution) triple.

use std::fmt;

use thiserror::Error;

/// Calibration of one absolute axis on one device.
///
/// `resolution` is in units per millimetre (units per radian for rotational
/// axes), as reported by the kernel's `input_absinfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisCalibration {
    pub minimum: i32,
    pub maximum: i32,
    pub resolution: i32,
}

/// Why a calibration cannot take part in a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalibrationError {
    #[error("maximum {maximum} is below minimum {minimum}")]
    InvertedRange { minimum: i32, maximum: i32 },

    #[error("resolution must be positive, got {0}")]
    ZeroResolution(i32),
}

impl AxisCalibration {
    #[must_use]
    pub fn new(minimum: i32, maximum: i32, resolution: i32) -> Self {
        Self {
            minimum,
            maximum,
            resolution,
        }
    }

    /// Width of the range in device units, computed without overflow.
    #[must_use]
    pub fn span(&self) -> f64 {
        f64::from(self.maximum) - f64::from(self.minimum)
    }

    /// Midpoint of the range, possibly fractional.
    #[must_use]
    pub fn center(&self) -> f64 {
        f64::from(self.minimum) + self.span() / 2.0
    }

    /// Saturate `value` into `[minimum, maximum]`.
    #[must_use]
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.minimum, self.maximum.max(self.minimum))
    }

    /// Check the invariants required of an axis that is remapped.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.maximum < self.minimum {
            return Err(CalibrationError::InvertedRange {
                minimum: self.minimum,
                maximum: self.maximum,
            });
        }
        if self.resolution <= 0 {
            return Err(CalibrationError::ZeroResolution(self.resolution));
        }
        Ok(())
    }
}

impl fmt::Display for AxisCalibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] @ {} units/mm",
            self.minimum, self.maximum, self.resolution
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_calibration() {
        assert!(AxisCalibration::new(0, 1000, 10).validate().is_ok());
        assert!(AxisCalibration::new(5, 5, 1).validate().is_ok());
    }

    #[test]
    fn inverted_range_rejected() {
        let err = AxisCalibration::new(10, 0, 1).validate().unwrap_err();
        assert_eq!(
            err,
            CalibrationError::InvertedRange {
                minimum: 10,
                maximum: 0
            }
        );
    }

    #[test]
    fn zero_and_negative_resolution_rejected() {
        assert_eq!(
            AxisCalibration::new(0, 100, 0).validate(),
            Err(CalibrationError::ZeroResolution(0))
        );
        assert_eq!(
            AxisCalibration::new(0, 100, -3).validate(),
            Err(CalibrationError::ZeroResolution(-3))
        );
    }

    #[test]
    fn span_and_center_do_not_overflow() {
        let wide = AxisCalibration::new(i32::MIN, i32::MAX, 1);
        assert_eq!(wide.span(), f64::from(u32::MAX));
        assert_eq!(wide.center(), -0.5);
    }

    #[test]
    fn clamp_saturates() {
        let cal = AxisCalibration::new(-50, 50, 1);
        assert_eq!(cal.clamp(-51), -50);
        assert_eq!(cal.clamp(0), 0);
        assert_eq!(cal.clamp(900), 50);
    }
}
