use chrono::{DateTime, Duration, Utc};
use std::fmt;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindowError {
    InvalidHalfWidth,
}

impl std::error::Error for TimeWindowError {}

impl fmt::Display for TimeWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeWindowError::InvalidHalfWidth => {
                write!(f, "Window half-width must be a non-negative number of hours")
            }
        }
    }
}

/// Closed interval of absolute instants. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Builds `[center - half_width_hours, center + half_width_hours]`. Fractional hours are
    /// honored to the millisecond. Bounds saturate at the representable range instead of
    /// overflowing.
    pub fn around(center: DateTime<Utc>, half_width_hours: f64) -> Result<Self, TimeWindowError> {
        if !half_width_hours.is_finite() || half_width_hours < 0.0 {
            return Err(TimeWindowError::InvalidHalfWidth);
        }

        // Float-to-int casts saturate, so absurd widths become i64::MAX
        let millis = (half_width_hours * MILLIS_PER_HOUR).round() as i64;
        let half_width = Duration::try_milliseconds(millis).unwrap_or(Duration::MAX);

        Ok(Self::around_duration(center, half_width))
    }

    pub fn around_duration(center: DateTime<Utc>, half_width: Duration) -> Self {
        let half_width = half_width.abs();

        Self {
            start: center
                .checked_sub_signed(half_width)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: center
                .checked_add_signed(half_width)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_around() {
        let window = TimeWindow::around(noon(), 2.0).unwrap();

        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 1, 1, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let window = TimeWindow::around(noon(), 2.0).unwrap();

        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(window.contains(noon()));
        assert!(!window.contains(window.start - Duration::milliseconds(1)));
        assert!(!window.contains(window.end + Duration::milliseconds(1)));
    }

    #[test]
    fn test_zero_width_is_a_point() {
        let window = TimeWindow::around(noon(), 0.0).unwrap();

        assert_eq!(window.start, noon());
        assert_eq!(window.end, noon());
        assert!(window.contains(noon()));
        assert!(!window.contains(noon() + Duration::milliseconds(1)));
    }

    #[test]
    fn test_fractional_hours() {
        let window = TimeWindow::around(noon(), 1.5).unwrap();

        assert_eq!(window.start, noon() - Duration::minutes(90));
        assert_eq!(window.end, noon() + Duration::minutes(90));
    }

    #[test]
    fn test_multi_week_width() {
        let window = TimeWindow::around(noon(), 24.0 * 7.0 * 6.0).unwrap();

        assert_eq!(window.start, noon() - Duration::weeks(6));
        assert_eq!(window.end, noon() + Duration::weeks(6));
    }

    #[test]
    fn test_huge_width_saturates() {
        let window = TimeWindow::around(noon(), 1e30).unwrap();

        assert_eq!(window.start, DateTime::<Utc>::MIN_UTC);
        assert_eq!(window.end, DateTime::<Utc>::MAX_UTC);
        assert!(window.contains(noon()));

        let window = TimeWindow::around_duration(DateTime::<Utc>::MAX_UTC, Duration::hours(2));
        assert_eq!(window.end, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_rejects_invalid_widths() {
        assert_eq!(
            TimeWindow::around(noon(), -1.0).unwrap_err(),
            TimeWindowError::InvalidHalfWidth
        );
        assert!(TimeWindow::around(noon(), f64::NAN).is_err());
        assert!(TimeWindow::around(noon(), f64::INFINITY).is_err());
    }
}
