use std::fmt;

/// A duration split the way the card's counter shows it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Elapsed {
    pub fn from_seconds(total: u64) -> Self {
        Self {
            days: total / 86_400,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        }
    }

    /// Whole seconds between two millisecond timestamps; negative spans count as zero
    pub fn between_millis(start_ms: f64, now_ms: f64) -> Self {
        let seconds = ((now_ms - start_ms) / 1000.0).floor();
        Self::from_seconds(if seconds.is_finite() && seconds > 0.0 { seconds as u64 } else { 0 })
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Days {} Hours {} Minutes {} Seconds",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

pub fn elapsed_text(seconds: u64) -> String {
    Elapsed::from_seconds(seconds).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_text() {
        assert_eq!(elapsed_text(0), "0 Days 0 Hours 0 Minutes 0 Seconds");
        assert_eq!(elapsed_text(90_061), "1 Days 1 Hours 1 Minutes 1 Seconds");
        assert_eq!(elapsed_text(86_399), "0 Days 23 Hours 59 Minutes 59 Seconds");
    }

    #[test]
    fn test_between_millis() {
        assert_eq!(Elapsed::between_millis(1_000.0, 62_999.0), Elapsed::from_seconds(61));
        assert_eq!(Elapsed::between_millis(5_000.0, 0.0), Elapsed::from_seconds(0));
    }
}
