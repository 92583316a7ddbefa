//! Reference ranges and value interpretation.
//!
//! A value is compared against the critical bounds first, then the normal bounds. Absolute
//! bounds are not used for interpretation; they mark values that cannot be real measurements
//! and are enforced by form validation instead.

/// Reference bounds for a numeric concept. Any bound may be unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReferenceRange {
    pub low_absolute: Option<f64>,
    pub low_critical: Option<f64>,
    pub low_normal: Option<f64>,
    pub hi_normal: Option<f64>,
    pub hi_critical: Option<f64>,
    pub hi_absolute: Option<f64>,
}

/// Adult BMI bands: normal 18.5 to 25, critical at 30 and above or 16 and below.
pub const BMI_REFERENCE_RANGE: ReferenceRange = ReferenceRange {
    low_absolute: None,
    low_critical: Some(16.0),
    low_normal: Some(18.5),
    hi_normal: Some(25.0),
    hi_critical: Some(30.0),
    hi_absolute: None,
};

/// How a value sits relative to its reference range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpretation {
    Normal,
    High,
    CriticallyHigh,
    Low,
    CriticallyLow,
}

impl Interpretation {
    /// Style class for abnormal values; `None` when the value is normal.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Interpretation::Normal => None,
            _ => Some("danger"),
        }
    }

    pub fn is_abnormal(self) -> bool {
        self != Interpretation::Normal
    }
}

impl ReferenceRange {
    /// Interpret `value` against this range.
    pub fn interpret(&self, value: f64) -> Interpretation {
        if self.hi_critical.is_some_and(|hi| value >= hi) {
            return Interpretation::CriticallyHigh;
        }
        if self.hi_normal.is_some_and(|hi| value > hi) {
            return Interpretation::High;
        }
        if self.low_critical.is_some_and(|low| value <= low) {
            return Interpretation::CriticallyLow;
        }
        if self.low_normal.is_some_and(|low| value < low) {
            return Interpretation::Low;
        }
        Interpretation::Normal
    }

    /// Whether `value` lies within the absolute bounds (inclusive). Unknown bounds pass.
    pub fn within_absolute(&self, value: f64) -> bool {
        self.low_absolute.map_or(true, |low| value >= low)
            && self.hi_absolute.map_or(true, |hi| value <= hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn systolic() -> ReferenceRange {
        ReferenceRange {
            low_absolute: Some(0.0),
            low_critical: Some(70.0),
            low_normal: Some(100.0),
            hi_normal: Some(140.0),
            hi_critical: Some(180.0),
            hi_absolute: Some(250.0),
        }
    }

    #[test]
    fn interprets_each_band() {
        let range = systolic();
        assert_eq!(range.interpret(120.0), Interpretation::Normal);
        assert_eq!(range.interpret(140.0), Interpretation::Normal);
        assert_eq!(range.interpret(141.0), Interpretation::High);
        assert_eq!(range.interpret(180.0), Interpretation::CriticallyHigh);
        assert_eq!(range.interpret(99.0), Interpretation::Low);
        assert_eq!(range.interpret(70.0), Interpretation::CriticallyLow);
    }

    #[test]
    fn unknown_bounds_are_normal() {
        let range = ReferenceRange::default();
        assert_eq!(range.interpret(-5.0), Interpretation::Normal);
        assert_eq!(range.interpret(1e6), Interpretation::Normal);
        assert!(range.within_absolute(1e6));
    }

    #[test]
    fn bmi_above_25_is_danger() {
        let interpretation = BMI_REFERENCE_RANGE.interpret(25.7);
        assert_eq!(interpretation, Interpretation::High);
        assert_eq!(interpretation.css_class(), Some("danger"));
        assert_eq!(BMI_REFERENCE_RANGE.interpret(22.0).css_class(), None);
        assert_eq!(
            BMI_REFERENCE_RANGE.interpret(31.0),
            Interpretation::CriticallyHigh
        );
        assert_eq!(BMI_REFERENCE_RANGE.interpret(17.0), Interpretation::Low);
    }

    #[test]
    fn absolute_bounds_are_inclusive() {
        let range = systolic();
        assert!(range.within_absolute(0.0));
        assert!(range.within_absolute(250.0));
        assert!(!range.within_absolute(250.5));
        assert!(!range.within_absolute(-1.0));
    }
}
