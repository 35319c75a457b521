//! Simulation epochs measured in Julian centuries from J2000.0.

/// Julian date of J2000.0.
const J2000_JD: f64 = 2_451_545.0;

/// Days in a Julian century.
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// A point in simulated time, in Julian centuries since J2000.0.
///
/// Motion-bucket intervals and the re-index delta use the same unit, so
/// comparisons never need a conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Epoch(f64);

impl Epoch {
    /// J2000.0, the epoch catalog positions are given for.
    pub const J2000: Epoch = Epoch(0.0);

    /// Epoch from Julian centuries since J2000.0.
    #[must_use]
    pub fn from_julian_centuries(centuries: f64) -> Self {
        Self(centuries)
    }

    /// Epoch from a Julian year such as `2000.0` or `2150.5`.
    #[must_use]
    pub fn from_julian_year(year: f64) -> Self {
        Self((year - 2000.0) / 100.0)
    }

    /// Epoch from a Julian date.
    #[must_use]
    pub fn from_julian_date(jd: f64) -> Self {
        Self((jd - J2000_JD) / DAYS_PER_CENTURY)
    }

    /// Julian centuries since J2000.0.
    #[must_use]
    pub fn julian_centuries(self) -> f64 {
        self.0
    }

    /// The Julian year of this epoch.
    #[must_use]
    pub fn julian_year(self) -> f64 {
        2000.0 + self.0 * 100.0
    }

    /// Signed years from `earlier` to `self`.
    #[must_use]
    pub fn years_since(self, earlier: Epoch) -> f64 {
        (self.0 - earlier.0) * 100.0
    }

    /// Absolute distance between two epochs in Julian centuries.
    #[must_use]
    pub fn centuries_between(self, other: Epoch) -> f64 {
        (self.0 - other.0).abs()
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "J{:.1}", self.julian_year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_j2000_is_zero() {
        assert_eq!(Epoch::from_julian_year(2000.0), Epoch::J2000);
        assert_eq!(Epoch::from_julian_date(J2000_JD), Epoch::J2000);
    }

    #[test]
    fn test_year_conversion() {
        let epoch = Epoch::from_julian_year(2150.0);
        assert!((epoch.julian_centuries() - 1.5).abs() < 1e-12);
        assert!((epoch.julian_year() - 2150.0).abs() < 1e-9);
    }

    #[test]
    fn test_years_since_is_signed() {
        let a = Epoch::from_julian_year(1900.0);
        let b = Epoch::from_julian_year(2000.0);
        assert!((b.years_since(a) - 100.0).abs() < 1e-9);
        assert!((a.years_since(b) + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_centuries_between_is_absolute() {
        let a = Epoch::from_julian_centuries(-3.0);
        let b = Epoch::from_julian_centuries(2.0);
        assert_eq!(a.centuries_between(b), 5.0);
        assert_eq!(b.centuries_between(a), 5.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Epoch::from_julian_year(2024.0).to_string(), "J2024.0");
    }
}
