//! Equatorial sky positions, horizon coordinates and proper motion.

use glam::DVec3;

/// Milliarcseconds in one degree.
pub const MAS_PER_DEGREE: f64 = 3_600_000.0;

/// An equatorial position in degrees. Right ascension is kept in `[0, 360)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SkyPoint {
    /// Right ascension in degrees.
    pub ra_deg: f64,
    /// Declination in degrees.
    pub dec_deg: f64,
}

impl SkyPoint {
    /// Build a point, wrapping right ascension into `[0, 360)` and clamping
    /// declination to `[-90, 90]`.
    #[must_use]
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self {
            ra_deg: ra_deg.rem_euclid(360.0),
            dec_deg: dec_deg.clamp(-90.0, 90.0),
        }
    }

    /// Build a point from right ascension in hours.
    #[must_use]
    pub fn from_hours(ra_hours: f64, dec_deg: f64) -> Self {
        Self::new(ra_hours * 15.0, dec_deg)
    }

    /// Right ascension in hours.
    #[must_use]
    pub fn ra_hours(&self) -> f64 {
        self.ra_deg / 15.0
    }

    /// Unit direction with +Z at the north celestial pole and +X at RA 0.
    #[must_use]
    pub fn to_unit_vector(&self) -> DVec3 {
        let (sin_ra, cos_ra) = self.ra_deg.to_radians().sin_cos();
        let (sin_dec, cos_dec) = self.dec_deg.to_radians().sin_cos();
        DVec3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
    }

    /// Angular distance to `other` in degrees.
    ///
    /// Vincenty formula; accurate at every separation.
    #[must_use]
    pub fn angular_separation_deg(&self, other: &SkyPoint) -> f64 {
        let (d1_sin, d1_cos) = self.dec_deg.to_radians().sin_cos();
        let (d2_sin, d2_cos) = other.dec_deg.to_radians().sin_cos();
        let (dl_sin, dl_cos) = (other.ra_deg - self.ra_deg).to_radians().sin_cos();

        let num1 = d2_cos * dl_sin;
        let num2 = d1_cos * d2_sin - d1_sin * d2_cos * dl_cos;
        let denom = d1_sin * d2_sin + d1_cos * d2_cos * dl_cos;
        num1.hypot(num2).atan2(denom).to_degrees()
    }

    /// Altitude and azimuth as seen by `observer`.
    #[must_use]
    pub fn to_horizontal(&self, observer: &Observer) -> Horizontal {
        let hour_angle = (observer.local_sidereal_time_deg - self.ra_deg).to_radians();
        let (sin_lat, cos_lat) = observer.latitude_deg.to_radians().sin_cos();
        let (sin_dec, cos_dec) = self.dec_deg.to_radians().sin_cos();
        let (sin_ha, cos_ha) = hour_angle.sin_cos();

        let sin_alt = (sin_dec * sin_lat + cos_dec * cos_lat * cos_ha).clamp(-1.0, 1.0);
        let alt = sin_alt.asin();
        let denom = cos_lat * alt.cos();

        // Azimuth is undefined at the zenith and at the geographic poles
        let mut az = if denom.abs() < 1e-12 {
            0.0
        } else {
            ((sin_dec - sin_lat * sin_alt) / denom).clamp(-1.0, 1.0).acos()
        };
        if sin_ha > 0.0 {
            az = std::f64::consts::TAU - az;
        }

        Horizontal {
            alt_deg: alt.to_degrees(),
            az_deg: az.to_degrees(),
        }
    }
}

impl std::fmt::Display for SkyPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(ra={:.5}°, dec={:+.5}°)", self.ra_deg, self.dec_deg)
    }
}

/// Horizon coordinates in degrees; azimuth measured from north through east.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Horizontal {
    /// Altitude above the horizon.
    pub alt_deg: f64,
    /// Azimuth in `[0, 360)`.
    pub az_deg: f64,
}

/// Where and when horizon coordinates are computed for.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Observer {
    /// Geodetic latitude in degrees.
    pub latitude_deg: f64,
    /// Local sidereal time in degrees.
    pub local_sidereal_time_deg: f64,
}

/// Proper motion in mas/yr. The RA component includes the `cos δ` factor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProperMotion {
    /// Motion along right ascension, `μα·cos δ`.
    pub ra_mas_yr: f64,
    /// Motion along declination.
    pub dec_mas_yr: f64,
}

impl ProperMotion {
    /// Total angular rate in mas/yr.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.ra_mas_yr.hypot(self.dec_mas_yr)
    }

    /// Direction of motion in degrees, north through east.
    #[must_use]
    pub fn position_angle_deg(&self) -> f64 {
        self.ra_mas_yr.atan2(self.dec_mas_yr).to_degrees().rem_euclid(360.0)
    }

    /// Linearly move `origin` forward by `years` (negative moves backward).
    #[must_use]
    pub fn propagate(&self, origin: &SkyPoint, years: f64) -> SkyPoint {
        let dec = origin.dec_deg + self.dec_mas_yr * years / MAS_PER_DEGREE;
        let cos_dec = origin.dec_deg.to_radians().cos();
        let ra = if cos_dec.abs() < 1e-12 {
            origin.ra_deg
        } else {
            origin.ra_deg + self.ra_mas_yr * years / MAS_PER_DEGREE / cos_dec
        };
        SkyPoint::new(ra, dec)
    }
}
