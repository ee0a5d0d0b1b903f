//! Geographic coordinate types and spatial utilities.
//!
//! `GeoPoint` uses `f64` (double-precision) latitude/longitude.  Edge-length
//! apportionment across grid cells must balance to one part in a million, and
//! clip parameters computed from f32 coordinates drift past that at city
//! scale, so the extra 4 bytes per axis buy exactness where it matters.
//!
//! Distances come in two flavours: raw degree-space Euclidean distance (what
//! the k-d tree orders by) and Manhattan miles under a [`DegreeScale`] (what
//! driver ETAs are estimated from).

/// A WGS-84 geographic coordinate stored as double-precision floats.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Straight-line distance in degree space, treating lat/lon as a plane.
    ///
    /// Not a physical distance — longitude degrees shrink with latitude — but
    /// a consistent total order over nearby points, which is all the
    /// nearest-node index needs.
    #[inline]
    pub fn euclidean_deg(self, other: GeoPoint) -> f64 {
        let d_lat = self.lat - other.lat;
        let d_lon = self.lon - other.lon;
        (d_lat * d_lat + d_lon * d_lon).sqrt()
    }

    /// Taxicab distance in miles under the given degree-to-mile scale.
    ///
    /// Matches how vehicles actually traverse a street grid, which is why
    /// driver ETA estimation uses it instead of straight-line distance.
    #[inline]
    pub fn manhattan_miles(self, other: GeoPoint, scale: DegreeScale) -> f64 {
        (self.lat - other.lat).abs() * scale.miles_per_lat_degree
            + (self.lon - other.lon).abs() * scale.miles_per_lon_degree
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── DegreeScale ───────────────────────────────────────────────────────────────

/// Linear degree-to-mile conversion factors for a latitude band.
///
/// One degree of latitude is ~69 mi everywhere; one degree of longitude
/// shrinks with the cosine of the latitude.  The defaults are calibrated for
/// the 40–41°N band (New York City): 60.0 mi/°lat and 45.5 mi/°lon as
/// street-grid (taxicab) factors.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DegreeScale {
    pub miles_per_lat_degree: f64,
    pub miles_per_lon_degree: f64,
}

impl Default for DegreeScale {
    fn default() -> Self {
        Self {
            miles_per_lat_degree: 60.0,
            miles_per_lon_degree: 45.5,
        }
    }
}

// ── GeoBounds ─────────────────────────────────────────────────────────────────

/// An axis-aligned bounding rectangle in degree space.
///
/// Closed on all four sides: points exactly on the boundary are contained.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoBounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self { min_lat, min_lon, max_lat, max_lon }
    }

    /// Tightest bounds around a point set, or `None` for an empty set.
    pub fn from_points<I>(points: I) -> Option<GeoBounds>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = GeoBounds::new(first.lat, first.lon, first.lat, first.lon);
        for p in iter {
            b.min_lat = b.min_lat.min(p.lat);
            b.min_lon = b.min_lon.min(p.lon);
            b.max_lat = b.max_lat.max(p.lat);
            b.max_lon = b.max_lon.max(p.lon);
        }
        Some(b)
    }

    #[inline]
    pub fn contains(self, p: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lon..=self.max_lon).contains(&p.lon)
    }

    #[inline]
    pub fn lat_span(self) -> f64 {
        self.max_lat - self.min_lat
    }

    #[inline]
    pub fn lon_span(self) -> f64 {
        self.max_lon - self.min_lon
    }
}

impl std::fmt::Display for GeoBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.4}, {:.4}] x [{:.4}, {:.4}]",
            self.min_lat, self.max_lat, self.min_lon, self.max_lon
        )
    }
}
