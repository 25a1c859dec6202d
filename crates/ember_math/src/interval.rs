/// A closed range of ray parameters or coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// An empty interval (min > max, contains nothing).
    pub const EMPTY: Interval = Interval {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    /// A universe interval (contains everything).
    pub const UNIVERSE: Interval = Interval {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns the size of the interval (max - min).
    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// Returns true if x is within [min, max].
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Returns true if x is strictly within (min, max).
    pub fn surrounds(&self, x: f64) -> bool {
        self.min < x && x < self.max
    }

    /// Hit-range test: `min` is exclusive, `max` is inclusive.
    ///
    /// Every primitive reports intersections with `t` in `(min, max]`, so a
    /// hit exactly at the current closest distance is still accepted.
    #[inline]
    pub fn accepts(&self, t: f64) -> bool {
        self.min < t && t <= self.max
    }

    /// Clamps x to be within [min, max]. Never panics, even on `EMPTY`.
    pub fn clamp(&self, x: f64) -> f64 {
        x.max(self.min).min(self.max)
    }

    /// Expands the interval by delta/2 on each side.
    pub fn expand(&self, delta: f64) -> Interval {
        let padding = delta / 2.0;
        Interval::new(self.min - padding, self.max + padding)
    }

    /// Adds a scalar displacement to both min and max.
    pub fn add_scalar(&self, displacement: f64) -> Interval {
        Interval::new(self.min + displacement, self.max + displacement)
    }

    /// Creates an interval that surrounds two other intervals.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_size() {
        assert_eq!(Interval::new(2.0, 7.0).size(), 5.0);
        assert_eq!(Interval::new(-5.0, 5.0).size(), 10.0);
    }

    #[test]
    fn test_interval_contains_and_surrounds() {
        let interval = Interval::new(0.0, 10.0);

        assert!(interval.contains(0.0));
        assert!(interval.contains(10.0));
        assert!(!interval.contains(10.1));

        assert!(!interval.surrounds(0.0));
        assert!(!interval.surrounds(10.0));
        assert!(interval.surrounds(5.0));
    }

    #[test]
    fn test_interval_accepts_is_half_open() {
        let interval = Interval::new(0.001, 4.0);

        assert!(!interval.accepts(0.001));
        assert!(interval.accepts(0.002));
        assert!(interval.accepts(4.0));
        assert!(!interval.accepts(4.0001));
        assert!(!interval.accepts(f64::NAN));
    }

    #[test]
    fn test_interval_clamp() {
        let interval = Interval::new(0.0, 10.0);

        assert_eq!(interval.clamp(-5.0), 0.0);
        assert_eq!(interval.clamp(5.0), 5.0);
        assert_eq!(interval.clamp(15.0), 10.0);
    }

    #[test]
    fn test_interval_expand() {
        let expanded = Interval::new(0.0, 10.0).expand(4.0);

        // 2.0 on each side
        assert_eq!(expanded.min, -2.0);
        assert_eq!(expanded.max, 12.0);
    }

    #[test]
    fn test_interval_empty_and_universe() {
        assert!(!Interval::EMPTY.contains(0.0));
        assert!(Interval::UNIVERSE.contains(1e300));
        assert!(Interval::UNIVERSE.accepts(-1e300));

        let merged = Interval::surrounding(&Interval::EMPTY, &Interval::new(1.0, 2.0));
        assert_eq!(merged, Interval::new(1.0, 2.0));
    }
}
