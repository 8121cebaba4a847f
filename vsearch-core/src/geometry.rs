use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::ops::Add;

/// A coordinate in aperture space: origin at the aperture centre, y pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_from_origin(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    Vertical,
    Oblique,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::Vertical, Orientation::Oblique];

    pub fn opposite(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Oblique,
            Orientation::Oblique => Orientation::Vertical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Orientation::Vertical => "vertical",
            Orientation::Oblique => "oblique",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Length and tilt shared by every line of a run.
///
/// Offsets are derived from these two values only, so a segment's end point is
/// always `start + offset(orientation)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineGeometry {
    pub length: f64,
    /// Tilt of the oblique line away from vertical, clockwise.
    pub oblique_angle_deg: f64,
}

impl Default for LineGeometry {
    fn default() -> Self {
        Self {
            length: 20.0,
            oblique_angle_deg: 20.0,
        }
    }
}

impl LineGeometry {
    pub fn new(length: f64, oblique_angle_deg: f64) -> Self {
        Self {
            length,
            oblique_angle_deg,
        }
    }

    pub fn offset(&self, orientation: Orientation) -> Point {
        match orientation {
            Orientation::Vertical => Point::new(0.0, self.length),
            Orientation::Oblique => {
                let angle = self.oblique_angle_deg.to_radians();
                Point::new(self.length * angle.sin(), self.length * angle.cos())
            }
        }
    }

    pub fn endpoint(&self, orientation: Orientation, start: Point) -> Point {
        start + self.offset(orientation)
    }

    pub fn segment(&self, orientation: Orientation, start: Point) -> LineSegment {
        LineSegment {
            start,
            end: self.endpoint(orientation, start),
            orientation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
    pub orientation: Orientation,
}

impl LineSegment {
    pub fn length(&self) -> f64 {
        (self.end.x - self.start.x).hypot(self.end.y - self.start.y)
    }
}

/// Circular region every segment is drawn in. Lines are placed inside
/// `radius - margin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aperture {
    pub radius: f64,
    pub margin: f64,
}

impl Default for Aperture {
    fn default() -> Self {
        Self {
            radius: 360.0,
            margin: 20.0,
        }
    }
}

impl Aperture {
    pub fn new(radius: f64, margin: f64) -> Self {
        Self { radius, margin }
    }

    pub fn inner_radius(&self) -> f64 {
        self.radius - self.margin
    }

    pub fn contains(&self, p: Point) -> bool {
        p.distance_from_origin() <= self.radius + 1e-9
    }

    pub fn contains_segment(&self, segment: &LineSegment) -> bool {
        self.contains(segment.start) && self.contains(segment.end)
    }

    /// Draws a start point from which a line of either orientation stays inside
    /// the inner radius.
    ///
    /// x is drawn from the columns that leave vertical room for both
    /// orientations, so `y` is only pinned to 0 when the line cannot fit at all
    /// (`radius - margin <= length`).
    pub fn choose_start_point<R: Rng + ?Sized>(&self, line: &LineGeometry, rng: &mut R) -> Point {
        let r = self.inner_radius();
        let x = match self.x_range(line) {
            Some((lo, hi)) => rng.random_range(lo..=hi),
            None if r - line.length >= -r => rng.random_range(-r..=r - line.length),
            None => -r,
        };
        let y = match self.y_range(line, x) {
            Some((lo, hi)) => rng.random_range(lo..=hi),
            None => 0.0,
        };
        Point::new(x, y)
    }

    /// Start columns, within `[-r, r - length]`, for which [`Aperture::y_range`]
    /// is non-empty. `None` when no column fits.
    ///
    /// The feasible start points form the intersection of three disks, so the
    /// columns form one interval. It always contains the column halfway
    /// between the two end offsets whenever `r > length`.
    pub fn x_range(&self, line: &LineGeometry) -> Option<(f64, f64)> {
        let r = self.inner_radius();
        let vertical = line.offset(Orientation::Vertical);
        let oblique = line.offset(Orientation::Oblique);
        let centre = -(vertical.x + oblique.x) / 2.0;
        self.y_range(line, centre)?;

        let lo = self.feasible_edge(line, centre, -r).max(-r);
        let hi = self.feasible_edge(line, centre, r).min(r - line.length);
        (lo <= hi).then_some((lo, hi))
    }

    /// Bisects between a feasible column and an infeasible one, returning the
    /// outermost feasible column found.
    fn feasible_edge(&self, line: &LineGeometry, mut inside: f64, mut outside: f64) -> f64 {
        for _ in 0..60 {
            let mid = 0.5 * (inside + outside);
            if self.y_range(line, mid).is_some() {
                inside = mid;
            } else {
                outside = mid;
            }
        }
        inside
    }

    /// Interval of start `y` values at column `x` for which the start point and
    /// both orientations' end points lie within the inner radius. `None` when
    /// the interval is empty or collapses to a single value.
    pub fn y_range(&self, line: &LineGeometry, x: f64) -> Option<(f64, f64)> {
        let r = self.inner_radius();
        let h = half_chord(r, x);
        let (mut lo, mut hi) = (-h, h);
        for orientation in Orientation::ALL {
            let d = line.offset(orientation);
            let h_end = half_chord(r, x + d.x);
            lo = lo.max(-h_end - d.y);
            hi = hi.min(h_end - d.y);
        }
        (lo < hi).then_some((lo, hi))
    }
}

/// Half the height of the circle of radius `r` at column `u`.
fn half_chord(r: f64, u: f64) -> f64 {
    if r <= 0.0 || u.abs() >= r {
        return 0.0;
    }
    let angle = (u / r).acos();
    if angle == 0.0 || angle == PI {
        return 0.0;
    }
    r * angle.sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn offsets_follow_length_and_angle() {
        let line = LineGeometry::new(20.0, 20.0);
        let v = line.offset(Orientation::Vertical);
        assert_close(v.x, 0.0);
        assert_close(v.y, 20.0);

        let o = line.offset(Orientation::Oblique);
        assert_close(o.x, 20.0 * 20f64.to_radians().sin());
        assert_close(o.y, 20.0 * 20f64.to_radians().cos());
        assert_close(line.segment(Orientation::Oblique, Point::ORIGIN).length(), 20.0);
    }

    #[test]
    fn zero_tilt_oblique_matches_vertical() {
        let line = LineGeometry::new(15.0, 0.0);
        let start = Point::new(3.0, -4.0);
        let a = line.endpoint(Orientation::Vertical, start);
        let b = line.endpoint(Orientation::Oblique, start);
        assert_close(a.x, b.x);
        assert_close(a.y, b.y);
    }

    #[test]
    fn half_chord_is_zero_at_the_rim() {
        assert_eq!(half_chord(340.0, -340.0), 0.0);
        assert_eq!(half_chord(340.0, 340.0), 0.0);
        assert_eq!(half_chord(340.0, 400.0), 0.0);
        assert_close(half_chord(340.0, 0.0), 340.0);
    }

    #[test]
    fn extreme_column_has_no_room() {
        let aperture = Aperture::new(360.0, 20.0);
        let line = LineGeometry::default();
        assert_eq!(aperture.y_range(&line, -340.0), None);
        assert!(aperture.y_range(&line, 0.0).is_some());
    }

    #[test]
    fn start_points_stay_in_the_documented_column_range() {
        let aperture = Aperture::new(360.0, 20.0);
        let line = LineGeometry::new(20.0, 20.0);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..5_000 {
            let p = aperture.choose_start_point(&line, &mut rng);
            assert!((-340.0..=320.0).contains(&p.x), "x = {}", p.x);
            let end = line.endpoint(Orientation::Vertical, p);
            assert!(end.distance_from_origin() <= 360.0);
        }
    }

    #[test]
    fn both_orientations_fit_whenever_radius_exceeds_margin_plus_length() {
        let cases = [
            (Aperture::new(360.0, 20.0), LineGeometry::new(20.0, 20.0)),
            (Aperture::new(100.0, 10.0), LineGeometry::new(30.0, 45.0)),
            (Aperture::new(50.0, 8.0), LineGeometry::new(20.0, 90.0)),
            (Aperture::new(30.0, 1.0), LineGeometry::new(28.0, 20.0)),
            (Aperture::new(100.0, 2.0), LineGeometry::new(40.0, 20.0)),
            (Aperture::new(100.0, 5.0), LineGeometry::new(30.0, 20.0)),
            (Aperture::new(41.0, 0.5), LineGeometry::new(40.0, 90.0)),
        ];
        let mut rng = StdRng::seed_from_u64(11);
        for (aperture, line) in cases {
            assert!(aperture.radius > aperture.margin + line.length);
            assert!(aperture.x_range(&line).is_some(), "{aperture:?} {line:?}");
            for _ in 0..10_000 {
                let start = aperture.choose_start_point(&line, &mut rng);
                for orientation in Orientation::ALL {
                    let seg = line.segment(orientation, start);
                    assert!(aperture.contains_segment(&seg), "{seg:?} escapes {aperture:?}");
                }
            }
        }
    }

    #[test]
    fn column_range_stays_inside_the_nominal_bounds() {
        let aperture = Aperture::new(360.0, 20.0);
        let line = LineGeometry::default();
        let (lo, hi) = aperture.x_range(&line).unwrap();
        assert!(lo >= -340.0 && hi <= 320.0);
        assert!(lo < -339.0 && hi > 319.0);
        assert!(aperture.y_range(&line, lo).is_some());
        assert!(aperture.y_range(&line, hi).is_some());
    }

    #[test]
    fn line_longer_than_the_inner_radius_has_no_columns() {
        let aperture = Aperture::new(30.0, 10.0);
        assert_eq!(aperture.x_range(&LineGeometry::new(45.0, 20.0)), None);
    }

    #[test]
    fn sampled_points_respect_the_margin() {
        let aperture = Aperture::new(360.0, 20.0);
        let line = LineGeometry::default();
        let inner = aperture.inner_radius() + 1e-9;
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..2_000 {
            let start = aperture.choose_start_point(&line, &mut rng);
            assert!(aperture.y_range(&line, start.x).is_some());
            assert!(start.distance_from_origin() <= inner);
            for orientation in Orientation::ALL {
                let end = line.endpoint(orientation, start);
                assert!(end.distance_from_origin() <= inner);
            }
        }
    }
}
