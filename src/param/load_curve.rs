//! Time curves attached to parameters.

use tracing::trace;

use crate::archive::{IArchive, OArchive, CID_LC_EXTEND, CID_LC_INTERPOLATION, CID_LC_POINT};
use crate::util::Result;

/// One control point of a load curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadPoint {
    pub time: f64,
    pub value: f64,
}

impl LoadPoint {
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// How values between control points are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Hold the value of the previous point.
    Step,
    /// Cubic Hermite with Catmull-Rom tangents.
    Smooth,
}

impl Interpolation {
    fn tag(self) -> i32 {
        match self {
            Self::Linear => 0,
            Self::Step => 1,
            Self::Smooth => 2,
        }
    }

    fn from_tag(tag: i32) -> Self {
        match tag {
            1 => Self::Step,
            2 => Self::Smooth,
            _ => Self::Linear,
        }
    }
}

/// How values outside the control point range are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Extend {
    /// Hold the first/last value.
    #[default]
    Constant,
    /// Continue the first/last segment linearly.
    Extrapolate,
    /// Repeat the curve periodically.
    Repeat,
    /// Repeat the curve, offsetting each period by the end-to-end change.
    RepeatOffset,
}

impl Extend {
    fn tag(self) -> i32 {
        match self {
            Self::Constant => 0,
            Self::Extrapolate => 1,
            Self::Repeat => 2,
            Self::RepeatOffset => 3,
        }
    }

    fn from_tag(tag: i32) -> Self {
        match tag {
            1 => Self::Extrapolate,
            2 => Self::Repeat,
            3 => Self::RepeatOffset,
            _ => Self::Constant,
        }
    }
}

/// Piecewise curve describing how a parameter varies over an analysis.
///
/// The id is assigned by [`CurveList`](super::CurveList) at export time;
/// `0` means the curve has not been registered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadCurve {
    id: i32,
    points: Vec<LoadPoint>,
    pub interpolation: Interpolation,
    pub extend: Extend,
}

impl LoadCurve {
    /// Create an empty, unregistered curve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a curve from control points. Points are sorted by time.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut lc = Self::new();
        for (t, v) in points {
            lc.add(t, v);
        }
        lc
    }

    #[inline]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[inline]
    pub fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    /// True once an export list has assigned a positive id.
    #[inline]
    pub fn is_registered(&self) -> bool {
        self.id > 0
    }

    /// Number of control points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[LoadPoint] {
        &self.points
    }

    pub fn point(&self, i: usize) -> Option<LoadPoint> {
        self.points.get(i).copied()
    }

    /// Insert a point keeping times ordered. Returns its index.
    pub fn add(&mut self, time: f64, value: f64) -> usize {
        let idx = self.points.partition_point(|p| p.time <= time);
        self.points.insert(idx, LoadPoint::new(time, value));
        idx
    }

    pub fn remove(&mut self, i: usize) -> Option<LoadPoint> {
        (i < self.points.len()).then(|| self.points.remove(i))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Evaluate the curve at time `t`.
    pub fn value(&self, t: f64) -> f64 {
        let n = self.points.len();
        match n {
            0 => return 0.0,
            1 => return self.points[0].value,
            _ => {}
        }

        let first = self.points[0];
        let last = self.points[n - 1];
        let span = last.time - first.time;

        if t < first.time || t > last.time {
            match self.extend {
                Extend::Constant => {
                    return if t < first.time { first.value } else { last.value };
                }
                Extend::Extrapolate => {
                    let (a, b) = if t < first.time {
                        (first, self.points[1])
                    } else {
                        (self.points[n - 2], last)
                    };
                    let dt = b.time - a.time;
                    if dt == 0.0 {
                        return a.value;
                    }
                    return a.value + (t - a.time) * (b.value - a.value) / dt;
                }
                Extend::Repeat | Extend::RepeatOffset if span > 0.0 => {
                    let cycles = ((t - first.time) / span).floor();
                    let local = t - cycles * span;
                    let base = self.interpolate(local.clamp(first.time, last.time));
                    if self.extend == Extend::RepeatOffset {
                        return base + cycles * (last.value - first.value);
                    }
                    return base;
                }
                _ => return if t < first.time { first.value } else { last.value },
            }
        }

        self.interpolate(t)
    }

    /// Interpolate inside the control point range.
    fn interpolate(&self, t: f64) -> f64 {
        let n = self.points.len();
        // index of the first point strictly after t
        let hi = self.points.partition_point(|p| p.time <= t).clamp(1, n - 1);
        let lo = hi - 1;
        let (a, b) = (self.points[lo], self.points[hi]);
        let dt = b.time - a.time;
        if dt <= 0.0 {
            return b.value;
        }
        let s = (t - a.time) / dt;

        match self.interpolation {
            Interpolation::Step => {
                if t >= b.time {
                    b.value
                } else {
                    a.value
                }
            }
            Interpolation::Linear => a.value + s * (b.value - a.value),
            Interpolation::Smooth => {
                let m0 = if lo > 0 {
                    let p = self.points[lo - 1];
                    (b.value - p.value) / (b.time - p.time) * dt
                } else {
                    b.value - a.value
                };
                let m1 = if hi + 1 < n {
                    let q = self.points[hi + 1];
                    (q.value - a.value) / (q.time - a.time) * dt
                } else {
                    b.value - a.value
                };
                let s2 = s * s;
                let s3 = s2 * s;
                (2.0 * s3 - 3.0 * s2 + 1.0) * a.value
                    + (s3 - 2.0 * s2 + s) * m0
                    + (-2.0 * s3 + 3.0 * s2) * b.value
                    + (s3 - s2) * m1
            }
        }
    }

    /// Write the curve as a sequence of chunks into the current chunk.
    pub fn save(&self, ar: &mut OArchive) -> Result<()> {
        ar.write_chunk(CID_LC_INTERPOLATION, &self.interpolation.tag())?;
        ar.write_chunk(CID_LC_EXTEND, &self.extend.tag())?;
        for p in &self.points {
            ar.write_chunk(CID_LC_POINT, &(p.time, p.value))?;
        }
        Ok(())
    }

    /// Read a curve from the chunks of the current chunk.
    pub fn load(ar: &mut IArchive) -> Result<Self> {
        let mut lc = Self::new();
        while let Some(id) = ar.open_chunk()? {
            match id {
                CID_LC_INTERPOLATION => lc.interpolation = Interpolation::from_tag(ar.read()?),
                CID_LC_EXTEND => lc.extend = Extend::from_tag(ar.read()?),
                CID_LC_POINT => {
                    let (time, value) = ar.read::<(f64, f64)>()?;
                    lc.points.push(LoadPoint::new(time, value));
                }
                _ => trace!(id, "skip unknown load curve chunk"),
            }
            ar.close_chunk()?;
        }
        Ok(lc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> LoadCurve {
        LoadCurve::from_points([(0.0, 0.0), (1.0, 2.0), (2.0, 2.0)])
    }

    #[test]
    fn test_add_keeps_order() {
        let mut lc = LoadCurve::new();
        lc.add(1.0, 10.0);
        lc.add(0.0, 0.0);
        lc.add(0.5, 5.0);
        let times: Vec<f64> = lc.points().iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert!(!lc.is_registered());
    }

    #[test]
    fn test_linear_value() {
        let lc = ramp();
        assert_eq!(lc.value(0.5), 1.0);
        assert_eq!(lc.value(1.5), 2.0);
        assert_eq!(lc.value(-1.0), 0.0);
        assert_eq!(lc.value(5.0), 2.0);
    }

    #[test]
    fn test_step_value() {
        let mut lc = ramp();
        lc.interpolation = Interpolation::Step;
        assert_eq!(lc.value(0.99), 0.0);
        assert_eq!(lc.value(1.0), 2.0);
    }

    #[test]
    fn test_smooth_hits_points() {
        let mut lc = ramp();
        lc.interpolation = Interpolation::Smooth;
        assert!((lc.value(0.0) - 0.0).abs() < 1e-12);
        assert!((lc.value(1.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_extend_modes() {
        let mut lc = LoadCurve::from_points([(0.0, 0.0), (1.0, 1.0)]);
        lc.extend = Extend::Extrapolate;
        assert!((lc.value(2.0) - 2.0).abs() < 1e-12);
        assert!((lc.value(-1.0) + 1.0).abs() < 1e-12);

        lc.extend = Extend::Repeat;
        assert!((lc.value(1.25) - 0.25).abs() < 1e-12);

        lc.extend = Extend::RepeatOffset;
        assert!((lc.value(1.25) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut lc = ramp();
        assert!(lc.remove(9).is_none());
        assert_eq!(lc.remove(0), Some(LoadPoint::new(0.0, 0.0)));
        assert_eq!(lc.len(), 2);
    }
}
