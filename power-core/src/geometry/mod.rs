//! Axis-aligned boxes and swept collision.
//!
//! [`sweep`] moves one box by a velocity over a unit time step against a
//! stationary box and reports the first time of contact. Touching faces count
//! as a hit. A zero velocity on an axis adds no constraint if the boxes
//! overlap or touch on that axis, and rules out any hit if they are apart.

use bevy::math::DVec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    /// Box spanning two corners in any order
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center(center: DVec3, half_extents: DVec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Interiors intersect; shared faces alone do not overlap
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
    }

    pub fn contains(&self, point: DVec3) -> bool {
        self.min.cmple(point).all() && self.max.cmpge(point).all()
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Grown by `amount` on every side
    pub fn expanded(&self, amount: DVec3) -> Self {
        Self::new(self.min - amount, self.max + amount)
    }

    /// Per-axis distance from the box to `point`; zero on axes where it is inside
    pub fn distance_to_point(&self, point: DVec3) -> DVec3 {
        (self.min - point).max(point - self.max).max(DVec3::ZERO)
    }

    /// Center of the face a hit with `normal` lands on.
    ///
    /// A normal along +X hits the min-X face, -X the max-X face, and so on for
    /// Y then Z. Returns `None` for a zero normal.
    pub fn hit_point(&self, normal: DVec3) -> Option<DVec3> {
        let c = self.center();
        if normal.x > 0.0 {
            Some(DVec3::new(self.min.x, c.y, c.z))
        } else if normal.x < 0.0 {
            Some(DVec3::new(self.max.x, c.y, c.z))
        } else if normal.y > 0.0 {
            Some(DVec3::new(c.x, self.min.y, c.z))
        } else if normal.y < 0.0 {
            Some(DVec3::new(c.x, self.max.y, c.z))
        } else if normal.z > 0.0 {
            Some(DVec3::new(c.x, c.y, self.min.z))
        } else if normal.z < 0.0 {
            Some(DVec3::new(c.x, c.y, self.max.z))
        } else {
            None
        }
    }
}

/// Absolute angle between two vectors in degrees; zero if either has no length
pub fn angle_between_degrees(a: DVec3, b: DVec3) -> f64 {
    if a.length_squared() == 0.0 || b.length_squared() == 0.0 {
        return 0.0;
    }
    a.angle_between(b).to_degrees().abs()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Fraction of the step at first contact, in `[0, 1]`
    pub time: f64,
    /// Velocity scaled by `time`: how far the box moves before contact
    pub velocity: DVec3,
    /// Unit axis pointing against the moving box's motion; `None` when the
    /// boxes already overlapped
    pub normal: Option<DVec3>,
}

/// Axes in normal tie-break priority
const AXIS_PRIORITY: [usize; 3] = [0, 2, 1];

enum AxisSweep {
    Miss,
    /// `entry` is set when the boxes are apart on this axis at t=0
    Window {
        entry: Option<f64>,
        exit: f64,
    },
}

/// One axis of the relative motion; `v` is the stationary box's velocity in
/// the moving box's frame
fn sweep_axis(a_min: f64, a_max: f64, b_min: f64, b_max: f64, v: f64) -> AxisSweep {
    let mut exit = f64::INFINITY;
    let mut entry = None;
    if v < 0.0 {
        if b_max < a_min {
            return AxisSweep::Miss;
        }
        if b_max > a_min {
            exit = (a_min - b_max) / v;
        }
        if a_max < b_min {
            entry = Some((a_max - b_min) / v);
        }
    } else if v > 0.0 {
        if b_min > a_max {
            return AxisSweep::Miss;
        }
        if a_max > b_min {
            exit = (a_max - b_min) / v;
        }
        if b_max < a_min {
            entry = Some((a_min - b_max) / v);
        }
    } else if a_max < b_min || b_max < a_min {
        return AxisSweep::Miss;
    }
    AxisSweep::Window { entry, exit }
}

fn axis_normal(axis: usize, v: f64) -> DVec3 {
    let mut normal = DVec3::ZERO;
    normal[axis] = v.signum();
    normal
}

/// Sweep `moving` by `velocity` against `stationary`.
///
/// Returns the earliest contact within the step, or `None` if the boxes never
/// touch during it. Boxes that only share a face count as a hit when the motion
/// pushes them together on that axis; sliding along the face or moving apart
/// is not a hit. A hit without a normal means the boxes already overlap.
pub fn sweep(moving: &BoundingBox, stationary: &BoundingBox, velocity: DVec3) -> Option<SweepHit> {
    if moving.overlaps(stationary) {
        return Some(SweepHit {
            time: 0.0,
            velocity: DVec3::ZERO,
            normal: None,
        });
    }

    let (a, b) = (moving, stationary);
    let v = -velocity;
    let mut hit_time = 0.0_f64;
    let mut out_time = 1.0_f64;
    let mut entries = [None; 3];

    for axis in 0..3 {
        match sweep_axis(a.min[axis], a.max[axis], b.min[axis], b.max[axis], v[axis]) {
            AxisSweep::Miss => return None,
            AxisSweep::Window { entry, exit } => {
                out_time = out_time.min(exit);
                if let Some(t) = entry {
                    hit_time = hit_time.max(t);
                }
                entries[axis] = entry;
            }
        }
    }

    if hit_time > out_time {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for axis in AXIS_PRIORITY {
        if let Some(t) = entries[axis] {
            if best.map_or(true, |(_, best_time)| t > best_time) {
                best = Some((axis, t));
            }
        }
    }
    // contact from t=0: pick the face pair already touching in the direction of travel
    let normal_axis = best.map(|(axis, _)| axis).or_else(|| {
        AXIS_PRIORITY.into_iter().find(|&axis| {
            (v[axis] < 0.0 && a.max[axis] == b.min[axis])
                || (v[axis] > 0.0 && b.max[axis] == a.min[axis])
        })
    })?;

    Some(SweepHit {
        time: hit_time,
        velocity: velocity * hit_time,
        normal: Some(axis_normal(normal_axis, v[normal_axis])),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box_at(x: f64, y: f64, z: f64) -> BoundingBox {
        BoundingBox::new(DVec3::new(x, y, z), DVec3::new(x + 1.0, y + 1.0, z + 1.0))
    }

    #[test]
    fn test_touching_hit_at_end_of_step() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = BoundingBox::new(DVec3::new(3.0, 0.0, 0.0), DVec3::new(4.0, 1.0, 1.0));
        let hit = sweep(&a, &b, DVec3::new(2.0, 0.0, 0.0)).unwrap();
        assert_eq!(hit.time, 1.0);
        assert_eq!(hit.normal, Some(DVec3::new(-1.0, 0.0, 0.0)));
        assert_eq!(hit.velocity, DVec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_moving_away_misses() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(3.0, 0.0, 0.0);
        assert!(sweep(&a, &b, DVec3::new(-2.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_overlapping_immediate_hit() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(0.5, 0.5, 0.5);
        let hit = sweep(&a, &b, DVec3::new(5.0, 0.0, 0.0)).unwrap();
        assert_eq!(hit.time, 0.0);
        assert_eq!(hit.velocity, DVec3::ZERO);
        assert!(hit.normal.is_none());
    }

    #[test]
    fn test_mid_step_hit() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(2.0, 0.0, 0.0);
        let hit = sweep(&a, &b, DVec3::new(4.0, 0.0, 0.0)).unwrap();
        assert_eq!(hit.time, 0.25);
        assert_eq!(hit.velocity, DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_too_slow_misses() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(3.0, 0.0, 0.0);
        assert!(sweep(&a, &b, DVec3::new(1.5, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_zero_velocity_axis_separated_misses() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(2.0, 5.0, 0.0);
        assert!(sweep(&a, &b, DVec3::new(2.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_diagonal_normal_picks_latest_axis() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(2.0, 0.0, 1.5);
        let hit = sweep(&a, &b, DVec3::new(2.0, 0.0, 2.0)).unwrap();
        assert_eq!(hit.time, 0.5);
        assert_eq!(hit.normal, Some(DVec3::new(-1.0, 0.0, 0.0)));

        let c = unit_box_at(1.5, 0.0, 2.0);
        let hit = sweep(&a, &c, DVec3::new(2.0, 0.0, 2.0)).unwrap();
        assert_eq!(hit.normal, Some(DVec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_equal_entry_prefers_x_then_z() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(2.0, 2.0, 2.0);
        let hit = sweep(&a, &b, DVec3::new(2.0, 2.0, 2.0)).unwrap();
        assert_eq!(hit.normal, Some(DVec3::new(-1.0, 0.0, 0.0)));

        let c = unit_box_at(0.0, 2.0, 2.0);
        let hit = sweep(&a, &c, DVec3::new(0.0, 2.0, 2.0)).unwrap();
        assert_eq!(hit.normal, Some(DVec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_touching_at_start() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(1.0, 0.0, 0.0);
        let hit = sweep(&a, &b, DVec3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(hit.time, 0.0);
        assert_eq!(hit.normal, Some(DVec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_touching_faces_without_approach_miss() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(1.0, 0.0, 0.0);
        // separating from a shared face
        assert!(sweep(&a, &b, DVec3::new(-1.0, 0.0, 0.0)).is_none());
        // sliding along it
        assert!(sweep(&a, &b, DVec3::new(0.0, 0.5, 0.0)).is_none());
        // resting against it
        assert!(sweep(&a, &b, DVec3::ZERO).is_none());
        // pushing into it while sliding is still a hit
        let hit = sweep(&a, &b, DVec3::new(0.5, 0.5, 0.0)).unwrap();
        assert_eq!(hit.time, 0.0);
        assert_eq!(hit.normal, Some(DVec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_box_helpers() {
        let b = BoundingBox::new(DVec3::new(2.0, 2.0, 2.0), DVec3::ZERO);
        assert_eq!(b.min, DVec3::ZERO);
        assert_eq!(b.center(), DVec3::ONE);
        assert!(b.contains(DVec3::new(2.0, 0.0, 1.0)));
        assert!(!b.overlaps(&b.translated(DVec3::new(2.0, 0.0, 0.0))));
        assert!(b.overlaps(&b.translated(DVec3::new(1.9, 0.0, 0.0))));
        assert_eq!(b.expanded(DVec3::ONE).size(), DVec3::splat(4.0));
        assert_eq!(
            BoundingBox::from_center(DVec3::ONE, DVec3::ONE),
            BoundingBox::new(DVec3::ZERO, DVec3::splat(2.0))
        );
    }

    #[test]
    fn test_distance_to_point() {
        let b = unit_box_at(0.0, 0.0, 0.0);
        assert_eq!(b.distance_to_point(DVec3::new(0.5, 0.5, 0.5)), DVec3::ZERO);
        assert_eq!(
            b.distance_to_point(DVec3::new(3.0, -2.0, 0.5)),
            DVec3::new(2.0, 2.0, 0.0)
        );
    }

    #[test]
    fn test_hit_point_faces() {
        let b = unit_box_at(0.0, 0.0, 0.0);
        assert_eq!(b.hit_point(DVec3::X), Some(DVec3::new(0.0, 0.5, 0.5)));
        assert_eq!(b.hit_point(DVec3::NEG_X), Some(DVec3::new(1.0, 0.5, 0.5)));
        assert_eq!(b.hit_point(DVec3::NEG_Z), Some(DVec3::new(0.5, 0.5, 1.0)));
        assert_eq!(b.hit_point(DVec3::ZERO), None);
    }

    #[test]
    fn test_angle_between() {
        assert!((angle_between_degrees(DVec3::X, DVec3::Y) - 90.0).abs() < 1e-9);
        assert!((angle_between_degrees(DVec3::X, DVec3::NEG_X) - 180.0).abs() < 1e-9);
        assert_eq!(angle_between_degrees(DVec3::X, DVec3::ZERO), 0.0);
    }
}
