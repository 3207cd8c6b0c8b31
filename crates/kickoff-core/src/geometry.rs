use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A 3D vector. The simulation lives on the XZ plane; `y` is carried along
/// for renderers but stays zero for everything the core moves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    /// Default facing of every entity before it is rotated.
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 { self / len } else { Self::ZERO }
    }

    pub fn distance_to(self, other: Self) -> f32 {
        (self - other).length()
    }

    pub fn squared_distance_to(self, other: Self) -> f32 {
        (self - other).length_squared()
    }

    /// Reflect about a unit plane normal: `v - 2(v.n)n`.
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * (2.0 * self.dot(normal))
    }

    /// Rotate about the vertical axis by `angle` radians.
    pub fn rotate_y(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            self.x * cos + self.z * sin,
            self.y,
            -self.x * sin + self.z * cos,
        )
    }

    /// Heading angle about the vertical axis, zero along `FORWARD`.
    pub fn yaw(self) -> f32 {
        self.x.atan2(self.z)
    }

    /// Unit vector on the XZ plane for a heading angle.
    pub fn from_yaw(yaw: f32) -> Self {
        Self::FORWARD.rotate_y(yaw)
    }

    /// Truncate the length to `max`.
    pub fn clamp_length(self, max: f32) -> Self {
        let len_sq = self.length_squared();
        if len_sq > max * max && len_sq > 0.0 {
            self * (max / len_sq.sqrt())
        } else {
            self
        }
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// An infinite plane: every point `p` with `normal.p + constant == 0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub const fn new(normal: Vec3, constant: f32) -> Self {
        Self { normal, constant }
    }

    /// Signed distance; positive on the side the normal points to.
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}

/// A half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray through two points, or `None` when they coincide.
    pub fn between(from: Vec3, to: Vec3) -> Option<Self> {
        let direction = (to - from).normalize();
        if direction == Vec3::ZERO {
            None
        } else {
            Some(Self::new(from, direction))
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Point where the ray meets the plane. A ray running parallel to the
    /// plane never meets it, even when it lies inside it.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let denominator = plane.normal.dot(self.direction);
        if denominator == 0.0 {
            return None;
        }
        let t = -plane.distance_to_point(self.origin) / denominator;
        if t >= 0.0 { Some(self.at(t)) } else { None }
    }
}

/// Whether segments `a-b` and `c-d` intersect on the XZ plane.
/// Touching endpoints count as an intersection.
pub fn segments_intersect_xz(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> bool {
    let r_x = b.x - a.x;
    let r_z = b.z - a.z;
    let s_x = d.x - c.x;
    let s_z = d.z - c.z;

    let denominator = r_x * s_z - r_z * s_x;
    let qp_x = c.x - a.x;
    let qp_z = c.z - a.z;

    if denominator == 0.0 {
        // Parallel. Only collinear overlap counts.
        let collinear = qp_x * r_z - qp_z * r_x;
        if collinear != 0.0 {
            return false;
        }
        let rr = r_x * r_x + r_z * r_z;
        if rr == 0.0 {
            return a == c || a == d;
        }
        let t0 = (qp_x * r_x + qp_z * r_z) / rr;
        let t1 = t0 + (s_x * r_x + s_z * r_z) / rr;
        let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        return hi >= 0.0 && lo <= 1.0;
    }

    let t = (qp_x * s_z - qp_z * s_x) / denominator;
    let u = (qp_x * r_z - qp_z * r_x) / denominator;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}
