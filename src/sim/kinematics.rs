//! Screen-space kinematics
//!
//! Bodies move by a constant per-frame velocity and wrap around the screen
//! edges. Screen coordinates have y pointing down.

use glam::Vec2;

/// Move a position by one frame of velocity
#[inline]
pub fn advance(pos: Vec2, vel: Vec2) -> Vec2 {
    pos + vel
}

/// Wrap a body of the given radius around the screen.
///
/// A body that has fully left one edge (center past the edge by its radius)
/// re-enters from the opposite edge, also offset by its radius, so it slides
/// back into view instead of popping in.
pub fn wrap_toroidal(pos: Vec2, radius: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        wrap_axis(pos.x, radius, width),
        wrap_axis(pos.y, radius, height),
    )
}

/// Wrap a point body around the screen with a hard jump to the opposite edge
pub fn wrap_point(pos: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(wrap_axis(pos.x, 0.0, width), wrap_axis(pos.y, 0.0, height))
}

#[inline]
fn wrap_axis(value: f32, margin: f32, extent: f32) -> f32 {
    if value < -margin {
        extent + margin
    } else if value > extent + margin {
        -margin
    } else {
        value
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// True if two circles overlap (touching does not count)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    distance(a, b) < ra + rb
}
