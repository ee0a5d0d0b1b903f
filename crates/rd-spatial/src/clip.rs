//! Segment/rectangle clipping.
//!
//! One Liang–Barsky pass covers every way a segment can leave a cell — side,
//! corner, or not at all — where per-case segment-intersection tests need
//! eight configurations and still miss grazing corners.  The grid only ever
//! asks for the **exit fraction**: how far along the segment the start cell's
//! boundary is crossed.

/// Axis-aligned clipping rectangle, in the same coordinate space as the
/// segment endpoints.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClipRect {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Fraction `t` in `[0, 1]` of the segment `a -> b` that lies inside `rect`,
/// assuming `a` is inside (or on the boundary of) `rect`.
///
/// Returns `None` when the Liang–Barsky interval is empty, which can only
/// happen if `a` is actually outside `rect` — e.g. a node clamped into a
/// border cell from beyond the grid bounds.  Callers treat that as a failed
/// clip and fall back to whole-length attribution.
pub fn exit_fraction(a: (f64, f64), b: (f64, f64), rect: ClipRect) -> Option<f64> {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;

    // (p, q) per boundary: left, right, bottom, top.  The segment crosses a
    // boundary at t = q / p; p's sign says whether it is entering or leaving.
    let checks = [
        (-dx, a.0 - rect.min_x),
        (dx, rect.max_x - a.0),
        (-dy, a.1 - rect.min_y),
        (dy, rect.max_y - a.1),
    ];

    let mut t_enter = 0.0f64;
    let mut t_exit = 1.0f64;

    for (p, q) in checks {
        if p == 0.0 {
            // Parallel to this boundary; outside it means no intersection.
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                if t > t_exit {
                    return None;
                }
                t_enter = t_enter.max(t);
            } else {
                if t < t_enter {
                    return None;
                }
                t_exit = t_exit.min(t);
            }
        }
    }

    Some(t_exit)
}
