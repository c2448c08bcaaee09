use vista_geom::{Ray, Vec3};

/// Bisection iterations used to refine a bracketed crossing.
pub const BISECTION_STEPS: u32 = 8;
const MIN_STEP: f32 = 0.25;
const MAX_STEP: f32 = 16.0;
const NORMAL_EPS: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Distance along the ray from its origin.
    pub distance: f32,
}

/// Height-map view of the world used for ray marching and physics queries.
pub trait TerrainSurface {
    /// Ground height at world XZ, or `None` where nothing is loaded.
    fn surface_height(&self, x: f32, z: f32) -> Option<f32>;

    fn surface_normal(&self, x: f32, z: f32) -> Vec3 {
        let h = |x, z| self.surface_height(x, z);
        match (
            h(x + NORMAL_EPS, z),
            h(x - NORMAL_EPS, z),
            h(x, z + NORMAL_EPS),
            h(x, z - NORMAL_EPS),
        ) {
            (Some(xp), Some(xn), Some(zp), Some(zn)) => {
                Vec3::new(xn - xp, 2.0 * NORMAL_EPS, zn - zp).normalized()
            }
            _ => Vec3::UP,
        }
    }
}

impl<F> TerrainSurface for F
where
    F: Fn(f32, f32) -> Option<f32>,
{
    fn surface_height(&self, x: f32, z: f32) -> Option<f32> {
        self(x, z)
    }
}

/// Marches `ray` over `surface` and returns the first crossing within `max_distance`.
///
/// Steps shrink with the clearance above the ground, so the cost is roughly
/// proportional to distance travelled over step size. Unloaded ground counts
/// as empty and is crossed at the largest step.
pub fn raycast<S>(surface: &S, ray: &Ray, max_distance: f32) -> Option<RaycastHit>
where
    S: TerrainSurface + ?Sized,
{
    if ray.is_degenerate() || !(max_distance > 0.0 && max_distance.is_finite()) {
        return None;
    }
    let mut t_prev = 0.0f32;
    let mut t = 0.0f32;
    loop {
        let p = ray.at(t);
        let step = match surface.surface_height(p.x, p.z) {
            Some(h) if p.y <= h => {
                let t_hit = if t == 0.0 {
                    0.0
                } else {
                    refine(surface, ray, t_prev, t)
                };
                let point = ray.at(t_hit);
                return Some(RaycastHit {
                    point,
                    normal: surface.surface_normal(point.x, point.z),
                    distance: t_hit,
                });
            }
            Some(h) => ((p.y - h) * 0.5).clamp(MIN_STEP, MAX_STEP),
            None => MAX_STEP,
        };
        let next = (t + step).min(max_distance);
        // at large t the step is lost to rounding and the march would stall
        if t >= max_distance || next <= t {
            return None;
        }
        t_prev = t;
        t = next;
    }
}

/// Narrows `[above, below]` to the crossing; returns the parameter on the solid side.
fn refine<S>(surface: &S, ray: &Ray, mut above: f32, mut below: f32) -> f32
where
    S: TerrainSurface + ?Sized,
{
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (above + below);
        let p = ray.at(mid);
        match surface.surface_height(p.x, p.z) {
            Some(h) if p.y <= h => below = mid,
            _ => above = mid,
        }
    }
    below
}
