//! Fixed-step time integrators for the 2D N-body system
//!
//! Both integrators advance `sys` in place by exactly `dt` and update `sys.t`.
//! The step size is passed explicitly so callers can shorten the final step
//! and land on an exact target time.

use super::states::{System, NVec2};
use super::forces::AccelSet;

/// Advance the system by one step using velocity-Verlet (kick-drift-kick)
/// Two force evaluations per step
pub fn verlet_integrator(sys: &mut System, forces: &AccelSet, dt: f64) {
    let n = sys.bodies.len();
    if n == 0 {
        sys.t += dt;
        return;
    }
    let half_dt = 0.5 * dt;

    // a_n from x_n
    let mut acc = vec![NVec2::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut acc);

    // v_n+1/2 = v_n + dt/2 a_n
    for (b, a) in sys.bodies.iter_mut().zip(acc.iter()) {
        b.v += half_dt * *a;
    }

    // x_n+1 = x_n + dt v_n+1/2
    for b in sys.bodies.iter_mut() {
        b.x += dt * b.v;
    }
    sys.t += dt;

    // a_n+1 from x_n+1, buffer reused
    forces.accumulate_accels(sys.t, &*sys, &mut acc);

    // v_n+1 = v_n+1/2 + dt/2 a_n+1
    for (b, a) in sys.bodies.iter_mut().zip(acc.iter()) {
        b.v += half_dt * *a;
    }
}

/// Advance the system by one step using drift-kick-drift leapfrog
/// One force evaluation per step, at the half step
pub fn leapfrog_integrator(sys: &mut System, forces: &AccelSet, dt: f64) {
    let n = sys.bodies.len();
    if n == 0 {
        sys.t += dt;
        return;
    }
    let half_dt = 0.5 * dt;

    // x_n+1/2 = x_n + dt/2 v_n
    for b in sys.bodies.iter_mut() {
        b.x += half_dt * b.v;
    }

    let t_mid = sys.t + half_dt;
    let mut a_mid = vec![NVec2::zeros(); n];
    forces.accumulate_accels(t_mid, &*sys, &mut a_mid);

    // v_n+1 = v_n + dt a_n+1/2
    for (b, a) in sys.bodies.iter_mut().zip(a_mid.iter()) {
        b.v += dt * *a;
    }

    // x_n+1 = x_n+1/2 + dt/2 v_n+1
    for b in sys.bodies.iter_mut() {
        b.x += half_dt * b.v;
    }

    sys.t += dt;
}
