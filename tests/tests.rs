use starsweep::simulation::states::{Body, System, NVec2};
use starsweep::simulation::params::Parameters;
use starsweep::simulation::forces::{NewtonianGravity, AccelSet};
use starsweep::simulation::templates::solar_system;
use starsweep::visualization::heatmap::{log_bounds, log_color};
use starsweep::visualization::animation::frame_bounds;
use starsweep::visualization::output::read_matrix_csv;
use starsweep::{
    check_divergence, divergence_time, linspace, sample_positions, verlet_integrator, leapfrog_integrator,
    DivergenceMatrix, DivergenceOutcome, Engine, IntegratorConfig, NamingStrategy, OutputConfig, ParamRange,
    PositionTrace, RunConfig, Scenario, ScanConfig, SimError, Simulation, SweepEngine, TaskConfig, Template,
};

use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::DMatrix;
use proptest::prelude::*;

/// Build a simple 2-body System separated along x-axis
pub fn two_body_system(dist: f64, m1: f64, m2: f64) -> System {
    System {
        bodies: vec![
            Body::new(m1, -dist / 2.0, 0.0, 0.0, 0.0),
            Body::new(m2, dist / 2.0, 0.0, 0.0, 0.0),
        ],
        t: 0.0,
    }
}

/// Default physics parameters for tests
pub fn test_params() -> Parameters {
    Parameters {
        h0: 0.001,
        eps2: 0.0,
        G: 0.1,
    }
}

/// Build a gravity term + AccelSet
pub fn gravity_set(p: &Parameters) -> AccelSet {
    AccelSet::new().with(NewtonianGravity {
        G: p.G,
        eps2: p.eps2,
    })
}

fn scenario_with(bodies: Vec<Body>, h0: f64) -> Scenario {
    let params = Parameters { h0, eps2: 0.0, G: 1.0 };
    let mut sim = Scenario::new(Engine::default(), params).unwrap();
    for b in bodies {
        sim.add_body(b).unwrap();
    }
    sim
}

/// One body drifting along +x at constant speed: x(t) = speed * t
struct Drifter {
    speed: f64,
    t: f64,
}

impl Drifter {
    fn new(speed: f64) -> Self {
        Self { speed, t: 0.0 }
    }
}

impl Simulation for Drifter {
    fn add_body(&mut self, _body: Body) -> starsweep::Result<()> {
        Ok(())
    }

    fn advance_to(&mut self, t: f64) -> starsweep::Result<()> {
        if t < self.t {
            return Err(SimError::BackwardStep { from: self.t, to: t });
        }
        self.t = t;
        Ok(())
    }

    fn positions(&self) -> Vec<NVec2> {
        vec![NVec2::new(self.speed * self.t, 0.0)]
    }

    fn time(&self) -> f64 {
        self.t
    }

    fn body_count(&self) -> usize {
        1
    }
}

fn trace_from(xs: Vec<f64>, ys: Vec<f64>, bodies: usize) -> PositionTrace {
    let samples = xs.len() / bodies;
    PositionTrace {
        x: DMatrix::from_vec(bodies, samples, xs),
        y: DMatrix::from_vec(bodies, samples, ys),
        times: linspace(0.0, 1.0, samples),
    }
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let sys = two_body_system(1.0, 2.0, 3.0);
    let p = test_params();
    let forces = gravity_set(&p);

    let mut acc = vec![NVec2::zeros(); 2];
    forces.accumulate_accels(sys.t, &sys, &mut acc);

    let net = acc[0] * sys.bodies[0].m + acc[1] * sys.bodies[1].m;
    assert!(net.norm() < 1e-12, "Net force not zero: {:?}", net);
}

#[test]
fn gravity_points_toward_other_body() {
    let sys = two_body_system(2.0, 1.0, 1.0);
    let p = test_params();
    let forces = gravity_set(&p);

    let mut acc = vec![NVec2::zeros(); 2];
    forces.accumulate_accels(sys.t, &sys, &mut acc);

    let dx = sys.bodies[1].x - sys.bodies[0].x;
    assert!(acc[0].dot(&dx) > 0.0, "Acceleration is not toward second body");
}

#[test]
fn gravity_inverse_square_law() {
    let sys_r = two_body_system(1.0, 1.0, 1.0);
    let sys_2r = two_body_system(2.0, 1.0, 1.0);
    let forces = gravity_set(&test_params());

    let mut acc_r = vec![NVec2::zeros(); 2];
    let mut acc_2r = vec![NVec2::zeros(); 2];
    forces.accumulate_accels(sys_r.t, &sys_r, &mut acc_r);
    forces.accumulate_accels(sys_2r.t, &sys_2r, &mut acc_2r);

    let ratio = acc_r[0].norm() / acc_2r[0].norm();
    assert_relative_eq!(ratio, 4.0, epsilon = 1e-9);
}

#[test]
fn gravity_softening_prevents_blowup() {
    let mut p = test_params();
    p.eps2 = 0.1;

    let sys = two_body_system(1e-9, 1.0, 1.0);
    let forces = gravity_set(&p);

    let mut acc = vec![NVec2::zeros(); 2];
    forces.accumulate_accels(sys.t, &sys, &mut acc);

    assert!(acc[0].norm() < 1e9, "Softening failed; acceleration too large");
}

#[test]
fn gravity_ignores_massless_pairs() {
    let sys = two_body_system(0.0, 0.0, 0.0);
    let forces = gravity_set(&test_params());

    let mut acc = vec![NVec2::new(5.0, 5.0); 2];
    forces.accumulate_accels(sys.t, &sys, &mut acc);

    assert_eq!(acc, vec![NVec2::zeros(); 2]);
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn verlet_conserves_momentum() {
    let mut sys = two_body_system(1.0, 2.0, 3.0);
    sys.bodies[0].v = NVec2::new(0.1, 0.4);
    sys.bodies[1].v = NVec2::new(-0.2, 0.0);
    let forces = gravity_set(&test_params());

    let momentum = |s: &System| s.bodies.iter().fold(NVec2::zeros(), |acc, b| acc + b.m * b.v);
    let before = momentum(&sys);
    for _ in 0..500 {
        verlet_integrator(&mut sys, &forces, 0.001);
    }

    assert_abs_diff_eq!((momentum(&sys) - before).norm(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(sys.t, 0.5, epsilon = 1e-9);
}

#[test]
fn leapfrog_keeps_circular_binary_energy() {
    // equal masses, separation 1, G = 1: circular speed sqrt(1/2) each
    let v = 0.5f64.sqrt();
    let mut sys = System {
        bodies: vec![Body::new(1.0, -0.5, 0.0, 0.0, -v), Body::new(1.0, 0.5, 0.0, 0.0, v)],
        t: 0.0,
    };
    let forces = AccelSet::new().with(NewtonianGravity { G: 1.0, eps2: 0.0 });

    let energy = |s: &System| {
        let kinetic: f64 = s.bodies.iter().map(|b| 0.5 * b.m * b.v.norm_squared()).sum();
        let r = (s.bodies[1].x - s.bodies[0].x).norm();
        kinetic - s.bodies[0].m * s.bodies[1].m / r
    };
    let e0 = energy(&sys);
    for _ in 0..5000 {
        leapfrog_integrator(&mut sys, &forces, 0.001);
    }

    assert_relative_eq!(energy(&sys), e0, max_relative = 1e-4);
    let separation = (sys.bodies[1].x - sys.bodies[0].x).norm();
    assert_relative_eq!(separation, 1.0, max_relative = 1e-3);
}

#[test]
fn advance_to_lands_on_target_time() {
    let mut sim = scenario_with(vec![Body::new(1.0, 0.0, 0.0, 0.0, 0.0), Body::new(1e-3, 1.0, 0.0, 0.0, 1.0)], 0.3);

    sim.advance_to(1.0).unwrap();
    assert_eq!(sim.time(), 1.0);

    // no-op when already there
    sim.advance_to(1.0).unwrap();
    assert_eq!(sim.time(), 1.0);
}

#[test]
fn advance_to_rejects_going_backwards() {
    let mut sim = scenario_with(vec![Body::new(1.0, 0.0, 0.0, 0.0, 0.0)], 0.01);
    sim.advance_to(1.0).unwrap();

    let err = sim.advance_to(0.5).unwrap_err();
    assert!(matches!(err, SimError::BackwardStep { .. }), "got {err:?}");
    assert!(matches!(sim.advance_to(f64::NAN), Err(SimError::InvalidTime(_))));
}

#[test]
fn advance_to_reports_non_finite_state() {
    // two massive bodies on top of each other with no softening
    let mut sim = scenario_with(vec![Body::new(1.0, 0.0, 0.0, 0.0, 0.0), Body::new(1.0, 0.0, 0.0, 0.0, 0.0)], 0.01);

    let err = sim.advance_to(0.05).unwrap_err();
    assert!(matches!(err, SimError::NonFiniteState(_)), "got {err:?}");
}

#[test]
fn leapfrog_engine_is_selectable() {
    let params = Parameters { h0: 0.01, eps2: 0.0, G: 1.0 };
    let mut sim = Scenario::new(Engine::new(IntegratorConfig::Leapfrog), params).unwrap();
    sim.add_body(Body::new(0.0, 0.0, 0.0, 2.0, 0.0)).unwrap();

    sim.advance_to(1.5).unwrap();
    assert_relative_eq!(sim.positions()[0].x, 3.0, epsilon = 1e-9);
}

// ==================================================================================
// Scenario / template tests
// ==================================================================================

#[test]
fn add_body_rejects_invalid_values() {
    let mut sim = scenario_with(vec![], 0.01);

    assert!(matches!(sim.add_body(Body::new(-1.0, 0.0, 0.0, 0.0, 0.0)), Err(SimError::InvalidBody(_))));
    assert!(matches!(sim.add_body(Body::new(1.0, f64::NAN, 0.0, 0.0, 0.0)), Err(SimError::InvalidBody(_))));
    assert!(matches!(
        sim.add_body(Body::new(1.0, 0.0, 0.0, 0.0, 0.0).with_radius(-0.1)),
        Err(SimError::InvalidBody(_))
    ));
    assert_eq!(sim.body_count(), 0);
}

#[test]
fn scenario_rejects_bad_parameters() {
    let params = Parameters { h0: 0.0, eps2: 0.0, G: 1.0 };
    assert!(matches!(Scenario::new(Engine::default(), params), Err(SimError::InvalidParameters(_))));
}

#[test]
fn triangle_template_places_345_triangle() {
    let sim = Template::Triangle { v0: 0.0 }
        .build_cell(2.0, 1.5, Engine::default(), &Parameters::default())
        .unwrap();
    let b = sim.bodies();

    assert_eq!(b.len(), 3);
    assert!(b.iter().all(|body| body.m == 2.0));
    assert_eq!(b[1].x, NVec2::new(3.0, 0.0));
    assert_eq!(b[1].v, NVec2::new(1.5, 0.0));
    assert_eq!(b[2].x, NVec2::new(0.0, 4.0));
    assert_eq!(b[2].v, NVec2::new(0.0, 1.5));
    assert_eq!((b[2].x - b[1].x).norm(), 5.0);
}

#[test]
fn aligned_template_mirrors_outer_stars() {
    let sim = Template::Aligned { x: 2.0, v0: 0.0 }
        .build_cell(1.0, 0.7, Engine::default(), &Parameters::default())
        .unwrap();
    let b = sim.bodies();

    assert_eq!(b[1].x, -b[2].x);
    assert_eq!(b[1].v, -b[2].v);
    assert_eq!(b[1].v, NVec2::new(0.0, 0.7));
}

#[test]
fn equilateral_template_is_equilateral_with_tangent_velocities() {
    let sim = Template::Equilateral { l: 2.0, v0: 0.0 }
        .build_cell(1.0, 0.5, Engine::default(), &Parameters::default())
        .unwrap();
    let b = sim.bodies();

    for (i, j) in [(0, 1), (1, 2), (0, 2)] {
        assert_relative_eq!((b[i].x - b[j].x).norm(), 2.0, epsilon = 1e-12);
    }
    for body in b {
        assert_relative_eq!(body.v.norm(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(body.v.dot(&body.x), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn random_two_template_is_reproducible_per_seed() {
    let template = Template::RandomTwo { m_range: 1.0, x_range: 5.0, v0_range: 2.0, seed: 7 };
    let a = template.build(1.0, Engine::default(), &Parameters::default()).unwrap();
    let b = template.build(1.0, Engine::default(), &Parameters::default()).unwrap();
    assert_eq!(a.bodies(), b.bodies());

    let second = &a.bodies()[1];
    assert!((0.0..5.0).contains(&second.x.x));
    assert!((1.0..2.0).contains(&second.m));
    assert!((0.0..2.0).contains(&second.v.x));

    let other = Template::RandomTwo { m_range: 1.0, x_range: 5.0, v0_range: 2.0, seed: 8 }
        .build(1.0, Engine::default(), &Parameters::default())
        .unwrap();
    assert_ne!(a.bodies(), other.bodies());
}

#[test]
fn solar_system_template_adds_perturber_only_when_massive() {
    let template = Template::SolarSystemPerturbator { distance: 0.0 };
    let without = template.build_cell(0.0, 40.0, Engine::default(), &Parameters::default()).unwrap();
    assert_eq!(without.body_count(), 9);

    let with = template.build_cell(0.5, 40.0, Engine::default(), &Parameters::default()).unwrap();
    assert_eq!(with.body_count(), 10);
    let perturber = &with.bodies()[9];
    assert_eq!(perturber.m, 0.5);
    assert_relative_eq!(perturber.x.norm(), 40.0, epsilon = 1e-12);
    assert_relative_eq!(perturber.x.x, perturber.x.y, epsilon = 1e-12);
}

#[test]
fn solar_system_is_barycentric() {
    let bodies = solar_system(1.0);
    let momentum = bodies.iter().fold(NVec2::zeros(), |acc, b| acc + b.m * b.v);
    let com = bodies.iter().fold(NVec2::zeros(), |acc, b| acc + b.m * b.x);

    assert_abs_diff_eq!(momentum.norm(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(com.norm(), 0.0, epsilon = 1e-12);
}

// ==================================================================================
// Range tests
// ==================================================================================

#[test]
fn linspace_includes_both_ends() {
    assert_eq!(linspace(0.0, 10.0, 5), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
    assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    assert!(linspace(0.0, 1.0, 0).is_empty());
}

#[test]
fn arange_is_half_open() {
    let masses = ParamRange::arange(2.0, 32.0, 2.0).values().unwrap();
    assert_eq!(masses.len(), 15);
    assert_eq!(masses[0], 2.0);
    assert_eq!(masses[14], 30.0);

    assert_eq!(ParamRange::arange(0.0, 13.0, 1.0).len().unwrap(), 13);
    assert!(ParamRange::arange(5.0, 1.0, 1.0).is_empty().unwrap());
    assert_eq!(ParamRange::arange(1.0, 0.0, -0.25).len().unwrap(), 4);
}

#[test]
fn arange_rejects_zero_step() {
    assert!(matches!(ParamRange::arange(0.0, 1.0, 0.0).values(), Err(SimError::InvalidRange(_))));
    assert!(matches!(ParamRange::linspace(0.0, f64::INFINITY, 3).values(), Err(SimError::InvalidRange(_))));
}

// ==================================================================================
// Sampler tests
// ==================================================================================

#[test]
fn sampler_records_bodies_by_samples() {
    let mut sim = scenario_with(
        vec![
            Body::new(0.0, 1.0, 2.0, 0.0, 0.0),
            Body::new(0.0, -1.0, 0.5, 0.0, 0.0),
            Body::new(0.0, 0.0, 0.0, 0.1, 0.0),
        ],
        0.01,
    );

    let trace = sample_positions(&mut sim, 10.0, 5).unwrap();

    assert_eq!(trace.x.shape(), (3, 5));
    assert_eq!(trace.y.shape(), (3, 5));
    assert_eq!(trace.times, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
    assert_eq!(trace.x[(0, 4)], 1.0);
    assert_eq!(trace.y[(1, 3)], 0.5);
    assert_relative_eq!(trace.x[(2, 4)], 1.0, epsilon = 1e-9);
    assert_eq!(sim.time(), 10.0);
}

#[test]
fn sampler_with_zero_steps_is_empty() {
    let mut sim = scenario_with(vec![Body::new(1.0, 0.0, 0.0, 0.0, 0.0)], 0.01);
    let trace = sample_positions(&mut sim, 10.0, 0).unwrap();

    assert!(trace.is_empty());
    assert_eq!(trace.body_count(), 1);
    assert_eq!(sim.time(), 0.0);
}

#[test]
fn sampler_only_moves_forward() {
    let mut sim = scenario_with(vec![Body::new(1.0, 0.0, 0.0, 0.0, 0.0)], 0.01);
    sim.advance_to(5.0).unwrap();

    let err = sample_positions(&mut sim, 10.0, 3).unwrap_err();
    assert!(matches!(err, SimError::BackwardStep { .. }));
}

#[test]
fn trace_subsampling_keeps_last_sample() {
    let mut sim = Drifter::new(1.0);
    let trace = sample_positions(&mut sim, 9.0, 10).unwrap();

    let sub = trace.subsampled(4);
    assert_eq!(sub.times, vec![0.0, 4.0, 8.0, 9.0]);
    assert_eq!(sub.x[(0, 3)], 9.0);
    assert_eq!(trace.truncated(3).sample_count(), 3);
}

// ==================================================================================
// Divergence tests
// ==================================================================================

#[test]
fn check_divergence_uses_absolute_coordinates() {
    let trace = trace_from(vec![0.0, -12.0], vec![1.0, 3.0], 1);

    assert!(check_divergence(&trace, 10.0));
    assert!(!check_divergence(&trace, 12.0));
}

#[test]
fn divergence_time_returns_first_exceeding_checkpoint() {
    let mut sim = Drifter::new(1.0);
    let outcome = divergence_time(&mut sim, 10.0, 10, 3.5).unwrap();

    assert_eq!(outcome, DivergenceOutcome::Diverged { time: 4.0 });
    // scan stops at the first hit
    assert_eq!(sim.time(), 4.0);
}

#[test]
fn divergence_time_returns_last_checkpoint_when_stable() {
    let mut sim = Drifter::new(0.1);
    let outcome = divergence_time(&mut sim, 10.0, 10, 5.0).unwrap();

    assert_eq!(outcome, DivergenceOutcome::Stable { scanned_until: 10.0 });
    assert_eq!(outcome.time(), 10.0);
    assert!(!outcome.diverged());
}

#[test]
fn divergence_time_with_zero_steps_checks_only_t0() {
    let mut sim = Drifter::new(100.0);
    let outcome = divergence_time(&mut sim, 10.0, 0, 1.0).unwrap();

    assert_eq!(outcome, DivergenceOutcome::Stable { scanned_until: 0.0 });
}

#[test]
fn massless_bodies_at_rest_never_diverge() {
    let mut sim = scenario_with(vec![Body::new(0.0, 0.0, 0.0, 0.0, 0.0); 3], 0.01);
    let outcome = divergence_time(&mut sim, 20.0, 40, 1e-6).unwrap();
    assert_eq!(outcome, DivergenceOutcome::Stable { scanned_until: 20.0 });

    let mut triangle = Template::Triangle { v0: 0.0 }
        .build(0.0, Engine::default(), &Parameters::default())
        .unwrap();
    let outcome = divergence_time(&mut triangle, 20.0, 40, 10.0).unwrap();
    assert_eq!(outcome.time(), 20.0);
}

#[test]
fn body_beyond_threshold_diverges_at_zero() {
    let mut sim = scenario_with(vec![Body::new(1.0, 0.0, 0.0, 0.0, 0.0), Body::new(1.0, 2000.0, 0.0, 0.0, 0.0)], 0.01);
    let outcome = divergence_time(&mut sim, 100.0, 10, 1000.0).unwrap();

    assert_eq!(outcome, DivergenceOutcome::Diverged { time: 0.0 });
}

#[test]
fn divergence_time_propagates_simulation_errors() {
    let mut sim = scenario_with(vec![Body::new(1.0, 0.0, 0.0, 0.0, 0.0), Body::new(1.0, 0.0, 0.0, 0.0, 0.0)], 0.01);
    let res = divergence_time(&mut sim, 1.0, 10, 1000.0);

    assert!(matches!(res, Err(SimError::NonFiniteState(_))));
}

#[test]
fn scan_config_checkpoints() {
    let cfg = ScanConfig::new(1.0, 4, 10.0);
    assert_eq!(cfg.checkpoints(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    assert!(ScanConfig::new(-1.0, 4, 10.0).validate().is_err());
}

proptest! {
    #[test]
    fn check_divergence_is_monotonic_in_threshold(
        coords in proptest::collection::vec(-1e4f64..1e4, 2..40),
        t1 in 0f64..2e4,
        dt in 0f64..2e4,
    ) {
        let n = coords.len() / 2;
        let trace = trace_from(coords[..n].to_vec(), coords[n..2 * n].to_vec(), 1);
        let t2 = t1 + dt;

        if check_divergence(&trace, t2) {
            prop_assert!(check_divergence(&trace, t1));
        }
    }

    #[test]
    fn divergence_time_is_first_exceedance(
        speed in 0.01f64..10.0,
        threshold in 0.1f64..100.0,
        nb_steps in 0usize..50,
        duration in 1f64..100.0,
    ) {
        let expected = linspace(0.0, duration, nb_steps + 1)
            .into_iter()
            .find(|t| speed * t > threshold);

        let mut sim = Drifter::new(speed);
        let outcome = divergence_time(&mut sim, duration, nb_steps, threshold).unwrap();

        match expected {
            Some(t) => prop_assert_eq!(outcome, DivergenceOutcome::Diverged { time: t }),
            None => {
                let last = if nb_steps == 0 { 0.0 } else { duration };
                prop_assert_eq!(outcome, DivergenceOutcome::Stable { scanned_until: last });
            }
        }
    }
}

// ==================================================================================
// Sweep tests
// ==================================================================================

fn drifter_sweep(masses: ParamRange, secondaries: ParamRange, scan: ScanConfig) -> SweepEngine {
    SweepEngine::new(Template::Triangle { v0: 0.0 }, masses, secondaries, scan)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sweep_shape_matches_axes(rows in 0usize..6, cols in 0usize..6, parallel in any::<bool>()) {
        let scan = ScanConfig::new(10.0, 10, 5.0);
        let sweep = drifter_sweep(ParamRange::linspace(0.1, 1.0, rows), ParamRange::linspace(0.5, 2.0, cols), scan)
            .parallel(parallel);

        let matrix = sweep.run_with(|m, p2| Ok(Drifter::new(m * p2))).unwrap();

        prop_assert_eq!(matrix.shape(), (rows, cols));
        prop_assert_eq!(matrix.diverged.shape(), (rows, cols));
        prop_assert!(matrix.times.iter().all(|t| (0.0..=10.0).contains(t)));
    }
}

#[test]
fn sweep_records_each_cell_independently() {
    let scan = ScanConfig::new(10.0, 10, 5.0);
    let sweep = drifter_sweep(ParamRange::linspace(1.0, 2.0, 2), ParamRange::linspace(0.25, 1.0, 2), scan);

    let matrix = sweep.run_with(|m, p2| Ok(Drifter::new(m * p2))).unwrap();

    // speed 0.25 never passes 5 within 10, speed 1 passes at t = 6, speed 0.5 is stable, speed 2 at t = 3
    assert_eq!(matrix.outcome(0, 0), DivergenceOutcome::Stable { scanned_until: 10.0 });
    assert_eq!(matrix.outcome(0, 1), DivergenceOutcome::Diverged { time: 6.0 });
    assert_eq!(matrix.outcome(1, 0), DivergenceOutcome::Stable { scanned_until: 10.0 });
    assert_eq!(matrix.outcome(1, 1), DivergenceOutcome::Diverged { time: 3.0 });
    assert_eq!(matrix.diverged_count(), 2);
    assert_eq!(matrix.masses, vec![1.0, 2.0]);
    assert_eq!(matrix.secondaries, vec![0.25, 1.0]);
}

#[test]
fn parallel_sweep_matches_sequential() {
    let scan = ScanConfig::new(50.0, 25, 20.0);
    let masses = ParamRange::arange(0.5, 4.0, 0.5);
    let secondaries = ParamRange::linspace(0.1, 3.0, 7);

    let seq = drifter_sweep(masses.clone(), secondaries.clone(), scan)
        .run_with(|m, p2| Ok(Drifter::new(m * p2)))
        .unwrap();
    let par = drifter_sweep(masses, secondaries, scan)
        .parallel(true)
        .run_with(|m, p2| Ok(Drifter::new(m * p2)))
        .unwrap();

    assert_eq!(seq, par);
}

#[test]
fn sweep_aborts_on_first_error() {
    let scan = ScanConfig::new(10.0, 10, 5.0);
    let sweep = drifter_sweep(ParamRange::linspace(1.0, 3.0, 3), ParamRange::linspace(1.0, 3.0, 3), scan);

    let res = sweep.run_with(|m, p2| {
        if m == 2.0 && p2 == 2.0 {
            Err(SimError::body("broken cell"))
        } else {
            Ok(Drifter::new(m * p2))
        }
    });

    assert!(matches!(res, Err(SimError::InvalidBody(_))));
}

#[test]
fn triangle_sweep_runs_on_real_scenarios() {
    let scan = ScanConfig::new(5.0, 5, 100.0);
    let params = Parameters { h0: 0.01, eps2: 1e-4, G: 1.0 };
    let sweep = SweepEngine::new(
        Template::Triangle { v0: 0.0 },
        ParamRange::linspace(0.0, 1.0, 2),
        ParamRange::linspace(0.0, 5.0, 2),
        scan,
    )
    .with_engine(Engine::default(), params);

    let matrix = sweep.run().unwrap();

    assert_eq!(matrix.shape(), (2, 2));
    assert!(matrix.times.iter().all(|t| (0.0..=5.0).contains(t)));
    // massless, at rest: nothing moves
    assert_eq!(matrix.outcome(0, 0), DivergenceOutcome::Stable { scanned_until: 5.0 });
    // massless, v0 = 5: furthest body reaches 4 + 25 = 29 < 100
    assert_eq!(matrix.outcome(0, 1), DivergenceOutcome::Stable { scanned_until: 5.0 });
}

// ==================================================================================
// Output tests
// ==================================================================================

fn small_matrix() -> DivergenceMatrix {
    DivergenceMatrix {
        times: DMatrix::from_row_slice(2, 2, &[10.0, 2.5, 0.0, 10.0]),
        diverged: DMatrix::from_row_slice(2, 2, &[false, true, true, false]),
        masses: vec![1.0, 2.0],
        secondaries: vec![0.0, 1.0],
        duration: 10.0,
    }
}

#[test]
fn random_suffix_stem_has_requested_digits() {
    let out = OutputConfig::new("unused", NamingStrategy::RandomSuffix { digits: 12 });
    let stem = out.stem("triangle");

    let suffix = stem.strip_prefix("triangle-").expect("missing name prefix");
    assert_eq!(suffix.len(), 12);
    assert!(suffix.chars().all(|c| c.is_ascii_digit()));

    let plain = OutputConfig::new("unused", NamingStrategy::Plain);
    assert_eq!(plain.stem("triangle"), "triangle");
}

#[test]
fn save_matrix_writes_times_and_mask() {
    let dir = tempfile::tempdir().unwrap();
    let out = OutputConfig::new(dir.path().join("arrays"), NamingStrategy::Plain);

    let (times_path, mask_path) = out.save_matrix(&small_matrix(), "triangle").unwrap();

    assert_eq!(times_path, dir.path().join("arrays").join("triangle.csv"));
    assert_eq!(read_matrix_csv(&times_path).unwrap(), small_matrix().times);
    let mask = std::fs::read_to_string(mask_path).unwrap();
    assert_eq!(mask.lines().collect::<Vec<_>>(), vec!["0,1", "1,0"]);
}

#[test]
fn save_trace_writes_one_row_per_body_and_sample() {
    let dir = tempfile::tempdir().unwrap();
    let out = OutputConfig::new(dir.path(), NamingStrategy::Plain);
    let mut sim = scenario_with(vec![Body::new(0.0, 1.0, 2.0, 0.0, 0.0), Body::new(0.0, 3.0, 4.0, 0.0, 0.0)], 0.01);
    let trace = sample_positions(&mut sim, 1.0, 3).unwrap();

    let path = out.save_trace(&trace, "run").unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "body,t,x,y");
    assert_eq!(lines.len(), 1 + 2 * 3);
    assert_eq!(lines[2], "1,0.0,3.0,4.0");
}

// ==================================================================================
// Plot helper tests
// ==================================================================================

#[test]
fn heatmap_log_scale_skips_non_positive_cells() {
    let matrix = small_matrix();
    let (lo, hi) = log_bounds(&matrix).unwrap();

    assert_relative_eq!(lo, 2.5f64.log10());
    assert_relative_eq!(hi, 1.0);
    assert!(log_color(0.0, lo, hi).is_none());
    assert!(log_color(10.0, lo, hi).is_some());
}

#[test]
fn animation_bounds_follow_visible_samples() {
    let trace = trace_from(vec![0.0, 1.0, 10.0, -10.0], vec![0.0, 2.0, 20.0, -20.0], 1);

    assert!(frame_bounds(&trace, 0).is_none());
    let (xr, yr) = frame_bounds(&trace, 2).unwrap();
    assert!(xr.start < 0.0 && xr.end > 1.0 && xr.end < 10.0);
    assert!(yr.start < 0.0 && yr.end > 2.0 && yr.end < 20.0);
}

// ==================================================================================
// Configuration tests
// ==================================================================================

#[test]
fn run_config_parses_sweep() {
    let yaml = r#"
engine:
  integrator: "leapfrog"
parameters:
  h0: 0.02
output:
  directory: "out"
  naming: { kind: plain }
task:
  kind: sweep
  template: { kind: aligned, x: 2.0 }
  masses: { kind: arange, start: 2.0, stop: 32.0, step: 2.0 }
  secondaries: { kind: linspace, start: 0.0, stop: 1.0, num: 3 }
  scan: { duration: 100.0 }
"#;
    let cfg = RunConfig::from_yaml(yaml).unwrap();

    assert_eq!(cfg.engine().integrator, IntegratorConfig::Leapfrog);
    let params = cfg.parameters().unwrap();
    assert_eq!(params.h0, 0.02);
    assert_eq!(params.G, 1.0);
    assert_eq!(cfg.output.naming, NamingStrategy::Plain);

    let TaskConfig::Sweep(task) = cfg.task else {
        panic!("expected a sweep task");
    };
    assert_eq!(task.template, Template::Aligned { x: 2.0, v0: 0.0 });
    assert_eq!(task.scan, ScanConfig::new(100.0, 100, 1000.0));
    assert!(!task.parallel);
    assert!(task.progress);
}

#[test]
fn run_config_rejects_bad_step() {
    let yaml = r#"
parameters:
  h0: -1.0
task:
  kind: trace
  source: { from: bodies, bodies: [] }
  duration: 1.0
  nb_steps: 2
"#;
    let cfg = RunConfig::from_yaml(yaml).unwrap();
    assert!(matches!(cfg.parameters(), Err(SimError::InvalidParameters(_))));
}

#[test]
fn bundled_scenarios_parse() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    let mut count = 0;
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        let cfg = RunConfig::from_path(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        cfg.parameters().unwrap();
        count += 1;
    }
    assert!(count >= 4);
}
