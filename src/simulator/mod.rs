pub mod results;
pub mod timecourse;

use ode_solvers::Dopri5;
use rayon::prelude::*;

use crate::error::{EdoxabanError, Result};
use crate::model::parameters::{self, BodyParameters};
use crate::model::{outputs, Body, ModelKind, State, StateTarget, OUTPUTS};

pub use results::{ScanPoint, ScanResult, SimulationResult, TimecourseResult};
pub use timecourse::{Changes, ScanDimension, ScanSim, Simulation, Timecourse, TimecourseSim};

const RTOL: f64 = 1e-6;
const ATOL: f64 = 1e-10;

type Time = f64;

#[derive(Debug, Clone, Copy)]
struct OdeModel {
    body: Body,
}

impl ode_solvers::System<Time, State> for OdeModel {
    fn system(&self, _t: Time, y: &State, dy: &mut State) {
        self.body.derivatives(y, dy)
    }
}

/// Integrate the model over one output interval of length `dt`
///
/// The model is autonomous, so every interval is integrated on `[0, dt]`. The
/// last accepted step of the solver ends at `dt`.
#[inline(always)]
fn simulate_interval(body: &Body, x: State, dt: f64, rtol: f64, atol: f64) -> Result<State> {
    if dt <= 0.0 {
        return Ok(x);
    }
    let model = OdeModel { body: *body };
    let mut stepper = Dopri5::new(model, 0.0, dt, 0.0, x, rtol, atol);
    stepper
        .integrate()
        .map_err(|e| EdoxabanError::Integration {
            time: dt,
            reason: format!("{:?}", e),
        })?;
    stepper
        .y_out()
        .last()
        .copied()
        .ok_or_else(|| EdoxabanError::Integration {
            time: dt,
            reason: "no solution output".to_string(),
        })
}

/// Apply changes in two passes: parameters first, then states
///
/// State changes given as concentrations therefore see the updated volumes.
pub fn apply_changes(changes: &Changes, p: &mut BodyParameters, x: &mut State) -> Result<()> {
    for (sid, quantity) in changes.iter() {
        if let Some(info) = parameters::info(sid) {
            p.set(sid, quantity.to(info.unit)?)?;
        }
    }
    for (sid, quantity) in changes.iter() {
        if parameters::info(sid).is_some() {
            continue;
        }
        let target =
            StateTarget::resolve(sid).ok_or_else(|| EdoxabanError::UnknownSymbol(sid.to_string()))?;
        target.assign(x, quantity.to(target.unit())?, p);
    }
    Ok(())
}

/// Column names of a [TimecourseResult]
pub fn result_columns() -> Vec<String> {
    std::iter::once("time")
        .chain(OUTPUTS.iter().map(|(sid, _)| *sid))
        .map(String::from)
        .collect()
}

/// Runs timecourse and scan simulations of the edoxaban model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simulator {
    pub kind: ModelKind,
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Simulator {
    fn default() -> Self {
        Simulator::new(ModelKind::Body)
    }
}

impl Simulator {
    pub fn new(kind: ModelKind) -> Self {
        Simulator {
            kind,
            rtol: RTOL,
            atol: ATOL,
        }
    }

    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    /// Simulate a multi-phase protocol starting from default parameters and empty states
    pub fn run_timecourse(&self, sim: &TimecourseSim) -> Result<TimecourseResult> {
        sim.validate()?;
        let columns = result_columns();
        let n_rows: usize = sim.timecourses.iter().map(|tc| tc.steps + 1).sum();
        let mut data = Vec::with_capacity(n_rows * columns.len());

        let mut p = BodyParameters::default();
        let mut x = State::zeros();
        let mut t_phase = sim.time_offset;

        for tc in &sim.timecourses {
            apply_changes(&tc.changes, &mut p, &mut x)?;
            let body = Body::new(p, self.kind);
            let dt = tc.duration() / tc.steps as f64;
            for i in 0..=tc.steps {
                if i > 0 {
                    x = simulate_interval(&body, x, dt, self.rtol, self.atol).map_err(|e| match e {
                        EdoxabanError::Integration { reason, .. } => EdoxabanError::Integration {
                            time: t_phase + i as f64 * dt,
                            reason,
                        },
                        other => other,
                    })?;
                }
                data.push(t_phase + i as f64 * dt);
                data.extend(outputs(&x, &p));
            }
            t_phase += tc.duration();
        }

        let data = ndarray::Array2::from_shape_vec((n_rows, columns.len()), data)
            .map_err(|e| EdoxabanError::InvalidTimecourse(e.to_string()))?;
        tracing::trace!("Simulated {} points over {} phases", n_rows, sim.timecourses.len());
        Ok(TimecourseResult::new(columns, data))
    }

    /// Simulate all points of a scan in parallel
    pub fn run_scan(&self, scan: &ScanSim) -> Result<ScanResult> {
        let points = scan.points()?;
        tracing::debug!("Running scan with {} points", points.len());
        let results: Vec<ScanPoint> = points
            .into_par_iter()
            .map(|point| {
                let result = self.run_timecourse(&scan.simulation_at(&point))?;
                let values = scan
                    .changes_at(&point)
                    .iter()
                    .map(|(sid, q)| (sid.to_string(), q.clone()))
                    .collect();
                Ok(ScanPoint {
                    indices: point,
                    values,
                    result,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ScanResult {
            dimensions: scan.dimensions.iter().map(|d| d.sid.clone()).collect(),
            points: results,
        })
    }

    pub fn run(&self, simulation: &Simulation) -> Result<SimulationResult> {
        match simulation {
            Simulation::Timecourse(sim) => self.run_timecourse(sim).map(SimulationResult::Timecourse),
            Simulation::Scan(scan) => self.run_scan(scan).map(SimulationResult::Scan),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{idx, Substance, N_STATES};
    use crate::routines::units::Quantity;

    #[test]
    fn test_interval_ends_at_dt() {
        let body = Body::new(BodyParameters::default(), ModelKind::Body);
        let mut x0 = State::zeros();
        x0[idx::IVDOSE_EDO] = 60.0;

        let whole = simulate_interval(&body, x0, 1.0, 1e-8, 1e-14).unwrap();
        let mut split = x0;
        for _ in 0..10 {
            split = simulate_interval(&body, split, 0.1, 1e-8, 1e-14).unwrap();
        }
        for i in 0..N_STATES {
            let diff = (whole[i] - split[i]).abs();
            assert!(diff <= 1e-6 * whole[i].abs() + 1e-12, "state {}", i);
        }
        // the IV dose decays with ki over exactly dt
        let p = &body.parameters;
        let expected = 60.0 * (-p.ki_edo * 1.0).exp();
        assert!((whole[idx::IVDOSE_EDO] - expected).abs() / expected < 1e-6);
    }

    #[test]
    fn test_zero_interval_keeps_state() {
        let body = Body::new(BodyParameters::default(), ModelKind::Body);
        let mut x = State::zeros();
        x[idx::PODOSE_EDO] = 30.0;
        assert_eq!(simulate_interval(&body, x, 0.0, RTOL, ATOL).unwrap(), x);
    }

    #[test]
    fn test_multi_phase_run_conserves_mass() {
        let mut p = BodyParameters::default();
        let mut x = State::zeros();
        let phases = [
            Changes::new().with("PODOSE_edo", Quantity::new(60.0, "mg")),
            Changes::new().with("IVDOSE_edo", Quantity::new(30.0, "mg")),
            Changes::new().with("PODOSE_edo", Quantity::new(30.0, "mg")),
        ];
        let mut dosed = 0.0;
        for changes in &phases {
            let before = x[idx::PODOSE_EDO] + x[idx::IVDOSE_EDO];
            apply_changes(changes, &mut p, &mut x).unwrap();
            dosed += (x[idx::PODOSE_EDO] + x[idx::IVDOSE_EDO] - before) / p.mr_edo;

            let body = Body::new(p, ModelKind::Body);
            for _ in 0..96 {
                x = simulate_interval(&body, x, 15.0, RTOL, ATOL).unwrap();
                let total = body.total_amount(&x);
                assert!((total - dosed).abs() / dosed < 1e-6, "total {} of {}", total, dosed);
            }
        }
        // drug has reached the excreta and the metabolites
        assert!(x[idx::urine(Substance::Edo)] > 0.0);
        assert!(x[idx::feces(Substance::Edo)] > 0.0);
        assert!(x[idx::plasma(Substance::M4)] > 0.0);
    }
}
