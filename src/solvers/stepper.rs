use log::{debug, info};

use super::rhs::RightHandSide;
use crate::error::Error;
use crate::patch::Patch;

/// Fraction of a time step within which the final time counts as reached.
const MATCH_TOLERANCE: f64 = 1e-9;

/// Whether the right hand side depends nonlinearly on the state. An explicit
/// scheme treats both alike; the marking is carried for the log.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemType {
    Linear,
    Nonlinear,
}

#[derive(Clone, Copy, Debug)]
pub struct StepReport {
    pub steps: u64,
    pub final_time: f64,
}

/// First-order explicit Euler time integration, `U <- U + h F(U, t)`, with a
/// fixed step size. Step `n` ends at `min(n dt, t_final)`, so the last step
/// is shortened if needed to land exactly on the final time.
///
#[derive(Clone, Debug)]
pub struct ForwardEuler {
    time_step_size: f64,
    final_time: f64,
    problem_type: ProblemType,
}

impl ForwardEuler {
    pub fn new(time_step_size: f64, final_time: f64) -> Result<Self, Error> {
        if !(time_step_size > 0.0 && time_step_size.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "time step must be positive, got {}",
                time_step_size
            )));
        }
        if !(final_time >= 0.0 && final_time.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "final time must be non-negative, got {}",
                final_time
            )));
        }
        Ok(Self {
            time_step_size,
            final_time,
            problem_type: ProblemType::Linear,
        })
    }

    pub fn with_problem_type(mut self, problem_type: ProblemType) -> Self {
        self.problem_type = problem_type;
        self
    }

    /// Advance `state` in place from `t = 0` to the final time.
    ///
    pub fn solve<R: RightHandSide>(&self, rhs: &mut R, state: &mut Patch) -> Result<StepReport, Error> {
        let dt = self.time_step_size;
        let t_final = self.final_time;
        let tolerance = MATCH_TOLERANCE * dt;
        let mut derivative = Patch::zeros(state.num_fields(), state.index_space());
        let mut time = 0.0;
        let mut steps: u64 = 0;

        info!(
            "forward Euler ({:?}): dt={} t_final={}",
            self.problem_type, dt, t_final
        );

        while t_final - time > tolerance {
            let mut next = (steps + 1) as f64 * dt;

            if t_final - next <= tolerance {
                next = t_final;
            }
            rhs.evaluate(time, state, &mut derivative)?;
            state.add_scaled(next - time, &derivative);

            time = next;
            steps += 1;

            if steps % 100 == 0 {
                debug!("[{}] t={:.4}", steps, time);
            }
        }
        Ok(StepReport {
            steps,
            final_time: time,
        })
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::index_space::IndexSpace;

    /// `du/dt = -u`, recording every time it was called at.
    struct Decay {
        times: Vec<f64>,
    }

    impl RightHandSide for Decay {
        fn evaluate(&mut self, time: f64, state: &Patch, derivative: &mut Patch) -> Result<(), Error> {
            self.times.push(time);
            for (f, u) in derivative.iter_data_mut().zip(state.iter_data()) {
                f[0] = -u[0];
            }
            Ok(())
        }
    }

    fn unit_state() -> Patch {
        Patch::from_slice_function(IndexSpace::new(0..1), 1, |_, f| f[0] = 1.0)
    }

    #[test]
    fn euler_steps_compound_the_decay_factor() {
        let mut rhs = Decay { times: Vec::new() };
        let mut u = unit_state();
        let report = ForwardEuler::new(0.1, 1.0).unwrap().solve(&mut rhs, &mut u).unwrap();

        assert_eq!(report.steps, 10);
        assert_eq!(report.final_time, 1.0);
        assert!((u.get_slice(0)[0] - 0.9f64.powi(10)).abs() < 1e-12);
    }

    #[test]
    fn last_step_is_shortened_to_hit_the_final_time() {
        let mut rhs = Decay { times: Vec::new() };
        let mut u = unit_state();
        let report = ForwardEuler::new(0.1, 0.25).unwrap().solve(&mut rhs, &mut u).unwrap();

        assert_eq!(report.steps, 3);
        assert_eq!(report.final_time, 0.25);
        assert_eq!(rhs.times.len(), 3);
        assert!(rhs.times.windows(2).all(|w| w[0] < w[1]));
        assert!((u.get_slice(0)[0] - 0.9 * 0.9 * 0.95).abs() < 1e-12);
    }

    #[test]
    fn zero_final_time_takes_no_steps() {
        let mut rhs = Decay { times: Vec::new() };
        let mut u = unit_state();
        let report = ForwardEuler::new(0.1, 0.0).unwrap().solve(&mut rhs, &mut u).unwrap();
        assert_eq!(report.steps, 0);
        assert_eq!(u, unit_state());
    }

    #[test]
    fn bad_step_sizes_are_rejected() {
        assert!(ForwardEuler::new(0.0, 1.0).is_err());
        assert!(ForwardEuler::new(-0.1, 1.0).is_err());
        assert!(ForwardEuler::new(0.1, f64::NAN).is_err());
    }
}
