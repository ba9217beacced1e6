//! The per-resolution run lifecycle and the resolution sweep around it.
//!
//! Each resolution owns its grid, state vectors, and right hand side for
//! exactly the duration of `run_resolution`; all of them are released on
//! every exit path, including an early return on a failed write.

use std::path::PathBuf;

use log::{info, warn};

use crate::config::Config;
use crate::distributed::DistributedGrid;
use crate::error::Error;
use crate::grid::Grid;
use crate::hydro::swe::{ShallowWater, NUM_FIELDS};
use crate::message::Communicator;
use crate::norm::{error_norm, ErrorNorm};
use crate::output;
use crate::runtime;
use crate::setup;
use crate::solvers::{ForwardEuler, ProblemType, ShallowWaterRhs};




/**
 * What one resolution's run produced. Every rank holds the same summary.
 */
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub num_points: usize,
    pub norm: ErrorNorm,
    pub steps: u64,
    pub final_time: f64,
    pub degenerate_points: usize,
    pub output: PathBuf,
}




/**
 * Run every configured resolution on `config.num_ranks` ranks, and return
 * the summaries in sweep order. The first error on any rank ends the whole
 * sweep.
 */
pub fn run(config: &Config) -> Result<Vec<RunSummary>, Error> {
    config.validate()?;

    info!(
        "sweeping {:?} on {} rank(s): dt={} t_final={} g={} boundary={} sources={}",
        config.resolutions,
        config.num_ranks,
        config.time_step_size,
        config.final_time,
        config.gravity,
        config.boundary,
        config.sources,
    );
    let per_rank = runtime::launch(config.num_ranks, config.pin_cores, |comm| sweep(comm, config))?;
    Ok(per_rank.into_iter().next().unwrap_or_default())
}




/**
 * Run the resolutions of `config` one after another on this rank, logging
 * the observed order of convergence between consecutive resolutions.
 */
pub fn sweep<C: Communicator>(comm: &C, config: &Config) -> Result<Vec<RunSummary>, Error> {
    let mut summaries: Vec<RunSummary> = Vec::with_capacity(config.resolutions.len());

    for &num_points in &config.resolutions {
        let summary = run_resolution(comm, config, num_points)?;

        if let Some(previous) = summaries.last() {
            if comm.rank() == 0 {
                let (h, hu) = convergence_order(previous, &summary);
                info!(
                    "convergence order {} -> {}: h {:.3}, hu {:.3}",
                    previous.num_points, num_points, h, hu
                );
            }
        }
        summaries.push(summary);
    }
    Ok(summaries)
}




/**
 * Evolve the manufactured initial condition on a grid of `num_points` to the
 * final time, measure its distance from the exact solution, report the
 * norms on stdout, and write `solution_<nx>.csv`.
 */
pub fn run_resolution<C: Communicator>(
    comm: &C,
    config: &Config,
    num_points: usize,
) -> Result<RunSummary, Error> {
    let grid = DistributedGrid::new(Grid::new(num_points)?, comm, NUM_FIELDS)?;
    let physics = ShallowWater::new(config.gravity);
    let stepper = ForwardEuler::new(config.time_step_size, config.final_time)?
        .with_problem_type(ProblemType::Nonlinear);

    let mut state = setup::initial_condition(&grid);
    let mut rhs = ShallowWaterRhs::new(&grid, physics, config.boundary, config.sources);
    let report = stepper.solve(&mut rhs, &mut state)?;

    let degenerate_points = grid.sum_all(&[rhs.degenerate_points() as f64])?[0] as usize;

    if degenerate_points > 0 && comm.rank() == 0 {
        warn!(
            "nx={}: momentum flux was undefined at {} point evaluation(s)",
            num_points, degenerate_points
        );
    }

    let exact = setup::exact_solution(&grid, report.final_time);
    let norm = error_norm(&grid, &state, &exact)?;

    if comm.rank() == 0 {
        println!(
            "Grid size: {}, Error norm (h): {}, Error norm (hu): {}",
            num_points,
            output::general(norm.height),
            output::general(norm.momentum)
        );
    }

    let output = config
        .output_directory
        .join(format!("solution_{}.csv", num_points));
    output::write_solution(&grid, &state, &output)?;

    if config.checkpoint {
        let path = config
            .output_directory
            .join(format!("solution_{}.cbor", num_points));
        output::write_checkpoint(&grid, config, &state, report.final_time, &path)?;
    }

    Ok(RunSummary {
        num_points,
        norm,
        steps: report.steps,
        final_time: report.final_time,
        degenerate_points,
        output,
    })
}




/**
 * The observed order `ln(e_coarse / e_fine) / ln(dx_coarse / dx_fine)` for
 * the height and momentum errors.
 */
pub fn convergence_order(coarse: &RunSummary, fine: &RunSummary) -> (f64, f64) {
    let dx = |n: usize| 1.0 / (n - 1) as f64;
    let ratio = (dx(coarse.num_points) / dx(fine.num_points)).ln();

    (
        (coarse.norm.height / fine.norm.height).ln() / ratio,
        (coarse.norm.momentum / fine.norm.momentum).ln() / ratio,
    )
}




// ============================================================================
#[cfg(test)]
mod test {

    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::solvers::{BoundaryPolicy, SourceTerms};

    fn scratch_directory(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shallows-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn short_run(name: &str, resolutions: Vec<usize>, num_ranks: usize) -> Config {
        Config {
            resolutions,
            final_time: 0.1,
            num_ranks,
            output_directory: scratch_directory(name),
            ..Config::default()
        }
    }

    #[test]
    fn a_short_run_writes_one_row_per_point() {
        let config = short_run("rows", vec![50], 1);
        let summaries = run(&config).unwrap();
        let summary = &summaries[0];

        assert_eq!(summaries.len(), 1);
        assert_eq!(summary.steps, 100);
        assert!((summary.final_time - 0.1).abs() < 1e-12);
        assert_eq!(summary.degenerate_points, 0);
        assert!(summary.norm.height.is_finite() && summary.norm.height > 0.0);
        assert!(summary.norm.momentum.is_finite() && summary.norm.momentum > 0.0);

        let text = fs::read_to_string(&summary.output).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 51);
        assert_eq!(lines[0], "x,h,hu");
        assert!(lines[1].starts_with("0,1,"));
        assert!(lines[50].starts_with("1,"));
    }

    #[test]
    fn the_default_resolution_writes_a_thousand_rows() {
        let config = Config {
            final_time: 0.01,
            output_directory: scratch_directory("default"),
            ..Config::default()
        };
        let summary = &run(&config).unwrap()[0];
        let text = fs::read_to_string(&summary.output).unwrap();

        assert_eq!(summary.output.file_name().unwrap(), "solution_1000.csv");
        assert_eq!(text.lines().count(), 1001);
    }

    #[test]
    fn rank_count_does_not_change_the_solution() {
        let serial = run(&short_run("serial", vec![40], 1)).unwrap();
        let parallel = run(&short_run("parallel", vec![40], 3)).unwrap();

        let a = fs::read_to_string(&serial[0].output).unwrap();
        let b = fs::read_to_string(&parallel[0].output).unwrap();
        assert_eq!(a, b);
        assert!((serial[0].norm.height - parallel[0].norm.height).abs() < 1e-12);
    }

    #[test]
    fn manufactured_problem_converges_at_second_order() {
        let config = Config {
            resolutions: vec![21, 41],
            time_step_size: 1e-5,
            final_time: 0.05,
            boundary: BoundaryPolicy::Manufactured,
            sources: SourceTerms::Complete,
            output_directory: scratch_directory("convergence"),
            ..Config::default()
        };
        let summaries = run(&config).unwrap();
        let (h, hu) = convergence_order(&summaries[0], &summaries[1]);

        assert!(summaries[1].norm.height < summaries[0].norm.height);
        assert!(summaries[1].norm.momentum < summaries[0].norm.momentum);
        assert!(h > 1.5, "order (h) = {}", h);
        assert!(hu > 1.5, "order (hu) = {}", hu);
    }

    #[test]
    fn checkpoint_holds_the_gathered_state() {
        let config = Config {
            checkpoint: true,
            ..short_run("checkpoint", vec![30], 2)
        };
        let summary = &run(&config).unwrap()[0];
        let checkpoint = output::read_checkpoint(&summary.output.with_extension("cbor")).unwrap();

        assert_eq!(checkpoint.num_points, 30);
        assert_eq!(checkpoint.config, config);
        assert_eq!(checkpoint.state.index_space().len(), 30);
        assert!((checkpoint.time - 0.1).abs() < 1e-12);
    }

    #[test]
    fn unwritable_output_fails_the_sweep_without_hanging() {
        let config = Config {
            output_directory: scratch_directory("unwritable").join("missing").join("nested"),
            ..short_run("unwritable", vec![20, 40], 2)
        };
        assert!(matches!(run(&config), Err(Error::Io { .. })));
    }
}
