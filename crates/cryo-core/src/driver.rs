// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Parallel Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fan-out of N independent trajectories over worker threads.
//!
//! Every trajectory owns an RNG stream derived from the master seed
//! and its index, so results reproduce bitwise for a fixed seed
//! regardless of thread scheduling. Output rows come back in index
//! order from the indexed parallel collect; bin grids are merged into
//! the shared accumulators behind a mutex as each trajectory ends.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::Mutex;

use cryo_types::error::{CryoError, CryoResult};
use cryo_types::record::{Termination, TrajectoryDiagnostics, TrajectoryRecord};

use crate::source::PhaseSpace;
use crate::stats::{BinGrid, BinGridSpec};
use crate::trajectory::{run_trajectory, EngineContext};

/// Everything a run produces: rows in launch order, the two merged
/// accumulators, and the summed diagnostics.
#[derive(Debug)]
pub struct RunOutput {
    pub records: Vec<TrajectoryRecord>,
    /// Statistics over every trajectory.
    pub all_stats: Option<BinGrid>,
    /// Statistics over trajectories that exited the domain.
    pub exit_stats: Option<BinGrid>,
    pub diagnostics: TrajectoryDiagnostics,
}

/// Stream seed for trajectory `index` (splitmix-style derivation).
fn stream_seed(master: u64, index: u64) -> u64 {
    master
        .wrapping_add(index)
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

/// Run `n` trajectories of `source` through the engine.
pub fn run<S>(
    ctx: &EngineContext<'_>,
    source: &S,
    n: usize,
    bin_spec: Option<BinGridSpec>,
) -> CryoResult<RunOutput>
where
    S: Fn(&mut StdRng) -> PhaseSpace + Sync,
{
    let master = ctx.config.seed;
    let all_acc = Mutex::new(bin_spec.map(BinGrid::new));
    let exit_acc = Mutex::new(bin_spec.map(BinGrid::new));

    let lock_err = || CryoError::PhysicsViolation("bin accumulator mutex poisoned".to_string());

    let results: Vec<CryoResult<(TrajectoryRecord, TrajectoryDiagnostics)>> = (0..n)
        .into_par_iter()
        .map(|index| {
            let mut rng = StdRng::seed_from_u64(stream_seed(master, index as u64));
            let (x0, v0) = source(&mut rng);
            let mut grid = bin_spec.map(BinGrid::new);

            let (record, diag) = run_trajectory(ctx, x0, v0, &mut rng, grid.as_mut());

            if let Some(grid) = grid {
                let mut all = all_acc.lock().map_err(|_| lock_err())?;
                if let Some(acc) = all.as_mut() {
                    acc.merge(&grid)?;
                }
                if record.termination == Termination::Exit {
                    let mut exit = exit_acc.lock().map_err(|_| lock_err())?;
                    if let Some(acc) = exit.as_mut() {
                        acc.merge(&grid)?;
                    }
                }
            }
            Ok((record, diag))
        })
        .collect();

    let mut records = Vec::with_capacity(n);
    let mut diagnostics = TrajectoryDiagnostics::default();
    for result in results {
        let (record, diag) = result?;
        diagnostics.absorb(&diag);
        records.push(record);
    }

    let all_stats = all_acc.into_inner().map_err(|_| lock_err())?;
    let exit_stats = exit_acc.into_inner().map_err(|_| lock_err())?;

    Ok(RunOutput {
        records,
        all_stats,
        exit_stats,
        diagnostics,
    })
}
