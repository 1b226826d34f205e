// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Trajectory Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-particle loop: interpolate → free path → propagate → boundary
//! test → collide, until the trajectory hits a wall or leaves the
//! domain.

use rand::Rng;

use cryo_field::flow::{FlowField, InterpState};
use cryo_field::geometry::Geometry;
use cryo_kinetics::collision::collide;
use cryo_kinetics::propagate::{mean_free_path, propagate_distance, sample_free_path, TrapParams};
use cryo_kinetics::proposal::ProposalTable;
use cryo_types::config::SimConfig;
use cryo_types::constants::V_EPSILON;
use cryo_types::record::{TrajectoryDiagnostics, TrajectoryRecord};

use crate::stats::BinGrid;

/// Shared read-only context for every trajectory of a run.
#[derive(Clone, Copy)]
pub struct EngineContext<'a> {
    pub config: &'a SimConfig,
    pub flow: &'a FlowField,
    pub geometry: &'a Geometry,
    pub table: &'a ProposalTable,
}

fn norm(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Run one particle from `(x0, v0)` to termination.
///
/// The per-trajectory bin grid, when present, observes the state at
/// every collision site; time accounting stops at the start of the
/// terminal segment, matching the row layout consumed downstream.
pub fn run_trajectory<R: Rng>(
    ctx: &EngineContext<'_>,
    x0: [f64; 3],
    v0: [f64; 3],
    rng: &mut R,
    mut bins: Option<&mut BinGrid>,
) -> (TrajectoryRecord, TrajectoryDiagnostics) {
    let cfg = ctx.config;
    let mut x = x0;
    let mut v = v0;
    let mut diag = TrajectoryDiagnostics::default();
    let mut interp = InterpState::default();
    let mut n_collisions: u64 = 0;
    let mut time = 0.0;

    ctx.flow.refresh(&mut interp, &x);

    // a particle at rest has no defined free path: thermalize it once
    // against the local gas before entering the loop
    if norm(&v) < V_EPSILON {
        let cell = ctx.table.lookup(interp.temperature, norm(&interp.vg));
        collide(
            &mut v,
            &interp.vg,
            interp.temperature,
            cell,
            cfg.particle_mass,
            cfg.gas_mass,
            rng,
            &mut diag,
        );
        n_collisions += 1;
    }

    // randomize the initial spin state
    let mut omega_eff = if rng.gen::<f64>() < 0.5 {
        -cfg.omega
    } else {
        cfg.omega
    };

    loop {
        ctx.flow.refresh(&mut interp, &x);
        let rel = [
            v[0] - interp.vg[0],
            v[1] - interp.vg[1],
            v[2] - interp.vg[2],
        ];
        let v_rel = norm(&rel);
        let speed = norm(&v);
        let lambda = mean_free_path(
            speed,
            v_rel,
            interp.temperature,
            interp.density,
            cfg.gas_mass,
            cfg.sigma,
        );
        let d = sample_free_path(lambda, rng);

        let mut x_next = x;
        let mut v_next = v;
        let trap = TrapParams {
            omega: omega_eff,
            z_min: cfg.trap_z_min,
            z_max: cfg.trap_z_max,
        };
        propagate_distance(&mut x_next, &mut v_next, d, &trap);

        if let Some(termination) = ctx.geometry.test(&x, &x_next) {
            diag.field_refreshes = interp.refreshes;
            return (
                TrajectoryRecord {
                    x,
                    x_next,
                    v: v_next,
                    n_collisions,
                    time,
                    termination,
                },
                diag,
            );
        }

        time += d / speed;
        n_collisions += 1;
        if let Some(grid) = bins.as_deref_mut() {
            grid.update(&x, &v, time, n_collisions, d);
        }
        x = x_next;
        v = v_next;

        let cell = ctx.table.lookup(interp.temperature, v_rel);
        collide(
            &mut v,
            &interp.vg,
            interp.temperature,
            cell,
            cfg.particle_mass,
            cfg.gas_mass,
            rng,
            &mut diag,
        );
        if rng.gen::<f64>() < cfg.p_flip {
            omega_eff = -omega_eff;
            diag.spin_flips += 1;
        }
    }
}
