// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Output Writers
// © 1998–2026 Miroslav Šotek. All rights reserved.
// ─────────────────────────────────────────────────────────────────────
//! Tabular output: per-particle termination rows and per-cell bin
//! statistics.

use std::io::{self, Write};

use cryo_types::record::{Termination, TrajectoryRecord};

use crate::stats::BinGrid;

/// Six significant figures, scientific.
fn sci(value: f64) -> String {
    format!("{value:.5e}")
}

/// CSV field: NaN (empty accumulator) renders as an empty field.
fn csv_field(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:.6e}")
    }
}

/// Write per-particle rows. A row appears when `save_all` is set or
/// the trajectory exited the domain.
pub fn write_particle_rows<W: Write>(
    out: &mut W,
    records: &[TrajectoryRecord],
    save_all: bool,
) -> io::Result<()> {
    writeln!(out, "idx x y z xnext ynext znext vx vy vz collides time")?;
    for (idx, rec) in records.iter().enumerate() {
        if !save_all && rec.termination != Termination::Exit {
            continue;
        }
        writeln!(
            out,
            "{} {} {} {} {} {} {} {} {} {} {} {}",
            idx,
            sci(rec.x[0]),
            sci(rec.x[1]),
            sci(rec.x[2]),
            sci(rec.x_next[0]),
            sci(rec.x_next[1]),
            sci(rec.x_next[2]),
            sci(rec.v[0]),
            sci(rec.v[1]),
            sci(rec.v[2]),
            rec.n_collisions,
            sci(rec.time),
        )?;
    }
    Ok(())
}

/// Write the bin-statistics CSV, one row per cell with cell-center
/// coordinates.
pub fn write_bin_csv<W: Write>(out: &mut W, grid: &BinGrid) -> io::Result<()> {
    writeln!(
        out,
        "r, z, n, t, tvar, vr, vz, vrvar, vzvar, vrvzcov, ncolls, ncollsvar, lfree, lfreevar"
    )?;
    let spec = grid.spec();
    for ir in 0..spec.r_bins {
        for iz in 0..spec.z_bins {
            let cell = grid.cell(ir, iz);
            let r = spec.r_min + (ir as f64 + 0.5) * spec.dr();
            let z = spec.z_min + (iz as f64 + 0.5) * spec.dz();
            let v_mean = cell.velocity.mean();
            let v_var = cell.velocity.variance();
            writeln!(
                out,
                "{}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}",
                csv_field(r),
                csv_field(z),
                cell.time.count(),
                csv_field(cell.time.mean()),
                csv_field(cell.time.variance()),
                csv_field(v_mean[0]),
                csv_field(v_mean[1]),
                csv_field(v_var[0]),
                csv_field(v_var[1]),
                csv_field(cell.velocity.covariance()),
                csv_field(cell.collisions.mean()),
                csv_field(cell.collisions.variance()),
                csv_field(cell.free_path.mean()),
                csv_field(cell.free_path.variance()),
            )?;
        }
    }
    Ok(())
}
