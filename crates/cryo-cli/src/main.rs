// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — cryoflow CLI
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Command-line driver: load the geometry and flow tables, fan the
//! trajectories across worker threads, write rows and bin statistics.

use clap::Parser;
use rand::rngs::StdRng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;

use cryo_core::driver::run;
use cryo_core::output::{write_bin_csv, write_particle_rows};
use cryo_core::source::GaussianSource;
use cryo_core::stats::BinGridSpec;
use cryo_core::trajectory::EngineContext;
use cryo_field::flow::FlowField;
use cryo_field::geometry::Geometry;
use cryo_kinetics::proposal::ProposalTable;
use cryo_types::config::SimConfig;
use cryo_types::error::{CryoError, CryoResult};

/// Buffer-gas beam Monte Carlo.
#[derive(Parser, Debug)]
#[command(name = "cryoflow")]
#[command(about = "Trace heavy test particles through a buffer-gas flow", long_about = None)]
struct Args {
    /// JSON run deck; flags override its values
    #[arg(long)]
    config: Option<String>,

    /// Geometry table
    #[arg(long)]
    geom: Option<String>,

    /// Flow-field table
    #[arg(long)]
    flow: Option<String>,

    /// Number of trajectories
    #[arg(short, long)]
    n: Option<usize>,

    /// Source axial position [m]
    #[arg(long)]
    z: Option<f64>,

    /// Source radial position [m]
    #[arg(long)]
    r: Option<f64>,

    /// Source axial bulk velocity [m/s]
    #[arg(long)]
    vz: Option<f64>,

    /// Source radial bulk velocity [m/s]
    #[arg(long)]
    vr: Option<f64>,

    /// Source temperature [K]
    #[arg(short = 'T', long = "temp")]
    t_source: Option<f64>,

    /// Buffer-gas atom mass [AMU]
    #[arg(short = 'm', long = "gas-mass")]
    gas_mass: Option<f64>,

    /// Test-particle mass [AMU]
    #[arg(short = 'M', long = "particle-mass")]
    particle_mass: Option<f64>,

    /// Collision cross-section [m^2]
    #[arg(long)]
    sigma: Option<f64>,

    /// Harmonic trap frequency parameter [1/s], signed
    #[arg(long)]
    omega: Option<f64>,

    /// Axial start of the trap window [m]
    #[arg(long)]
    zmin: Option<f64>,

    /// Axial end of the trap window [m]
    #[arg(long)]
    zmax: Option<f64>,

    /// Per-collision spin-flip probability
    #[arg(long)]
    pflip: Option<f64>,

    /// Emit every per-particle row, not only exits (0/1)
    #[arg(long)]
    saveall: Option<u8>,

    /// Bin-statistics CSV path, all trajectories
    #[arg(long)]
    stats: Option<String>,

    /// Bin-statistics CSV path, exited trajectories only
    #[arg(long)]
    exitstats: Option<String>,

    /// Radial bin count for trajectory statistics
    #[arg(long)]
    rbins: Option<usize>,

    /// Axial bin count for trajectory statistics
    #[arg(long)]
    zbins: Option<usize>,

    /// Master RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    /// Fold CLI flags over the run deck (or the defaults).
    fn into_config(self) -> CryoResult<SimConfig> {
        let mut cfg = match &self.config {
            Some(path) => SimConfig::from_file(path)?,
            None => SimConfig::default(),
        };
        if self.geom.is_some() {
            cfg.geom = self.geom;
        }
        if self.flow.is_some() {
            cfg.flow = self.flow;
        }
        if let Some(n) = self.n {
            cfg.n_particles = n;
        }
        if let Some(z) = self.z {
            cfg.z_start = z;
        }
        if let Some(r) = self.r {
            cfg.r_start = r;
        }
        if let Some(vz) = self.vz {
            cfg.vz_start = vz;
        }
        if let Some(vr) = self.vr {
            cfg.vr_start = vr;
        }
        if let Some(t) = self.t_source {
            cfg.t_source = t;
        }
        if let Some(m) = self.gas_mass {
            cfg.gas_mass = m;
        }
        if let Some(m) = self.particle_mass {
            cfg.particle_mass = m;
        }
        if let Some(s) = self.sigma {
            cfg.sigma = s;
        }
        if let Some(w) = self.omega {
            cfg.omega = w;
        }
        if let Some(z) = self.zmin {
            cfg.trap_z_min = z;
        }
        if let Some(z) = self.zmax {
            cfg.trap_z_max = z;
        }
        if let Some(p) = self.pflip {
            cfg.p_flip = p;
        }
        if let Some(s) = self.saveall {
            cfg.save_all = s;
        }
        if self.stats.is_some() {
            cfg.stats = self.stats;
        }
        if self.exitstats.is_some() {
            cfg.exitstats = self.exitstats;
        }
        if self.rbins.is_some() {
            cfg.r_bins = self.rbins;
        }
        if self.zbins.is_some() {
            cfg.z_bins = self.zbins;
        }
        if let Some(s) = self.seed {
            cfg.seed = s;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn execute(cfg: SimConfig) -> CryoResult<()> {
    let geom_path = cfg
        .geom
        .clone()
        .ok_or_else(|| CryoError::ConfigError("geometry table path is required".to_string()))?;
    let flow_path = cfg
        .flow
        .clone()
        .ok_or_else(|| CryoError::ConfigError("flow table path is required".to_string()))?;

    let geometry = Geometry::from_file(&geom_path)?;
    let flow = FlowField::from_file(&flow_path)?;
    let table = ProposalTable::generate(
        flow.t_min,
        flow.t_max,
        1.5 * flow.max_bulk_speed,
        cfg.gas_mass,
        cfg.seed,
    );

    let bin_spec = match (cfg.r_bins, cfg.z_bins) {
        (Some(r_bins), Some(z_bins)) => Some(BinGridSpec {
            r_bins,
            z_bins,
            r_min: flow.r_min,
            r_max: flow.r_max,
            z_min: flow.z_min,
            z_max: flow.z_max,
        }),
        _ => None,
    };

    let ctx = EngineContext {
        config: &cfg,
        flow: &flow,
        geometry: &geometry,
        table: &table,
    };
    let gaussian = GaussianSource::from_config(&cfg);
    let source = move |rng: &mut StdRng| gaussian.draw(rng);

    let out = run(&ctx, &source, cfg.n_particles, bin_spec)?;

    // per-particle rows go to the primary output stream
    let stdout = std::io::stdout();
    let mut rows = BufWriter::new(stdout.lock());
    write_particle_rows(&mut rows, &out.records, cfg.save_all != 0)?;
    rows.flush()?;

    if let Some(path) = &cfg.stats {
        if let Some(grid) = &out.all_stats {
            let mut writer = BufWriter::new(File::create(path)?);
            write_bin_csv(&mut writer, grid)?;
        }
    }
    if let Some(path) = &cfg.exitstats {
        if let Some(grid) = &out.exit_stats {
            let mut writer = BufWriter::new(File::create(path)?);
            write_bin_csv(&mut writer, grid)?;
        }
    }

    let diag = &out.diagnostics;
    eprintln!(
        "cryoflow: {} trajectories, {} field refreshes, {} sampler fallbacks ({} speed / {} angle), {} spin flips",
        out.records.len(),
        diag.field_refreshes,
        diag.speed_fallbacks + diag.angle_fallbacks,
        diag.speed_fallbacks,
        diag.angle_fallbacks,
        diag.spin_flips,
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let cfg = match args.into_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("cryoflow: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = execute(cfg) {
        eprintln!("cryoflow: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
