// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Cryo Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Trajectory engine, parallel driver, binned trajectory statistics,
//! and the tabular output writers.

pub mod driver;
pub mod output;
pub mod source;
pub mod stats;
pub mod trajectory;
