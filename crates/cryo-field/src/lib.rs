// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Cryo Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Background gas state and wall geometry.
//!
//! Both components are built once from whitespace tables and shared
//! read-only across worker threads.

pub mod flow;
pub mod geometry;
