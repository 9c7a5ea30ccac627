// src/manifest/mod.rs
// =============================================================================
// This module reads dependency manifests.
//
// Currently implements:
// - go.mod `require` scanning (single-line and block form)
//
// The scanner is a pure function over text. It knows nothing about the
// graph or the network; the parse stage in crawl/ wires it up.
// =============================================================================

mod gomod;

pub use gomod::{parse_requirements, Requirement, ScanError};
