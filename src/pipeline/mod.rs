//! End-to-end generation: run lifecycle, orchestration, and the output catalog.

pub(crate) mod catalog;
pub(crate) mod orchestrator;
pub(crate) mod state;
