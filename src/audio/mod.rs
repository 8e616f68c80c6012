//! Narration audio synthesis.

pub(crate) mod synth;
