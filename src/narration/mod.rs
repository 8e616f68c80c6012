//! Promotional narration text.

pub(crate) mod script;
