//! CPU rasterization of promo frames and thumbnails.
//!
//! Composers draw against the [`surface::Surface`] capability in a fixed 1080x1920 design space;
//! [`surface::CpuSurface`] scales that to the configured canvas and rasterizes with `vello_cpu`.

pub(crate) mod backend;
pub(crate) mod frame;
pub(crate) mod palette;
pub(crate) mod surface;
pub(crate) mod text;
pub(crate) mod thumbnail;
