pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Premultiply one straight-alpha RGBA8 pixel.
pub(crate) fn premul_rgba8(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let a16 = u16::from(a);
    let p = |c: u8| mul_div255_u16(u16::from(c), a16) as u8;
    [p(r), p(g), p(b), a]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
