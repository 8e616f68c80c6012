use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(255, 128), 128);
}

#[test]
fn premul_scales_color_by_alpha() {
    assert_eq!(premul_rgba8(255, 0, 0, 128), [128, 0, 0, 128]);
    assert_eq!(premul_rgba8(10, 20, 30, 255), [10, 20, 30, 255]);
    assert_eq!(premul_rgba8(10, 20, 30, 0), [0, 0, 0, 0]);
}
