use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    assert_eq!(over(OPAQUE_BLACK, [255, 0, 0, 255], 1.0), [255, 0, 0, 255]);
}

#[test]
fn half_opacity_blends_opaque_layers_evenly() {
    let out = over([200, 0, 0, 255], [0, 0, 200, 255], 0.5);
    assert_eq!(out[3], 255);
    assert!(out[0].abs_diff(100) <= 1);
    assert!(out[2].abs_diff(100) <= 1);
}

#[test]
fn fill_writes_every_pixel() {
    let mut buf = vec![7u8; 12];
    fill(&mut buf, OPAQUE_BLACK);
    assert!(buf.chunks_exact(4).all(|p| p == OPAQUE_BLACK));
}
