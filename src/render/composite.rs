use crate::foundation::math::{mul_div255_u8, opacity_to_u8};

pub type PremulRgba8 = [u8; 4];

pub const OPAQUE_BLACK: PremulRgba8 = [0, 0, 0, 255];

pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = opacity_to_u8(f64::from(opacity));
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn fill(dst: &mut [u8], px: PremulRgba8) {
    for d in dst.chunks_exact_mut(4) {
        d.copy_from_slice(&px);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
