/// `v * num / den`, rounded to nearest. Used to carry lores coordinates into hires space.
pub(crate) fn scale_round(v: i32, num: u32, den: u32) -> i32 {
    if den == 0 {
        return v;
    }
    let scaled = (f64::from(v) * f64::from(num)) / f64::from(den);
    scaled.round() as i32
}

/// `len * factor`, rounded to nearest and never below one pixel.
pub(crate) fn scale_extent(len: u32, factor: f32) -> u32 {
    let scaled = (f64::from(len) * f64::from(factor)).round();
    if scaled < 1.0 { 1 } else { scaled as u32 }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
