use rayon::prelude::*;

const RGB_TO_YIQ: [[f32; 3]; 3] = [
    [0.299, 0.587, 0.114],
    [0.595_716, -0.274_453, -0.321_263],
    [0.211_456, -0.522_591, 0.311_135],
];

const YIQ_TO_RGB: [[f32; 3]; 3] = [
    [1.0, 0.9563, 0.6210],
    [1.0, -0.2721, -0.6474],
    [1.0, -1.1070, 1.7046],
];

/// Hue in degrees wrapped into `[0, 359)`.
pub fn wrap_hue(hue: i32) -> i32 {
    hue.rem_euclid(359)
}

/// Rotates the chroma of every pixel by `turns` of a full circle in YIQ space. Alpha is kept.
pub fn rotate_hue_rgba8(pixels: &mut [u8], turns: f32) {
    let m = hue_matrix(turns);
    pixels.par_chunks_exact_mut(4).for_each(|px| {
        let rgb = [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])];
        for (c, row) in m.iter().enumerate() {
            let v = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2];
            px[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    });
}

fn hue_matrix(turns: f32) -> [[f32; 3]; 3] {
    let theta = -turns * std::f32::consts::TAU;
    let (s, c) = theta.sin_cos();
    let rot = [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]];
    mul(&YIQ_TO_RGB, &mul(&rot, &RGB_TO_YIQ))
}

fn mul(a: &[[f32; 3]; 3], b: &[[f32; 3]; 3]) -> [[f32; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, v) in row.iter_mut().enumerate() {
            *v = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/hue.rs"]
mod tests;
