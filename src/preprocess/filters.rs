//! Base preprocessing techniques applied to the grayscale buffer.

use image::GrayImage;
use imageproc::contrast;
use rayon::prelude::*;

/// Window radius for local-adaptive binarization (11-pixel block).
const ADAPTIVE_BLOCK_RADIUS: u32 = 5;

/// CLAHE tile grid: 8x8 tiles across the image.
const CLAHE_TILES: u32 = 8;
/// CLAHE contrast clip limit, as a multiple of the uniform bin height.
const CLAHE_CLIP_LIMIT: f32 = 2.0;

/// Bilateral filter kernel radius (9-pixel extent).
const BILATERAL_RADIUS: isize = 4;
/// Bilateral intensity-domain sigma.
const BILATERAL_SIGMA_COLOR: f32 = 75.0;
/// Bilateral spatial-domain sigma.
const BILATERAL_SIGMA_SPACE: f32 = 75.0;

/// Global binarization with automatic threshold selection.
pub fn otsu_binarize(gray: &GrayImage) -> GrayImage {
    let threshold = otsu_threshold(gray.as_raw());
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = if pixel[0] <= threshold { 0 } else { 255 };
    }
    out
}

/// Calculate the threshold that maximizes between-class variance.
fn otsu_threshold(gray: &[u8]) -> u8 {
    // Build histogram
    let mut histogram = [0u32; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total_pixels = gray.len() as f64;
    let mut max_variance = 0.0;
    let mut optimal_threshold = 128u8;

    for threshold in 0..=255u8 {
        let mut dark_pixels = 0u32;
        let mut dark_sum = 0u64;
        let mut light_pixels = 0u32;
        let mut light_sum = 0u64;

        for intensity in 0..=255u8 {
            let count = histogram[intensity as usize];
            if intensity < threshold {
                dark_pixels += count;
                dark_sum += count as u64 * intensity as u64;
            } else {
                light_pixels += count;
                light_sum += count as u64 * intensity as u64;
            }
        }

        if dark_pixels == 0 || light_pixels == 0 {
            continue;
        }

        let dark_mean = dark_sum as f64 / dark_pixels as f64;
        let light_mean = light_sum as f64 / light_pixels as f64;
        let dark_weight = dark_pixels as f64 / total_pixels;
        let light_weight = light_pixels as f64 / total_pixels;

        let variance = dark_weight * light_weight * (dark_mean - light_mean).powi(2);
        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = threshold;
        }
    }

    optimal_threshold
}

/// Local-adaptive binarization over a sliding mean window. Images too
/// small to hold the window pass through unchanged.
pub fn adaptive_binarize(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let max_radius = width.min(height).saturating_sub(1) / 2;
    let radius = ADAPTIVE_BLOCK_RADIUS.min(max_radius);
    if radius == 0 {
        return gray.clone();
    }
    contrast::adaptive_threshold(gray, radius)
}

/// Plain histogram equalization over the full image.
pub fn equalize(gray: &GrayImage) -> GrayImage {
    contrast::equalize_histogram(gray)
}

/// Contrast-limited adaptive histogram equalization.
///
/// Per-tile clipped histograms with bilinear blending between the four
/// nearest tile mappings, so tile boundaries stay artifact-free.
pub fn clahe(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let tile_w = width / CLAHE_TILES;
    let tile_h = height / CLAHE_TILES;
    if tile_w == 0 || tile_h == 0 {
        // Image smaller than the tile grid; equalization degenerates
        return gray.clone();
    }

    let tiles = CLAHE_TILES as usize;
    let src = gray.as_raw();
    let w = width as usize;
    let h = height as usize;

    // One 256-entry intensity mapping per tile
    let mut maps = vec![[0u8; 256]; tiles * tiles];
    for ty in 0..tiles {
        for tx in 0..tiles {
            let x0 = tx * tile_w as usize;
            let y0 = ty * tile_h as usize;
            let x1 = if tx == tiles - 1 { w } else { x0 + tile_w as usize };
            let y1 = if ty == tiles - 1 { h } else { y0 + tile_h as usize };
            let pixels = ((x1 - x0) * (y1 - y0)) as u32;

            let mut histogram = [0u32; 256];
            for row in y0..y1 {
                for col in x0..x1 {
                    histogram[src[row * w + col] as usize] += 1;
                }
            }

            // Clip the histogram and spread the excess uniformly
            let clip = ((CLAHE_CLIP_LIMIT * pixels as f32 / 256.0) as u32).max(1);
            let mut excess = 0u32;
            for bin in histogram.iter_mut() {
                if *bin > clip {
                    excess += *bin - clip;
                    *bin = clip;
                }
            }
            let spread = excess / 256;
            let remainder = (excess % 256) as usize;
            for (i, bin) in histogram.iter_mut().enumerate() {
                *bin += spread;
                if i < remainder {
                    *bin += 1;
                }
            }

            // Cumulative distribution becomes the mapping table
            let mut cumulative = 0u32;
            let mut cdf = [0u32; 256];
            for (i, &bin) in histogram.iter().enumerate() {
                cumulative += bin;
                cdf[i] = cumulative;
            }
            let cdf_min = cdf.iter().copied().find(|&v| v > 0).unwrap_or(0);
            let denom = cdf[255].saturating_sub(cdf_min);

            let map = &mut maps[ty * tiles + tx];
            for i in 0..256 {
                map[i] = if denom == 0 {
                    i as u8
                } else {
                    let scaled = (cdf[i].saturating_sub(cdf_min)) as f32 / denom as f32 * 255.0;
                    scaled.min(255.0) as u8
                };
            }
        }
    }

    // Blend each pixel between the four nearest tile mappings
    let tile_wf = tile_w as f32;
    let tile_hf = tile_h as f32;
    let last_tile = tiles as i32 - 1;
    let mut out = vec![0u8; w * h];
    out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let fy = (y as f32 + 0.5) / tile_hf - 0.5;
        let ty0 = (fy.floor() as i32).clamp(0, last_tile) as usize;
        let ty1 = (fy.floor() as i32 + 1).clamp(0, last_tile) as usize;
        let ay = fy - fy.floor();
        for (x, dst) in row.iter_mut().enumerate() {
            let value = src[y * w + x] as usize;
            let fx = (x as f32 + 0.5) / tile_wf - 0.5;
            let tx0 = (fx.floor() as i32).clamp(0, last_tile) as usize;
            let tx1 = (fx.floor() as i32 + 1).clamp(0, last_tile) as usize;
            let ax = fx - fx.floor();

            let v00 = maps[ty0 * tiles + tx0][value] as f32;
            let v10 = maps[ty0 * tiles + tx1][value] as f32;
            let v01 = maps[ty1 * tiles + tx0][value] as f32;
            let v11 = maps[ty1 * tiles + tx1][value] as f32;
            let top = v00 * (1.0 - ax) + v10 * ax;
            let bottom = v01 * (1.0 - ax) + v11 * ax;
            *dst = (top * (1.0 - ay) + bottom * ay).round().clamp(0.0, 255.0) as u8;
        }
    });

    GrayImage::from_raw(width, height, out).expect("output buffer matches input dimensions")
}

/// Edge-preserving smoothing: Gaussian in both the spatial and the
/// intensity domain, so flat regions blur while module edges survive.
pub fn bilateral(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let w = width as usize;
    let h = height as usize;
    if w == 0 || h == 0 {
        return gray.clone();
    }
    let src = gray.as_raw();

    let side = (2 * BILATERAL_RADIUS + 1) as usize;
    let mut spatial = vec![0f32; side * side];
    let space_denom = 2.0 * BILATERAL_SIGMA_SPACE * BILATERAL_SIGMA_SPACE;
    for dy in -BILATERAL_RADIUS..=BILATERAL_RADIUS {
        for dx in -BILATERAL_RADIUS..=BILATERAL_RADIUS {
            let dist = (dx * dx + dy * dy) as f32;
            let row = (dy + BILATERAL_RADIUS) as usize;
            let col = (dx + BILATERAL_RADIUS) as usize;
            spatial[row * side + col] = (-dist / space_denom).exp();
        }
    }

    let mut range = [0f32; 256];
    let color_denom = 2.0 * BILATERAL_SIGMA_COLOR * BILATERAL_SIGMA_COLOR;
    for (delta, weight) in range.iter_mut().enumerate() {
        let d = delta as f32;
        *weight = (-(d * d) / color_denom).exp();
    }

    let mut out = vec![0u8; w * h];
    out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, dst) in row.iter_mut().enumerate() {
            let center = src[y * w + x] as i32;
            let mut acc = 0f32;
            let mut norm = 0f32;
            for dy in -BILATERAL_RADIUS..=BILATERAL_RADIUS {
                let sy = (y as isize + dy).clamp(0, h as isize - 1) as usize;
                for dx in -BILATERAL_RADIUS..=BILATERAL_RADIUS {
                    let sx = (x as isize + dx).clamp(0, w as isize - 1) as usize;
                    let value = src[sy * w + sx];
                    let krow = (dy + BILATERAL_RADIUS) as usize;
                    let kcol = (dx + BILATERAL_RADIUS) as usize;
                    let weight = spatial[krow * side + kcol]
                        * range[(value as i32 - center).unsigned_abs() as usize];
                    acc += weight * value as f32;
                    norm += weight;
                }
            }
            *dst = (acc / norm).round().clamp(0.0, 255.0) as u8;
        }
    });

    GrayImage::from_raw(width, height, out).expect("output buffer matches input dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn bimodal_image() -> GrayImage {
        // Top half dark, bottom half light
        GrayImage::from_fn(10, 10, |_, y| if y < 5 { Luma([50]) } else { Luma([200]) })
    }

    #[test]
    fn test_otsu_separates_bimodal() {
        let binary = otsu_binarize(&bimodal_image());
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(0, 9)[0], 255);
    }

    #[test]
    fn test_otsu_threshold_between_clusters() {
        let mut gray = vec![50u8; 50];
        gray.extend(vec![200u8; 50]);
        let t = otsu_threshold(&gray);
        assert!(t > 50 && t <= 200, "threshold was {}", t);
    }

    #[test]
    fn test_adaptive_preserves_dimensions() {
        let binary = adaptive_binarize(&bimodal_image());
        assert_eq!(binary.dimensions(), (10, 10));
    }

    #[test]
    fn test_equalize_expands_range() {
        let equalized = equalize(&bimodal_image());
        let values: Vec<u8> = equalized.pixels().map(|p| p[0]).collect();
        let max = values.iter().copied().max().unwrap();
        assert!(max > 200);
    }

    #[test]
    fn test_clahe_uniform_stays_uniform() {
        let gray = GrayImage::from_pixel(64, 64, Luma([128]));
        let result = clahe(&gray);
        let first = result.get_pixel(0, 0)[0];
        assert!(result.pixels().all(|p| p[0] == first));
    }

    #[test]
    fn test_clahe_small_image_passthrough() {
        let gray = GrayImage::from_pixel(4, 4, Luma([99]));
        let result = clahe(&gray);
        assert_eq!(result.get_pixel(2, 2)[0], 99);
    }

    #[test]
    fn test_bilateral_smooths_flat_noise() {
        let mut gray = GrayImage::from_pixel(9, 9, Luma([100]));
        gray.put_pixel(4, 4, Luma([110]));
        let smoothed = bilateral(&gray);
        assert!(smoothed.get_pixel(4, 4)[0] < 110);
        assert_eq!(smoothed.dimensions(), (9, 9));
    }

    #[test]
    fn test_bilateral_preserves_strong_edges() {
        let gray = GrayImage::from_fn(16, 16, |x, _| if x < 8 { Luma([0]) } else { Luma([255]) });
        let smoothed = bilateral(&gray);
        // Far from the edge both sides keep their level
        assert!(smoothed.get_pixel(1, 8)[0] < 20);
        assert!(smoothed.get_pixel(14, 8)[0] > 235);
    }
}
