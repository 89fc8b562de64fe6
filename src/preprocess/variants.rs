//! Ordered generation of labeled preprocessing variants.
//!
//! The sequence is technique-major, then rotation, then scale within
//! rotation, and is identical for two invocations over the same input.

use super::filters;
use crate::models::{Raster, Rotation};

/// Base technique names, in cascade order.
const TECHNIQUES: [&str; 7] = [
    "Original",
    "Grayscale",
    "Otsu",
    "Adaptive",
    "Equalized",
    "CLAHE",
    "Bilateral",
];

/// Rotations applied to every base technique output.
pub const ROTATIONS: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

/// Scale factors applied to every rotated variant, after the unscaled
/// copy: area-style downscale first, cubic upscale second.
pub const SCALES: [f32; 2] = [0.7, 1.5];

/// Variant count for inputs where no resize degenerates.
pub const FULL_VARIANT_COUNT: usize = TECHNIQUES.len() * ROTATIONS.len() * (1 + SCALES.len());

/// One preprocessed copy of the input image.
#[derive(Debug, Clone)]
pub struct Variant {
    /// Technique label, e.g. `"CLAHE_90°_1.5x"`. Diagnostics only.
    pub label: String,
    /// The transformed image
    pub image: Raster,
}

/// One step of the variant sequence. A `Skipped` step marks a variant
/// that could not be produced (degenerate resize), which is distinct
/// from a produced variant in which no symbol is found.
#[derive(Debug, Clone)]
pub enum VariantStep {
    /// The variant was produced and can be decoded
    Produced(Variant),
    /// The variant could not be produced
    Skipped {
        /// Label the variant would have carried
        label: String,
    },
}

/// Lazily generate the full battery of preprocessing variants for one
/// image. The input is never modified; calling this again with the
/// same image yields the same sequence.
pub fn generate_variants(image: &Raster) -> VariantIter {
    VariantIter {
        bases: build_bases(image),
        technique: 0,
        rotation: 0,
        scale: 0,
        rotated: None,
    }
}

/// Compute the base technique battery: the color passthrough plus six
/// derivations of a single shared grayscale buffer.
fn build_bases(image: &Raster) -> Vec<(&'static str, Raster)> {
    let gray = image.to_gray();
    vec![
        (TECHNIQUES[0], image.clone()),
        (TECHNIQUES[1], Raster::Gray(gray.clone())),
        (TECHNIQUES[2], Raster::Gray(filters::otsu_binarize(&gray))),
        (TECHNIQUES[3], Raster::Gray(filters::adaptive_binarize(&gray))),
        (TECHNIQUES[4], Raster::Gray(filters::equalize(&gray))),
        (TECHNIQUES[5], Raster::Gray(filters::clahe(&gray))),
        (TECHNIQUES[6], Raster::Gray(filters::bilateral(&gray))),
    ]
}

/// Iterator over the variant sequence. See [`generate_variants`].
pub struct VariantIter {
    bases: Vec<(&'static str, Raster)>,
    technique: usize,
    rotation: usize,
    scale: usize,
    /// Rotated copy shared by the scale steps of the current rotation
    rotated: Option<Raster>,
}

impl Iterator for VariantIter {
    type Item = VariantStep;

    fn next(&mut self) -> Option<VariantStep> {
        if self.technique >= self.bases.len() {
            return None;
        }
        let name = self.bases[self.technique].0;
        let rotation = ROTATIONS[self.rotation];
        let degrees = rotation.degrees();

        let step = if self.scale == 0 {
            let rotated = self.bases[self.technique].1.rotated(rotation);
            let variant = Variant {
                label: format!("{name}_{degrees}°"),
                image: rotated.clone(),
            };
            self.rotated = Some(rotated);
            VariantStep::Produced(variant)
        } else {
            let factor = SCALES[self.scale - 1];
            let label = format!("{name}_{degrees}°_{factor}x");
            let scaled = match &self.rotated {
                Some(rotated) => rotated.scaled(factor),
                None => self.bases[self.technique].1.rotated(rotation).scaled(factor),
            };
            match scaled {
                Some(image) => VariantStep::Produced(Variant { label, image }),
                None => VariantStep::Skipped { label },
            }
        };

        self.scale += 1;
        if self.scale > SCALES.len() {
            self.scale = 0;
            self.rotated = None;
            self.rotation += 1;
            if self.rotation >= ROTATIONS.len() {
                self.rotation = 0;
                self.technique += 1;
            }
        }

        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};

    fn step_label(step: &VariantStep) -> String {
        match step {
            VariantStep::Produced(variant) => variant.label.clone(),
            VariantStep::Skipped { label } => label.clone(),
        }
    }

    #[test]
    fn test_full_variant_count() {
        let image = Raster::Gray(GrayImage::from_pixel(32, 32, Luma([120])));
        let steps: Vec<VariantStep> = generate_variants(&image).collect();
        assert_eq!(steps.len(), FULL_VARIANT_COUNT);
        assert_eq!(FULL_VARIANT_COUNT, 84);
        assert!(
            steps
                .iter()
                .all(|s| matches!(s, VariantStep::Produced(_)))
        );
    }

    #[test]
    fn test_ordering_is_technique_major() {
        let image = Raster::Gray(GrayImage::from_pixel(16, 16, Luma([80])));
        let labels: Vec<String> = generate_variants(&image).map(|s| step_label(&s)).collect();
        assert_eq!(labels[0], "Original_0°");
        assert_eq!(labels[1], "Original_0°_0.7x");
        assert_eq!(labels[2], "Original_0°_1.5x");
        assert_eq!(labels[3], "Original_90°");
        assert_eq!(labels[12], "Grayscale_0°");
        assert_eq!(labels[83], "Bilateral_270°_1.5x");
    }

    #[test]
    fn test_sequence_is_deterministic() {
        let image = Raster::Rgb(RgbImage::from_pixel(24, 18, image::Rgb([10, 90, 200])));
        let first: Vec<String> = generate_variants(&image).map(|s| step_label(&s)).collect();
        let second: Vec<String> = generate_variants(&image).map(|s| step_label(&s)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_resize_is_typed_skip() {
        let image = Raster::Gray(GrayImage::from_pixel(1, 1, Luma([0])));
        let steps: Vec<VariantStep> = generate_variants(&image).collect();
        assert_eq!(steps.len(), FULL_VARIANT_COUNT);
        let skipped = steps
            .iter()
            .filter(|s| matches!(s, VariantStep::Skipped { .. }))
            .count();
        // Every 0.7x downscale of a 1x1 image degenerates
        assert_eq!(skipped, 28);
    }

    #[test]
    fn test_input_is_untouched() {
        let image = Raster::Gray(GrayImage::from_pixel(16, 16, Luma([200])));
        let _ = generate_variants(&image).count();
        if let Raster::Gray(img) = &image {
            assert!(img.pixels().all(|p| p[0] == 200));
        }
    }
}
