//! Image preprocessing battery and variant generation.
//!
//! Seven base techniques (color passthrough, grayscale, Otsu and
//! adaptive binarization, histogram equalization, CLAHE, bilateral
//! smoothing), each expanded by four axis-aligned rotations and two
//! rescales, for a fixed battery of 84 variants per input image.

pub mod filters;
pub mod variants;

pub use variants::{
    FULL_VARIANT_COUNT, ROTATIONS, SCALES, Variant, VariantIter, VariantStep, generate_variants,
};
