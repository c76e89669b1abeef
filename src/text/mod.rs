//! Text cleanup and correction applied to OCR output.

mod correct;
mod normalize;

pub use correct::{
    apply_edits, correct_or_original, CorrectionError, Edit, LanguageToolCorrector,
    PassthroughCorrector, TextCorrector,
};
pub use normalize::normalize;
