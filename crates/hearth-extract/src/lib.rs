//! Hearth Extract - structured field extraction over recognized text.
//!
//! Maps noisy recognized text (typically OCR output from a rendered risk
//! panel) into a fixed schema of typed score fields, and defines the
//! black-box text-recognition capability the climate-risk worker consumes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod recognizer;
pub mod scores;

pub use error::{ExtractError, Result};
pub use recognizer::{FixedRecognizer, TesseractRecognizer, TextRecognizer};
pub use scores::{extract_risk_scores, RiskScores};
