//! Output languages and their localized strings.
//!
//! - `registry`: the set of output languages for a run, with output directories
//! - `strings`: localized text added to translated documents

mod registry;
mod strings;

pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::{LanguageStrings, ARABIC_STRINGS, ENGLISH_STRINGS, SPANISH_STRINGS};
