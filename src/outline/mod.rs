//! Title and heading extraction.
//!
//! The pipeline for one document is:
//!
//! 1. [`ProfileBuilder`] samples the leading pages for the average font size,
//!    the distinct size ranks and the document language.
//! 2. [`TitleSelector`] picks the largest, shortest oversized line on page 1.
//! 3. [`HeadingClassifier`] accepts or rejects every line.
//! 4. [`LevelAssigner`] maps accepted lines to H1, H2 or H3.
//!
//! [`OutlineExtractor`] drives the stages.

mod classify;
mod extractor;
mod level;
mod normalize;
mod profile;
mod title;

pub use classify::{HeadingClassifier, HeadingCue};
pub use extractor::OutlineExtractor;
pub use level::{rank_level, LevelAssigner};
pub use normalize::{clean_title, normalize_text, strip_heading_numbers};
pub use profile::ProfileBuilder;
pub use title::TitleSelector;
