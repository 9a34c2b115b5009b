//! A Rust library for turning FragPipe protein quantification tables into
//! annotated, statistically tested and plotted results.
//!
//! This library's API is based around several stages that form a data
//! analysis pipeline. Every stage reads and writes plain tab separated
//! files, so each can be run on its own.
//!
//! The raw FragPipe export is reformatted into a fixed 5-column [`Table`]
//! (accession, annotation, triplicate intensities), and accession numbers
//! can then be replaced by annotations from a [`Dictionary`]:
//!
//! ```rust,ignore
//! # use fragpipe::*;
//! let formatted = format::format_file("./data/20240101_PA14_LB_exp.txt").unwrap();
//! let dict = Dictionary::load("./data/annotations.txt").unwrap();
//! annotate::annotate_file(&formatted, &dict).unwrap();
//! ```
//!
//! Two single-condition files are merged into a [`Merged`] dataset, filtered
//! with a [`Filter`], and tested row by row to produce [`Results`]:
//!
//! ```rust,ignore
//! # use fragpipe::*;
//! let analysis = Analysis::new(StatTest::Welch, Correction::FdrBh);
//! let path = analysis
//!     .run(
//!         "./data/20240101_PA14_LB_exp_annotated.txt",
//!         "./data/20240101_PA14_LB_stat_annotated.txt",
//!         "output/proteomics",
//!     )
//!     .unwrap();
//! ```
//!
//! The results file is the input for the [`volcano`] plot and the
//! [`significant`] summary table.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub mod annotate;
mod condition;
mod config;
pub mod correction;
mod error;
mod filter;
pub mod format;
pub mod hypothesis;
mod merge;
mod parser;
pub mod significant;
pub mod statistics;
mod stats;
pub mod volcano;

pub use annotation::Dictionary;
pub use condition::{Condition, Entry, Labels, Metadata};
pub use config::{Thresholds, EPSILON};
pub use correction::Correction;
pub use error::{Error, Result};
pub use filter::{Filter, PointFilter, RowFilter};
pub use hypothesis::StatTest;
pub use merge::{Merged, Row};
pub use parser::{format_value, parse_value, Table};
pub use statistics::{Analysis, Results};

/// Three replicate measurements for one protein in one condition, `None`
/// where the instrument reported nothing
pub type Triplicate = [Option<f64>; 3];

/// Files in `dir` whose names end with `suffix`, sorted by name
pub(crate) fn files_with_suffix<P: AsRef<Path>>(dir: P, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut v = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(suffix) {
                v.push(path);
            }
        }
    }
    v.sort();
    Ok(v)
}

/// File name without its final extension
pub(crate) fn file_stem<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
