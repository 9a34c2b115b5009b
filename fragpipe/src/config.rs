//! Significance thresholds shared by the statistics, plotting and
//! extraction stages.
//!
//! Thresholds are serializable so that every user of a data set can run the
//! pipeline with the same cutoffs. Fields that are absent from the file keep
//! their defaults.
//!
//! ```json
//! {
//!   "fold_change": 1.0,
//!   "neg_log10_p": 1.3
//! }
//! ```
use super::*;
use serde::{Deserialize, Serialize};

/// Value substituted for zero intensities before taking ratios
pub const EPSILON: f64 = 1e-14;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum |log2 fold change| for a protein to count as changed
    pub fold_change: f64,
    /// Minimum -log10(p) for a protein to count as significant
    pub neg_log10_p: f64,
    /// Points with |log2 fold change| above this are left out of the volcano plot
    pub plot_fold_change_limit: f64,
    pub epsilon: f64,
    pub point_radius: u32,
}

impl Default for Thresholds {
    fn default() -> Thresholds {
        Thresholds {
            fold_change: 2.0,
            neg_log10_p: 2.0,
            plot_fold_change_limit: 15.0,
            epsilon: EPSILON,
            point_radius: 4,
        }
    }
}

impl Thresholds {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Thresholds> {
        let buf = fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&buf).map_err(|source| Error::Config {
            path: path.as_ref().into(),
            source,
        })
    }

    /// Passes the p-value cutoff
    pub fn significant(&self, neg_log10_p: f64) -> bool {
        neg_log10_p > self.neg_log10_p
    }

    pub fn up(&self, log2_fc: f64) -> bool {
        log2_fc > self.fold_change
    }

    pub fn down(&self, log2_fc: f64) -> bool {
        log2_fc < -self.fold_change
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "fold_change": 1.0 }}"#).unwrap();
        let t = Thresholds::load(file.path()).unwrap();
        assert_eq!(t.fold_change, 1.0);
        assert_eq!(t.neg_log10_p, 2.0);
        assert_eq!(t.plot_fold_change_limit, 15.0);
        assert_eq!(t.point_radius, 4);
    }

    #[test]
    fn invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "fold_change = 1").unwrap();
        match Thresholds::load(file.path()) {
            Err(Error::Config { .. }) => {}
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn cutoffs_are_strict() {
        let t = Thresholds::default();
        assert!(!t.significant(2.0));
        assert!(t.significant(2.01));
        assert!(t.up(2.5) && !t.up(2.0));
        assert!(t.down(-2.5) && !t.down(-2.0));
    }
}
