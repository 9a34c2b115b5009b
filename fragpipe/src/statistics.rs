//! Compare two conditions protein by protein.
//!
//! 1. Load both condition files and join them on accession
//! 2. Drop rows with partially quantified triplicates or no signal at all
//! 3. Calculate means and standard deviations per condition
//! 4. Determine log2 fold changes
//! 5. Calculate p-values with the chosen test, optionally corrected
//! 6. Export the results
use super::*;
use hypothesis::replace_all_zero;
use parser::format_option;
use rayon::prelude::*;

pub const ACCESSION: &str = "Accession Number";
pub const PRESENCE: &str = "Present_Only_In";
pub const LOG2_FC: &str = "Log2_Fold_Change";
pub const ADJ_P: &str = "Adj_P_Values";
pub const NEG_LOG10_ADJ_P: &str = "-log10(Adj_P_Values)";

/// Positions of the columns read back by the plotting and extraction stages
pub const PRESENCE_COLUMN: usize = 9;
pub const LOG2_FC_COLUMN: usize = 14;
pub const NEG_LOG10_P_COLUMN: usize = 17;

/// In which condition a protein was detected
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Presence {
    Both,
    OnlyFirst,
    OnlySecond,
}

impl Presence {
    fn of(first: &[f64; 3], second: &[f64; 3]) -> Presence {
        let zero = |t: &[f64; 3]| t.iter().all(|&v| v == 0.0);
        match (zero(first), zero(second)) {
            (true, false) => Presence::OnlySecond,
            (false, true) => Presence::OnlyFirst,
            _ => Presence::Both,
        }
    }

    pub fn label(&self, labels: &[String; 2]) -> String {
        match self {
            Presence::Both => "Both".to_string(),
            Presence::OnlyFirst => format!("Only_{}", labels[0]),
            Presence::OnlySecond => format!("Only_{}", labels[1]),
        }
    }
}

/// Statistics for one protein
#[derive(Clone, Debug, PartialEq)]
pub struct Tested {
    pub row: Row,
    pub presence: Presence,
    pub means: [f64; 2],
    pub stds: [f64; 2],
    pub log2_fc: Option<f64>,
    /// Adjusted p-value (raw when no correction was applied)
    pub pvalue: f64,
}

impl Tested {
    pub fn neg_log10_p(&self) -> f64 {
        -self.pvalue.log10()
    }
}

/// Output of an [`Analysis`]
#[derive(Clone, Debug, PartialEq)]
pub struct Results {
    pub labels: [String; 2],
    pub correction: Correction,
    pub rows: Vec<Tested>,
}

/// log2(first / second), with zero means replaced by `epsilon`
pub fn log2_fold_change(first: f64, second: f64, epsilon: f64) -> Option<f64> {
    let nonzero = |m: f64| if m == 0.0 { epsilon } else { m };
    Some((nonzero(first) / nonzero(second)).log2()).filter(|fc| fc.is_finite())
}

/// A test and correction to run over merged conditions
#[derive(Clone, Debug, Default)]
pub struct Analysis {
    pub test: StatTest,
    pub correction: Correction,
    pub thresholds: Thresholds,
}

impl Analysis {
    pub fn new(test: StatTest, correction: Correction) -> Analysis {
        Analysis {
            test,
            correction,
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Analysis {
        self.thresholds = thresholds;
        self
    }

    /// Filter, describe and test every row of a merged dataset
    pub fn analyze(&self, merged: Merged) -> Results {
        tracing::info!("before filtering: {} rows", merged.rows.len());
        let merged = merged.filter(&Filter::standard());
        tracing::info!("after filtering: {} rows", merged.rows.len());

        let epsilon = self.thresholds.epsilon;
        let test = self.test;

        let raw = merged
            .rows
            .par_iter()
            .map(|row| {
                let mut a = row.filled(0);
                let mut b = row.filled(1);
                replace_all_zero(&mut a, &mut b, epsilon);
                test.pvalue(&a, &b)
            })
            .collect::<Vec<f64>>();

        if let Correction::None = self.correction {
            tracing::info!("no multiple testing correction applied");
        }
        let adjusted = self.correction.adjust(&raw);

        let rows = merged
            .rows
            .into_iter()
            .zip(adjusted)
            .map(|(row, pvalue)| {
                let (a, b) = (row.filled(0), row.filled(1));
                let means = [stats::mean(&a), stats::mean(&b)];
                Tested {
                    presence: Presence::of(&a, &b),
                    stds: [stats::stddev(&a), stats::stddev(&b)],
                    log2_fc: log2_fold_change(means[0], means[1], epsilon),
                    means,
                    pvalue,
                    row,
                }
            })
            .collect();

        Results {
            labels: merged.labels,
            correction: self.correction,
            rows,
        }
    }

    /// Run the full statistics stage on two condition files, writing the
    /// results into `output_dir`
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        file_1: P,
        file_2: P,
        output_dir: Q,
    ) -> Result<PathBuf> {
        let labels = Labels::derive(file_1.as_ref(), file_2.as_ref());
        let first = Condition::load(file_1.as_ref(), labels.first.clone())?;
        let second = Condition::load(file_2.as_ref(), labels.second.clone())?;

        let results = self.analyze(Merged::merge(&first, &second));

        fs::create_dir_all(output_dir.as_ref())?;
        let out = output_dir
            .as_ref()
            .join(labels.output_name(self.test.name(), self.correction.name()));
        results.write(&out)?;
        tracing::info!("statistics run with {} and {}", self.test, self.correction);
        tracing::info!("data saved to {}", out.display());
        Ok(out)
    }
}

impl Results {
    pub fn header(&self) -> Vec<String> {
        let [l1, l2] = &self.labels;
        let last = match self.correction {
            Correction::None => "Log10_P_Values",
            _ => "Log10_Adj_P_Values",
        };
        let mut header = vec![ACCESSION.to_string()];
        for l in [l1, l2] {
            header.push(format!("Annotation_{}", l));
            header.extend((1..=3).map(|i| format!("{}_{}", i, l)));
        }
        header.push(PRESENCE.to_string());
        for l in [l1, l2] {
            header.push(format!("Row_Average_{}", l));
            header.push(format!("STD_{}", l));
        }
        header.extend(
            [LOG2_FC, ADJ_P, NEG_LOG10_ADJ_P, last]
                .iter()
                .map(|s| s.to_string()),
        );
        header
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(self.header());
        for t in &self.rows {
            let mut cells = vec![t.row.accession.clone()];
            for idx in 0..2 {
                cells.push(
                    t.row.annotations[idx]
                        .clone()
                        .unwrap_or_else(|| annotation::UNKNOWN.to_string()),
                );
                cells.extend(t.row.filled(idx).iter().map(|&v| format_value(v)));
            }
            cells.push(t.presence.label(&self.labels));
            for idx in 0..2 {
                cells.push(format_value(t.means[idx]));
                cells.push(format_value(t.stds[idx]));
            }
            let neg_log10 = t.neg_log10_p();
            cells.push(format_option(t.log2_fc));
            cells.push(format_value(t.pvalue));
            cells.push(format_value(neg_log10));
            cells.push(format_value(neg_log10));
            table.rows.push(cells);
        }
        table
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_table().write(path)
    }
}

/// One row of a statistics output file, as needed for plotting and
/// significance extraction
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub accession: String,
    pub annotation: String,
    pub presence: String,
    pub log2_fc: Option<f64>,
    pub neg_log10_p: Option<f64>,
}

impl Point {
    /// Detected in only one of the two conditions
    pub fn exclusive(&self) -> bool {
        self.presence.contains("Only_")
    }
}

/// Read back a statistics output file. Columns are found by name, falling
/// back to their standard positions.
pub fn read_points<P: AsRef<Path>>(path: P) -> Result<Vec<Point>> {
    let table = Table::load(path.as_ref())?;

    let fc = table.column(LOG2_FC).unwrap_or(LOG2_FC_COLUMN);
    let p = table
        .header
        .iter()
        .rposition(|h| h.starts_with("Log10_"))
        .unwrap_or(NEG_LOG10_P_COLUMN);
    let presence = table.column(PRESENCE).unwrap_or(PRESENCE_COLUMN);

    let needed = fc.max(p).max(presence);
    if table.header.len() <= needed {
        return Err(Error::format(
            path.as_ref(),
            format!(
                "expected a statistics file with at least {} columns, found {}",
                needed + 1,
                table.header.len()
            ),
        ));
    }

    Ok(table
        .rows
        .iter()
        .map(|row| Point {
            accession: Table::cell(row, 0).to_string(),
            annotation: Table::cell(row, 1).to_string(),
            presence: Table::cell(row, presence).to_string(),
            log2_fc: parse_value(Table::cell(row, fc)),
            neg_log10_p: parse_value(Table::cell(row, p)),
        })
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! entry {
        ($acc:expr, $($r:expr),+) => {
            Entry {
                accession: $acc.into(),
                annotation: Some(format!("{} protein", $acc)),
                replicates: [$($r),+],
            }
        };
    }

    fn conditions() -> (Condition, Condition) {
        let first = Condition {
            label: "exp".into(),
            entries: vec![
                entry!("P1", Some(1.0), Some(2.0), Some(3.0)),
                entry!("P2", Some(0.0), Some(0.0), Some(0.0)),
                entry!("P3", Some(4.0), None, Some(4.0)),
                entry!("P4", Some(8.0), Some(8.0), Some(8.0)),
                entry!("P5", Some(0.0), Some(0.0), Some(0.0)),
            ],
        };
        let second = Condition {
            label: "stat".into(),
            entries: vec![
                entry!("P1", Some(4.0), Some(5.0), Some(7.0)),
                entry!("P2", Some(0.0), Some(0.0), Some(0.0)),
                entry!("P3", Some(1.0), Some(1.0), Some(1.0)),
                entry!("P5", Some(2.0), Some(3.0), Some(4.0)),
                entry!("P6", Some(0.0), Some(0.0), Some(0.0)),
            ],
        };
        (first, second)
    }

    #[test]
    fn fold_change() {
        assert_eq!(log2_fold_change(8.0, 2.0, EPSILON), Some(2.0));
        assert_eq!(log2_fold_change(1.0, 4.0, EPSILON), Some(-2.0));
        let fc = log2_fold_change(0.0, 1.0, EPSILON).unwrap();
        assert!((fc - EPSILON.log2()).abs() < 1e-9);
        assert_eq!(log2_fold_change(0.0, 0.0, EPSILON), Some(0.0));
        assert_eq!(log2_fold_change(-1.0, 1.0, EPSILON), None);
    }

    #[test]
    fn analyze_filters_and_tests() {
        let (first, second) = conditions();
        let results = Analysis::new(StatTest::TTest, Correction::None)
            .analyze(Merged::merge(&first, &second));

        // P2 all zero, P3 partially quantified
        let accs = results
            .rows
            .iter()
            .map(|t| t.row.accession.as_str())
            .collect::<Vec<_>>();
        assert_eq!(accs, vec!["P1", "P4", "P5", "P6"]);

        let p1 = &results.rows[0];
        assert_eq!(p1.presence, Presence::Both);
        assert_eq!(p1.means, [2.0, 16.0 / 3.0]);
        assert_eq!(p1.stds[0], 1.0);
        assert!((p1.pvalue - 0.034109).abs() < 1e-4);

        let p4 = &results.rows[1];
        assert_eq!(p4.presence, Presence::OnlyFirst);
        assert_eq!(p4.presence.label(&results.labels), "Only_exp");
        assert_eq!(p4.means[1], 0.0);
        assert!(p4.log2_fc.unwrap() > 40.0);
        // constant triplicates that differ
        assert_eq!(p4.pvalue, 0.0);
        assert_eq!(p4.neg_log10_p(), f64::INFINITY);

        let p5 = &results.rows[2];
        assert_eq!(p5.presence.label(&results.labels), "Only_stat");
        assert!(p5.log2_fc.unwrap() < -40.0);

        // zero in the second condition and absent from the first
        let p6 = &results.rows[3];
        assert_eq!(p6.presence, Presence::Both);
        assert_eq!(p6.means, [0.0, 0.0]);
        assert_eq!(p6.log2_fc, Some(0.0));
        assert_eq!(p6.pvalue, 0.0);
    }

    #[test]
    fn zero_and_absent_rows_count_as_tests() {
        let first = Condition {
            label: "exp".into(),
            entries: vec![
                entry!("P1", Some(1.0), Some(2.0), Some(3.0)),
                entry!("P9", Some(0.0), Some(0.0), Some(0.0)),
            ],
        };
        let second = Condition {
            label: "stat".into(),
            entries: vec![entry!("P1", Some(4.0), Some(5.0), Some(7.0))],
        };

        let results = Analysis::new(StatTest::TTest, Correction::Bonferroni)
            .analyze(Merged::merge(&first, &second));
        assert_eq!(results.rows.len(), 2);
        assert!((results.rows[0].pvalue - 2.0 * 0.034109).abs() < 2e-4);

        let p9 = &results.rows[1];
        assert_eq!(p9.row.accession, "P9");
        assert_eq!(p9.presence, Presence::Both);
        assert_eq!(p9.presence.label(&results.labels), "Both");
        assert_eq!(p9.pvalue, 0.0);
    }

    #[test]
    fn correction_is_applied() {
        let (first, second) = conditions();
        let merged = Merged::merge(&first, &second);
        let raw = Analysis::new(StatTest::Welch, Correction::None).analyze(merged.clone());
        let adj = Analysis::new(StatTest::Welch, Correction::Bonferroni).analyze(merged);
        let m = raw.rows.len() as f64;
        assert_eq!(m, 4.0);
        for (r, a) in raw.rows.iter().zip(&adj.rows) {
            assert_eq!(a.pvalue, (r.pvalue * m).min(1.0));
        }
    }

    #[test]
    fn header() {
        let (first, second) = conditions();
        let results = Analysis::new(StatTest::TTest, Correction::FdrBh)
            .analyze(Merged::merge(&first, &second));
        let header = results.header();
        assert_eq!(header.len(), 18);
        assert_eq!(header[1], "Annotation_exp");
        assert_eq!(header[6], "1_stat");
        assert_eq!(header[PRESENCE_COLUMN], PRESENCE);
        assert_eq!(header[LOG2_FC_COLUMN], LOG2_FC);
        assert_eq!(header[NEG_LOG10_P_COLUMN], "Log10_Adj_P_Values");

        let results = Results {
            correction: Correction::None,
            ..results
        };
        assert_eq!(results.header()[NEG_LOG10_P_COLUMN], "Log10_P_Values");
    }

    #[test]
    fn run_writes_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let f1 = dir.path().join("20240101_PA14_LB_exp_annotated.txt");
        let f2 = dir.path().join("20240101_PA14_LB_stat_annotated.txt");
        fs::write(
            &f1,
            "Accession Number\tAnnotation\t1\t2\t3\n\
             P1\tGAPDH\t1\t2\t3\n\
             P4\tDnaK\t8\t8\t8\n",
        )
        .unwrap();
        fs::write(
            &f2,
            "Accession Number\tAnnotation\t1\t2\t3\n\
             P1\tGAPDH\t4\t5\t7\n\
             P7\t0\t1\t1\t1\n",
        )
        .unwrap();

        let out_dir = dir.path().join("output/proteomics");
        let out = Analysis::new(StatTest::TTest, Correction::FdrBh)
            .run(&f1, &f2, &out_dir)
            .unwrap();
        assert_eq!(out, out_dir.join("PA14_LB_expVSstat_t-test_fdr_bh.txt"));

        let table = Table::load(&out).unwrap();
        assert_eq!(table.rows.len(), 3);
        // P4 only in the first file, P7 only in the second with no annotation
        assert_eq!(table.rows[1][5], "Unknown");
        assert_eq!(table.rows[1][6], "0");
        assert_eq!(table.rows[2][1], "Unknown");
        assert_eq!(table.rows[2][5], "Unknown");

        let points = read_points(&out).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].accession, "P1");
        assert_eq!(points[0].annotation, "GAPDH");
        assert!(!points[0].exclusive());
        assert!(points[1].exclusive());
        assert_eq!(points[1].neg_log10_p, Some(f64::INFINITY));
        assert!(points[2].log2_fc.unwrap() < 0.0);
    }

    #[test]
    fn read_points_rejects_narrow_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrow.txt");
        fs::write(&path, "Accession Number\tAnnotation\nP1\tx\n").unwrap();
        assert!(matches!(read_points(&path), Err(Error::Format { .. })));
    }
}
