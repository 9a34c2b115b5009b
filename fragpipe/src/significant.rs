//! Summary table of the proteins passing the significance cutoffs.
//!
//! The table has two independent halves placed side by side. The left half
//! has one slot per tested protein, in file order, holding it in the
//! over- or under-expressed columns when both the p-value and the fold
//! change pass. The right half lists the significant proteins detected in
//! only one condition, split by the sign of their fold change. Rows that
//! are empty in both halves are dropped.
use super::*;
use statistics::{read_points, Point};

pub const HEADER: [&str; 12] = [
    "Significant_Overexpressed",
    "Accession Number +",
    "log2FC +",
    "-log10_adj_p +",
    "Significant_Underexpressed",
    "Accession Number -",
    "log2FC -",
    "-log10_adj_p -",
    "Zero_Condition_Overexpressed",
    "Accession Zero +",
    "Zero_Condition_Underexpressed",
    "Accession Zero -",
];

#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    pub annotation: String,
    pub accession: String,
    pub log2_fc: f64,
    pub neg_log10_p: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    Over(Hit),
    Under(Hit),
    Empty,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Significant {
    pub slots: Vec<Slot>,
    /// (annotation, accession) of exclusive proteins with positive fold change
    pub zero_over: Vec<(String, String)>,
    pub zero_under: Vec<(String, String)>,
}

impl Significant {
    pub fn extract(points: &[Point], thresholds: &Thresholds) -> Significant {
        let mut sig = Significant::default();

        for point in points {
            let (fc, p) = match (point.log2_fc, point.neg_log10_p) {
                (Some(fc), Some(p)) if thresholds.significant(p) => (fc, p),
                _ => {
                    sig.slots.push(Slot::Empty);
                    continue;
                }
            };

            let pair = || (point.annotation.clone(), point.accession.clone());
            if point.exclusive() {
                if fc > 0.0 {
                    sig.zero_over.push(pair());
                } else if fc < 0.0 {
                    sig.zero_under.push(pair());
                }
            }

            let hit = || Hit {
                annotation: point.annotation.clone(),
                accession: point.accession.clone(),
                log2_fc: fc,
                neg_log10_p: p,
            };
            sig.slots.push(if thresholds.up(fc) {
                Slot::Over(hit())
            } else if thresholds.down(fc) {
                Slot::Under(hit())
            } else {
                Slot::Empty
            });
        }
        sig
    }

    pub fn over(&self) -> impl Iterator<Item = &Hit> {
        self.slots.iter().filter_map(|s| match s {
            Slot::Over(h) => Some(h),
            _ => None,
        })
    }

    pub fn under(&self) -> impl Iterator<Item = &Hit> {
        self.slots.iter().filter_map(|s| match s {
            Slot::Under(h) => Some(h),
            _ => None,
        })
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(HEADER.iter().map(|s| s.to_string()).collect());

        let hit_cells = |h: Option<&Hit>| -> [String; 4] {
            match h {
                Some(h) => [
                    h.annotation.clone(),
                    h.accession.clone(),
                    format_value(h.log2_fc),
                    format_value(h.neg_log10_p),
                ],
                None => Default::default(),
            }
        };
        let pair_cells = |p: Option<&(String, String)>| -> [String; 2] {
            p.map(|(ann, acc)| [ann.clone(), acc.clone()])
                .unwrap_or_default()
        };

        let zeros = self.zero_over.len().max(self.zero_under.len());
        for i in 0..self.slots.len().max(zeros) {
            let (over, under) = match self.slots.get(i) {
                Some(Slot::Over(h)) => (Some(h), None),
                Some(Slot::Under(h)) => (None, Some(h)),
                _ => (None, None),
            };
            let mut row = Vec::with_capacity(HEADER.len());
            row.extend(hit_cells(over));
            row.extend(hit_cells(under));
            row.extend(pair_cells(self.zero_over.get(i)));
            row.extend(pair_cells(self.zero_under.get(i)));

            if row.iter().any(|c| !c.is_empty()) {
                table.rows.push(row);
            }
        }
        table
    }
}

/// `<output_dir>/<title>_significant.txt`
pub fn output_path<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output_dir: Q) -> PathBuf {
    output_dir
        .as_ref()
        .join(format!("{}_significant.txt", file_stem(input)))
}

/// Extract the significant proteins of a statistics output file
pub fn significant_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    thresholds: &Thresholds,
) -> Result<PathBuf> {
    let points = read_points(input.as_ref())?;
    let sig = Significant::extract(&points, thresholds);
    tracing::info!(
        "{} over-expressed, {} under-expressed, {} only in one condition",
        sig.over().count(),
        sig.under().count(),
        sig.zero_over.len() + sig.zero_under.len()
    );

    fs::create_dir_all(output_dir.as_ref())?;
    let out = output_path(input.as_ref(), output_dir.as_ref());
    sig.to_table().write(&out)?;
    tracing::info!("significant proteins saved to {}", out.display());
    Ok(out)
}
