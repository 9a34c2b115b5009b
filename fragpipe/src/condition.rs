//! Single-condition input files and the metadata carried in their names
use super::*;

/// One protein measured in one condition
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub accession: String,
    pub annotation: Option<String>,
    pub replicates: Triplicate,
}

/// A formatted (and usually annotated) 5-column file for one condition
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub label: String,
    pub entries: Vec<Entry>,
}

impl Condition {
    /// Load a file with columns accession, annotation and three replicate
    /// intensities. Duplicate accessions keep their first occurrence.
    pub fn load<P: AsRef<Path>, S: Into<String>>(path: P, label: S) -> Result<Condition> {
        let table = Table::load(path.as_ref())?;
        if table.header.len() < 5 {
            return Err(Error::format(
                path.as_ref(),
                format!(
                    "expected accession, annotation and 3 replicate columns, found {} columns",
                    table.header.len()
                ),
            ));
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let accession = Table::cell(row, 0).trim();
            if accession.is_empty() {
                continue;
            }
            if !seen.insert(accession.to_string()) {
                tracing::warn!(
                    "{}: duplicate accession {}, keeping the first row",
                    path.as_ref().display(),
                    accession
                );
                continue;
            }
            let annotation = match Table::cell(row, 1).trim() {
                "" | "0" => None,
                s => Some(s.to_string()),
            };
            entries.push(Entry {
                accession: accession.to_string(),
                annotation,
                replicates: [
                    parse_value(Table::cell(row, 2)),
                    parse_value(Table::cell(row, 3)),
                    parse_value(Table::cell(row, 4)),
                ],
            });
        }

        Ok(Condition {
            label: label.into(),
            entries,
        })
    }
}

/// Experiment details encoded in a file name:
/// `DATE_STRAIN_MEDIUM_GROWTHPHASE[_anything].txt`
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    pub date: String,
    pub strain: String,
    pub medium: String,
    pub phase: String,
}

impl Metadata {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Metadata> {
        let stem = file_stem(path);
        let mut x = stem.split('_');
        let date = x.next()?.to_string();
        let strain = x.next()?.to_string();
        let medium = x.next()?.to_string();
        let phase = x.next()?.to_string();
        if [&strain, &medium, &phase].iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Metadata {
            date,
            strain,
            medium,
            phase,
        })
    }
}

/// Names used to tell the two conditions apart in column headers and in the
/// output file name
#[derive(Clone, Debug, PartialEq)]
pub struct Labels {
    pub first: String,
    pub second: String,
    meta: Option<(Metadata, Metadata)>,
    stems: (String, String),
}

impl Labels {
    /// Conditions grown in the same medium are labelled by growth phase,
    /// otherwise by medium
    pub fn derive<P: AsRef<Path>>(file_1: P, file_2: P) -> Labels {
        let stems = (file_stem(file_1.as_ref()), file_stem(file_2.as_ref()));
        let meta = match (
            Metadata::from_path(file_1.as_ref()),
            Metadata::from_path(file_2.as_ref()),
        ) {
            (Some(m1), Some(m2)) => Some((m1, m2)),
            _ => {
                tracing::warn!(
                    "file names do not follow DATE_STRAIN_MEDIUM_PHASE, labelling conditions 1 and 2"
                );
                None
            }
        };

        let (mut first, mut second) = match &meta {
            Some((m1, m2)) if m1.medium == m2.medium => (m1.phase.clone(), m2.phase.clone()),
            Some((m1, m2)) => (m1.medium.clone(), m2.medium.clone()),
            None => ("1".to_string(), "2".to_string()),
        };
        if first == second {
            tracing::warn!("both conditions are labelled {}, appending 1 and 2", first);
            first.push('1');
            second.push('2');
        }

        Labels {
            first,
            second,
            meta,
            stems,
        }
    }

    /// Name of the statistics output file for a given test and correction
    pub fn output_name(&self, test: &str, correction: &str) -> String {
        match &self.meta {
            Some((m1, m2)) if m1.medium == m2.medium => format!(
                "{}_{}_{}VS{}_{}_{}.txt",
                m1.strain, m1.medium, m1.phase, m2.phase, test, correction
            ),
            Some((m1, m2)) => format!(
                "{}_{}_{}VS{}_{}_{}.txt",
                m1.strain, m1.phase, m1.medium, m2.medium, test, correction
            ),
            None => format!(
                "{}VS{}_{}_{}.txt",
                self.stems.0, self.stems.1, test, correction
            ),
        }
    }
}
