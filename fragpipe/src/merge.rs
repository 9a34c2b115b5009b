use super::*;

/// One accession after joining two conditions
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub accession: String,
    /// Annotation reported by each condition, if it had the protein
    pub annotations: [Option<String>; 2],
    /// Triplicates for each condition, all `None` where the protein is absent
    pub replicates: [Triplicate; 2],
}

impl Row {
    fn new(accession: String) -> Row {
        Row {
            accession,
            annotations: [None, None],
            replicates: [[None; 3]; 2],
        }
    }

    /// Replicates of condition `idx` with missing values read as 0
    pub fn filled(&self, idx: usize) -> [f64; 3] {
        let r = &self.replicates[idx];
        [
            r[0].unwrap_or(0.0),
            r[1].unwrap_or(0.0),
            r[2].unwrap_or(0.0),
        ]
    }
}

/// Two [`Condition`]s joined on accession
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Merged {
    pub rows: Vec<Row>,
    pub labels: [String; 2],
}

impl Merged {
    /// Full outer join of `first` and `second`, ordered by accession
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// # use fragpipe::*;
    /// let c1 = Condition::load("./data/a_annotated.txt", "exp").unwrap();
    /// let c2 = Condition::load("./data/b_annotated.txt", "stat").unwrap();
    ///
    /// let merged = Merged::merge(&c1, &c2);
    /// // merged now contains the union of accessions from both files
    /// ```
    pub fn merge(first: &Condition, second: &Condition) -> Merged {
        let mut table: BTreeMap<&str, Row> = BTreeMap::new();
        for (idx, condition) in [first, second].iter().enumerate() {
            for entry in &condition.entries {
                let row = table
                    .entry(entry.accession.as_str())
                    .or_insert_with(|| Row::new(entry.accession.clone()));
                row.annotations[idx] = entry.annotation.clone();
                row.replicates[idx] = entry.replicates;
            }
        }

        Merged {
            rows: table.into_iter().map(|(_, row)| row).collect(),
            labels: [first.label.clone(), second.label.clone()],
        }
    }

    pub fn filter(self, filters: &Filter) -> Merged {
        let rows = self
            .rows
            .into_iter()
            .filter(|row| filters.keep(row))
            .collect();
        Merged {
            rows,
            labels: self.labels,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! entry {
        ($acc:expr, $ann:expr, $($r:expr),+) => {
            Entry {
                accession: $acc.into(),
                annotation: $ann.map(String::from),
                replicates: [$($r),+],
            }
        };
    }

    #[test]
    fn outer_join() {
        let c1 = Condition {
            label: "exp".into(),
            entries: vec![
                entry!("P2", Some("B"), Some(1.0), Some(2.0), Some(3.0)),
                entry!("P1", Some("A"), Some(4.0), Some(5.0), Some(6.0)),
            ],
        };
        let c2 = Condition {
            label: "stat".into(),
            entries: vec![
                entry!("P3", None::<&str>, Some(7.0), None, Some(9.0)),
                entry!("P1", Some("A2"), Some(1.0), Some(1.0), Some(1.0)),
            ],
        };

        let merged = Merged::merge(&c1, &c2);
        assert_eq!(merged.labels, ["exp".to_string(), "stat".to_string()]);
        assert_eq!(
            merged.rows.iter().map(|r| r.accession.as_str()).collect::<Vec<_>>(),
            vec!["P1", "P2", "P3"]
        );

        let p1 = &merged.rows[0];
        assert_eq!(
            p1.annotations,
            [Some("A".to_string()), Some("A2".to_string())]
        );
        assert_eq!(p1.filled(1), [1.0, 1.0, 1.0]);

        let p2 = &merged.rows[1];
        assert_eq!(p2.replicates[1], [None, None, None]);
        assert_eq!(p2.filled(1), [0.0, 0.0, 0.0]);

        let p3 = &merged.rows[2];
        assert_eq!(p3.annotations, [None, None]);
        assert_eq!(p3.filled(1), [7.0, 0.0, 9.0]);
    }
}
