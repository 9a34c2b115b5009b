use super::*;

/// Row validity rules applied to merged data before testing
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum RowFilter {
    /// Each triplicate must be fully quantified or entirely missing
    CompleteTriplicates,
    /// Drop rows measured as zero in every replicate of both conditions. A
    /// condition missing the protein is not zero.
    Quantified,
}

/// Rules applied to tested rows when plotting
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum PointFilter {
    /// Keep |log2 fold change| <= limit
    FoldChangeRange(f64),
}

#[derive(Clone, Debug, Default)]
pub struct Filter {
    row_filters: Vec<RowFilter>,
    point_filters: Vec<PointFilter>,
}

fn complete(t: &Triplicate) -> bool {
    let missing = t.iter().filter(|v| v.is_none()).count();
    missing == 0 || missing == t.len()
}

fn all_zero(t: &Triplicate) -> bool {
    t.iter().all(|v| *v == Some(0.0))
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    /// The rules the statistics stage applies to every merged dataset
    pub fn standard() -> Self {
        Filter::new()
            .add_row_filter(RowFilter::CompleteTriplicates)
            .add_row_filter(RowFilter::Quantified)
    }

    pub fn add_row_filter(mut self, f: RowFilter) -> Self {
        self.row_filters.push(f);
        self
    }

    pub fn add_point_filter(mut self, f: PointFilter) -> Self {
        self.point_filters.push(f);
        self
    }

    pub fn keep(&self, row: &Row) -> bool {
        self.row_filters.iter().all(|filter| match filter {
            RowFilter::CompleteTriplicates => row.replicates.iter().all(complete),
            RowFilter::Quantified => !row.replicates.iter().all(all_zero),
        })
    }

    /// Should a point with this fold change be plotted. Missing fold
    /// changes never pass a range filter.
    pub fn keep_point(&self, log2_fc: Option<f64>) -> bool {
        self.point_filters.iter().all(|filter| match filter {
            PointFilter::FoldChangeRange(limit) => match log2_fc {
                Some(fc) => fc.abs() <= *limit,
                None => false,
            },
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ZERO: Triplicate = [Some(0.0); 3];
    const NONE: Triplicate = [None; 3];

    macro_rules! row {
        ($a:expr, $b:expr) => {
            Row {
                accession: "P1".into(),
                annotations: [None, None],
                replicates: [$a, $b],
            }
        };
    }

    #[test]
    fn complete_triplicates() {
        let filter = Filter::new().add_row_filter(RowFilter::CompleteTriplicates);
        let full = [Some(1.0), Some(2.0), Some(3.0)];
        assert!(filter.keep(&row!(full, NONE)));
        assert!(!filter.keep(&row!([Some(1.0), None, Some(3.0)], full)));
        assert!(!filter.keep(&row!(full, [None, None, Some(0.0)])));
    }

    #[test]
    fn quantified() {
        let filter = Filter::new().add_row_filter(RowFilter::Quantified);
        assert!(!filter.keep(&row!(ZERO, ZERO)));
        // absent from the second condition, so not zero there
        assert!(filter.keep(&row!(ZERO, NONE)));
        assert!(filter.keep(&row!(ZERO, [None, Some(2.0), None])));
    }

    #[test]
    fn standard_filter_order_does_not_matter() {
        let r = row!([Some(5.0), Some(6.0), Some(7.0)], NONE);
        assert!(Filter::standard().keep(&r));
        assert!(!Filter::standard().keep(&row!(ZERO, ZERO)));
        let r = row!([Some(0.0), None, Some(0.0)], NONE);
        assert!(!Filter::standard().keep(&r));
    }

    #[test]
    fn fold_change_range() {
        let filter = Filter::new().add_point_filter(PointFilter::FoldChangeRange(15.0));
        assert!(filter.keep_point(Some(15.0)));
        assert!(filter.keep_point(Some(-3.0)));
        assert!(!filter.keep_point(Some(-15.5)));
        assert!(!filter.keep_point(None));
        assert!(Filter::new().keep_point(None));
    }
}
