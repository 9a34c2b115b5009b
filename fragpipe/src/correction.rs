//! Multiple testing correction of row-wise p-values.
//!
//! Testing thousands of proteins at once inflates the number of false
//! positives; the methods here control either the family-wise error rate
//! (Bonferroni, Holm, Sidak) or the false discovery rate
//! (Benjamini-Hochberg, Benjamini-Yekutieli).
//!
//! NaN p-values are left out: they do not count towards the number of tests
//! and stay NaN in the output.
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Correction {
    None,
    Bonferroni,
    Holm,
    Sidak,
    /// Benjamini-Hochberg
    FdrBh,
    /// Benjamini-Yekutieli
    FdrBy,
}

impl Default for Correction {
    fn default() -> Self {
        Correction::None
    }
}

impl FromStr for Correction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Correction::None),
            "bonferroni" => Ok(Correction::Bonferroni),
            "holm" => Ok(Correction::Holm),
            "sidak" => Ok(Correction::Sidak),
            "fdr_bh" => Ok(Correction::FdrBh),
            "fdr_by" => Ok(Correction::FdrBy),
            _ => Err(format!("invalid correction method '{}'", s)),
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Correction {
    /// Parse a method name, falling back to no correction for unknown names
    pub fn parse_or_default(s: &str) -> Correction {
        s.parse().unwrap_or_else(|e| {
            tracing::warn!("{}, using 'None' by default", e);
            Correction::None
        })
    }

    /// Is `s` the name of a correction method (other than `None`)
    pub fn is_method(s: &str) -> bool {
        !matches!(s.parse::<Correction>(), Ok(Correction::None) | Err(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Correction::None => "None",
            Correction::Bonferroni => "bonferroni",
            Correction::Holm => "holm",
            Correction::Sidak => "sidak",
            Correction::FdrBh => "fdr_bh",
            Correction::FdrBy => "fdr_by",
        }
    }

    /// Adjusted p-values, in the same order as `pvalues`
    pub fn adjust(&self, pvalues: &[f64]) -> Vec<f64> {
        // indices of testable p-values, ascending by p
        let mut order = (0..pvalues.len())
            .filter(|&i| !pvalues[i].is_nan())
            .collect::<Vec<_>>();
        order.sort_by(|&a, &b| pvalues[a].total_cmp(&pvalues[b]).then(a.cmp(&b)));

        let m = order.len() as f64;
        let mut adjusted = vec![f64::NAN; pvalues.len()];

        match self {
            Correction::None => return pvalues.to_vec(),
            Correction::Bonferroni => {
                for &i in &order {
                    adjusted[i] = (pvalues[i] * m).min(1.0);
                }
            }
            Correction::Sidak => {
                for &i in &order {
                    adjusted[i] = 1.0 - (1.0 - pvalues[i]).powf(m);
                }
            }
            Correction::Holm => {
                let mut running = 0.0f64;
                for (rank, &i) in order.iter().enumerate() {
                    running = running.max((m - rank as f64) * pvalues[i]);
                    adjusted[i] = running.min(1.0);
                }
            }
            Correction::FdrBh | Correction::FdrBy => {
                let cm = if let Correction::FdrBy = self {
                    (1..=order.len()).map(|k| 1.0 / k as f64).sum::<f64>()
                } else {
                    1.0
                };
                let mut running = f64::INFINITY;
                for (rank, &i) in order.iter().enumerate().rev() {
                    running = running.min(pvalues[i] * m * cm / (rank + 1) as f64);
                    adjusted[i] = running.min(1.0);
                }
            }
        }
        adjusted
    }
}
