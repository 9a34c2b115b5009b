//! Two-group hypothesis tests applied to one protein at a time.
//!
//! Every test returns a two-sided p-value. A degenerate input (zero
//! variance, identical samples) follows the usual conventions: a t
//! statistic with a zero denominator gives `p = 0` when the means differ and
//! NaN when they do not. Distribution construction failures give `p = 1`.
use super::stats::{mean, rank, tie_counts, variance};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal, StudentsT};
use std::fmt;
use std::str::FromStr;

/// Exact Mann-Whitney distribution is used when one sample is at most this
/// large and there are no ties
const MWU_EXACT_MAX: usize = 8;

/// Exact signed-rank distribution is used up to this many differences
const WILCOXON_EXACT_MAX: usize = 50;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StatTest {
    /// Student's two-sample t-test, pooled variance
    TTest,
    /// Welch's t-test, unequal variances
    Welch,
    /// Paired t-test
    Paired,
    /// Mann-Whitney U, two-sided with continuity correction
    MannWhitneyU,
    /// Wilcoxon signed-rank on paired differences
    Wilcoxon,
    /// Kruskal-Wallis H
    Kruskal,
    /// One-way ANOVA
    FOneway,
}

impl Default for StatTest {
    fn default() -> Self {
        StatTest::TTest
    }
}

impl FromStr for StatTest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "t-test" | "ttest" | "ttest_ind" => Ok(StatTest::TTest),
            "welch" => Ok(StatTest::Welch),
            "ttest_rel" | "paired" => Ok(StatTest::Paired),
            "mannwhitneyu" => Ok(StatTest::MannWhitneyU),
            "wilcoxon" => Ok(StatTest::Wilcoxon),
            "kruskal" => Ok(StatTest::Kruskal),
            "f_oneway" | "anova" => Ok(StatTest::FOneway),
            _ => Err(format!("unknown statistical test '{}'", s)),
        }
    }
}

impl fmt::Display for StatTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl StatTest {
    pub const ALL: [StatTest; 7] = [
        StatTest::TTest,
        StatTest::Welch,
        StatTest::Paired,
        StatTest::MannWhitneyU,
        StatTest::Wilcoxon,
        StatTest::Kruskal,
        StatTest::FOneway,
    ];

    /// Parse a test name, falling back to the t-test for unknown names
    pub fn parse_or_default(s: &str) -> StatTest {
        s.parse().unwrap_or_else(|e| {
            tracing::warn!("{}, using t-test", e);
            StatTest::TTest
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            StatTest::TTest => "t-test",
            StatTest::Welch => "welch",
            StatTest::Paired => "ttest_rel",
            StatTest::MannWhitneyU => "mannwhitneyu",
            StatTest::Wilcoxon => "wilcoxon",
            StatTest::Kruskal => "kruskal",
            StatTest::FOneway => "f_oneway",
        }
    }

    /// Two-sided p-value comparing `a` and `b`
    pub fn pvalue(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            StatTest::TTest => student(a, b),
            StatTest::Welch => welch(a, b),
            StatTest::Paired => paired(a, b),
            StatTest::MannWhitneyU => mann_whitney_u(a, b),
            StatTest::Wilcoxon => wilcoxon(a, b),
            StatTest::Kruskal => kruskal(a, b),
            StatTest::FOneway => f_oneway(a, b),
        }
    }
}

/// Replace an all-zero triplicate by `epsilon` so that rank and variance
/// based tests have something to work with. Only one side is replaced,
/// condition 1 taking precedence.
pub fn replace_all_zero(a: &mut [f64], b: &mut [f64], epsilon: f64) {
    if a.iter().all(|&v| v == 0.0) {
        a.iter_mut().for_each(|v| *v = epsilon);
    } else if b.iter().all(|&v| v == 0.0) {
        b.iter_mut().for_each(|v| *v = epsilon);
    }
}

#[inline]
fn degenerate(diff: f64) -> f64 {
    if diff != 0.0 {
        0.0
    } else {
        f64::NAN
    }
}

/// Two-sided p-value for a t statistic with `df` degrees of freedom
fn t_pvalue(diff: f64, denom: f64, df: f64) -> f64 {
    if !(denom > 0.0) {
        return degenerate(diff);
    }
    let t = diff / denom;
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).min(1.0),
        Err(_) => 1.0,
    }
}

fn normal_sf(z: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(n) => n.sf(z),
        Err(_) => 1.0,
    }
}

fn student(a: &[f64], b: &[f64]) -> f64 {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    if a.len() < 2 || b.len() < 2 {
        return f64::NAN;
    }
    let df = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * variance(a) + (n2 - 1.0) * variance(b)) / df;
    let denom = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    t_pvalue(mean(a) - mean(b), denom, df)
}

fn welch(a: &[f64], b: &[f64]) -> f64 {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    if a.len() < 2 || b.len() < 2 {
        return f64::NAN;
    }
    let (v1, v2) = (variance(a) / n1, variance(b) / n2);
    let denom = (v1 + v2).sqrt();
    // Welch-Satterthwaite
    let df = (v1 + v2).powi(2) / (v1.powi(2) / (n1 - 1.0) + v2.powi(2) / (n2 - 1.0));
    t_pvalue(mean(a) - mean(b), denom, df)
}

fn paired(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 1.0;
    }
    if a.len() < 2 {
        return f64::NAN;
    }
    let d = a.iter().zip(b).map(|(x, y)| x - y).collect::<Vec<_>>();
    let n = d.len() as f64;
    let denom = (variance(&d) / n).sqrt();
    t_pvalue(mean(&d), denom, n - 1.0)
}

/// Number of ways to obtain each U statistic for sample sizes `m` and `n`
fn mwu_counts(m: usize, n: usize) -> Vec<f64> {
    // c[i][j][k]: arrangements of i and j items with U = k, built from
    // c(i, j) = c(i - 1, j) shifted by j + c(i, j - 1)
    let mut prev: Vec<Vec<f64>> = (0..=n).map(|_| vec![1.0]).collect();
    for i in 1..=m {
        let mut cur: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        cur.push(vec![1.0]);
        for j in 1..=n {
            let mut c = vec![0.0; i * j + 1];
            for (k, v) in prev[j].iter().enumerate() {
                c[k + j] += v;
            }
            for (k, v) in cur[j - 1].iter().enumerate() {
                c[k] += v;
            }
            cur.push(c);
        }
        prev = cur;
    }
    prev.swap_remove(n)
}

fn mann_whitney_u(a: &[f64], b: &[f64]) -> f64 {
    let (n1, n2) = (a.len(), b.len());
    if n1 == 0 || n2 == 0 {
        return f64::NAN;
    }
    let all = a.iter().chain(b).copied().collect::<Vec<_>>();
    let ranks = rank(&all);
    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u = u1.max(u2);

    let ties = tie_counts(&all);
    let has_ties = ties.iter().any(|&t| t > 1);

    if (n1 <= MWU_EXACT_MAX || n2 <= MWU_EXACT_MAX) && !has_ties {
        let counts = mwu_counts(n1, n2);
        let total: f64 = counts.iter().sum();
        // P(U >= u)
        let sf: f64 = counts[u.round() as usize..].iter().sum::<f64>() / total;
        return (2.0 * sf).min(1.0);
    }

    let n = (n1 + n2) as f64;
    let mu = (n1 * n2) as f64 / 2.0;
    let tie_term = ties.iter().map(|&t| (t * t * t - t) as f64).sum::<f64>() / (n * (n - 1.0));
    let s = ((n1 * n2) as f64 / 12.0 * ((n + 1.0) - tie_term)).sqrt();
    if !(s > 0.0) {
        return 1.0;
    }
    let z = (u - mu - 0.5) / s;
    (2.0 * normal_sf(z)).clamp(0.0, 1.0)
}

/// Number of subsets of `1..=n` summing to each total
fn signed_rank_counts(n: usize) -> Vec<f64> {
    let max = n * (n + 1) / 2;
    let mut c = vec![0.0; max + 1];
    c[0] = 1.0;
    for r in 1..=n {
        for k in (r..=max).rev() {
            c[k] += c[k - r];
        }
    }
    c
}

fn wilcoxon(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 1.0;
    }
    let diffs = a.iter().zip(b).map(|(x, y)| x - y).collect::<Vec<_>>();
    let zeros = diffs.iter().filter(|&&d| d == 0.0).count();
    let d = diffs.into_iter().filter(|&d| d != 0.0).collect::<Vec<_>>();
    let n = d.len();
    if n == 0 {
        return 1.0;
    }

    let abs = d.iter().map(|v| v.abs()).collect::<Vec<_>>();
    let ranks = rank(&abs);
    let r_plus: f64 = d
        .iter()
        .zip(&ranks)
        .filter(|(v, _)| **v > 0.0)
        .map(|(_, r)| r)
        .sum();
    let total = (n * (n + 1)) as f64 / 2.0;
    let r_minus = total - r_plus;

    let ties = tie_counts(&abs);
    let has_ties = ties.iter().any(|&t| t > 1);

    if n <= WILCOXON_EXACT_MAX && !has_ties && zeros == 0 {
        let counts = signed_rank_counts(n);
        let all: f64 = counts.iter().sum();
        let k = r_plus.round() as usize;
        let cdf = counts[..=k].iter().sum::<f64>() / all;
        let sf = counts[k..].iter().sum::<f64>() / all;
        return (2.0 * cdf.min(sf)).min(1.0);
    }

    let nf = n as f64;
    let mn = nf * (nf + 1.0) / 4.0;
    let mut se = nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0;
    se -= ties.iter().map(|&t| (t * t * t - t) as f64).sum::<f64>() / 48.0;
    let se = se.sqrt();
    if !(se > 0.0) {
        return 1.0;
    }
    let z = (r_plus.min(r_minus) - mn) / se;
    (2.0 * (1.0 - normal_sf(z))).clamp(0.0, 1.0)
}

fn kruskal(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return f64::NAN;
    }
    let all = a.iter().chain(b).copied().collect::<Vec<_>>();
    let n = all.len() as f64;
    let ranks = rank(&all);
    let (ra, rb) = ranks.split_at(a.len());
    let h = 12.0 / (n * (n + 1.0))
        * (ra.iter().sum::<f64>().powi(2) / a.len() as f64
            + rb.iter().sum::<f64>().powi(2) / b.len() as f64)
        - 3.0 * (n + 1.0);

    let correction = 1.0
        - tie_counts(&all)
            .iter()
            .map(|&t| (t * t * t - t) as f64)
            .sum::<f64>()
            / (n * n * n - n);
    if !(correction > 0.0) {
        // every value identical
        return 1.0;
    }
    match ChiSquared::new(1.0) {
        Ok(dist) => dist.sf(h / correction),
        Err(_) => 1.0,
    }
}

fn f_oneway(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() + b.len();
    if a.is_empty() || b.is_empty() || n < 3 {
        return f64::NAN;
    }
    let grand = (a.iter().sum::<f64>() + b.iter().sum::<f64>()) / n as f64;
    let (ma, mb) = (mean(a), mean(b));
    let ssb = a.len() as f64 * (ma - grand).powi(2) + b.len() as f64 * (mb - grand).powi(2);
    let ssw = a.iter().map(|x| (x - ma).powi(2)).sum::<f64>()
        + b.iter().map(|x| (x - mb).powi(2)).sum::<f64>();

    let dfw = (n - 2) as f64;
    let msw = ssw / dfw;
    if !(msw > 0.0) {
        return degenerate(ssb);
    }
    let f = ssb / msw;
    match FisherSnedecor::new(1.0, dfw) {
        Ok(dist) => dist.sf(f),
        Err(_) => 1.0,
    }
}
