//! Descriptive statistics and the few tests the figures annotate.
//!
//! Degenerate inputs (empty slices, zero variance) yield `NaN` or `None`
//! rather than panicking.

use statrs::distribution::{ContinuousCDF, StudentsT};

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

pub fn sem(xs: &[f64]) -> f64 {
    std_dev(xs) / (xs.len() as f64).sqrt()
}

/// Half-width of the Student-t 95% confidence interval of the mean.
pub fn ci95(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let dof = (xs.len() - 1) as f64;
    match StudentsT::new(0.0, 1.0, dof) {
        Ok(t) => t.inverse_cdf(0.975) * sem(xs),
        Err(_) => f64::NAN,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    pub t: f64,
    pub dof: f64,
    /// Two-sided p-value.
    pub p: f64,
}

/// Two-sided paired t-test of `a - b`. Slices must be aligned by subject.
pub fn paired_t_test(a: &[f64], b: &[f64]) -> Option<TTest> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let diffs: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    let se = sem(&diffs);
    if !(se > 0.0) {
        return None;
    }
    let t = mean(&diffs) / se;
    let dof = (diffs.len() - 1) as f64;
    let dist = StudentsT::new(0.0, 1.0, dof).ok()?;
    let p = (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0);
    Some(TTest { t, dof, p })
}

/// Pearson correlation coefficient.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    let denom = (sxx * syy).sqrt();
    (denom > 0.0).then(|| sxy / denom)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Quartiles {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Quartiles with linear interpolation between order statistics.
pub fn quartiles(xs: &[f64]) -> Option<Quartiles> {
    let mut sorted: Vec<f64> = xs.iter().copied().filter(|x| x.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(Quartiles {
        min: sorted[0],
        q1: percentile_sorted(&sorted, 25.0),
        median: percentile_sorted(&sorted, 50.0),
        q3: percentile_sorted(&sorted, 75.0),
        max: sorted[sorted.len() - 1],
    })
}

fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Star annotation for a p-value.
pub fn significance_stars(p: f64) -> &'static str {
    if p <= 0.001 {
        "***"
    } else if p <= 0.01 {
        "**"
    } else if p <= 0.05 {
        "*"
    } else {
        "n.s."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn descriptive_stats() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&xs), 5.0);
        assert!(close(std_dev(&xs), 2.138_089_935, 1e-6));
        assert!(close(sem(&xs), 2.138_089_935 / 8f64.sqrt(), 1e-9));
        assert!(mean(&[]).is_nan());
        assert!(std_dev(&[1.0]).is_nan());
    }

    #[test]
    fn ci95_uses_t_quantile() {
        // n = 2: t(0.975, 1) = 12.706
        let half = ci95(&[0.0, 2.0]);
        assert!(close(half, 12.706_204 * 1.0, 1e-3));
    }

    #[test]
    fn paired_t_test_matches_reference() {
        let a = [10.0, 12.0, 9.0, 11.0, 13.0];
        let b = [8.0, 11.0, 9.0, 8.0, 10.0];
        let res = paired_t_test(&a, &b).unwrap();
        // diffs 2,1,0,3,3 -> mean 1.8, sd 1.3038, t = 3.0870
        assert!(close(res.t, 3.087, 1e-3));
        assert_eq!(res.dof, 4.0);
        assert!(close(res.p, 0.0366, 1e-3));
    }

    #[test]
    fn paired_t_test_rejects_degenerate_input() {
        assert!(paired_t_test(&[1.0, 2.0], &[1.0]).is_none());
        assert!(paired_t_test(&[1.0, 2.0], &[0.0, 1.0]).is_none());
    }

    #[test]
    fn quartiles_interpolate() {
        let q = quartiles(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(q.min, 1.0);
        assert!(close(q.q1, 1.75, 1e-12));
        assert!(close(q.median, 2.5, 1e-12));
        assert!(close(q.q3, 3.25, 1e-12));
        assert_eq!(q.max, 4.0);
        assert!(quartiles(&[f64::NAN]).is_none());
    }

    #[test]
    fn pearson_detects_perfect_relationships() {
        assert!(close(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap(), 1.0, 1e-12));
        assert!(close(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap(), -1.0, 1e-12));
        assert!(pearson(&[1.0, 1.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn stars() {
        assert_eq!(significance_stars(0.0005), "***");
        assert_eq!(significance_stars(0.008), "**");
        assert_eq!(significance_stars(0.05), "*");
        assert_eq!(significance_stars(0.2), "n.s.");
    }
}
