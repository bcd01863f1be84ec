//! The optimization objective.

/// Point-biserial correlation between a continuous score and a binary
/// outcome. Algebraically the Pearson correlation with the outcome coded
/// 0/1, which is how it is computed here.
///
/// Returns `None` when either side has zero variance (all leads converted,
/// none converted, or all composites identical): the correlation is
/// undefined and the caller must treat the input as degenerate.
pub fn point_biserial(scores: &[f64], outcomes: &[bool]) -> Option<f64> {
    if scores.len() != outcomes.len() || scores.len() < 2 {
        return None;
    }
    let n = scores.len() as f64;

    let mean_x = scores.iter().sum::<f64>() / n;
    let mean_y = outcomes.iter().filter(|c| **c).count() as f64 / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, converted) in scores.iter().zip(outcomes.iter()) {
        let dx = x - mean_x;
        let y = if *converted { 1.0 } else { 0.0 };
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return None;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then_some(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_separation_is_near_one() {
        let scores = vec![10.0, 11.0, 12.0, 90.0, 91.0, 92.0];
        let outcomes = vec![false, false, false, true, true, true];
        let r = point_biserial(&scores, &outcomes).unwrap();
        assert!(r > 0.95, "r = {r}");
    }

    #[test]
    fn inverted_separation_is_negative() {
        let scores = vec![90.0, 91.0, 10.0, 11.0];
        let outcomes = vec![false, false, true, true];
        let r = point_biserial(&scores, &outcomes).unwrap();
        assert!(r < -0.95, "r = {r}");
    }

    #[test]
    fn zero_outcome_variance_is_none() {
        let scores = vec![1.0, 2.0, 3.0];
        assert!(point_biserial(&scores, &[true, true, true]).is_none());
        assert!(point_biserial(&scores, &[false, false, false]).is_none());
    }

    #[test]
    fn zero_score_variance_is_none() {
        let scores = vec![5.0, 5.0, 5.0, 5.0];
        let outcomes = vec![true, false, true, false];
        assert!(point_biserial(&scores, &outcomes).is_none());
    }

    #[test]
    fn mismatched_or_tiny_input_is_none() {
        assert!(point_biserial(&[1.0], &[true]).is_none());
        assert!(point_biserial(&[1.0, 2.0], &[true]).is_none());
    }
}
