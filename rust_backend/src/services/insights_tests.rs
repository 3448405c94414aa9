#[cfg(test)]
mod tests {
    use crate::core::domain::DepthJob;
    use crate::services::insights::{compute_insights, ResultsAggregator, DEFAULT_DIMINISHING_THRESHOLD};

    fn job(depth: usize, snr: f64) -> DepthJob {
        let mut job = DepthJob::new(depth);
        job.snr = snr;
        job
    }

    /// Test that fewer than two results yield no insight and no graph
    #[test]
    fn test_single_result_not_graphable() {
        let mut agg = ResultsAggregator::default();
        let summary = agg.summarize();
        assert!(summary.insights.is_empty());
        assert!(!summary.graphable);

        agg.push(job(12, 3.0));
        let summary = agg.summarize();
        assert!(summary.insights.is_empty());
        assert!(!summary.graphable);
        assert_eq!(summary.diminishing_returns_depth, None);
    }

    #[test]
    fn test_relative_gain_per_transition() {
        let results = vec![job(12, 2.0), job(24, 2.5), job(48, 2.6)];
        let summary = compute_insights(&results, DEFAULT_DIMINISHING_THRESHOLD);

        assert!(summary.graphable);
        assert_eq!(summary.insights.len(), 2);

        let first = &summary.insights[0];
        assert_eq!((first.from_depth, first.to_depth), (12, 24));
        assert_eq!(first.from_label, "N12");
        assert!((first.snr_gain - 0.5).abs() < 1e-12);
        assert!((first.relative_gain - 0.25).abs() < 1e-12);
        assert!((first.ideal_relative_gain - (2f64.sqrt() - 1.0)).abs() < 1e-12);
        assert!(!first.below_threshold);

        let second = &summary.insights[1];
        assert!((second.relative_gain - 0.04).abs() < 1e-12);
        assert!(second.below_threshold);
    }

    /// Test that the first sub-threshold transition wins
    #[test]
    fn test_diminishing_returns_is_first_drop() {
        let results = vec![
            job(8, 1.0),
            job(16, 1.4),
            job(32, 1.45),
            job(64, 2.0),
            job(128, 2.05),
        ];
        let summary = compute_insights(&results, 0.10);
        assert_eq!(summary.diminishing_returns_depth, Some(32));
    }

    #[test]
    fn test_no_drop_below_threshold() {
        let results = vec![job(8, 1.0), job(16, 1.41), job(32, 2.0)];
        let summary = compute_insights(&results, 0.10);
        assert_eq!(summary.diminishing_returns_depth, None);
    }

    #[test]
    fn test_ideal_scaling_has_unit_efficiency() {
        let results = vec![job(16, 2.0), job(64, 4.0)];
        let summary = compute_insights(&results, 0.10);
        assert!((summary.insights[0].efficiency - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_snr_transition_skipped() {
        let results = vec![job(8, 0.0), job(16, 1.0), job(32, 1.3)];
        let summary = compute_insights(&results, 0.10);
        assert_eq!(summary.insights.len(), 1);
        assert_eq!(summary.insights[0].from_depth, 16);
        assert_eq!(summary.warnings.len(), 1);
    }

    #[test]
    fn test_negative_snr_kept() {
        let results = vec![job(8, -1.0), job(16, -0.5)];
        let summary = compute_insights(&results, 0.10);
        assert!((summary.insights[0].relative_gain + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_push_keeps_depth_order() {
        let mut agg = ResultsAggregator::new(0.05);
        agg.push(job(8, 1.0));
        agg.push(job(32, 2.0));
        agg.push(job(16, 1.5));
        let depths: Vec<usize> = agg.results().iter().map(|j| j.depth).collect();
        assert_eq!(depths, vec![8, 16, 32]);
        assert_eq!(agg.threshold(), 0.05);
        assert_eq!(agg.len(), 3);
    }
}
