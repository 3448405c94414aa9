//! Cumulative exposure per depth.

use qtty::Seconds;

use crate::core::domain::{DepthJob, Subframe};

/// Fill `total_exposure` on each job with the summed exposure of the first
/// `depth` subframes.
///
/// A depth beyond the subframe count sums what is available.
pub fn accumulate(jobs: Vec<DepthJob>, subframes: &[Subframe]) -> Vec<DepthJob> {
    // prefix[i] = exposure of the first i subframes
    let mut prefix = Vec::with_capacity(subframes.len() + 1);
    prefix.push(0.0f64);
    for sub in subframes {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + sub.exposure.value());
    }

    jobs.into_iter()
        .map(|job| {
            let n = job.depth.min(subframes.len());
            if job.depth > subframes.len() {
                log::warn!(
                    "{} asks for {} subs but only {} are available",
                    job.label,
                    job.depth,
                    subframes.len()
                );
            }
            let total = Seconds::new(prefix[n]);
            job.with_exposure(total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(exposures: &[f64]) -> Vec<Subframe> {
        exposures
            .iter()
            .enumerate()
            .map(|(i, &e)| Subframe::new(format!("L_{:04}.tif", i), e))
            .collect()
    }

    #[test]
    fn test_accumulate_prefix_sums() {
        let subframes = subs(&[300.0, 300.0, 180.0, 180.0, 120.0]);
        let jobs = accumulate(vec![DepthJob::new(1), DepthJob::new(3), DepthJob::new(5)], &subframes);

        let totals: Vec<f64> = jobs.iter().map(|j| j.total_exposure.value()).collect();
        assert_eq!(totals, vec![300.0, 780.0, 1080.0]);
    }

    /// Test that acquisition order decides which subs count
    #[test]
    fn test_accumulate_respects_order() {
        let subframes = subs(&[60.0, 600.0]);
        let jobs = accumulate(vec![DepthJob::new(1)], &subframes);
        assert_eq!(jobs[0].total_exposure.value(), 60.0);
    }

    #[test]
    fn test_accumulate_clamps_to_available() {
        let subframes = subs(&[120.0, 120.0]);
        let jobs = accumulate(vec![DepthJob::new(10)], &subframes);
        assert_eq!(jobs[0].total_exposure.value(), 240.0);
        assert_eq!(jobs[0].depth, 10);
    }

    #[test]
    fn test_accumulate_leaves_other_fields() {
        let subframes = subs(&[10.0]);
        let jobs = accumulate(vec![DepthJob::new(1)], &subframes);
        assert_eq!(jobs[0].label, "N1");
        assert_eq!(jobs[0].snr, 0.0);
        assert_eq!(jobs[0].integration_time.value(), 0.0);
    }
}
