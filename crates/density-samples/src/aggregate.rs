//! Throughput aggregation across worker windows.

use tracing::debug;

use density_core::IterationResult;

use crate::reader::SampleWindow;

/// Reduce per-worker windows to a total and per-worker throughput.
///
/// Each non-empty window contributes its average. The total is divided by
/// the nominal `worker_count`, not by the number of windows read, so
/// workers that failed to report pull the per-worker figure down.
pub fn aggregate(worker_count: u32, windows: &[SampleWindow]) -> IterationResult {
    let mut total_throughput = 0.0;
    for window in windows {
        if let Some(avg) = window.average() {
            debug!(path = %window.path.display(), avg, "averaged pipeline throughput");
            total_throughput += avg;
        }
    }

    let per_worker_throughput = if worker_count == 0 {
        0.0
    } else {
        total_throughput / worker_count as f64
    };

    IterationResult {
        worker_count,
        total_throughput,
        per_worker_throughput,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn window(samples: &[f64]) -> SampleWindow {
        SampleWindow {
            path: PathBuf::from("pipeline_x.log"),
            samples: samples.to_vec(),
        }
    }

    #[test]
    fn averages_each_window_then_sums() {
        let result = aggregate(2, &[window(&[10.0, 20.0]), window(&[30.0])]);
        assert_eq!(result.total_throughput, 45.0);
        assert_eq!(result.per_worker_throughput, 22.5);
        assert_eq!(result.worker_count, 2);
    }

    #[test]
    fn all_sentinel_windows_yield_zero() {
        for n in 1..=8 {
            let windows: Vec<_> = (0..n).map(|_| window(&[])).collect();
            let result = aggregate(n, &windows);
            assert_eq!(result.per_worker_throughput, 0.0);
            assert_eq!(result.total_throughput, 0.0);
        }
        assert_eq!(aggregate(3, &[]).per_worker_throughput, 0.0);
    }

    #[test]
    fn divides_by_requested_count_not_windows_read() {
        // Only two of four workers reported.
        let result = aggregate(4, &[window(&[20.0]), window(&[20.0])]);
        assert_eq!(result.total_throughput, 40.0);
        assert_eq!(result.per_worker_throughput, 10.0);
    }

    #[test]
    fn per_worker_decreases_as_count_grows() {
        let windows = [window(&[12.0, 14.0]), window(&[9.0])];
        let mut previous = f64::INFINITY;
        for n in 1..=10 {
            let per_worker = aggregate(n, &windows).per_worker_throughput;
            assert!(per_worker < previous);
            previous = per_worker;
        }
    }
}
