
use std::sync::Arc;

use scriptpool::{wait_all_timeout, Invocation, InvocationStatus, PoolConfig};
use test_helpers::{open_pool_with, tracking_engine, Overlap, WAIT};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_never_exceeds_max_contexts() {
        let overlap = Arc::new(Overlap::default());
        let pool = open_pool_with(PoolConfig::new(1, 3), tracking_engine(Arc::clone(&overlap)));

        let handles: Vec<_> = (0..12)
            .map(|_| pool.submit(Invocation::new("track 30")).unwrap())
            .collect();

        assert!(wait_all_timeout(&handles, WAIT));
        assert!(handles.iter().all(|h| h.status() == InvocationStatus::Completed));
        assert!(overlap.peak() <= 3, "peak overlap {} exceeded 3", overlap.peak());
        assert!(overlap.peak() > 1, "invocations never overlapped");
        pool.dispose().unwrap();
    }

    #[test]
    fn test_single_context_serializes() {
        let overlap = Arc::new(Overlap::default());
        let pool = open_pool_with(PoolConfig::new(1, 1), tracking_engine(Arc::clone(&overlap)));

        let handles: Vec<_> = (0..5)
            .map(|_| pool.submit(Invocation::new("track 5")).unwrap())
            .collect();
        assert!(wait_all_timeout(&handles, WAIT));
        assert_eq!(overlap.peak(), 1);
    }

    #[test]
    fn test_contexts_created_on_demand_up_to_max() {
        let overlap = Arc::new(Overlap::default());
        let pool = open_pool_with(PoolConfig::new(1, 4), tracking_engine(Arc::clone(&overlap)));
        assert_eq!(pool.metrics().created_contexts, 1);

        let handles: Vec<_> = (0..16)
            .map(|_| pool.submit(Invocation::new("track 20")).unwrap())
            .collect();
        assert!(wait_all_timeout(&handles, WAIT));

        let metrics = pool.metrics();
        assert!(metrics.created_contexts >= 1 && metrics.created_contexts <= 4);
        assert!(metrics.created_contexts >= overlap.peak());
        assert_eq!(metrics.available_contexts, metrics.created_contexts);
        assert_eq!(metrics.completed, 16);
        assert_eq!(metrics.queued, 0);
        assert_eq!(metrics.running, 0);
    }

    #[test]
    fn test_submissions_from_many_threads() {
        let overlap = Arc::new(Overlap::default());
        let pool = Arc::new(open_pool_with(PoolConfig::new(2, 2), tracking_engine(Arc::clone(&overlap))));

        let submitters: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    (0..5)
                        .map(|_| pool.submit(Invocation::new("track 2")).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let handles: Vec<_> = submitters.into_iter().flat_map(|t| t.join().unwrap()).collect();

        assert_eq!(handles.len(), 20);
        assert!(wait_all_timeout(&handles, WAIT));
        assert!(overlap.peak() <= 2);
        assert_eq!(pool.metrics().completed, 20);
    }
}
