
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::Rng;
use scriptpool::{wait_all_timeout, Invocation, InvocationStatus};
use scriptpool_api::StateBag;
use test_helpers::open_pool;

const SCRIPT: &str = "sleep $ms; echo \"$i | Slept: $ms ms\"";

#[cfg(test)]
mod tests {
    use super::*;

    /// Twenty invocations on twenty contexts, each sleeping a random number
    /// of milliseconds below `max_sleep_ms`; every handler must see its own
    /// index and the text the script produced for it.
    fn run_twenty_random_sleeps(max_sleep_ms: i64, time_limit: Duration) {
        let pool = open_pool(1, 20);
        let mut rng = rand::thread_rng();
        let outputs = Arc::new(Mutex::new(BTreeMap::new()));
        let mut expected = BTreeMap::new();
        let mut longest = 0;

        let start = Instant::now();
        let mut handles = Vec::new();
        for i in 0..20i64 {
            let ms: i64 = rng.gen_range(0..=max_sleep_ms);
            longest = longest.max(ms);
            expected.insert(i, format!("{i} | Slept: {ms} ms"));

            let outputs = Arc::clone(&outputs);
            let invocation = Invocation::new(SCRIPT)
                .parameter("i", i)
                .and_then(|inv| inv.parameter("ms", ms))
                .unwrap()
                .with_state(StateBag::new().with("i", i))
                .on_complete(move |results, state| {
                    let i = state.require_i64("i").unwrap();
                    let text = results.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");
                    outputs.lock().unwrap().insert(i, text);
                })
                .on_error(|fault, state| panic!("invocation {:?} faulted: {fault}", state.get("i")));
            handles.push(pool.submit(invocation).unwrap());
        }

        assert!(wait_all_timeout(&handles, time_limit + Duration::from_secs(10)));
        assert!(handles.iter().all(|h| h.status() == InvocationStatus::Completed));
        assert_eq!(*outputs.lock().unwrap(), expected);

        // 20 contexts run the sleeps side by side: wall time tracks the
        // longest sleep, not the sum.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(longest as u64));
        assert!(elapsed < time_limit, "took {elapsed:?}");
        pool.dispose().unwrap();
    }

    // Sleeps capped at 200 ms keep the suite fast; the full 0-5000 ms range
    // runs in the ignored test below and in `examples/parallel_sleep.rs`.
    #[test]
    fn test_twenty_random_sleeps() {
        run_twenty_random_sleeps(200, Duration::from_secs(3));
    }

    #[test]
    #[ignore = "sleeps up to five seconds"]
    fn test_twenty_random_sleeps_full_range() {
        run_twenty_random_sleeps(5000, Duration::from_secs(8));
    }

    #[test]
    fn test_fewer_contexts_than_invocations() {
        let pool = open_pool(1, 4);
        let outputs = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..20i64)
            .map(|i| {
                let outputs = Arc::clone(&outputs);
                let invocation = Invocation::new(SCRIPT)
                    .parameter("i", i)
                    .and_then(|inv| inv.parameter("ms", 5))
                    .unwrap()
                    .with_state(StateBag::new().with("i", i))
                    .on_complete(move |results, state| {
                        outputs.lock().unwrap().push((state.require_i64("i").unwrap(), results[0].to_string()));
                    });
                pool.submit(invocation).unwrap()
            })
            .collect();

        assert!(wait_all_timeout(&handles, Duration::from_secs(10)));
        let mut outputs = outputs.lock().unwrap().clone();
        outputs.sort();
        assert_eq!(outputs.len(), 20);
        for (i, text) in outputs {
            assert_eq!(text, format!("{i} | Slept: 5 ms"));
        }
        assert!(pool.metrics().created_contexts <= 4);
    }
}
