/// # Parallel Sleep Example
///
/// Twenty invocations of the same script, each sleeping a random 0-5000 ms,
/// run on a pool of 20 contexts. Each completion handler prints the script's
/// output together with the index carried in its state bag. Total wall time is
/// close to the longest single sleep rather than the sum.
///
/// Run with `RUST_LOG=scriptpool=debug` to see pool and invocation events.

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use scriptpool::{logging, wait_all, CommandEngine, Invocation, InvocationStatus, PoolConfig, RunspacePool};
use scriptpool_api::StateBag;

const SCRIPT: &str = "sleep $ms; echo \"$i | Slept: $ms ms\"";
const INVOCATIONS: i64 = 20;

fn main() -> anyhow::Result<()> {
    logging::init_default();

    let pool = RunspacePool::open_with(
        PoolConfig::new(1, INVOCATIONS as usize).with_thread_name_prefix("sleeper"),
        Arc::new(CommandEngine::new()),
    )?;

    let mut rng = rand::thread_rng();
    let started = Instant::now();
    let mut handles = Vec::with_capacity(INVOCATIONS as usize);

    for i in 0..INVOCATIONS {
        let ms: i64 = rng.gen_range(0..=5000);
        let invocation = Invocation::new(SCRIPT)
            .parameter("i", i)?
            .parameter("ms", ms)?
            .with_state(StateBag::new().with("i", i))
            .on_complete(|results, state| {
                let index = state.require_i64("i").unwrap_or(-1);
                for record in results {
                    println!("[{index:>2}] {record}");
                }
            })
            .on_error(|fault, state| {
                eprintln!("[{:?}] failed: {fault}", state.get("i"));
            });
        handles.push(pool.submit(invocation)?);
    }

    let statuses = wait_all(&handles);
    let completed = statuses.iter().filter(|s| **s == InvocationStatus::Completed).count();
    println!(
        "{completed}/{} invocations completed in {:?}",
        statuses.len(),
        started.elapsed()
    );

    let metrics = pool.metrics();
    println!(
        "contexts created: {}, completed: {}, faulted: {}",
        metrics.created_contexts, metrics.completed, metrics.faulted
    );

    pool.dispose()?;
    Ok(())
}
