
use std::time::Duration;

use scriptpool::{wait_all_async, Invocation, InvocationStatus};
use test_helpers::open_pool;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_wait_async_single_handle() {
        let pool = open_pool(1, 2);
        let handle = pool.submit(Invocation::new("sleep 20; echo done")).unwrap();

        let status = tokio::time::timeout(Duration::from_secs(10), handle.wait_async())
            .await
            .expect("handle should be signalled");
        assert_eq!(status, InvocationStatus::Completed);
        assert_eq!(handle.result_count(), 1);
    }

    #[tokio::test]
    async fn test_wait_all_async_mixed_outcomes() {
        let pool = open_pool(2, 4);
        let handles: Vec<_> = ["sleep 30", "fail", "echo a", "sleep 10; echo b"]
            .into_iter()
            .map(|script| pool.submit(Invocation::new(script)).unwrap())
            .collect();

        let statuses = tokio::time::timeout(Duration::from_secs(10), wait_all_async(&handles))
            .await
            .expect("all handles should be signalled");
        assert_eq!(
            statuses,
            vec![
                InvocationStatus::Completed,
                InvocationStatus::Faulted,
                InvocationStatus::Completed,
                InvocationStatus::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_wait_async_on_finished_handle_returns_immediately() {
        let pool = open_pool(1, 1);
        let handle = pool.submit(Invocation::new("echo quick")).unwrap();
        handle.wait();
        assert_eq!(handle.wait_async().await, InvocationStatus::Completed);
    }

    #[tokio::test]
    async fn test_handler_result_forwarded_to_task() {
        let pool = open_pool(1, 2);
        let (tx, rx) = tokio::sync::oneshot::channel();
        let handle = pool
            .submit(Invocation::new("emit status=ok").on_complete(move |results, _| {
                let _ = tx.send(results);
            }))
            .unwrap();

        let results = rx.await.unwrap();
        assert_eq!(results[0].to_string(), "@{status=ok}");
        assert_eq!(handle.wait_async().await, InvocationStatus::Completed);
    }
}
