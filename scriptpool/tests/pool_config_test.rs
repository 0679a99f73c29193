use scriptpool::{ExhaustionStrategy, PoolConfig, PoolError, PoolState};
use scriptpool::pool::DEFAULT_THREAD_NAME_PREFIX;
use scriptpool_api::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PoolConfig::default();
        assert_eq!(config.min_contexts, 1);
        assert_eq!(config.max_contexts, num_cpus::get());
        assert_eq!(config.queue_capacity, None);
        assert_eq!(config.exhaustion_strategy, ExhaustionStrategy::Block);
        assert_eq!(config.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
        assert!(config.initial_variables.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = PoolConfig::new(2, 8)
            .with_queue_capacity(16)
            .with_exhaustion_strategy(ExhaustionStrategy::FailFast)
            .with_thread_name_prefix("etl")
            .with_variable("env", "prod")
            .with_variable("retries", 3);

        assert_eq!(config.min_contexts, 2);
        assert_eq!(config.max_contexts, 8);
        assert_eq!(config.queue_capacity, Some(16));
        assert_eq!(config.exhaustion_strategy, ExhaustionStrategy::FailFast);
        assert_eq!(config.thread_name_prefix, "etl");
        assert_eq!(
            config.initial_variables,
            vec![("env".to_string(), Value::from("prod")), ("retries".to_string(), Value::Int(3))]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_min_may_equal_max_or_be_zero() {
        assert!(PoolConfig::new(4, 4).validate().is_ok());
        assert!(PoolConfig::new(0, 1).validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            (PoolConfig::new(0, 0), "Invalid configuration: max_contexts must be at least 1"),
            (PoolConfig::new(5, 2), "Invalid configuration: min_contexts (5) exceeds max_contexts (2)"),
            (
                PoolConfig::new(1, 1).with_thread_name_prefix(""),
                "Invalid configuration: thread_name_prefix must not be empty",
            ),
            (
                PoolConfig::new(1, 1).with_variable("x", 1).with_variable("x", 2),
                "Invalid configuration: initial variable x is defined more than once",
            ),
        ];
        for (config, message) in cases {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, PoolError::InvalidConfig(_)));
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn test_pool_error_display() {
        let exhausted = PoolError::Exhausted { max_contexts: 4, queue_capacity: 0 };
        assert_eq!(
            exhausted.to_string(),
            "Pool exhausted: all 4 contexts busy and queue capacity (0) reached"
        );
        let invalid = PoolError::InvalidState { operation: "open", state: PoolState::Disposed };
        assert_eq!(invalid.to_string(), "Cannot open a pool that is disposed");
        let setup = PoolError::ThreadSetup("worker 2: resource unavailable".to_string());
        assert_eq!(setup.to_string(), "Worker thread setup error: worker 2: resource unavailable");
        let other: PoolError = anyhow::anyhow!("worker threads panicked: runspace-1").into();
        assert_eq!(other.to_string(), "Internal pool error: worker threads panicked: runspace-1");
    }
}
