//! 配置模块的集成测试

use tempfile::TempDir;

#[cfg(test)]
mod config_tests {
    use super::*;
    use fwlog_parser::concurrent::FailurePolicy;
    use fwlog_parser::config::{Config, DEFAULT_CHUNK_SIZE, DEFAULT_FALLBACK_YEAR, PipelineConfig};

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();

        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.max_workers >= 1);
        assert_eq!(config.max_threads, 1);
        assert!(!config.preserve_intermediate);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.fallback_year, DEFAULT_FALLBACK_YEAR);
        assert_eq!(config.variants, vec!["hw", "cp"]);
    }

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
[log]
enable_stdout = false
log_dir = "custom_logs"
level = "debug"

[pipeline]
chunk_size = 65536
max_workers = 6
max_threads = 2
preserve_intermediate = true
failure_policy = "best-effort"
fallback_year = 2024
variants = ["cp"]
"#;

        let config = Config::from_str(toml_content).unwrap();

        assert!(!config.log.enable_stdout);
        assert_eq!(config.log.log_dir, "custom_logs");
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.pipeline.chunk_size, 65536);
        assert_eq!(config.pipeline.max_workers, 6);
        assert_eq!(config.pipeline.max_threads, 2);
        assert!(config.pipeline.preserve_intermediate);
        assert_eq!(config.pipeline.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(config.pipeline.fallback_year, 2024);
        assert_eq!(config.pipeline.variants, vec!["cp"]);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_str("[pipeline]\nmax_threads = 4\n").unwrap();

        assert_eq!(config.pipeline.max_threads, 4);
        assert_eq!(config.pipeline.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let cases = [
            "[pipeline]\nchunk_size = 0\n",
            "[pipeline]\nmax_workers = 0\n",
            "[pipeline]\nfallback_year = 0\n",
            "[pipeline]\nvariants = []\n",
            "[pipeline]\nfailure_policy = \"sometimes\"\n",
            "[log]\nlevel = \"loud\"\n",
            "not toml at all = = =",
        ];
        for content in cases {
            assert!(Config::from_str(content).is_err(), "accepted: {content}");
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fwlog.toml");

        let mut config = Config::default();
        config.pipeline.chunk_size = 1024;
        config.pipeline.failure_policy = FailurePolicy::BestEffort;
        config.pipeline.variants = vec!["cp".to_string(), "hw".to_string()];
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.pipeline.chunk_size, 1024);
        assert_eq!(loaded.pipeline.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(loaded.pipeline.variants, vec!["cp", "hw"]);
    }

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::from_file(temp_dir.path().join("nope.toml")).unwrap_err();
        assert!(err.is_io_error());
    }
}
