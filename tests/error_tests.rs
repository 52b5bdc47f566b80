//! 错误处理系统的集成测试

#[cfg(test)]
mod error_tests {
    use fwlog_parser::error::{FwlogError, Result};
    use std::error::Error;
    use std::io;

    #[test]
    fn test_io_error_from() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: FwlogError = io_err.into();

        assert!(err.is_io_error());
        assert!(!err.is_config_error());
        assert!(!err.is_pipeline_state_error());
        assert!(!err.is_worker_failure());
        assert!(format!("{err}").contains("IO错误"));
    }

    #[test]
    fn test_json_and_toml_errors_from() {
        let json_err = serde_json::from_str::<Vec<String>>("[1,").unwrap_err();
        let err: FwlogError = json_err.into();
        assert!(format!("{err}").contains("中间产物序列化错误"));

        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: FwlogError = toml_err.into();
        assert!(format!("{err}").contains("配置文件解析错误"));
    }

    #[test]
    fn test_chunk_error_exposes_source() {
        let err = FwlogError::pipeline_state("boom").in_chunk(3);

        assert_eq!(err.chunk_id(), Some(3));
        assert!(!err.is_pipeline_state_error());
        let source = err.source().unwrap();
        assert!(source.to_string().contains("boom"));
    }

    #[test]
    fn test_result_alias() {
        fn fails() -> Result<()> {
            Err(FwlogError::other("nothing to see"))
        }
        let err = fails().unwrap_err();
        assert_eq!(err.to_string(), "未知错误: nothing to see");
    }
}
