//! 集成测试公共模块

use fwlog_parser::concurrent::FailurePolicy;
use fwlog_parser::config::PipelineConfig;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// 华为会话拆除日志（带设备时间）
#[allow(dead_code)]
pub const HW_TEARDOWN: &str = "Sep  9 11:56:41 10.123.169.1 2020-09-09 10:05:11 FW-OUT-01 %%01SECLOG/6/SESSION_TEARDOWN(l):IPVer=4,Protocol=udp,SourceIP=10.123.169.167,DestinationIP=8.8.8.8,SourcePort=52451,DestinationPort=53,PolicyName=Permit_all,CloseReason=aged-out.";

/// CheckPoint 日志
#[allow(dead_code)]
pub const CP_ACCEPT: &str = r#"Sep 10 08:15:02 10.1.1.1 +02:00 10.2.2.2 time="1599718502" action="Accept" orig="10.1.1.1" product="VPN-1 & FireWall-1" service:="443""#;

/// 缺少时区的 CheckPoint 风格日志，不匹配任何变体
#[allow(dead_code)]
pub const CP_NO_TIMEZONE: &str = r#"Sep 10 08:15:02 10.1.1.1 10.2.2.2 action="Accept""#;

/// 创建测试用的日志文件
#[allow(dead_code)]
pub fn create_test_log(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).expect("Failed to write test file");
    file_path
}

/// 第 `seq` 条华为日志，源端口等于序号，便于校验行顺序
#[allow(dead_code)]
pub fn hw_line(seq: usize) -> String {
    format!(
        "Sep  9 11:{:02}:{:02} 10.123.169.1 FW-OUT-01 %%01SECLOG/6/SESSION_TEARDOWN(l):IPVer=4,Protocol=udp,SourcePort={seq},CloseReason=aged-out.",
        (seq / 60) % 60,
        seq % 60
    )
}

/// 第 `seq` 条 CheckPoint 日志
#[allow(dead_code)]
pub fn cp_line(seq: usize) -> String {
    format!(r#"Sep 10 08:15:02 10.1.1.1 +02:00 10.2.2.2 seq="{seq}" action="Drop""#)
}

/// 生成混合内容：每 5 行一条 CheckPoint，每 7 行一条无法解析的行，其余为华为
///
/// 返回 (文件内容, 华为行数, CheckPoint 行数, 未解析行)
#[allow(dead_code)]
pub fn mixed_log(lines: usize) -> (String, usize, usize, Vec<String>) {
    let mut content = String::new();
    let (mut hw, mut cp) = (0, 0);
    let mut leftovers = Vec::new();

    for seq in 0..lines {
        let line = if seq % 7 == 6 {
            let line = format!("garbage line {seq}");
            leftovers.push(line.clone());
            line
        } else if seq % 5 == 4 {
            cp += 1;
            cp_line(seq)
        } else {
            hw += 1;
            hw_line(seq)
        };
        content.push_str(&line);
        content.push('\n');
    }

    (content, hw, cp, leftovers)
}

/// 小分块、多 worker 的测试配置
#[allow(dead_code)]
pub fn test_config(chunk_size: u64, workers: usize, threads: usize) -> PipelineConfig {
    PipelineConfig {
        chunk_size,
        max_workers: workers,
        max_threads: threads,
        preserve_intermediate: false,
        failure_policy: FailurePolicy::FailFast,
        ..PipelineConfig::default()
    }
}
