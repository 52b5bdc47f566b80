//! 拆分阶段的集成测试

mod common;

use common::{create_test_log, test_config};
use fwlog_parser::pipeline::{OutputLayout, PipelineContext, plan_chunks, split_file, write_chunk};
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn reassemble(dir: &TempDir, source: &std::path::Path, chunk_size: u64) -> Vec<u8> {
    let spans = plan_chunks(source, chunk_size).unwrap();
    let mut joined = Vec::new();
    for (index, span) in spans.iter().enumerate() {
        assert_eq!(span.id, index + 1);
        let dest = dir.path().join(format!("chunk_{}", span.id));
        write_chunk(source, span, &dest).unwrap();

        let bytes = fs::read(&dest).unwrap();
        // 除最后一个分块外都以换行符结尾
        if index + 1 < spans.len() {
            assert_eq!(bytes.last(), Some(&b'\n'));
        }
        assert!(!bytes.is_empty());
        joined.extend(bytes);
    }
    joined
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_split_then_concatenate_is_identity(
        lines in prop::collection::vec("[a-zA-Z0-9 =,;\"]{0,40}", 0..30),
        trailing_newline in any::<bool>(),
        chunk_size in 1u64..128,
    ) {
        let dir = TempDir::new().unwrap();
        let mut content = lines.join("\n");
        if trailing_newline && !content.is_empty() {
            content.push('\n');
        }
        let source = create_test_log(&dir, "source.log", &content);

        let joined = reassemble(&dir, &source, chunk_size);
        prop_assert_eq!(joined, content.into_bytes());
    }
}

#[test]
fn test_chunks_are_at_least_chunk_size_except_last() {
    let dir = TempDir::new().unwrap();
    let content = "0123456789\n".repeat(50);
    let source = create_test_log(&dir, "source.log", &content);

    let spans = plan_chunks(&source, 64).unwrap();
    assert!(spans.len() > 1);
    for span in &spans[..spans.len() - 1] {
        assert!(span.len() >= 64);
        // 向前对齐到行尾：最多多出一行
        assert!(span.len() < 64 + 11);
    }
    assert_eq!(spans.last().unwrap().end, content.len() as u64);
}

#[test]
fn test_split_file_runs_through_executor() {
    let dir = TempDir::new().unwrap();
    let content: String = (0..100).map(|i| format!("line number {i}\n")).collect();
    let source = create_test_log(&dir, "central.log", &content);
    let out = dir.path().join("out");

    let ctx = PipelineContext::new(test_config(100, 3, 2)).unwrap();
    let layout = OutputLayout::new(&source, Some(&out)).unwrap();
    let (chunks, failures) = split_file(&ctx, &source, &layout).unwrap();

    assert!(failures.is_empty());
    assert!(chunks.len() > 5);
    let mut joined = String::new();
    for (index, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.id, index + 1);
        assert_eq!(chunk.path, layout.chunk_path(chunk.id));
        joined.push_str(&fs::read_to_string(&chunk.path).unwrap());
    }
    assert_eq!(joined, content);
}
