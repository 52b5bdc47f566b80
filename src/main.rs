use anyhow::{Context, Result};
use clap::Parser;
use fwlog_parser::concurrent::FailurePolicy;
use fwlog_parser::config::Config;
use fwlog_parser::pipeline::FileParser;
use fwlog_parser::utils::format_wall_time;
use std::path::PathBuf;

/// 防火墙日志分块并行解析
#[derive(Debug, Parser)]
#[command(name = "fwlog-cli")]
#[command(version)]
#[command(about = "将华为 / CheckPoint 防火墙日志解析为 TSV 表格")]
struct Cli {
    /// 源日志文件路径
    path: PathBuf,

    /// 输出目录（必须不存在），默认为 `<源文件目录>/<文件名主干>`
    #[arg(short = 'o', long = "out-dir-path")]
    out_dir_path: Option<PathBuf>,

    /// 分块目标字节数
    #[arg(short = 'c', long = "chunk-size")]
    chunk_size: Option<u64>,

    /// 外层并发 worker 数
    #[arg(short = 'p', long = "max-processes")]
    max_processes: Option<usize>,

    /// 每个 worker 内部的线程数
    #[arg(short = 't', long = "max-threads")]
    max_threads: Option<usize>,

    /// 保留中间产物目录
    #[arg(short = 'i', long = "preserve-intermediate-results")]
    preserve_intermediate_results: bool,

    /// 任务失败时继续处理其余分块
    #[arg(long = "best-effort")]
    best_effort: bool,

    /// 日志缺失年份时使用的年份
    #[arg(long = "year")]
    year: Option<i32>,

    /// 解析变体优先级列表，逗号分隔（如 `hw,cp`）
    #[arg(long = "variants", value_delimiter = ',')]
    variants: Option<Vec<String>>,

    /// TOML 配置文件
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

impl Cli {
    /// 读取配置文件（如有）并用命令行参数覆盖
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("读取配置文件失败: {}", path.display()))?,
            None => Config::default(),
        };

        let pipeline = &mut config.pipeline;
        if let Some(chunk_size) = self.chunk_size {
            pipeline.chunk_size = chunk_size;
        }
        if let Some(workers) = self.max_processes {
            pipeline.max_workers = workers;
        }
        if let Some(threads) = self.max_threads {
            pipeline.max_threads = threads;
        }
        if self.preserve_intermediate_results {
            pipeline.preserve_intermediate = true;
        }
        if self.best_effort {
            pipeline.failure_policy = FailurePolicy::BestEffort;
        }
        if let Some(year) = self.year {
            pipeline.fallback_year = year;
        }
        if let Some(variants) = &self.variants {
            pipeline.variants = variants.clone();
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }

        config.validate().context("配置无效")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    #[cfg(feature = "logging")]
    fwlog_parser::logging::init_logging(&config.log).context("日志系统初始化失败")?;

    let parser = FileParser::from_config(config.pipeline).context("初始化解析器失败")?;
    let summary = parser
        .parse_file(&cli.path, cli.out_dir_path.as_deref())
        .with_context(|| format!("解析失败: {}", cli.path.display()))?;

    println!(
        "\n解析完成，共 {} 个分块、{} 行，解析 {} 条记录，未解析 {} 行，耗时 {}。",
        summary.chunks,
        summary.lines,
        summary.total_records(),
        summary.leftovers,
        format_wall_time(summary.elapsed)
    );
    for (variant, path) in &summary.tables {
        println!("  {variant}: {}", path.display());
    }
    println!("  na: {}", summary.leftover_path.display());

    if !summary.is_complete() {
        eprintln!("\n{} 个任务失败（中间产物已保留）:", summary.failures.len());
        for failure in &summary.failures {
            eprintln!("  {failure}");
        }
    }
    Ok(())
}
