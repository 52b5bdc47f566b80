//! 输出目录布局
//!
//! ```text
//! <out>/
//!   .0_split/chunk_<id><ext>
//!   .1_parsed/<variant>/chunk_<id>.<variant>.records
//!   .1_parsed/<variant>/chunk_<id>.<variant>.keys
//!   .1_parsed/na/chunk_<id>.na<ext>
//!   .2_tabularized/<variant>/chunk_<id>.<variant>.tsv
//!   <stem>.<variant>.tsv
//!   <stem>.na<ext>
//! ```
//!
//! 所有分块产物按 (分块编号, 变体) 定址，不同任务永远不会写同一路径。

use crate::error::{FwlogError, Result};
use crate::fwlog::LEFTOVER_NAME;
use std::path::{Path, PathBuf};

const SPLIT_DIR: &str = ".0_split";
const PARSED_DIR: &str = ".1_parsed";
const TABULARIZED_DIR: &str = ".2_tabularized";

const RECORDS_EXT: &str = "records";
const KEYS_EXT: &str = "keys";
const TABLE_EXT: &str = "tsv";

/// 一次运行的输出路径集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    stem: String,
    /// 源文件扩展名（含前导 `.`，没有时为空）
    ext: String,
}

impl OutputLayout {
    /// 由源文件路径推导布局；未指定输出目录时使用 `<源文件目录>/<文件名主干>`
    ///
    /// 源文件没有扩展名且未指定输出目录时返回 [`FwlogError::InvalidPipelineState`]。
    pub fn new(source: &Path, out_dir: Option<&Path>) -> Result<Self> {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                FwlogError::pipeline_state(format!(
                    "无法从源文件路径推导文件名: {}",
                    source.display()
                ))
            })?;
        let ext = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let root = match out_dir {
            Some(dir) => dir.to_path_buf(),
            None => {
                // 没有扩展名时默认输出目录与源文件同名
                if ext.is_empty() {
                    return Err(FwlogError::pipeline_state(format!(
                        "源文件没有扩展名，无法推导默认输出目录，请显式指定输出目录: {}",
                        source.display()
                    )));
                }
                source.parent().unwrap_or_else(|| Path::new("")).join(&stem)
            }
        };

        Ok(Self { root, stem, ext })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn split_dir(&self) -> PathBuf {
        self.root.join(SPLIT_DIR)
    }

    pub fn parsed_dir(&self) -> PathBuf {
        self.root.join(PARSED_DIR)
    }

    pub fn tabularized_dir(&self) -> PathBuf {
        self.root.join(TABULARIZED_DIR)
    }

    /// 全部中间产物目录
    pub fn intermediate_dirs(&self) -> [PathBuf; 3] {
        [self.split_dir(), self.parsed_dir(), self.tabularized_dir()]
    }

    pub fn chunk_path(&self, chunk_id: usize) -> PathBuf {
        self.split_dir().join(format!("chunk_{chunk_id}{}", self.ext))
    }

    pub fn parsed_variant_dir(&self, variant: &str) -> PathBuf {
        self.parsed_dir().join(variant)
    }

    pub fn records_path(&self, variant: &str, chunk_id: usize) -> PathBuf {
        self.parsed_variant_dir(variant)
            .join(format!("chunk_{chunk_id}.{variant}.{RECORDS_EXT}"))
    }

    pub fn keys_path(&self, variant: &str, chunk_id: usize) -> PathBuf {
        self.parsed_variant_dir(variant)
            .join(format!("chunk_{chunk_id}.{variant}.{KEYS_EXT}"))
    }

    pub fn leftover_dir(&self) -> PathBuf {
        self.parsed_variant_dir(LEFTOVER_NAME)
    }

    pub fn leftover_chunk_path(&self, chunk_id: usize) -> PathBuf {
        self.leftover_dir()
            .join(format!("chunk_{chunk_id}.{LEFTOVER_NAME}{}", self.ext))
    }

    pub fn table_dir(&self, variant: &str) -> PathBuf {
        self.tabularized_dir().join(variant)
    }

    pub fn table_chunk_path(&self, variant: &str, chunk_id: usize) -> PathBuf {
        self.table_dir(variant)
            .join(format!("chunk_{chunk_id}.{variant}.{TABLE_EXT}"))
    }

    pub fn final_table_path(&self, variant: &str) -> PathBuf {
        self.root.join(format!("{}.{variant}.{TABLE_EXT}", self.stem))
    }

    pub fn final_leftover_path(&self) -> PathBuf {
        self.root.join(format!("{}.{LEFTOVER_NAME}{}", self.stem, self.ext))
    }
}
