use std::ffi::OsStr;
use std::fmt;
use std::fs::Metadata;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::pattern::NamePattern;
use crate::error::FindError;

/// 搜索的条目类型，每次搜索只有一个
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    File,
    Directory,
}

impl TypeFilter {
    /// 条目类型是否符合要求
    pub fn accepts(self, is_dir: bool) -> bool {
        match self {
            TypeFilter::File => !is_dir,
            TypeFilter::Directory => is_dir,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = FindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f" | "file" => Ok(TypeFilter::File),
            "d" | "dir" | "directory" => Ok(TypeFilter::Directory),
            other => Err(FindError::InvalidTypeFilter(other.to_string())),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::File => f.write_str("文件"),
            TypeFilter::Directory => f.write_str("目录"),
        }
    }
}

/// 把路径拆成目录部分和最后一个组成部分
///
/// 最后一部分可以是 `..`、`.` 或根目录本身；目录部分为空表示没有目录。
pub fn split_base_name(path: &Path) -> (&Path, &OsStr) {
    let mut components = path.components();
    match components.next_back() {
        Some(last) => (components.as_path(), last.as_os_str()),
        None => (Path::new(""), OsStr::new("")),
    }
}

/// 路径的最后一个组成部分
pub fn base_name(path: &Path) -> &OsStr {
    split_base_name(path).1
}

/// 条目过滤器：类型检查加文件名匹配
#[derive(Debug, Clone)]
pub struct EntryFilter {
    type_filter: TypeFilter,
    pattern: Option<NamePattern>,
}

impl EntryFilter {
    pub fn new(type_filter: TypeFilter, pattern: Option<NamePattern>) -> Self {
        Self { type_filter, pattern }
    }

    /// 根据条目类型和文件名决定是否接受
    pub fn accepts(&self, is_dir: bool, name: impl AsRef<OsStr>) -> bool {
        if !self.type_filter.accepts(is_dir) {
            return false;
        }

        self.pattern
            .as_ref()
            .map_or(true, |pattern| pattern.is_match(name))
    }

    /// 使用已获取的元数据检查路径
    pub fn accepts_metadata(&self, path: &Path, metadata: &Metadata) -> bool {
        self.accepts(metadata.is_dir(), base_name(path))
    }
}
