use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 搜索核心的错误类型
///
/// 只有致命错误会离开核心：单个条目的元数据错误在工作线程中被跳过，
/// 从不出现在这里。
#[derive(Debug, Error)]
pub enum FindError {
    /// 搜索根目录不存在或不可读
    #[error("无法访问搜索根目录 {}: {source}", .path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 遍历过程中的致命错误
    #[error("遍历目录失败: {0}")]
    Traversal(#[from] ignore::Error),

    /// 正则引擎拒绝了生成的表达式（仅在超出大小限制时发生）
    #[error("无效的文件名模式: {0}")]
    Pattern(#[from] regex::Error),

    /// 无法识别的搜索类型
    #[error("无效的搜索类型 '{0}' (可选: f, d)")]
    InvalidTypeFilter(String),

    /// 系统无法创建线程
    #[error("无法启动线程 {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    /// 遍历线程未发送完成信号就退出了
    #[error("遍历线程异常退出")]
    WalkerPanicked,

    /// 至少一个过滤线程异常退出
    #[error("过滤线程异常退出")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, FindError>;
