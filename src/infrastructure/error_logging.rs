use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;

/// 错误类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// 无法获取条目元数据
    Metadata,
    /// 遍历子目录失败（按策略跳过）
    Traversal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Metadata => "元数据读取",
            ErrorType::Traversal => "目录遍历",
        }
    }
}

/// 单个条目错误的记录器
///
/// 这些错误不会中断搜索，只写入错误日志并计数。
pub struct ErrorLogger {
    error_file: Mutex<Option<File>>,
    error_counts: Mutex<HashMap<ErrorType, usize>>,
}

impl ErrorLogger {
    pub fn disabled() -> Self {
        Self {
            error_file: Mutex::new(None),
            error_counts: Mutex::new(HashMap::new()),
        }
    }

    /// 创建新的错误日志记录器，日志文件写入 `log_dir`
    pub fn new(enabled: bool, log_dir: &Path) -> Result<Self> {
        if !enabled {
            return Ok(Self::disabled());
        }

        let now = Local::now();
        let error_path = log_dir.join(format!("error_{}.log", now.format("%Y%m%d_%H%M%S")));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&error_path)
            .with_context(|| format!("无法创建错误日志文件: {}", error_path.display()))?;

        file.write_all(&[0xEF, 0xBB, 0xBF])?; // UTF-8 BOM
        writeln!(file, "# find-names 错误日志")?;
        writeln!(file, "# 开始时间: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file, "# ============================================")?;
        writeln!(file)?;

        Ok(Self {
            error_file: Mutex::new(Some(file)),
            error_counts: Mutex::new(HashMap::new()),
        })
    }

    /// 记录错误
    pub fn log_error(&self, error_type: ErrorType, path: Option<&Path>, message: &str) -> Result<()> {
        if let Ok(mut counts) = self.error_counts.lock() {
            *counts.entry(error_type).or_insert(0) += 1;
        }

        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                writeln!(file, "[{}] {} - {}", timestamp, error_type.as_str(), message)?;

                if let Some(path) = path {
                    writeln!(file, "  路径: {}", path.display())?;
                }

                writeln!(file)?;
                file.flush()?;
            }
        }

        Ok(())
    }

    /// 获取错误统计信息
    pub fn get_error_summary(&self) -> HashMap<ErrorType, usize> {
        self.error_counts
            .lock()
            .map(|counts| counts.clone())
            .unwrap_or_default()
    }

    /// 获取总错误数
    pub fn get_total_errors(&self) -> usize {
        self.error_counts
            .lock()
            .map_or(0, |counts| counts.values().sum())
    }

    /// 完成错误日志记录
    pub fn finalize(&self) -> Result<()> {
        let summary = self.get_error_summary();
        let total = self.get_total_errors();

        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "# ============================================")?;
                writeln!(file, "# 结束时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;

                if summary.is_empty() {
                    writeln!(file, "# 无错误记录")?;
                } else {
                    writeln!(file, "# 错误统计:")?;
                    for (error_type, count) in &summary {
                        writeln!(file, "#   {}: {} 次", error_type.as_str(), count)?;
                    }
                    writeln!(file, "#   总计: {} 个错误", total)?;
                }

                file.flush()?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_error_logger_creation() {
        let temp_dir = tempdir().unwrap();
        let logger = ErrorLogger::new(false, temp_dir.path()).unwrap();
        assert_eq!(logger.get_total_errors(), 0);
    }

    #[test]
    fn test_error_logging() {
        let temp_dir = tempdir().unwrap();
        let logger = ErrorLogger::new(true, temp_dir.path()).unwrap();

        logger
            .log_error(ErrorType::Metadata, Some(Path::new("/test/path")), "测试错误")
            .unwrap();
        logger.log_error(ErrorType::Traversal, None, "权限不足").unwrap();
        logger.log_error(ErrorType::Metadata, None, "条目已删除").unwrap();
        logger.finalize().unwrap();

        assert_eq!(logger.get_total_errors(), 3);
        let summary = logger.get_error_summary();
        assert_eq!(summary.get(&ErrorType::Metadata), Some(&2));
        assert_eq!(summary.get(&ErrorType::Traversal), Some(&1));
    }

    #[test]
    fn test_disabled_logger_still_counts() {
        let logger = ErrorLogger::disabled();
        logger.log_error(ErrorType::Metadata, None, "x").unwrap();
        assert_eq!(logger.get_total_errors(), 1);
    }

    #[test]
    fn test_error_types() {
        assert_eq!(ErrorType::Metadata.as_str(), "元数据读取");
        assert_eq!(ErrorType::Traversal.as_str(), "目录遍历");
    }
}
