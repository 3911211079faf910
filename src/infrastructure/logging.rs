use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;

/// 日志记录器trait
pub trait LoggerTrait: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn log_message(&self, message: &str) -> Result<()>;
    fn log_entry(&self, path: &Path, status: &str) -> Result<()>;
    fn finalize(&self, visited: u64, matched: u64, skipped: u64, duration: Duration) -> Result<()>;
}

/// 调试日志记录器（搜索参数、匹配条目和搜索摘要）
pub struct Logger {
    log_file: Mutex<Option<File>>,
}

impl Logger {
    /// 不写任何文件的记录器
    pub fn disabled() -> Self {
        Self {
            log_file: Mutex::new(None),
        }
    }

    /// 创建新的日志记录器，日志文件写入 `log_dir`
    pub fn new(enabled: bool, log_dir: &Path) -> Result<Self> {
        if !enabled {
            return Ok(Self::disabled());
        }

        let now = Local::now();
        let log_path = log_dir.join(format!("debug_{}.log", now.format("%Y%m%d_%H%M%S")));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("无法创建日志文件: {}", log_path.display()))?;

        // 写入UTF-8 BOM以确保文件被正确识别为UTF-8
        file.write_all(&[0xEF, 0xBB, 0xBF])?;
        writeln!(file, "# find-names 调试日志")?;
        writeln!(file, "# 开始时间: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file, "# --------------------------------------------")?;

        Ok(Self {
            log_file: Mutex::new(Some(file)),
        })
    }

    fn write_line(&self, line: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        if let Ok(mut file_guard) = self.log_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "[{}] {}", timestamp, line)?;
                file.flush()?;
            }
        }

        Ok(())
    }
}

impl LoggerTrait for Logger {
    fn is_enabled(&self) -> bool {
        self.log_file.lock().map_or(false, |file| file.is_some())
    }

    fn log_message(&self, message: &str) -> Result<()> {
        self.write_line(message)
    }

    fn log_entry(&self, path: &Path, status: &str) -> Result<()> {
        self.write_line(&format!("条目: {} | 状态: {}", path.display(), status))
    }

    fn finalize(&self, visited: u64, matched: u64, skipped: u64, duration: Duration) -> Result<()> {
        if let Ok(mut file_guard) = self.log_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "# --------------------------------------------")?;
                writeln!(file, "# 搜索完成时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
                writeln!(file, "# 总用时: {:.3}秒", duration.as_secs_f64())?;
                writeln!(file, "# 遍历条目数: {}", visited)?;
                writeln!(file, "# 匹配条目数: {}", matched)?;
                writeln!(file, "# 跳过条目数: {}", skipped)?;
                writeln!(file, "# ============================================")?;
                file.flush()?;
            }
        }

        Ok(())
    }
}
