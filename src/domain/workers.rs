use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use super::filter::EntryFilter;
use crate::error::{FindError, Result};
use crate::infrastructure::{ErrorLogger, ErrorType, LoggerTrait};

/// 固定数量的过滤线程，共享同一个路径通道
///
/// 每个线程持有一个匹配通道发送端的副本，全部线程退出后匹配通道自动关闭，
/// 收集器据此判断没有更多结果。
pub struct WorkerPool {
    handles: Vec<JoinHandle<u64>>,
}

impl WorkerPool {
    /// 启动 `workers` 个过滤线程（至少一个）
    pub fn spawn(
        workers: usize,
        paths: Receiver<PathBuf>,
        matched: Sender<PathBuf>,
        filter: Arc<EntryFilter>,
        logger: Arc<dyn LoggerTrait>,
        error_logger: Arc<ErrorLogger>,
    ) -> Result<Self> {
        let mut handles = Vec::with_capacity(workers.max(1));

        for id in 0..workers.max(1) {
            let name = format!("filter-{}", id);
            let paths = paths.clone();
            let matched = matched.clone();
            let filter = Arc::clone(&filter);
            let logger = Arc::clone(&logger);
            let error_logger = Arc::clone(&error_logger);

            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || run_worker(&paths, &matched, &filter, logger.as_ref(), &error_logger))
                .map_err(|source| FindError::Spawn { name, source })?;
            handles.push(handle);
        }

        Ok(Self { handles })
    }

    /// 等待全部线程结束，返回因元数据错误跳过的条目总数
    pub fn join(self) -> Result<u64> {
        let mut skipped = 0;
        let mut panicked = false;

        for handle in self.handles {
            match handle.join() {
                Ok(count) => skipped += count,
                Err(_) => panicked = true,
            }
        }

        if panicked {
            return Err(FindError::WorkerPanicked);
        }
        Ok(skipped)
    }
}

/// 单个过滤线程：取路径、读取元数据、过滤、转发
fn run_worker(
    paths: &Receiver<PathBuf>,
    matched: &Sender<PathBuf>,
    filter: &EntryFilter,
    logger: &dyn LoggerTrait,
    error_logger: &ErrorLogger,
) -> u64 {
    let mut skipped = 0;

    for path in paths.iter() {
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                // 条目可能在遍历后被删除，或没有权限
                skipped += 1;
                // 日志写入失败不影响搜索
                let _ = error_logger.log_error(ErrorType::Metadata, Some(&path), &err.to_string());
                continue;
            }
        };

        if !filter.accepts_metadata(&path, &metadata) {
            continue;
        }

        if logger.is_enabled() {
            // 同上，忽略日志错误
            let _ = logger.log_entry(&path, "匹配");
        }

        if matched.send(path).is_err() {
            // 收集器已放弃本次搜索
            break;
        }
    }

    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::TypeFilter;
    use crate::domain::pattern::NamePattern;
    use crate::infrastructure::Logger;
    use crossbeam_channel::unbounded;
    use std::fs;
    use tempfile::tempdir;

    fn spawn_pool(workers: usize, filter: EntryFilter) -> (Sender<PathBuf>, Receiver<PathBuf>, WorkerPool) {
        let (paths_tx, paths_rx) = unbounded();
        let (matched_tx, matched_rx) = unbounded();
        let pool = WorkerPool::spawn(
            workers,
            paths_rx,
            matched_tx,
            Arc::new(filter),
            Arc::new(Logger::disabled()),
            Arc::new(ErrorLogger::disabled()),
        )
        .unwrap();
        (paths_tx, matched_rx, pool)
    }

    #[test]
    fn test_workers_filter_and_forward() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), "").unwrap();
        fs::write(root.join("b.log"), "").unwrap();

        let filter = EntryFilter::new(TypeFilter::File, NamePattern::from_wildcard("*.txt").unwrap());
        let (paths_tx, matched_rx, pool) = spawn_pool(4, filter);

        for name in ["", "sub", "a.txt", "b.log"] {
            paths_tx.send(root.join(name)).unwrap();
        }
        drop(paths_tx);

        // 所有线程退出后匹配通道关闭
        let matched: Vec<PathBuf> = matched_rx.iter().collect();
        assert_eq!(matched, vec![root.join("a.txt")]);
        assert_eq!(pool.join().unwrap(), 0);
    }

    #[test]
    fn test_metadata_errors_are_skipped() {
        let temp_dir = tempdir().unwrap();
        let filter = EntryFilter::new(TypeFilter::File, None);
        let (paths_tx, matched_rx, pool) = spawn_pool(2, filter);

        paths_tx.send(temp_dir.path().join("vanished.txt")).unwrap();
        paths_tx.send(temp_dir.path().join("also-gone")).unwrap();
        drop(paths_tx);

        assert_eq!(matched_rx.iter().count(), 0);
        assert_eq!(pool.join().unwrap(), 2);
    }

    #[test]
    fn test_zero_workers_still_runs_one() {
        let temp_dir = tempdir().unwrap();
        let filter = EntryFilter::new(TypeFilter::Directory, None);
        let (paths_tx, matched_rx, pool) = spawn_pool(0, filter);

        paths_tx.send(temp_dir.path().to_path_buf()).unwrap();
        drop(paths_tx);

        assert_eq!(matched_rx.iter().count(), 1);
        pool.join().unwrap();
    }
}
