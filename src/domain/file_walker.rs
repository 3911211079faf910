use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{FindError, Result};
use crate::infrastructure::{ErrorLogger, ErrorType, LoggerTrait};

/// 遍历结束时发送的完成信号，成功时携带已遍历的条目数
pub type WalkSignal = Result<u64>;

/// 根目录以下的遍历错误如何处理
///
/// 根目录本身的错误总是致命的。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalErrorPolicy {
    /// 记录到错误日志后继续遍历
    #[default]
    Skip,
    /// 第一个错误即终止整个搜索
    Abort,
}

impl TraversalErrorPolicy {
    fn is_fatal(self, err: &ignore::Error) -> bool {
        match self {
            TraversalErrorPolicy::Abort => true,
            TraversalErrorPolicy::Skip => err.depth().map_or(true, |depth| depth == 0),
        }
    }
}

/// 遍历生产者：按遍历顺序把每个访问到的路径（包括根目录）送入路径通道
pub struct TraversalProducer {
    root: PathBuf,
    policy: TraversalErrorPolicy,
    logger: Arc<dyn LoggerTrait>,
    error_logger: Arc<ErrorLogger>,
}

impl TraversalProducer {
    pub fn new(
        root: &Path,
        policy: TraversalErrorPolicy,
        logger: Arc<dyn LoggerTrait>,
        error_logger: Arc<ErrorLogger>,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            policy,
            logger,
            error_logger,
        }
    }

    /// 在独立线程中遍历
    ///
    /// 线程结束前先关闭路径通道（释放 `paths`），再发送完成信号。
    pub fn spawn(self, paths: Sender<PathBuf>, done: Sender<WalkSignal>) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("walker".to_string())
            .spawn(move || {
                let signal = self.walk(&paths);
                drop(paths);
                // 容量为 1，不会阻塞；收集器已退出时忽略
                let _ = done.send(signal);
            })
            .map_err(|source| FindError::Spawn {
                name: "walker".to_string(),
                source,
            })
    }

    /// 遍历目录树，返回已发送的条目数
    ///
    /// 单个子目录的错误是否致命由 `policy` 决定；`ignore` 在报告子目录错误后会继续遍历。
    pub fn walk(&self, paths: &Sender<PathBuf>) -> WalkSignal {
        // 根目录不存在或不可读时立即失败
        std::fs::symlink_metadata(&self.root).map_err(|source| FindError::Root {
            path: self.root.clone(),
            source,
        })?;

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .build();

        let mut visited = 0u64;
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) if self.policy.is_fatal(&err) => return Err(FindError::Traversal(err)),
                Err(err) => {
                    // 日志写入失败不影响搜索
                    let _ = self.error_logger.log_error(ErrorType::Traversal, None, &err.to_string());
                    if self.logger.is_enabled() {
                        let _ = self.logger.log_message(&format!("已跳过遍历错误: {}", err));
                    }
                    continue;
                }
            };

            visited += 1;
            if paths.send(entry.into_path()).is_err() {
                // 所有过滤线程都已退出
                break;
            }
        }

        Ok(visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::Logger;
    use crossbeam_channel::unbounded;
    use std::fs;
    use tempfile::tempdir;

    fn producer(root: &Path, policy: TraversalErrorPolicy) -> TraversalProducer {
        TraversalProducer::new(
            root,
            policy,
            Arc::new(Logger::disabled()),
            Arc::new(ErrorLogger::disabled()),
        )
    }

    #[test]
    fn test_walk_emits_root_and_all_descendants() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("a.txt"), "").unwrap();
        fs::write(root.join(".hidden"), "").unwrap();
        fs::write(root.join(".gitignore"), "*.txt\n").unwrap();
        fs::write(root.join("sub/deeper/b.txt"), "").unwrap();

        let (tx, rx) = unbounded();
        let visited = producer(root, TraversalErrorPolicy::Skip).walk(&tx).unwrap();
        drop(tx);

        let mut emitted: Vec<PathBuf> = rx.iter().collect();
        assert_eq!(visited, emitted.len() as u64);
        assert_eq!(emitted[0], root.to_path_buf());

        emitted.sort();
        let mut expected = vec![
            root.to_path_buf(),
            root.join(".gitignore"),
            root.join(".hidden"),
            root.join("a.txt"),
            root.join("sub"),
            root.join("sub/deeper"),
            root.join("sub/deeper/b.txt"),
        ];
        expected.sort();
        assert_eq!(emitted, expected);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp_dir = tempdir().unwrap();
        let (tx, rx) = unbounded();

        let result = producer(&temp_dir.path().join("missing"), TraversalErrorPolicy::Skip).walk(&tx);
        drop(tx);

        assert!(matches!(result, Err(FindError::Root { .. })));
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn test_spawn_closes_paths_before_signal() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "").unwrap();

        let (paths_tx, paths_rx) = unbounded();
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let handle = producer(temp_dir.path(), TraversalErrorPolicy::Skip)
            .spawn(paths_tx, done_tx)
            .unwrap();

        let visited = done_rx.recv().unwrap().unwrap();
        // 完成信号到达时路径通道已经关闭
        assert_eq!(paths_rx.iter().count() as u64, visited);
        assert_eq!(visited, 2);
        handle.join().unwrap();
    }

    #[test]
    fn test_walk_stops_when_workers_are_gone() {
        let temp_dir = tempdir().unwrap();
        for i in 0..10 {
            fs::write(temp_dir.path().join(format!("{i}.txt")), "").unwrap();
        }

        let (tx, rx) = unbounded();
        drop(rx);
        let visited = producer(temp_dir.path(), TraversalErrorPolicy::Skip).walk(&tx).unwrap();
        assert_eq!(visited, 1);
    }
}
