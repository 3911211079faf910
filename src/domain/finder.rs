use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;

use super::collector::Collector;
use super::file_walker::{TraversalErrorPolicy, TraversalProducer};
use super::filter::{EntryFilter, TypeFilter};
use super::pattern::NamePattern;
use super::workers::WorkerPool;
use crate::error::{FindError, Result};
use crate::infrastructure::{ErrorLogger, Logger, LoggerTrait};

/// 通道默认容量
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// 一次搜索的全部参数，搜索开始前构造，之后不再修改
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pattern: Option<NamePattern>,
    type_filter: TypeFilter,
    workers: usize,
    color: bool,
    channel_capacity: usize,
    error_policy: TraversalErrorPolicy,
}

impl SearchConfig {
    /// 以默认参数创建：工作线程数等于CPU核心数，不启用颜色
    pub fn new(pattern: &str, type_filter: TypeFilter) -> Result<Self> {
        Ok(Self {
            pattern: NamePattern::from_wildcard(pattern)?,
            type_filter,
            workers: num_cpus::get(),
            color: false,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            error_policy: TraversalErrorPolicy::default(),
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// 容量为 0 时每次传递都要等待对方就绪
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_error_policy(mut self, policy: TraversalErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn pattern(&self) -> Option<&NamePattern> {
        self.pattern.as_ref()
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn entry_filter(&self) -> EntryFilter {
        EntryFilter::new(self.type_filter, self.pattern.clone())
    }
}

/// 搜索结果及统计
#[derive(Debug)]
pub struct SearchReport {
    /// 匹配的路径，顺序取决于过滤线程的竞争
    pub matches: Vec<PathBuf>,
    pub visited: u64,
    /// 因元数据错误跳过的条目数
    pub skipped: u64,
    pub elapsed: Duration,
}

/// 文件查找器：遍历线程 → 过滤线程池 → 收集器
pub struct Finder {
    config: SearchConfig,
    logger: Arc<dyn LoggerTrait>,
    error_logger: Arc<ErrorLogger>,
}

impl Finder {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            logger: Arc::new(Logger::disabled()),
            error_logger: Arc::new(ErrorLogger::disabled()),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn LoggerTrait>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_error_logger(mut self, error_logger: Arc<ErrorLogger>) -> Self {
        self.error_logger = error_logger;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// 在 `root` 下执行搜索
    ///
    /// 遍历出现致命错误时返回该错误，已收集的部分结果被丢弃。
    pub fn find(&self, root: &Path) -> Result<SearchReport> {
        let start_time = Instant::now();
        let capacity = self.config.channel_capacity;

        if self.logger.is_enabled() {
            let _ = self.logger.log_message(&format!(
                "开始搜索: {} | 模式: {} | 类型: {} | 线程数: {}",
                root.display(),
                self.config.pattern().map_or("(全部)", NamePattern::as_str),
                self.config.type_filter,
                self.config.workers,
            ));
        }

        let (paths_tx, paths_rx) = bounded(capacity);
        let (matched_tx, matched_rx) = bounded(capacity);
        let (done_tx, done_rx) = bounded(1);

        let pool = WorkerPool::spawn(
            self.config.workers,
            paths_rx,
            matched_tx,
            Arc::new(self.config.entry_filter()),
            Arc::clone(&self.logger),
            Arc::clone(&self.error_logger),
        )?;

        let walker = TraversalProducer::new(
            root,
            self.config.error_policy,
            Arc::clone(&self.logger),
            Arc::clone(&self.error_logger),
        )
        .spawn(paths_tx, done_tx)?;

        // 收集器返回时释放接收端，阻塞在发送上的线程随之退出
        let collected = Collector::new(done_rx, matched_rx).collect();
        let skipped = pool.join();
        let walker_joined = walker.join();

        let collected = collected?;
        let skipped = skipped?;
        if walker_joined.is_err() {
            return Err(FindError::WalkerPanicked);
        }

        let report = SearchReport {
            matches: collected.matches,
            visited: collected.visited,
            skipped,
            elapsed: start_time.elapsed(),
        };

        if self.logger.is_enabled() {
            let _ = self.logger.finalize(
                report.visited,
                report.matches.len() as u64,
                report.skipped,
                report.elapsed,
            );
        }
        let _ = self.error_logger.finalize();

        Ok(report)
    }
}
