use std::path::PathBuf;

use crossbeam_channel::{never, select, Receiver};

use super::file_walker::WalkSignal;
use crate::error::{FindError, Result};

/// 收集器的输出
#[derive(Debug)]
pub struct Collected {
    /// 按接收顺序排列的匹配路径
    pub matches: Vec<PathBuf>,
    /// 遍历线程报告的条目数
    pub visited: u64,
}

enum Event {
    Walk(std::result::Result<WalkSignal, crossbeam_channel::RecvError>),
    Matched(std::result::Result<PathBuf, crossbeam_channel::RecvError>),
}

/// 在同一个 select 上同时等待完成信号和匹配通道
///
/// 只有同时收到遍历成功信号且匹配通道关闭时才算成功；任何时刻收到遍历错误都立即失败，
/// 因此匹配通道先关闭时迟到的错误也不会丢失。
pub struct Collector {
    done: Receiver<WalkSignal>,
    matched: Receiver<PathBuf>,
}

impl Collector {
    pub fn new(done: Receiver<WalkSignal>, matched: Receiver<PathBuf>) -> Self {
        Self { done, matched }
    }

    pub fn collect(self) -> Result<Collected> {
        let Self { mut done, mut matched } = self;
        let mut matches = Vec::new();
        let mut visited = None;
        let mut stream_closed = false;

        loop {
            if let (Some(visited), true) = (visited, stream_closed) {
                return Ok(Collected { matches, visited });
            }

            let event = select! {
                recv(done) -> signal => Event::Walk(signal),
                recv(matched) -> path => Event::Matched(path),
            };

            match event {
                Event::Walk(Ok(Ok(count))) => {
                    visited = Some(count);
                    // 信号只有一个，之后不再等待
                    done = never();
                }
                Event::Walk(Ok(Err(err))) => return Err(err),
                Event::Walk(Err(_)) => return Err(FindError::WalkerPanicked),
                Event::Matched(Ok(path)) => matches.push(path),
                Event::Matched(Err(_)) => {
                    stream_closed = true;
                    matched = never();
                }
            }
        }
    }
}
