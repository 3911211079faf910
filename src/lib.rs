// 三层架构模块
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;
pub mod error;

// 重新导出主要类型
pub use domain::{Finder, NamePattern, SearchConfig, SearchReport, TraversalErrorPolicy, TypeFilter};
pub use application::{ColorChoice, Config};
pub use infrastructure::{ErrorLogger, Logger, LoggerTrait};
pub use presentation::{format_result, print_results, render_result};
pub use error::{FindError, Result};
