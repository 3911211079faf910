use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use find_names::{
    print_results, ColorChoice, Config, ErrorLogger, Finder, Logger, SearchConfig, TypeFilter,
};

/// 按名称查找文件或目录的命令行工具
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// 要搜索的目录路径
    #[clap(required_unless_present = "write_config")]
    path: Option<PathBuf>,

    /// 文件名匹配模式，* 匹配任意字符序列
    #[clap(long, default_value = "")]
    name: String,

    /// 搜索类型 (f: 文件, d: 目录)
    #[clap(short = 't', long = "type")]
    entry_type: Option<TypeFilter>,

    /// 过滤线程数 (默认使用所有可用CPU)
    #[clap(short = 'j', long)]
    workers: Option<usize>,

    /// 颜色输出
    #[clap(long, value_enum)]
    color: Option<ColorChoice>,

    /// 启用详细日志记录
    #[clap(long)]
    log: bool,

    /// 日志文件目录
    #[clap(long, default_value = ".")]
    log_dir: PathBuf,

    /// 配置文件路径 (默认为程序同级目录下的 find-names.toml)
    #[clap(long)]
    config: Option<PathBuf>,

    /// 将当前生效的配置写入配置文件后退出
    #[clap(long)]
    write_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置文件，命令行参数优先
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };
    let mut config = Config::load_or_default(&config_path)?;
    if let Some(workers) = args.workers {
        config.search.workers = workers;
    }
    if let Some(color) = args.color {
        config.display.color = color;
    }
    config.validate()?;

    if args.write_config {
        config.save_to_file(&config_path)?;
        eprintln!("已写入配置文件: {}", config_path.display());
        return Ok(());
    }

    let root = args.path.context("请指定搜索路径")?;

    let color = config.display.color.resolve(|key| std::env::var(key).ok());
    let search_config = SearchConfig::new(&args.name, args.entry_type.unwrap_or(config.search.default_type))?
        .with_workers(config.worker_count())
        .with_channel_capacity(config.search.channel_capacity)
        .with_error_policy(config.search.on_traversal_error)
        .with_color(color);

    let logger = Arc::new(Logger::new(args.log, &args.log_dir)?);
    let error_logger = Arc::new(ErrorLogger::new(args.log, &args.log_dir)?);
    let finder = Finder::new(search_config)
        .with_logger(logger)
        .with_error_logger(error_logger);

    // 搜索期间在 stderr 显示进度，不是终端时自动隐藏
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    progress.set_message(format!("正在搜索 {}", root.display()));
    progress.enable_steady_tick(Duration::from_millis(100));

    let report = finder.find(&root);
    progress.finish_and_clear();

    let report = report?;
    print_results(&report.matches, finder.config())?;

    Ok(())
}
