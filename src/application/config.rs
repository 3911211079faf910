use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::finder::DEFAULT_CHANNEL_CAPACITY;
use crate::domain::{TraversalErrorPolicy, TypeFilter};

/// 应用程序配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 搜索相关配置
    pub search: SearchSettings,
    /// 显示相关配置
    pub display: DisplaySettings,
}

/// 搜索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// 未指定 --type 时的搜索类型
    pub default_type: TypeFilter,
    /// 过滤线程数，0 表示使用CPU核心数
    pub workers: usize,
    /// 路径通道和结果通道的容量
    pub channel_capacity: usize,
    /// 子目录遍历出错时跳过还是终止
    pub on_traversal_error: TraversalErrorPolicy,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_type: TypeFilter::File,
            workers: 0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            on_traversal_error: TraversalErrorPolicy::Skip,
        }
    }
}

/// 显示配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub color: ColorChoice,
}

/// 是否输出颜色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// 根据环境变量判断
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// 解析为是否启用颜色
    ///
    /// `auto` 时 `TERM=dumb` 或设置了非空的 `NO_COLOR` 会禁用颜色。
    pub fn resolve<F>(self, env: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                let dumb = env("TERM").map_or(false, |term| term == "dumb");
                let no_color = env("NO_COLOR").map_or(false, |value| !value.is_empty());
                !dumb && !no_color
            }
        }
    }
}

impl Config {
    /// 配置文件存在时加载，否则使用默认配置
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// 从文件加载配置
    pub fn load_from_file(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("无法读取配置文件: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", config_path.display()))?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, config_path: &Path) -> Result<()> {
        // 确保目录存在
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("无法序列化配置")?;

        fs::write(config_path, content)
            .with_context(|| format!("无法写入配置文件: {}", config_path.display()))?;

        Ok(())
    }

    /// 获取配置文件的默认路径
    pub fn default_config_path() -> Result<PathBuf> {
        // 尝试获取程序所在目录
        let exe_path = std::env::current_exe().context("无法获取程序路径")?;

        let exe_dir = exe_path.parent().context("无法获取程序目录")?;

        Ok(exe_dir.join("find-names.toml"))
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.search.workers > 1024 {
            anyhow::bail!("workers 不能超过 1024");
        }

        if self.search.channel_capacity > 65536 {
            anyhow::bail!("channel_capacity 不能超过 65536");
        }

        Ok(())
    }

    /// 实际使用的过滤线程数
    pub fn worker_count(&self) -> usize {
        match self.search.workers {
            0 => num_cpus::get(),
            n => n,
        }
    }
}
