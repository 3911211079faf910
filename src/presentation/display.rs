use std::io::{self, Write};
use std::path::{is_separator, Path, PathBuf};

use anyhow::Result;

use crate::domain::filter::split_base_name;
use crate::domain::{SearchConfig, TypeFilter};

// ANSI 颜色转义序列
pub const COLOR_RED: &str = "\x1b[31m";
pub const COLOR_GREEN: &str = "\x1b[32m";
pub const COLOR_RESET: &str = "\x1b[0m";

/// 格式化匹配结果，返回原始字节，非UTF-8的文件名保持不变
///
/// 只扫描文件名部分。匹配用红色包裹，目录的整个文件名再用绿色包裹，
/// 两者都只在启用颜色时生效。没有可高亮的内容时原样返回路径。
pub fn render_result(path: &Path, config: &SearchConfig) -> Vec<u8> {
    let mark_dir = config.color() && config.type_filter() == TypeFilter::Directory;
    if config.pattern().is_none() && !mark_dir {
        return path.as_os_str().as_encoded_bytes().to_vec();
    }

    let (dir, base) = split_base_name(path);
    let mut highlighted = match config.pattern() {
        Some(pattern) if config.color() => pattern.highlight(base, COLOR_RED, COLOR_RESET),
        _ => base.as_encoded_bytes().to_vec(),
    };

    // 如果是目录，使用绿色显示
    if mark_dir {
        highlighted = [COLOR_GREEN.as_bytes(), &highlighted, COLOR_RESET.as_bytes()].concat();
    }

    // 组合完整路径，当前目录省略
    let dir = dir.as_os_str().as_encoded_bytes();
    if dir.is_empty() || dir == b"." {
        return highlighted;
    }

    let mut rendered = Vec::with_capacity(dir.len() + 1 + highlighted.len());
    rendered.extend_from_slice(dir);
    if !dir.last().map_or(false, |&b| is_separator(char::from(b))) {
        rendered.extend_from_slice(std::path::MAIN_SEPARATOR_STR.as_bytes());
    }
    rendered.extend_from_slice(&highlighted);
    rendered
}

/// 格式化为字符串，非UTF-8字节会被替换
pub fn format_result(path: &Path, config: &SearchConfig) -> String {
    String::from_utf8_lossy(&render_result(path, config)).into_owned()
}

/// 输出全部结果，每行一个，没有摘要
pub fn print_results(results: &[PathBuf], config: &SearchConfig) -> Result<()> {
    let mut stdout = io::stdout().lock();

    for path in results {
        stdout.write_all(&render_result(path, config))?;
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;

    Ok(())
}
