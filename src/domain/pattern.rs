use std::ffi::OsStr;

use regex::bytes::{Captures, Regex};

use crate::error::Result;

/// 通配符：匹配任意长度（包括零）的字符序列
pub const WILDCARD: char = '*';

/// 通配符对应的表达式，逐字节匹配，非UTF-8文件名也能匹配
const ANY_SEQUENCE: &str = "(?s-u:.)*";

/// 编译后的文件名模式
///
/// 总是锚定到完整的文件名，不做子串匹配。按字节匹配，所以文件名不必是合法的UTF-8。
#[derive(Debug, Clone)]
pub struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    /// 从通配符模式编译匹配器
    ///
    /// 空模式返回 `None`，表示匹配所有文件名。
    pub fn from_wildcard(pattern: &str) -> Result<Option<Self>> {
        if pattern.is_empty() {
            return Ok(None);
        }

        let regex = Regex::new(&Self::translate(pattern))?;
        Ok(Some(Self { regex }))
    }

    /// 将通配符模式转换为正则表达式
    fn translate(pattern: &str) -> String {
        let mut expr = String::with_capacity(pattern.len() * 2 + 2);
        expr.push('^');
        for c in pattern.chars() {
            if c == WILDCARD {
                expr.push_str(ANY_SEQUENCE);
            } else {
                // 转义其他正则表达式的特殊字符
                let mut buf = [0u8; 4];
                expr.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
        }
        expr.push('$');
        expr
    }

    /// 文件名是否完整匹配
    pub fn is_match(&self, name: impl AsRef<OsStr>) -> bool {
        self.regex.is_match(name.as_ref().as_encoded_bytes())
    }

    /// 用给定的标记包裹文件名中每个不重叠的匹配，返回原始字节
    pub fn highlight(&self, name: impl AsRef<OsStr>, open: &str, close: &str) -> Vec<u8> {
        self.regex
            .replace_all(name.as_ref().as_encoded_bytes(), |caps: &Captures<'_>| {
                [open.as_bytes(), &caps[0], close.as_bytes()].concat()
            })
            .into_owned()
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> NamePattern {
        NamePattern::from_wildcard(pattern).unwrap().unwrap()
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        assert!(NamePattern::from_wildcard("").unwrap().is_none());
    }

    #[test]
    fn test_wildcard_translation() {
        assert_eq!(compile("a*").as_str(), "^a(?s-u:.)*$");
        assert_eq!(compile("*.txt").as_str(), r"^(?s-u:.)*\.txt$");
    }

    #[test]
    fn test_literal_pattern_is_exact_match() {
        let literals = ["a.txt", "foo(1).log", "[x]+y?", "a|b", "^$", r"back\slash", "数据.csv"];
        let candidates = ["a.txt", "aatxt", "a.txt.bak", "xa.txt", "foo(1).log", "foo1.log", "[x]+y?", "xy", "a", "b", "^$", "", "数据.csv"];

        for literal in literals {
            let pattern = compile(literal);
            for candidate in candidates {
                assert_eq!(
                    pattern.is_match(candidate),
                    candidate == literal,
                    "pattern {literal:?} vs {candidate:?}"
                );
            }
            assert!(pattern.is_match(literal));
        }
    }

    #[test]
    fn test_wildcard_matches_any_sequence() {
        let pattern = compile("a*");
        assert!(pattern.is_match("a"));
        assert!(pattern.is_match("a.txt"));
        assert!(pattern.is_match("a\nb"));
        assert!(!pattern.is_match("ba.txt"));

        let pattern = compile("*report*");
        assert!(pattern.is_match("report"));
        assert!(pattern.is_match("2024-report.pdf"));
        assert!(!pattern.is_match("repor"));
    }

    #[test]
    fn test_no_partial_match() {
        let pattern = compile("log");
        assert!(!pattern.is_match("b.log"));
        assert!(!pattern.is_match("logs"));
    }

    #[test]
    fn test_highlight_wraps_whole_name() {
        let pattern = compile("*.rs");
        assert_eq!(pattern.highlight("main.rs", "<", ">"), b"<main.rs>");
        assert_eq!(pattern.highlight("main.go", "<", ">"), b"main.go");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names() {
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"caf\xe9.txt");
        assert!(compile("caf*.txt").is_match(name));
        assert!(compile("*").is_match(name));
        assert!(!compile("café.txt").is_match(name));
        assert_eq!(compile("*.txt").highlight(name, "<", ">"), b"<caf\xe9.txt>");
    }
}
