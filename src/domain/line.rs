//! REPL 한 줄 입력의 문법(마커 분류/토큰화).

/// 호스트 쉘로 넘기는 줄의 접두어.
pub const SHELL_ESCAPE_MARKER: char = '!';
/// REPL 내부 명령 줄의 접두어.
pub const INTERNAL_COMMAND_MARKER: char = ':';

/// 비어 있지 않은 한 줄을 처리할 주체.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `!` 이후 나머지 문자열.
    ShellEscape(&'a str),
    /// `:` 이후 나머지 문자열.
    Internal(&'a str),
    /// 명령 트리에 그대로 넘길 원문.
    Invoke(&'a str),
}

impl<'a> LineKind<'a> {
    /// 쉘 이스케이프 → 내부 명령 → 서브커맨드 순서로 분류한다.
    pub fn classify(line: &'a str) -> Self {
        if let Some(rest) = line.strip_prefix(SHELL_ESCAPE_MARKER) {
            return Self::ShellEscape(rest);
        }
        if let Some(rest) = line.strip_prefix(INTERNAL_COMMAND_MARKER) {
            return Self::Internal(rest);
        }
        Self::Invoke(line)
    }
}

/// 따옴표를 인식해 쉘처럼 분리한다.
/// 따옴표가 닫히지 않는 등 형식이 깨지면 `None`.
pub fn tokenize(line: &str) -> Option<Vec<String>> {
    shlex::split(line)
}

/// 마지막 글자가 공백인지 검사한다.
pub fn ends_with_whitespace(text: &str) -> bool {
    text.chars().last().is_some_and(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_in_fixed_priority_order() {
        assert_eq!(LineKind::classify("!echo hi"), LineKind::ShellEscape("echo hi"));
        assert_eq!(LineKind::classify(":help"), LineKind::Internal("help"));
        assert_eq!(LineKind::classify("db migrate"), LineKind::Invoke("db migrate"));
        // 첫 글자만 본다.
        assert_eq!(LineKind::classify("!:q"), LineKind::ShellEscape(":q"));
        assert_eq!(LineKind::classify(":!ls"), LineKind::Internal("!ls"));
        assert_eq!(LineKind::classify(" !ls"), LineKind::Invoke(" !ls"));
    }

    #[test]
    fn tokenize_respects_quotes() {
        assert_eq!(
            tokenize(r#"echo "hello world" 'a b'"#),
            Some(vec![
                "echo".to_string(),
                "hello world".to_string(),
                "a b".to_string()
            ])
        );
        assert_eq!(tokenize(""), Some(Vec::new()));
    }

    #[test]
    fn tokenize_rejects_unterminated_quote() {
        assert_eq!(tokenize(r#"echo "oops"#), None);
        assert_eq!(tokenize("echo 'oops"), None);
    }

    #[test]
    fn trailing_whitespace_detection() {
        assert!(ends_with_whitespace("db "));
        assert!(ends_with_whitespace("db\t"));
        assert!(!ends_with_whitespace("db"));
        assert!(!ends_with_whitespace(""));
    }
}
