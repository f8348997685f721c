//! 자동완성 후보 값 객체.

/// 자동완성 후보 하나.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// 삽입할 문자열
    pub text: String,
    /// 커서 기준 치환 시작 위치(음수). `-3`이면 직전 3글자를 바꾼다.
    pub start_position: isize,
    /// 메뉴에 함께 표시할 설명
    pub display_meta: Option<String>,
}

impl Completion {
    pub fn new(text: impl Into<String>, start_position: isize, display_meta: Option<String>) -> Self {
        Self {
            text: text.into(),
            start_position,
            display_meta,
        }
    }

    /// 치환 대상 글자 수.
    pub fn replace_len(&self) -> usize {
        self.start_position.unsigned_abs()
    }

    /// `before_cursor`(커서 앞 문자열)에 후보를 적용한 결과를 돌려준다.
    pub fn apply_to(&self, before_cursor: &str) -> String {
        let keep = before_cursor
            .chars()
            .count()
            .saturating_sub(self.replace_len());
        let mut out: String = before_cursor.chars().take(keep).collect();
        out.push_str(&self.text);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replaces_only_the_fragment() {
        let c = Completion::new("migrate", -3, None);
        assert_eq!(c.apply_to("db mig"), "db migrate");
    }

    #[test]
    fn apply_with_empty_fragment_appends() {
        let c = Completion::new("--dry-run", 0, Some("preview only".into()));
        assert_eq!(c.apply_to("db migrate "), "db migrate --dry-run");
    }
}
