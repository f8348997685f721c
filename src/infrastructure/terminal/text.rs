//! 터미널 표시 폭 계산/자르기 유틸리티.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

// unicode-width 크레이트를 사용하여 정확한 터미널 표시 폭을 계산한다.
pub(crate) fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

pub(crate) fn char_display_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// 폭을 넘으면 앞쪽을 `...`로 줄여 끝부분을 보여준다.
pub(crate) fn tail_with_ellipsis_display(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(text) <= max_width {
        return text.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let target = max_width - 3;
    let mut tail_rev = String::new();
    let mut used = 0usize;
    for ch in text.chars().rev() {
        let cw = char_display_width(ch);
        if used + cw > target {
            break;
        }
        tail_rev.push(ch);
        used += cw;
    }

    let tail: String = tail_rev.chars().rev().collect();
    format!("...{tail}")
}

/// 폭을 넘으면 뒤쪽을 `...`로 자른다.
pub(crate) fn clip_line_display(line: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(line) <= max_width {
        return line.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let mut out = String::new();
    let mut used = 0usize;
    let cap = max_width - 3;
    for ch in line.chars() {
        let cw = char_display_width(ch);
        if used + cw > cap {
            break;
        }
        out.push(ch);
        used += cw;
    }
    out.push_str("...");
    out
}

pub(crate) fn pad_line_display(line: &str, width: usize) -> String {
    let mut out = line.to_string();
    let used = display_width(line);
    if used < width {
        out.push_str(&" ".repeat(width - used));
    }
    out
}

pub(crate) fn byte_index_at_char(input: &str, char_idx: usize) -> usize {
    input
        .char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}
