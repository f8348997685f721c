//! 콘솔 출력 포트 구현 어댑터.

use std::io::{self, Write};

use crate::application::ports::ReplOutput;

/// stdout/stderr로 바로 쓰는 출력 어댑터.
pub struct ConsoleOutput;

impl ReplOutput for ConsoleOutput {
    fn echo(&self, text: &str) {
        write_text(&mut io::stdout().lock(), text);
    }

    fn error(&self, text: &str) {
        write_text(&mut io::stderr().lock(), text);
    }
}

// 이미 개행으로 끝나는 텍스트(도움말 등)에는 개행을 덧붙이지 않는다.
fn write_text(out: &mut impl Write, text: &str) {
    let _ = if text.ends_with('\n') {
        write!(out, "{text}")
    } else {
        writeln!(out, "{text}")
    };
    let _ = out.flush();
}
