//! 비대화형(파이프) stdin 줄 입력 어댑터.
//! 빈 읽기(EOF)만 입력 끝으로 보고, 중간의 빈 줄은 건너뛴다.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::application::ports::{AsyncLineReader, LineReader, ReadOutcome};
use crate::application::session::{EndOfInput, Interrupts};

/// 블로킹 줄 입력. 자동완성/히스토리 없이 원시 줄만 읽는다.
pub struct StdinLineReader<R = io::StdinLock<'static>> {
    input: R,
    end_of_input: EndOfInput,
    interrupts: Interrupts,
}

impl StdinLineReader {
    pub fn stdin(end_of_input: EndOfInput) -> Self {
        Self::new(io::stdin().lock(), end_of_input)
    }
}

impl<R: BufRead> StdinLineReader<R> {
    pub fn new(input: R, end_of_input: EndOfInput) -> Self {
        Self {
            input,
            end_of_input,
            interrupts: Interrupts::new(),
        }
    }

    /// 읽는 동안 들어온 인터럽트를 `Interrupted`로 보고하게 한다.
    pub fn with_interrupts(mut self, interrupts: Interrupts) -> Self {
        self.interrupts = interrupts;
        self
    }
}

impl<R: BufRead> LineReader for StdinLineReader<R> {
    fn read_line(&mut self) -> Result<ReadOutcome> {
        loop {
            if self.end_of_input.is_signaled() {
                return Ok(ReadOutcome::EndOfInput);
            }
            if self.interrupts.take() {
                return Ok(ReadOutcome::Interrupted);
            }

            // `read_line`은 EINTR을 스스로 재시도하므로, Ctrl-C는 핸들러가 남긴 플래그로
            // 다음 읽기에서 보고된다.
            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("failed to read from stdin")?;
            if let Some(outcome) = into_outcome(read, line) {
                return Ok(outcome);
            }
        }
    }
}

/// 협력적 줄 입력. 읽는 동안 다른 태스크가 계속 실행된다.
pub struct AsyncStdinReader<R = BufReader<tokio::io::Stdin>> {
    input: R,
    end_of_input: EndOfInput,
    interrupts: Interrupts,
}

impl AsyncStdinReader {
    pub fn stdin(end_of_input: EndOfInput) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), end_of_input)
    }
}

impl<R: AsyncBufRead + Unpin + Send> AsyncStdinReader<R> {
    pub fn new(input: R, end_of_input: EndOfInput) -> Self {
        Self {
            input,
            end_of_input,
            interrupts: Interrupts::new(),
        }
    }

    /// 읽는 동안 들어온 인터럽트를 `Interrupted`로 보고하게 한다.
    pub fn with_interrupts(mut self, interrupts: Interrupts) -> Self {
        self.interrupts = interrupts;
        self
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> AsyncLineReader for AsyncStdinReader<R> {
    async fn read_line(&mut self) -> Result<ReadOutcome> {
        loop {
            if self.end_of_input.is_signaled() {
                return Ok(ReadOutcome::EndOfInput);
            }

            // 인터럽트로 끊긴 줄의 일부는 버린다.
            let mut line = String::new();
            let read = tokio::select! {
                biased;
                _ = self.end_of_input.wait() => return Ok(ReadOutcome::EndOfInput),
                _ = self.interrupts.wait() => return Ok(ReadOutcome::Interrupted),
                read = self.input.read_line(&mut line) => read.context("failed to read from stdin")?,
            };
            if let Some(outcome) = into_outcome(read, line) {
                return Ok(outcome);
            }
        }
    }
}

/// 빈 읽기는 입력 끝, 빈 줄은 `None`(다음 줄을 읽는다).
fn into_outcome(read: usize, line: String) -> Option<ReadOutcome> {
    if read == 0 {
        return Some(ReadOutcome::EndOfInput);
    }
    let line = trim_newline(line);
    if line.is_empty() {
        tracing::debug!("skipping blank piped line");
        return None;
    }
    Some(ReadOutcome::Line(line))
}

pub(crate) fn trim_newline(mut s: String) -> String {
    while matches!(s.chars().last(), Some('\n' | '\r')) {
        s.pop();
    }
    s
}
