//! 읽기 → 분류 → 실행 루프.
//!
//! 분류/실행은 [`Dispatcher::accept`] 하나로 공유하고,
//! 줄을 읽는 방식(블로킹/협력적 대기)만 드라이버별로 다르다.

use anyhow::Result;

use crate::application::invoker::Invoker;
use crate::application::ports::{
    AsyncLineReader, CommandTree, LineReader, ReadOutcome, ReplOutput, ShellExecutor,
};
use crate::application::registry::{InternalCommandRegistry, InternalOutcome};
use crate::application::session::Session;
use crate::domain::line::LineKind;

/// 루프 상태. `Reading`에서 시작해 `Done`에서 끝난다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Reading,
    ShellEscape,
    Internal,
    Invoke,
    Done,
}

/// 한 세션의 분류/실행기.
pub struct Dispatcher<'a, T: CommandTree> {
    pub session: Session,
    pub registry: &'a InternalCommandRegistry,
    pub invoker: Invoker<'a, T>,
    pub shell: &'a dyn ShellExecutor,
    pub output: &'a dyn ReplOutput,
}

impl<T: CommandTree> Dispatcher<'_, T> {
    /// 읽기 결과 하나를 처리하고 다음 상태(`Reading` 또는 `Done`)를 돌려준다.
    pub fn accept(&self, read: ReadOutcome) -> Result<LoopState> {
        match read {
            ReadOutcome::Interrupted => Ok(LoopState::Reading),
            ReadOutcome::EndOfInput => Ok(LoopState::Done),
            ReadOutcome::Line(line) if line.is_empty() => {
                // 파이프 리더는 빈 줄을 건너뛰므로, 여기 닿는 빈 줄은 빈 읽기(입력 끝)다.
                if self.session.interactive {
                    Ok(LoopState::Reading)
                } else {
                    Ok(LoopState::Done)
                }
            }
            ReadOutcome::Line(line) => self.dispatch(&line),
        }
    }

    fn dispatch(&self, line: &str) -> Result<LoopState> {
        match LineKind::classify(line) {
            LineKind::ShellEscape(command) => {
                tracing::debug!(state = ?LoopState::ShellEscape, command);
                let status = self.shell.execute(command);
                tracing::debug!(?status, "shell escape finished");
                Ok(LoopState::Reading)
            }
            LineKind::Internal(name) => {
                let name = name.trim();
                tracing::debug!(state = ?LoopState::Internal, name);
                let Some(action) = self.registry.resolve(name) else {
                    return Ok(LoopState::Reading);
                };
                match action() {
                    InternalOutcome::Exit => Ok(LoopState::Done),
                    InternalOutcome::Text(text) => {
                        self.output.echo(&text);
                        Ok(LoopState::Reading)
                    }
                    InternalOutcome::Silent => Ok(LoopState::Reading),
                }
            }
            LineKind::Invoke(line) => {
                tracing::debug!(state = ?LoopState::Invoke, line);
                self.invoker.invoke(line)?;
                Ok(LoopState::Reading)
            }
        }
    }

    /// 블로킹 드라이버.
    pub fn run_blocking(&self, reader: &mut dyn LineReader) -> Result<()> {
        loop {
            let read = reader.read_line()?;
            if self.accept(read)? == LoopState::Done {
                return Ok(());
            }
        }
    }

    /// 협력적 드라이버. 줄을 기다리는 동안 다른 태스크가 실행된다.
    pub async fn run_cooperative(&self, reader: &mut dyn AsyncLineReader) -> Result<()> {
        loop {
            let read = reader.read_line().await?;
            if self.accept(read)? == LoopState::Done {
                return Ok(());
            }
        }
    }
}
