//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::command::{CommandOutcome, CommandSpec, InvokeError};
use crate::domain::completion::Completion;

/// REPL이 노출하는 명령 트리 프레임워크 포트.
pub trait CommandTree {
    /// 호출 한 번 동안 유지되는 실행 컨텍스트. drop 시점에 해제된다.
    type Context;

    /// 부모 컨텍스트의 자식으로 새 컨텍스트를 만든다.
    fn make_context(&self, parent: &Self::Context, args: &[String])
    -> Result<Self::Context, InvokeError>;

    /// 컨텍스트가 가리키는 명령을 실행한다.
    fn invoke(&self, ctx: &mut Self::Context) -> Result<CommandOutcome, InvokeError>;

    /// 토큰 경로로 도달한 명령의 옵션/자식 목록. 경로가 없으면 `None`.
    fn describe(&self, path: &[String]) -> Option<CommandSpec>;
}

/// 자동완성 후보 공급 포트.
pub trait CompletionProvider: Send + Sync {
    /// 커서 앞 문자열에 대한 후보를 지연 생성한다.
    fn complete<'a>(&'a self, before_cursor: &'a str) -> Box<dyn Iterator<Item = Completion> + 'a>;
}

/// 한 줄 읽기 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// 읽는 도중 인터럽트(Ctrl-C). 현재 줄은 버린다.
    Interrupted,
    EndOfInput,
}

/// 호출 스레드를 막는 줄 입력 포트.
pub trait LineReader {
    fn read_line(&mut self) -> Result<ReadOutcome>;
}

/// 현재 태스크만 양보하는 줄 입력 포트.
#[async_trait]
pub trait AsyncLineReader: Send {
    async fn read_line(&mut self) -> Result<ReadOutcome>;
}

/// 호스트 OS 쉘 실행 포트.
pub trait ShellExecutor: Send + Sync {
    /// 명령을 실행하고 종료 코드를 돌려준다. 실행 자체를 못 하면 `None`.
    fn execute(&self, command: &str) -> Option<i32>;
}

/// 콘솔 출력 추상화 포트.
pub trait ReplOutput: Send + Sync {
    /// 일반 출력(내부 명령 결과, 도움말).
    fn echo(&self, text: &str);
    /// 오류 출력.
    fn error(&self, text: &str);
}
