//! 명령 트리 호출 결과/오류와 자기 기술(introspection) 모델.

use thiserror::Error;

/// 호출이 정상 종료된 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Normal,
    /// 명령이 프로세스 종료를 요청했다. REPL에서는 무시된다.
    ExitRequested(i32),
}

/// 사용자에게 보여줄 명령 오류(검증/사용법 오류, 도움말 출력 포함).
#[derive(Debug, Clone, Error)]
#[error("{}", .rendered.trim_end())]
pub struct CommandError {
    rendered: String,
    exit_code: i32,
    use_stderr: bool,
}

impl CommandError {
    /// 프레임워크가 이미 렌더링한 문자열로 오류를 만든다.
    pub fn rendered(rendered: impl Into<String>, exit_code: i32, use_stderr: bool) -> Self {
        Self {
            rendered: rendered.into(),
            exit_code,
            use_stderr,
        }
    }

    /// 단순 메시지 오류(`error: ...`, 종료 코드 1).
    pub fn message(message: impl AsRef<str>) -> Self {
        Self::rendered(format!("error: {}\n", message.as_ref()), 1, true)
    }

    /// 단독 실행 시와 동일한 출력 문자열.
    pub fn render(&self) -> &str {
        &self.rendered
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// `false`면 도움말처럼 stdout으로 내보낼 출력이다.
    pub fn use_stderr(&self) -> bool {
        self.use_stderr
    }
}

/// 명령 트리 호출 실패.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// 사용자에게 렌더링하고 루프를 계속한다.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// 그 밖의 실패. REPL 경계 밖으로 전파된다.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 명령에 선언된 옵션 하나.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSpec {
    /// 기본 표기(`-v`, `--verbose`)
    pub flags: Vec<String>,
    /// 보조 표기(별칭 등)
    pub secondary_flags: Vec<String>,
    pub help: Option<String>,
}

/// 그룹 명령의 자식 명령.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSpec {
    pub name: String,
    pub short_help: Option<String>,
}

/// 토큰 경로로 찾아간 명령의 자기 기술.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub options: Vec<OptionSpec>,
    /// 그룹이면 `Some`.
    pub children: Option<Vec<ChildSpec>>,
}

impl CommandSpec {
    pub fn is_group(&self) -> bool {
        self.children.is_some()
    }
}
