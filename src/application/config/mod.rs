//! 애플리케이션이 사용하는 설정 스키마(순수 데이터).
//!
//! 주의: 파일/환경변수/프로세스 접근은 `infrastructure`에서만 수행한다.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROMPT: &str = "> ";
pub const DEFAULT_HISTORY_LIMIT: usize = 500;
pub const DEFAULT_COMPLETION_ROWS: usize = 8;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// 대화형 입력 설정
    #[serde(default)]
    pub repl: ReplConfig,
    /// `!` 줄을 실행할 호스트 쉘
    #[serde(default)]
    pub shell: ShellConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ReplConfig {
    /// 프롬프트 문자열
    pub prompt: Option<String>,
    /// 메모리 히스토리 최대 줄 수
    pub history_limit: Option<usize>,
    /// 자동완성 메뉴 최대 행 수
    pub completion_rows: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ShellConfig {
    /// 쉘 실행 파일(기본: unix `sh`, windows `cmd`)
    pub program: Option<String>,
    /// 명령 문자열 앞에 붙는 인자(기본: `-c` / `/C`)
    pub args: Option<Vec<String>>,
}

/// 실행 파일과 인자로 정규화된 쉘 사양.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl Config {
    pub fn prompt(&self) -> String {
        self.repl
            .prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string())
    }

    pub fn history_limit(&self) -> usize {
        self.repl.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    pub fn completion_rows(&self) -> usize {
        self.repl
            .completion_rows
            .unwrap_or(DEFAULT_COMPLETION_ROWS)
            .max(1)
    }

    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub fn merge_from(&mut self, other: Config) {
        self.repl.merge_from(other.repl);
        self.shell.merge_from(other.shell);
    }
}

impl ReplConfig {
    pub fn merge_from(&mut self, other: ReplConfig) {
        if other.prompt.is_some() {
            self.prompt = other.prompt;
        }
        if other.history_limit.is_some() {
            self.history_limit = other.history_limit;
        }
        if other.completion_rows.is_some() {
            self.completion_rows = other.completion_rows;
        }
    }
}

impl ShellConfig {
    /// 플랫폼 기본값을 채운 쉘 사양.
    pub fn command_spec(&self) -> ShellCommandSpec {
        let (default_program, default_args) = if cfg!(windows) {
            ("cmd", vec!["/C".to_string()])
        } else {
            ("sh", vec!["-c".to_string()])
        };

        ShellCommandSpec {
            program: self
                .program
                .clone()
                .unwrap_or_else(|| default_program.to_string()),
            args: self.args.clone().unwrap_or(default_args),
        }
    }

    pub fn merge_from(&mut self, other: ShellConfig) {
        if other.program.is_some() {
            self.program = other.program;
        }
        if other.args.is_some() {
            self.args = other.args;
        }
    }
}
