//! repltree library root.
//! 명령 트리 위에 대화형 쉘을 얹는 계층(domain/application/infrastructure/interface)을 외부에 노출한다.

use anyhow::Result;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;

pub use application::ports::{CommandTree, CompletionProvider, LineReader, ReadOutcome};
pub use application::registry::{InternalCommandRegistry, InternalOutcome, RegistryBuilder};
pub use domain::command::{CommandError, CommandOutcome, InvokeError};
pub use interface::cli::{ReplSetup, async_repl, register_repl, repl, repl_task};

/// 설정 점검 JSON 출력용 함수.
pub fn inspect_config_pretty_json() -> Result<String> {
    infrastructure::config::inspect_pretty_json()
}
