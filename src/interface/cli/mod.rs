//! CLI 인터페이스 모듈 묶음.
//! 명령 트리 정의/REPL 진입점/조립을 한 네임스페이스로 관리한다.

pub mod command;
pub mod composition;
pub mod repl;

pub use command::{REPL_COMMAND, ReplArgs, build_cli, build_tree, register_repl};
pub use composition::AppComposition;
pub use repl::{ReplOptions, ReplSetup, async_repl, repl, repl_task};
