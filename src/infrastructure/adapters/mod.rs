//! 애플리케이션 포트를 실제 인프라 구현체로 연결하는 어댑터 계층.

mod console_output;
mod shell_executor;
mod sigint;
mod stdin_reader;

pub use console_output::ConsoleOutput;
pub use shell_executor::SystemShell;
pub use sigint::sigint_interrupts;
pub use stdin_reader::{AsyncStdinReader, StdinLineReader};

pub(crate) use stdin_reader::trim_newline;
