//! 호스트 쉘 실행 포트 구현 어댑터.

use std::process::Command;

use crate::application::config::ShellCommandSpec;
use crate::application::ports::ShellExecutor;

/// 설정된 쉘(`sh -c`, `cmd /C` 등)로 명령을 실행한다.
/// 출력은 캡처하지 않고 터미널로 그대로 흘려보낸다.
pub struct SystemShell {
    spec: ShellCommandSpec,
}

impl SystemShell {
    pub fn new(spec: ShellCommandSpec) -> Self {
        Self { spec }
    }
}

impl ShellExecutor for SystemShell {
    fn execute(&self, command: &str) -> Option<i32> {
        let status = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .arg(command)
            .status();

        match status {
            Ok(status) => status.code(),
            Err(err) => {
                tracing::warn!(program = %self.spec.program, error = %err, "failed to launch shell");
                None
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh() -> SystemShell {
        SystemShell::new(ShellCommandSpec {
            program: "sh".into(),
            args: vec!["-c".into()],
        })
    }

    #[test]
    fn returns_exit_status() {
        assert_eq!(sh().execute("exit 0"), Some(0));
        assert_eq!(sh().execute("exit 3"), Some(3));
    }

    #[test]
    fn missing_shell_is_none() {
        let shell = SystemShell::new(ShellCommandSpec {
            program: "repltree-no-such-shell".into(),
            args: Vec::new(),
        });
        assert_eq!(shell.execute("true"), None);
    }
}
