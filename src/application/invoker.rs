//! 한 줄을 명령 트리 호출로 실행하는 인보커.

use anyhow::Result;

use crate::application::ports::{CommandTree, ReplOutput};
use crate::domain::command::{CommandOutcome, InvokeError};
use crate::domain::line::tokenize;

/// 명령 트리 호출을 감싸 사용자 오류를 루프 안에 가둔다.
pub struct Invoker<'a, T: CommandTree> {
    pub tree: &'a T,
    pub parent: &'a T::Context,
    pub output: &'a dyn ReplOutput,
}

impl<T: CommandTree> Invoker<'_, T> {
    /// 줄을 실행한다. 사용자 오류와 종료 요청은 여기서 끝나고,
    /// 그 밖의 실패만 `Err`로 돌아간다.
    pub fn invoke(&self, line: &str) -> Result<()> {
        let Some(args) = tokenize(line) else {
            // 따옴표가 깨진 줄은 조용히 버린다.
            tracing::debug!(line, "dropping line with malformed quoting");
            return Ok(());
        };

        match self.run(&args) {
            Ok(CommandOutcome::Normal) => Ok(()),
            Ok(CommandOutcome::ExitRequested(code)) => {
                // 프로세스 수명은 REPL이 관리한다.
                tracing::debug!(code, "swallowed exit request from command");
                Ok(())
            }
            Err(InvokeError::Command(err)) => {
                if err.use_stderr() {
                    self.output.error(err.render());
                } else {
                    self.output.echo(err.render());
                }
                Ok(())
            }
            Err(InvokeError::Other(err)) => Err(err),
        }
    }

    fn run(&self, args: &[String]) -> Result<CommandOutcome, InvokeError> {
        // 컨텍스트는 이 스코프를 벗어나는 모든 경로에서 drop된다.
        let mut ctx = self.tree.make_context(self.parent, args)?;
        self.tree.invoke(&mut ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::domain::command::{CommandError, CommandSpec};

    #[derive(Default)]
    struct Captured {
        echo: Mutex<Vec<String>>,
        error: Mutex<Vec<String>>,
    }

    impl ReplOutput for Captured {
        fn echo(&self, text: &str) {
            self.echo.lock().unwrap().push(text.to_string());
        }

        fn error(&self, text: &str) {
            self.error.lock().unwrap().push(text.to_string());
        }
    }

    struct Ctx {
        args: Vec<String>,
        released: Option<Arc<AtomicUsize>>,
    }

    impl Drop for Ctx {
        fn drop(&mut self) {
            if let Some(released) = &self.released {
                released.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// 첫 토큰으로 동작을 고르는 트리. 해제된 컨텍스트 수를 센다.
    #[derive(Default)]
    struct ScriptTree {
        invoked: Mutex<Vec<Vec<String>>>,
        released: Arc<AtomicUsize>,
    }

    impl CommandTree for ScriptTree {
        type Context = Ctx;

        fn make_context(&self, _: &Ctx, args: &[String]) -> Result<Ctx, InvokeError> {
            if args.first().map(String::as_str) == Some("bad-usage") {
                return Err(CommandError::message("no such option: --nope").into());
            }
            Ok(Ctx {
                args: args.to_vec(),
                released: Some(self.released.clone()),
            })
        }

        fn invoke(&self, ctx: &mut Ctx) -> Result<CommandOutcome, InvokeError> {
            self.invoked.lock().unwrap().push(ctx.args.clone());
            match ctx.args.first().map(String::as_str) {
                Some("fail") => Err(CommandError::message("it failed").into()),
                Some("help") => Err(CommandError::rendered("Usage: app\n", 0, false).into()),
                Some("exit") => Ok(CommandOutcome::ExitRequested(3)),
                Some("bug") => Err(anyhow::anyhow!("handler bug").into()),
                _ => Ok(CommandOutcome::Normal),
            }
        }

        fn describe(&self, _: &[String]) -> Option<CommandSpec> {
            None
        }
    }

    fn invoke(tree: &ScriptTree, output: &Captured, line: &str) -> Result<()> {
        let root = Ctx {
            args: Vec::new(),
            released: None,
        };
        Invoker {
            tree,
            parent: &root,
            output,
        }
        .invoke(line)
    }

    #[test]
    fn runs_tokenized_command_and_releases_context() {
        let tree = ScriptTree::default();
        let output = Captured::default();
        invoke(&tree, &output, r#"list "two words""#).unwrap();

        assert_eq!(
            *tree.invoked.lock().unwrap(),
            vec![vec!["list".to_string(), "two words".to_string()]]
        );
        assert_eq!(tree.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn malformed_quoting_is_silently_dropped() {
        let tree = ScriptTree::default();
        let output = Captured::default();
        invoke(&tree, &output, r#"list "oops"#).unwrap();

        assert!(tree.invoked.lock().unwrap().is_empty());
        assert!(output.error.lock().unwrap().is_empty());
        assert!(output.echo.lock().unwrap().is_empty());
    }

    #[test]
    fn command_errors_are_rendered_and_contained() {
        let tree = ScriptTree::default();
        let output = Captured::default();
        invoke(&tree, &output, "fail").unwrap();
        invoke(&tree, &output, "bad-usage").unwrap();

        assert_eq!(
            *output.error.lock().unwrap(),
            vec![
                "error: it failed\n".to_string(),
                "error: no such option: --nope\n".to_string()
            ]
        );
        // 실패한 호출의 컨텍스트도 해제된다.
        assert_eq!(tree.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn help_display_goes_to_stdout() {
        let tree = ScriptTree::default();
        let output = Captured::default();
        invoke(&tree, &output, "help").unwrap();

        assert_eq!(*output.echo.lock().unwrap(), vec!["Usage: app\n".to_string()]);
        assert!(output.error.lock().unwrap().is_empty());
    }

    #[test]
    fn exit_request_is_swallowed() {
        let tree = ScriptTree::default();
        let output = Captured::default();
        invoke(&tree, &output, "exit").unwrap();
        assert_eq!(tree.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn other_failures_propagate() {
        let tree = ScriptTree::default();
        let output = Captured::default();
        let err = invoke(&tree, &output, "bug").unwrap_err();

        assert_eq!(err.to_string(), "handler bug");
        assert_eq!(tree.released.load(Ordering::SeqCst), 1);
    }
}
