//! 대화형 쉘(REPL) 진입점.
//! 블로킹(`repl`)과 협력적(`repl_task`, `async_repl`) 두 방식으로 같은 루프를 돌린다.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::completer::TreeCompleter;
use crate::application::config::Config;
use crate::application::dispatch::Dispatcher;
use crate::application::invoker::Invoker;
use crate::application::ports::{
    AsyncLineReader, CommandTree, CompletionProvider, LineReader, ReplOutput, ShellExecutor,
};
use crate::application::registry::InternalCommandRegistry;
use crate::application::session::{EndOfInput, Interrupts, Session};
use crate::infrastructure::adapters::{AsyncStdinReader, StdinLineReader, sigint_interrupts};
use crate::infrastructure::terminal::{AsyncTerminalReader, History, TerminalLineEditor};

/// 줄 편집기와 세션 종료에 관한 설정.
#[derive(Clone)]
pub struct ReplOptions {
    pub prompt: String,
    pub history_limit: usize,
    pub completion_rows: usize,
    pub end_of_input: EndOfInput,
}

impl ReplOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            prompt: config.prompt(),
            history_limit: config.history_limit(),
            completion_rows: config.completion_rows(),
            end_of_input: EndOfInput::new(),
        }
    }
}

/// REPL 한 세션에 필요한 협력자 묶음.
pub struct ReplSetup<'a, T: CommandTree> {
    pub tree: Arc<T>,
    /// 줄마다 만들어지는 호출 컨텍스트의 부모
    pub parent: &'a T::Context,
    pub registry: &'a InternalCommandRegistry,
    pub shell: &'a dyn ShellExecutor,
    pub output: &'a dyn ReplOutput,
    pub options: ReplOptions,
}

impl<T> ReplSetup<'_, T>
where
    T: CommandTree + Send + Sync + 'static,
{
    pub fn dispatcher(&self, session: Session) -> Dispatcher<'_, T> {
        Dispatcher {
            session,
            registry: self.registry,
            invoker: Invoker {
                tree: self.tree.as_ref(),
                parent: self.parent,
                output: self.output,
            },
            shell: self.shell,
            output: self.output,
        }
    }

    /// 대화형 세션에만 자동완성을 붙인다. 파이프 입력은 원시 줄만 읽는다.
    fn completer(&self, session: Session) -> Option<Arc<dyn CompletionProvider>> {
        if !session.interactive {
            return None;
        }
        Some(Arc::new(TreeCompleter::new(self.tree.clone())))
    }

    fn editor(
        &self,
        completer: Arc<dyn CompletionProvider>,
        interrupts: Interrupts,
    ) -> TerminalLineEditor {
        TerminalLineEditor::new(
            self.options.prompt.clone(),
            completer,
            History::new(self.options.history_limit),
            self.options.completion_rows,
            self.options.end_of_input.clone(),
        )
        .with_interrupts(interrupts)
    }

    fn reader(&self, session: Session, interrupts: Interrupts) -> Box<dyn LineReader> {
        match self.completer(session) {
            Some(completer) => Box::new(self.editor(completer, interrupts)),
            None => Box::new(
                StdinLineReader::stdin(self.options.end_of_input.clone())
                    .with_interrupts(interrupts),
            ),
        }
    }

    fn async_reader(&self, session: Session, interrupts: Interrupts) -> Box<dyn AsyncLineReader> {
        match self.completer(session) {
            Some(completer) => Box::new(AsyncTerminalReader::new(
                self.editor(completer, interrupts),
            )),
            None => Box::new(
                AsyncStdinReader::stdin(self.options.end_of_input.clone())
                    .with_interrupts(interrupts),
            ),
        }
    }
}

/// 블로킹 방식으로 세션을 끝까지 돌린다.
/// stdin이 터미널이면 히스토리/자동완성 편집기를, 아니면 원시 줄 입력을 쓴다.
pub fn repl<T>(setup: &ReplSetup<'_, T>) -> Result<()>
where
    T: CommandTree + Send + Sync + 'static,
{
    let session = Session::detect();
    tracing::debug!(interactive = session.interactive, "starting blocking repl");

    let mut reader = setup.reader(session, sigint_interrupts());
    setup.dispatcher(session).run_blocking(reader.as_mut())
}

/// 협력적 방식. 줄을 기다리는 동안 같은 런타임의 다른 태스크가 실행된다.
pub async fn repl_task<T>(setup: &ReplSetup<'_, T>) -> Result<()>
where
    T: CommandTree + Send + Sync + 'static,
{
    let session = Session::detect();
    tracing::debug!(interactive = session.interactive, "starting cooperative repl");

    let mut reader = setup.async_reader(session, sigint_interrupts());
    setup
        .dispatcher(session)
        .run_cooperative(reader.as_mut())
        .await
}

/// 비동기 런타임이 없는 호스트용. 새 current-thread 런타임에서 `repl_task`를 돌린다.
pub fn async_repl<T>(setup: &ReplSetup<'_, T>) -> Result<()>
where
    T: CommandTree + Send + Sync + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build the repl runtime")?;
    runtime.block_on(repl_task(setup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ReadOutcome;
    use crate::interface::cli::composition::AppComposition;

    #[test]
    fn options_follow_config_defaults() {
        let options = ReplOptions::from_config(&Config::default());
        assert_eq!(options.prompt, "> ");
        assert_eq!(options.history_limit, 500);
        assert_eq!(options.completion_rows, 8);
        assert!(!options.end_of_input.is_signaled());
    }

    #[test]
    fn piped_session_gets_no_completer() {
        let composition = AppComposition::new(Config::default()).unwrap();
        let setup = composition.repl_setup();

        assert!(setup.completer(Session::new(false)).is_none());

        let completer = setup.completer(Session::new(true)).unwrap();
        let texts: Vec<_> = completer.complete("db mig").map(|c| c.text).collect();
        assert_eq!(texts, ["migrate"]);
    }

    #[test]
    fn piped_reader_honors_end_of_input_and_interrupts() {
        let composition = AppComposition::new(Config::default()).unwrap();
        let setup = composition.repl_setup();
        let interrupts = Interrupts::new();
        let mut reader = setup.reader(Session::new(false), interrupts.clone());

        // 미리 올린 플래그가 stdin을 읽기 전에 보고된다.
        interrupts.raise();
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::Interrupted);
        setup.options.end_of_input.signal();
        assert_eq!(reader.read_line().unwrap(), ReadOutcome::EndOfInput);
    }

    #[tokio::test]
    async fn async_piped_reader_honors_end_of_input_and_interrupts() {
        let composition = AppComposition::new(Config::default()).unwrap();
        let setup = composition.repl_setup();
        let interrupts = Interrupts::new();
        let mut reader = setup.async_reader(Session::new(false), interrupts.clone());

        interrupts.raise();
        assert_eq!(reader.read_line().await.unwrap(), ReadOutcome::Interrupted);
        setup.options.end_of_input.signal();
        assert_eq!(reader.read_line().await.unwrap(), ReadOutcome::EndOfInput);
    }
}
