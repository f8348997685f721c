//! 애플리케이션 조립(composition root) 모듈.

use std::sync::Arc;

use anyhow::Result;

use crate::application::config::Config;
use crate::application::ports::{CommandTree, ReplOutput};
use crate::application::registry::{InternalCommandRegistry, RegistryBuilder};
use crate::domain::command::{CommandOutcome, InvokeError};
use crate::infrastructure::adapters::{ConsoleOutput, SystemShell};
use crate::infrastructure::clap_tree::{ClapCommandTree, ClapContext};
use crate::infrastructure::config;
use crate::interface::cli::command::build_tree;
use crate::interface::cli::repl::{ReplOptions, ReplSetup};

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
pub struct AppComposition {
    config: Config,
    output: Arc<ConsoleOutput>,
    shell: SystemShell,
    tree: Arc<ClapCommandTree>,
    root: ClapContext,
    registry: Arc<InternalCommandRegistry>,
}

impl AppComposition {
    /// 병합된 사용자 설정으로 조립한다.
    pub fn load() -> Result<Self> {
        Self::new(config::load()?)
    }

    pub fn new(config: Config) -> Result<Self> {
        let output = Arc::new(ConsoleOutput);
        let tree = Arc::new(build_tree(output.clone()));
        let root = tree.root_context();
        let shell = SystemShell::new(config.shell.command_spec());

        let mut registry = RegistryBuilder::new();
        registry.register(
            ["version"],
            || format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            Some("shows the version"),
        )?;

        Ok(Self {
            config,
            output,
            shell,
            tree,
            root,
            registry: registry.build(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 설정값과 종료 신호로 REPL 세션 구성을 만든다.
    pub fn repl_setup(&self) -> ReplSetup<'_, ClapCommandTree> {
        ReplSetup {
            tree: self.tree.clone(),
            parent: &self.root,
            registry: &self.registry,
            shell: &self.shell,
            output: self.output.as_ref(),
            options: ReplOptions::from_config(&self.config),
        }
    }

    /// 한 번의 명령줄 호출을 실행하고 프로세스 종료 코드를 돌려준다.
    pub fn run_command(&self, args: &[String]) -> Result<i32> {
        let result = self
            .tree
            .make_context(&self.root, args)
            .and_then(|mut ctx| self.tree.invoke(&mut ctx));

        match result {
            Ok(CommandOutcome::Normal) => Ok(0),
            Ok(CommandOutcome::ExitRequested(code)) => Ok(code),
            Err(InvokeError::Command(err)) => {
                if err.use_stderr() {
                    self.output.error(err.render());
                } else {
                    self.output.echo(err.render());
                }
                Ok(err.exit_code())
            }
            Err(InvokeError::Other(err)) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_registered_next_to_builtins() {
        let composition = AppComposition::new(Config::default()).unwrap();
        let setup = composition.repl_setup();

        let help = setup.registry.help_text();
        assert!(help.contains(":version"));
        assert!(help.contains(":exit, :q, :quit"));
        assert!(setup.registry.resolve("version").is_some());
    }

    #[test]
    fn run_command_maps_outcomes_to_exit_codes() {
        let composition = AppComposition::new(Config::default()).unwrap();
        assert_eq!(composition.run_command(&["db".into(), "status".into()]).unwrap(), 0);
        assert_eq!(composition.run_command(&["fail".into()]).unwrap(), 1);
        assert_eq!(composition.run_command(&["nope".into()]).unwrap(), 2);
    }
}
