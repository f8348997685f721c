//! `clap` 명령 트리를 REPL 명령 트리 포트로 연결하는 어댑터.

use std::collections::HashMap;

use anyhow::anyhow;
use clap::{ArgMatches, Command};

use crate::application::ports::CommandTree;
use crate::domain::command::{
    ChildSpec, CommandError, CommandOutcome, CommandSpec, InvokeError, OptionSpec,
};

/// 서브커맨드 경로 하나에 연결되는 실행 함수.
pub type Handler =
    Box<dyn Fn(&mut ClapContext) -> Result<CommandOutcome, InvokeError> + Send + Sync>;

/// 호출 한 번의 실행 컨텍스트. drop 시 등록된 정리 함수가 역순으로 실행된다.
pub struct ClapContext {
    path: Vec<String>,
    parent_path: Option<Vec<String>>,
    matches: ArgMatches,
    on_close: Vec<Box<dyn FnOnce() + Send>>,
}

impl ClapContext {
    /// 선택된 서브커맨드 경로(루트 제외).
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// 부모 컨텍스트의 경로. 루트 컨텍스트는 `None`.
    pub fn parent_path(&self) -> Option<&[String]> {
        self.parent_path.as_deref()
    }

    /// 말단 명령의 파싱 결과.
    pub fn matches(&self) -> &ArgMatches {
        &self.matches
    }

    /// 컨텍스트 해제 시 실행할 정리 함수를 등록한다.
    pub fn call_on_close(&mut self, f: impl FnOnce() + Send + 'static) {
        self.on_close.push(Box::new(f));
    }
}

impl Drop for ClapContext {
    fn drop(&mut self) {
        while let Some(close) = self.on_close.pop() {
            close();
        }
    }
}

/// `clap::Command` + 경로별 핸들러 표.
pub struct ClapCommandTree {
    command: Command,
    handlers: HashMap<Vec<String>, Handler>,
}

impl ClapCommandTree {
    pub fn new(mut command: Command) -> Self {
        // 자동 생성되는 `--help`/`help`까지 포함해 자기 기술이 가능하도록 미리 빌드한다.
        command.build();
        Self {
            command,
            handlers: HashMap::new(),
        }
    }

    /// `path`(예: `["db", "migrate"]`)에 핸들러를 연결한다.
    pub fn handler<F>(mut self, path: &[&str], f: F) -> Self
    where
        F: Fn(&mut ClapContext) -> Result<CommandOutcome, InvokeError> + Send + Sync + 'static,
    {
        let key = path.iter().map(|s| (*s).to_string()).collect();
        self.handlers.insert(key, Box::new(f));
        self
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// REPL이 자식 컨텍스트의 부모로 쓰는 루트 컨텍스트.
    pub fn root_context(&self) -> ClapContext {
        ClapContext {
            path: Vec::new(),
            parent_path: None,
            matches: ArgMatches::default(),
            on_close: Vec::new(),
        }
    }

    fn find(&self, path: &[String]) -> Option<&Command> {
        path.iter()
            .try_fold(&self.command, |current, name| current.find_subcommand(name))
    }
}

impl CommandTree for ClapCommandTree {
    type Context = ClapContext;

    fn make_context(
        &self,
        parent: &ClapContext,
        args: &[String],
    ) -> Result<ClapContext, InvokeError> {
        let argv = std::iter::once(self.command.get_name().to_string()).chain(args.iter().cloned());
        let matches = self
            .command
            .clone()
            .try_get_matches_from(argv)
            .map_err(command_error)?;

        let mut path = Vec::new();
        let mut leaf = &matches;
        while let Some((name, sub)) = leaf.subcommand() {
            path.push(name.to_string());
            leaf = sub;
        }

        Ok(ClapContext {
            path,
            parent_path: Some(parent.path.clone()),
            matches: leaf.clone(),
            on_close: Vec::new(),
        })
    }

    fn invoke(&self, ctx: &mut ClapContext) -> Result<CommandOutcome, InvokeError> {
        if let Some(handler) = self.handlers.get(&ctx.path) {
            return handler(ctx);
        }

        let command = self
            .find(&ctx.path)
            .ok_or_else(|| anyhow!("unknown command path `{}`", ctx.path.join(" ")))?;
        if command.has_subcommands() {
            // 그룹만 입력되면 단독 실행처럼 도움말을 보여준다.
            let help = command.clone().render_help().to_string();
            return Err(CommandError::rendered(help, 0, false).into());
        }

        Err(anyhow!("no handler registered for `{}`", ctx.path.join(" ")).into())
    }

    fn describe(&self, path: &[String]) -> Option<CommandSpec> {
        let mut current = &self.command;
        let mut tokens = path.iter();
        let mut positional_only = false;

        while let Some(token) = tokens.next() {
            if !positional_only && token == "--" {
                positional_only = true;
                continue;
            }
            if !positional_only && token.starts_with('-') && token.len() > 1 {
                // 값을 받는 옵션이면 다음 토큰은 그 값이다.
                if !token.contains('=') && option_takes_value(current, token) {
                    tokens.next();
                }
                continue;
            }
            if !positional_only && let Some(sub) = current.find_subcommand(token) {
                current = sub;
                continue;
            }
            if current.get_positionals().next().is_some() {
                continue;
            }
            return None;
        }

        Some(command_spec(current))
    }
}

fn command_error(err: clap::Error) -> InvokeError {
    CommandError::rendered(err.render().to_string(), err.exit_code(), err.use_stderr()).into()
}

fn option_takes_value(command: &Command, token: &str) -> bool {
    let arg = if let Some(long) = token.strip_prefix("--") {
        command.get_arguments().find(|arg| {
            arg.get_long() == Some(long)
                || arg
                    .get_all_aliases()
                    .is_some_and(|aliases| aliases.contains(&long))
        })
    } else {
        // `-abc` 묶음 표기는 마지막 글자만 값을 받을 수 있다.
        let Some(short) = token.chars().last() else {
            return false;
        };
        if token.chars().count() != 2 {
            return false;
        }
        command.get_arguments().find(|arg| {
            arg.get_short() == Some(short)
                || arg
                    .get_all_short_aliases()
                    .is_some_and(|aliases| aliases.contains(&short))
        })
    };

    arg.is_some_and(|arg| arg.get_action().takes_values())
}

fn command_spec(command: &Command) -> CommandSpec {
    let options = command
        .get_arguments()
        .filter(|arg| !arg.is_positional() && !arg.is_hide_set())
        .map(|arg| {
            let flags = arg
                .get_short()
                .map(|short| format!("-{short}"))
                .into_iter()
                .chain(arg.get_long().map(|long| format!("--{long}")))
                .collect();
            let secondary_flags = arg
                .get_visible_aliases()
                .unwrap_or_default()
                .into_iter()
                .map(|alias| format!("--{alias}"))
                .chain(
                    arg.get_visible_short_aliases()
                        .unwrap_or_default()
                        .into_iter()
                        .map(|alias| format!("-{alias}")),
                )
                .collect();
            OptionSpec {
                flags,
                secondary_flags,
                help: arg.get_help().map(ToString::to_string),
            }
        })
        .collect();

    let children = command.has_subcommands().then(|| {
        command
            .get_subcommands()
            .filter(|sub| !sub.is_hide_set())
            .map(|sub| ChildSpec {
                name: sub.get_name().to_string(),
                short_help: sub.get_about().map(ToString::to_string),
            })
            .collect()
    });

    CommandSpec { options, children }
}
