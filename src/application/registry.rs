//! REPL 내부 명령(`:q`, `:help` 등) 레지스트리.
//!
//! 시작 시 [`RegistryBuilder`]로 한 번 채운 뒤 [`InternalCommandRegistry`]로 고정한다.
//! 고정된 레지스트리는 읽기 전용이라 부분 등록 상태가 관찰되지 않는다.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;
use std::sync::{Arc, Weak};

use thiserror::Error;

use crate::domain::line::{INTERNAL_COMMAND_MARKER, SHELL_ESCAPE_MARKER};

/// 내부 명령 실행 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalOutcome {
    /// 세션 종료 요청
    Exit,
    /// 사용자에게 보여줄 텍스트
    Text(String),
    Silent,
}

impl From<String> for InternalOutcome {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Option<String>> for InternalOutcome {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Silent, Self::Text)
    }
}

impl From<()> for InternalOutcome {
    fn from(_: ()) -> Self {
        Self::Silent
    }
}

/// 인자 없는 내부 명령 동작.
pub type InternalAction = Arc<dyn Fn() -> InternalOutcome + Send + Sync>;

/// 등록 설정 오류.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("internal command needs at least one name")]
    NoNames,
    #[error("invalid internal command name `{0}`")]
    InvalidName(String),
}

#[derive(Clone)]
enum PendingAction {
    Custom(InternalAction),
    Exit,
    Help,
}

/// 시작 시점 전용 등록기. 기본 명령(exit/help)이 미리 들어 있다.
pub struct RegistryBuilder {
    entries: HashMap<String, (PendingAction, Option<String>)>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        let mut builder = Self {
            entries: HashMap::new(),
        };
        builder.insert(&["q", "quit", "exit"], PendingAction::Exit, Some("exits the repl"));
        builder.insert(
            &["?", "h", "help"],
            PendingAction::Help,
            Some("displays general help information"),
        );
        builder
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 하나 이상의 이름으로 동작을 등록한다. 같은 이름은 나중 등록이 덮어쓴다.
    pub fn register<I, S, F, R>(
        &mut self,
        names: I,
        action: F,
        description: Option<&str>,
    ) -> Result<&mut Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<InternalOutcome>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(RegistryError::NoNames);
        }
        if let Some(bad) = names
            .iter()
            .find(|name| name.is_empty() || name.chars().any(char::is_whitespace))
        {
            return Err(RegistryError::InvalidName(bad.clone()));
        }

        let shared: InternalAction = Arc::new(move || -> InternalOutcome { action().into() });
        for name in names {
            if self.entries.contains_key(&name) {
                tracing::debug!(%name, "internal command replaced");
            }
            self.entries.insert(
                name,
                (
                    PendingAction::Custom(shared.clone()),
                    description.map(str::to_string),
                ),
            );
        }
        Ok(self)
    }

    /// 등록을 마감하고 읽기 전용 레지스트리를 만든다.
    pub fn build(self) -> Arc<InternalCommandRegistry> {
        Arc::new_cyclic(|registry: &Weak<InternalCommandRegistry>| {
            let commands = self
                .entries
                .into_iter()
                .map(|(name, (pending, description))| {
                    let action: InternalAction = match pending {
                        PendingAction::Custom(action) => action,
                        PendingAction::Exit => Arc::new(|| InternalOutcome::Exit),
                        PendingAction::Help => {
                            let registry = registry.clone();
                            Arc::new(move || {
                                registry
                                    .upgrade()
                                    .map_or(InternalOutcome::Silent, |r| {
                                        InternalOutcome::Text(r.help_text())
                                    })
                            })
                        }
                    };
                    (name, InternalCommand { action, description })
                })
                .collect();
            InternalCommandRegistry { commands }
        })
    }

    fn insert(&mut self, names: &[&str], action: PendingAction, description: Option<&str>) {
        for name in names {
            self.entries.insert(
                (*name).to_string(),
                (action.clone(), description.map(str::to_string)),
            );
        }
    }
}

struct InternalCommand {
    action: InternalAction,
    description: Option<String>,
}

/// 고정된 내부 명령 테이블.
pub struct InternalCommandRegistry {
    commands: HashMap<String, InternalCommand>,
}

impl InternalCommandRegistry {
    /// 기본 명령만 들어 있는 레지스트리.
    pub fn with_defaults() -> Arc<Self> {
        RegistryBuilder::new().build()
    }

    pub fn resolve(&self, name: &str) -> Option<&InternalAction> {
        self.commands.get(name).map(|command| &command.action)
    }

    /// 설명별로 묶은 이름 목록.
    pub fn describe(&self) -> BTreeMap<Option<String>, BTreeSet<String>> {
        let mut table: BTreeMap<Option<String>, BTreeSet<String>> = BTreeMap::new();
        for (name, command) in &self.commands {
            table
                .entry(command.description.clone())
                .or_default()
                .insert(name.clone());
        }
        table
    }

    /// `:help` 출력 문자열.
    pub fn help_text(&self) -> String {
        let rows: Vec<(String, String)> = self
            .describe()
            .into_iter()
            .map(|(description, names)| {
                let names = names
                    .iter()
                    .map(|name| format!("{INTERNAL_COMMAND_MARKER}{name}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                (names, description.unwrap_or_default())
            })
            .collect();
        let first_col = rows
            .iter()
            .map(|(names, _)| names.chars().count())
            .max()
            .unwrap_or(0)
            .min(HELP_FIRST_COL_MAX);

        let mut out = String::new();
        let _ = writeln!(out, "REPL help:");
        let _ = writeln!(out);
        let _ = writeln!(out, "  External Commands:");
        let _ = writeln!(
            out,
            "    prefix external commands with \"{SHELL_ESCAPE_MARKER}\""
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "  Internal Commands:");
        let _ = writeln!(
            out,
            "    prefix internal commands with \"{INTERNAL_COMMAND_MARKER}\""
        );
        for (names, description) in rows {
            if description.is_empty() {
                let _ = writeln!(out, "    {names}");
            } else if names.chars().count() > first_col {
                // 이름 열이 넘치면 설명은 다음 줄로 내린다.
                let _ = writeln!(out, "    {names}");
                let _ = writeln!(out, "    {:first_col$}  {description}", "");
            } else {
                let _ = writeln!(out, "    {names:<first_col$}  {description}");
            }
        }
        out
    }
}

const HELP_FIRST_COL_MAX: usize = 30;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn run(registry: &InternalCommandRegistry, name: &str) -> Option<InternalOutcome> {
        registry.resolve(name).map(|action| action())
    }

    #[test]
    fn defaults_cover_exit_and_help_mnemonics() {
        let registry = InternalCommandRegistry::with_defaults();
        for name in ["q", "quit", "exit"] {
            assert_eq!(run(&registry, name), Some(InternalOutcome::Exit));
        }
        for name in ["?", "h", "help"] {
            assert!(matches!(run(&registry, name), Some(InternalOutcome::Text(_))));
        }
        assert!(registry.resolve("nope").is_none());
    }

    #[test]
    fn help_groups_mnemonics_by_description() {
        let registry = InternalCommandRegistry::with_defaults();
        let help = registry.help_text();
        assert!(help.starts_with("REPL help:\n"));
        assert!(help.contains("prefix external commands with \"!\""));
        assert!(help.contains("prefix internal commands with \":\""));
        assert!(help.contains(":?, :h, :help     displays general help information"));
        assert!(help.contains(":exit, :q, :quit  exits the repl"));
    }

    #[test]
    fn describe_sorts_names_within_a_group() {
        let registry = InternalCommandRegistry::with_defaults();
        let table = registry.describe();
        let exit: Vec<_> = table[&Some("exits the repl".to_string())]
            .iter()
            .cloned()
            .collect();
        assert_eq!(exit, ["exit", "q", "quit"]);
    }

    #[test]
    fn custom_command_runs_exactly_its_action() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut builder = RegistryBuilder::new();
        builder
            .register(
                ["c", "count"],
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
                Some("counts"),
            )
            .unwrap();
        let registry = builder.build();

        assert_eq!(run(&registry, "count"), Some(InternalOutcome::Silent));
        assert_eq!(run(&registry, "c"), Some(InternalOutcome::Silent));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(registry.help_text().contains(":c, :count"));
    }

    #[test]
    fn later_registration_replaces_builtin_name() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(["q"], || "not quitting".to_string(), Some("custom"))
            .unwrap();
        let registry = builder.build();
        assert_eq!(
            run(&registry, "q"),
            Some(InternalOutcome::Text("not quitting".into()))
        );
        assert_eq!(run(&registry, "quit"), Some(InternalOutcome::Exit));
    }

    #[test]
    fn register_rejects_bad_names() {
        let mut builder = RegistryBuilder::new();
        let empty: [&str; 0] = [];
        assert_eq!(
            builder.register(empty, || (), None).err(),
            Some(RegistryError::NoNames)
        );
        assert_eq!(
            builder.register(["ok", "two words"], || (), None).err(),
            Some(RegistryError::InvalidName("two words".into()))
        );
        assert_eq!(
            builder.register([""], || (), None).err(),
            Some(RegistryError::InvalidName(String::new()))
        );
    }

    #[test]
    fn option_results_map_to_text_or_silent() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(["some"], || Some("x".to_string()), None)
            .unwrap()
            .register(["none"], || None::<String>, None)
            .unwrap();
        let registry = builder.build();
        assert_eq!(run(&registry, "some"), Some(InternalOutcome::Text("x".into())));
        assert_eq!(run(&registry, "none"), Some(InternalOutcome::Silent));
    }
}
