//! 명령 트리 기반 자동완성기.

use std::sync::Arc;

use crate::application::ports::{CommandTree, CompletionProvider};
use crate::domain::completion::Completion;
use crate::domain::line::{ends_with_whitespace, tokenize};

/// 현재 커서 위치의 명령을 찾아 옵션/자식 명령을 후보로 낸다.
pub struct TreeCompleter<T> {
    tree: Arc<T>,
}

impl<T> TreeCompleter<T> {
    pub fn new(tree: Arc<T>) -> Self {
        Self { tree }
    }
}

impl<T> CompletionProvider for TreeCompleter<T>
where
    T: CommandTree + Send + Sync,
{
    fn complete<'a>(&'a self, before_cursor: &'a str) -> Box<dyn Iterator<Item = Completion> + 'a> {
        // 공백으로 끝나면 다음 인자 경계이므로 후보를 내지 않는다.
        if ends_with_whitespace(before_cursor) {
            return Box::new(std::iter::empty());
        }

        let Some(mut args) = tokenize(before_cursor) else {
            return Box::new(std::iter::empty());
        };
        let incomplete = args.pop().unwrap_or_default();

        let Some(spec) = self.tree.describe(&args) else {
            return Box::new(std::iter::empty());
        };

        let start_position = -(incomplete.chars().count() as isize);
        let options = spec.options.into_iter().flat_map(move |option| {
            let help = option.help;
            option
                .flags
                .into_iter()
                .chain(option.secondary_flags)
                .map(move |flag| Completion::new(flag, start_position, help.clone()))
        });
        let children = spec
            .children
            .unwrap_or_default()
            .into_iter()
            .map(move |child| Completion::new(child.name, start_position, child.short_help));

        Box::new(
            options
                .chain(children)
                .filter(move |candidate| candidate.text.starts_with(incomplete.as_str())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::{
        ChildSpec, CommandOutcome, CommandSpec, InvokeError, OptionSpec,
    };

    /// 경로 → 명세를 고정 응답하는 트리.
    struct StaticTree;

    impl CommandTree for StaticTree {
        type Context = ();

        fn make_context(&self, _: &(), _: &[String]) -> Result<(), InvokeError> {
            Ok(())
        }

        fn invoke(&self, _: &mut ()) -> Result<CommandOutcome, InvokeError> {
            Ok(CommandOutcome::Normal)
        }

        fn describe(&self, path: &[String]) -> Option<CommandSpec> {
            let path: Vec<&str> = path.iter().map(String::as_str).collect();
            match path.as_slice() {
                [] => Some(CommandSpec {
                    options: vec![OptionSpec {
                        flags: vec!["--verbose".into()],
                        secondary_flags: vec!["--quiet".into()],
                        help: Some("chatty output".into()),
                    }],
                    children: Some(vec![
                        ChildSpec {
                            name: "db".into(),
                            short_help: Some("database tools".into()),
                        },
                        ChildSpec {
                            name: "list".into(),
                            short_help: None,
                        },
                    ]),
                }),
                ["db"] => Some(CommandSpec {
                    options: vec![OptionSpec {
                        flags: vec!["--dry-run".into()],
                        secondary_flags: Vec::new(),
                        help: Some("preview only".into()),
                    }],
                    children: Some(vec![
                        ChildSpec {
                            name: "migrate".into(),
                            short_help: Some("apply migrations".into()),
                        },
                        ChildSpec {
                            name: "status".into(),
                            short_help: None,
                        },
                    ]),
                }),
                _ => None,
            }
        }
    }

    fn texts(line: &str) -> Vec<String> {
        let completer = TreeCompleter::new(Arc::new(StaticTree));
        let mut out: Vec<String> = completer.complete(line).map(|c| c.text).collect();
        out.sort();
        out
    }

    #[test]
    fn trailing_whitespace_yields_nothing() {
        assert!(texts("db ").is_empty());
        assert!(texts(" ").is_empty());
    }

    #[test]
    fn unterminated_quote_yields_nothing() {
        assert!(texts("db \"mig").is_empty());
    }

    #[test]
    fn unknown_path_yields_nothing() {
        assert!(texts("nope mig").is_empty());
    }

    #[test]
    fn empty_line_lists_root_options_and_children() {
        assert_eq!(texts(""), ["--quiet", "--verbose", "db", "list"]);
    }

    #[test]
    fn group_children_are_filtered_by_fragment() {
        let completer = TreeCompleter::new(Arc::new(StaticTree));
        let candidates: Vec<Completion> = completer.complete("db mig").collect();
        assert_eq!(
            candidates,
            vec![Completion::new("migrate", -3, Some("apply migrations".into()))]
        );
    }

    #[test]
    fn option_flags_carry_help_text() {
        let completer = TreeCompleter::new(Arc::new(StaticTree));
        let candidates: Vec<Completion> = completer.complete("db --d").collect();
        assert_eq!(
            candidates,
            vec![Completion::new("--dry-run", -3, Some("preview only".into()))]
        );
    }

    #[test]
    fn secondary_spellings_are_offered() {
        assert_eq!(texts("--q"), ["--quiet"]);
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        assert!(texts("DB").is_empty());
    }
}
