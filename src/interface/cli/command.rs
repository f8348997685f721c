//! 데모 명령 트리 정의.
//! 자동완성이 런타임에 트리를 살펴봐야 하므로 derive 대신 builder API를 쓴다.

use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::application::ports::ReplOutput;
use crate::domain::command::{CommandError, CommandOutcome, InvokeError};
use crate::infrastructure::clap_tree::ClapCommandTree;
use crate::infrastructure::config;

pub const APP_NAME: &str = "repltree";
pub const REPL_COMMAND: &str = "repl";

const REPL_ABOUT: &str = "Start an interactive shell. All subcommands are available in it.\n\n\
You can also pipe to this command to execute subcommands.";

const DEMO_ITEMS: [&str; 3] = ["alpha", "beta", "gamma"];
const PENDING_MIGRATIONS: usize = 3;

/// `command`에 대화형 쉘 서브커맨드를 붙인다.
pub fn register_repl(command: Command, name: &'static str) -> Command {
    command.subcommand(
        Command::new(name)
            .about(REPL_ABOUT)
            .arg(
                Arg::new("cooperative")
                    .long("cooperative")
                    .action(ArgAction::SetTrue)
                    .help("Wait for input without blocking other async tasks"),
            )
            .arg(
                Arg::new("timeout")
                    .long("timeout")
                    .value_name("SECS")
                    .value_parser(value_parser!(u64))
                    .requires("cooperative")
                    .help("End the session after SECS seconds"),
            ),
    )
}

/// `repl` 서브커맨드 실행 옵션.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplArgs {
    pub cooperative: bool,
    pub timeout_secs: Option<u64>,
}

impl ReplArgs {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            cooperative: matches.get_flag("cooperative"),
            timeout_secs: matches.get_one::<u64>("timeout").copied(),
        }
    }
}

/// 바이너리의 루트 명령.
pub fn build_cli() -> Command {
    let command = Command::new(APP_NAME)
        .about("Demo command tree with an interactive shell")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List demo items"))
        .subcommand(
            Command::new("echo")
                .about("Print the given words")
                .arg(
                    Arg::new("upper")
                        .short('u')
                        .long("upper")
                        .action(ArgAction::SetTrue)
                        .help("Print in upper case"),
                )
                .arg(Arg::new("words").num_args(0..).help("Words to print")),
        )
        .subcommand(
            Command::new("db")
                .about("Database maintenance")
                .subcommand(
                    Command::new("migrate").about("Apply pending migrations").arg(
                        Arg::new("dry-run")
                            .long("dry-run")
                            .action(ArgAction::SetTrue)
                            .help("Only show what would be applied"),
                    ),
                )
                .subcommand(Command::new("status").about("Show migration status")),
        )
        .subcommand(Command::new("fail").about("Fail with a user-facing error"))
        .subcommand(
            Command::new("config").about("Show effective merged config and searched paths"),
        );

    register_repl(command, REPL_COMMAND)
}

/// 루트 명령 + 데모 핸들러를 명령 트리로 묶는다.
pub fn build_tree(output: Arc<dyn ReplOutput>) -> ClapCommandTree {
    let list_out = output.clone();
    let echo_out = output.clone();
    let migrate_out = output.clone();
    let status_out = output.clone();
    let config_out = output;

    ClapCommandTree::new(build_cli())
        .handler(&["list"], move |_| {
            for item in DEMO_ITEMS {
                list_out.echo(item);
            }
            Ok(CommandOutcome::Normal)
        })
        .handler(&["echo"], move |ctx| {
            let words: Vec<&str> = ctx
                .matches()
                .get_many::<String>("words")
                .map(|words| words.map(String::as_str).collect())
                .unwrap_or_default();
            let text = words.join(" ");
            if ctx.matches().get_flag("upper") {
                echo_out.echo(&text.to_uppercase());
            } else {
                echo_out.echo(&text);
            }
            Ok(CommandOutcome::Normal)
        })
        .handler(&["db", "migrate"], move |ctx| {
            if ctx.matches().get_flag("dry-run") {
                migrate_out.echo(&format!("would apply {PENDING_MIGRATIONS} migrations"));
            } else {
                migrate_out.echo(&format!("applied {PENDING_MIGRATIONS} migrations"));
            }
            Ok(CommandOutcome::Normal)
        })
        .handler(&["db", "status"], move |_| {
            status_out.echo(&format!("{PENDING_MIGRATIONS} migrations pending"));
            Ok(CommandOutcome::Normal)
        })
        .handler(&["fail"], |_| {
            Err(CommandError::message("this command always fails").into())
        })
        .handler(&["config"], move |_| {
            let json = config::inspect_pretty_json().map_err(InvokeError::Other)?;
            config_out.echo(&json);
            Ok(CommandOutcome::Normal)
        })
        // 바이너리는 `repl`을 트리 밖에서 처리하므로, 여기까지 오면 셸 안에서 다시 연 경우다.
        .handler(&[REPL_COMMAND], |_| {
            Err(CommandError::message("the interactive shell is already running").into())
        })
}
