//! `repltree` 바이너리 진입점.

use std::time::Duration;

use anyhow::Result;
use repltree::interface::cli::{AppComposition, REPL_COMMAND, ReplArgs, build_cli, repl, repl_task};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    match run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    // 사용법 오류와 --help는 clap이 직접 출력하고 종료한다.
    let matches = build_cli().get_matches();
    let composition = AppComposition::load()?;

    let Some((REPL_COMMAND, sub)) = matches.subcommand() else {
        let args: Vec<String> = std::env::args().skip(1).collect();
        return composition.run_command(&args);
    };

    let args = ReplArgs::from_matches(sub);
    let setup = composition.repl_setup();

    if !args.cooperative {
        tokio::task::block_in_place(|| repl(&setup))?;
        return Ok(0);
    }

    if let Some(secs) = args.timeout_secs {
        let end_of_input = setup.options.end_of_input.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::debug!(secs, "repl timeout reached");
            end_of_input.signal();
        });
    }
    repl_task(&setup).await?;
    Ok(0)
}
