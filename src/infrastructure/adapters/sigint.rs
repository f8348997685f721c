//! SIGINT(Ctrl-C)를 프로세스 종료 대신 읽기 인터럽트로 바꾸는 어댑터.

use std::sync::OnceLock;

use crate::application::session::Interrupts;

/// 프로세스 전역 Ctrl-C 핸들러를 한 번만 설치하고, 연결된 핸들을 돌려준다.
/// 설치에 실패하면 기본 동작(프로세스 종료)이 그대로 남는다.
pub fn sigint_interrupts() -> Interrupts {
    static INSTALLED: OnceLock<Interrupts> = OnceLock::new();

    INSTALLED
        .get_or_init(|| {
            let interrupts = Interrupts::new();
            let remote = interrupts.clone();
            if let Err(err) = ctrlc::set_handler(move || remote.raise()) {
                tracing::warn!(error = %err, "failed to set ctrl-c handler");
            }
            interrupts
        })
        .clone()
}
