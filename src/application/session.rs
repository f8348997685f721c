//! REPL 세션 상태와 외부 종료 신호.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// 세션 시작 시 한 번 정해지는 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// stdin이 대화형 터미널인지 여부
    pub interactive: bool,
}

impl Session {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    /// stdin 기준으로 대화형 여부를 판정한다.
    pub fn detect() -> Self {
        Self::new(io::stdin().is_terminal())
    }
}

#[derive(Default)]
struct Signal {
    raised: AtomicBool,
    notify: Notify,
}

impl Signal {
    fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// `ready`가 참을 돌려줄 때까지 대기한다. 깨우기 유실이 없도록 먼저 구독한다.
    async fn wait_until(&self, ready: impl Fn(&AtomicBool) -> bool) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if ready(&self.raised) {
                return;
            }
            notified.await;
        }
    }
}

/// 바깥 태스크(타임아웃 등)가 입력 종료를 주입하는 핸들.
/// 리더는 다음 기회에 `EndOfInput`을 보고한다.
#[derive(Clone, Default)]
pub struct EndOfInput {
    signal: Arc<Signal>,
}

impl EndOfInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        self.signal.raise();
    }

    pub fn is_signaled(&self) -> bool {
        self.signal.raised.load(Ordering::SeqCst)
    }

    /// 신호가 올 때까지 대기한다.
    pub async fn wait(&self) {
        self.signal
            .wait_until(|raised| raised.load(Ordering::SeqCst))
            .await;
    }
}

/// 읽기 도중 들어온 인터럽트(Ctrl-C). 한 번 보고하면 소비된다.
#[derive(Clone, Default)]
pub struct Interrupts {
    signal: Arc<Signal>,
}

impl Interrupts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.signal.raise();
    }

    /// 대기 중인 인터럽트가 있으면 소비하고 `true`.
    pub fn take(&self) -> bool {
        self.signal.raised.swap(false, Ordering::SeqCst)
    }

    /// 인터럽트가 올 때까지 대기하고 소비한다.
    pub async fn wait(&self) {
        self.signal
            .wait_until(|raised| raised.swap(false, Ordering::SeqCst))
            .await;
    }
}
