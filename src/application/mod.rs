//! Application layer
//! REPL 루프와 내부 명령/자동완성/호출을 정의하고 포트(추상 인터페이스)를 통해 인프라를 사용한다.

pub mod completer;
pub mod config;
pub mod dispatch;
pub mod invoker;
pub mod ports;
pub mod registry;
pub mod session;
