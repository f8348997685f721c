//! Infrastructure layer
//! 외부 시스템(터미널/셸/파일시스템)과 clap 명령 트리에 직접 닿는 구현체 집합.

pub mod adapters;
pub mod clap_tree;
pub mod config;
pub mod terminal;
