//! 터미널 줄 편집기(raw 모드 입력 + 히스토리 + 자동완성 메뉴).

mod editor;
mod history;
mod text;

pub use editor::{AsyncTerminalReader, TerminalLineEditor};
pub use history::History;
