//! Domain layer
//! 줄 문법, 자동완성 후보, 명령 호출 결과 같은 값 객체를 표현한다.

pub mod command;
pub mod completion;
pub mod line;
