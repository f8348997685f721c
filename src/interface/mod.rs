//! Interface layer
//! 사용자 입력(명령줄/대화형 쉘)을 애플리케이션 계층으로 연결한다.

pub mod cli;
