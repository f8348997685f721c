//! 설정 모듈 공용 유틸리티.

use std::env;
use std::path::{Path, PathBuf};

/// 쉘 실행 파일이 실행 가능한지 탐지한다.
pub fn command_exists(command: &str) -> bool {
    find_in_path(command).is_some()
}

/// PATH에서 실행 파일 위치를 찾는다.
pub fn find_in_path(command: &str) -> Option<PathBuf> {
    if command.trim().is_empty() {
        return None;
    }

    // 경로 구분자가 있으면 파일 존재만 검사한다.
    let command_path = Path::new(command);
    if command_path.components().count() > 1 {
        return command_path.is_file().then(|| command_path.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    let candidates = executable_names(command);
    env::split_paths(&path_var).find_map(|dir| {
        candidates
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

#[cfg(windows)]
fn executable_names(command: &str) -> Vec<String> {
    // Windows는 확장자를 생략할 수 있으므로 PATHEXT를 고려한다.
    let mut names = vec![command.to_string()];
    if Path::new(command).extension().is_some() {
        return names;
    }
    let pathext = env::var_os("PATHEXT").unwrap_or_else(|| ".EXE;.CMD;.BAT;.COM".into());
    names.extend(
        pathext
            .to_string_lossy()
            .split(';')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!("{command}{ext}")),
    );
    names
}

#[cfg(not(windows))]
fn executable_names(command: &str) -> Vec<String> {
    vec![command.to_string()]
}
