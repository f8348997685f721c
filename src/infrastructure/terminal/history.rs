//! 세션 한정 메모리 히스토리. 디스크에 저장하지 않는다.

use std::collections::VecDeque;

pub struct History {
    entries: VecDeque<String>,
    limit: usize,
    /// 탐색 중인 항목 위치(`None`이면 새 입력 편집 중)
    cursor: Option<usize>,
    /// 탐색을 시작할 때 편집 중이던 입력
    draft: String,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
            cursor: None,
            draft: String::new(),
        }
    }

    /// 제출된 줄을 기록한다. 빈 줄과 직전과 같은 줄은 건너뛴다.
    pub fn push(&mut self, line: &str) {
        self.reset();
        if line.trim().is_empty() || self.limit == 0 {
            return;
        }
        if self.entries.back().is_some_and(|last| last == line) {
            return;
        }
        self.entries.push_back(line.to_string());
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    /// 한 단계 이전 항목. 처음 호출 시 `current`를 보관한다.
    pub fn older(&mut self, current: &str) -> Option<&str> {
        let next = match self.cursor {
            None if self.entries.is_empty() => return None,
            None => {
                self.draft = current.to_string();
                self.entries.len() - 1
            }
            Some(0) => 0,
            Some(idx) => idx - 1,
        };
        self.cursor = Some(next);
        self.entries.get(next).map(String::as_str)
    }

    /// 한 단계 이후 항목. 끝을 지나면 보관해 둔 입력으로 돌아간다.
    pub fn newer(&mut self) -> Option<&str> {
        let idx = self.cursor?;
        if idx + 1 < self.entries.len() {
            self.cursor = Some(idx + 1);
            return self.entries.get(idx + 1).map(String::as_str);
        }
        self.cursor = None;
        Some(&self.draft)
    }

    pub fn reset(&mut self) {
        self.cursor = None;
        self.draft.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
