//! REPL 대화형 줄 편집기.
//! 입력 중 커서 앞 문자열로 자동완성 후보를 실시간으로 표시한다.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use crossterm::cursor;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, ClearType};
use crossterm::{execute, queue};

use super::history::History;
use super::text::{
    byte_index_at_char, clip_line_display, display_width, pad_line_display,
    tail_with_ellipsis_display,
};
use crate::application::ports::{AsyncLineReader, CompletionProvider, LineReader, ReadOutcome};
use crate::application::session::{EndOfInput, Interrupts};
use crate::domain::completion::Completion;
use crate::infrastructure::adapters::trim_newline;

// 키 입력이 없을 때 입력 종료 신호를 확인하는 주기
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const MENU_TEXT_WIDTH: usize = 16;

/// 히스토리와 자동완성이 연결된 터미널 줄 편집기.
pub struct TerminalLineEditor {
    prompt: String,
    completer: Arc<dyn CompletionProvider>,
    history: History,
    completion_rows: usize,
    end_of_input: EndOfInput,
    interrupts: Interrupts,
}

impl TerminalLineEditor {
    pub fn new(
        prompt: impl Into<String>,
        completer: Arc<dyn CompletionProvider>,
        history: History,
        completion_rows: usize,
        end_of_input: EndOfInput,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            completer,
            history,
            completion_rows: completion_rows.max(1),
            end_of_input,
            interrupts: Interrupts::new(),
        }
    }

    /// raw 모드를 못 쓸 때(cooked 입력) 들어온 Ctrl-C를 `Interrupted`로 보고하게 한다.
    pub fn with_interrupts(mut self, interrupts: Interrupts) -> Self {
        self.interrupts = interrupts;
        self
    }

    fn read_interactive(&mut self) -> Result<ReadOutcome> {
        let mut stdout = io::stdout();
        let _guard = InputGuard::enter(&mut stdout)?;
        let mut state = EditState::new(self.completer.as_ref(), &mut self.history);
        let mut dirty = true;

        loop {
            if dirty {
                let width = terminal::size()
                    .map(|(w, _)| w as usize)
                    .unwrap_or(80)
                    .max(20);
                render(&mut stdout, &self.prompt, &state, self.completion_rows, width)?;
                dirty = false;
            }

            if !event::poll(POLL_INTERVAL)? {
                if self.end_of_input.is_signaled() {
                    finish(&mut stdout, &self.prompt, &state.buffer.text)?;
                    return Ok(ReadOutcome::EndOfInput);
                }
                continue;
            }

            dirty = true;
            match event::read()? {
                Event::Paste(text) => state.paste(&text),
                Event::Key(key) if key.kind == KeyEventKind::Press => match state.handle_key(key) {
                    KeyResult::Continue => {}
                    KeyResult::Submit => {
                        let line = state.buffer.text.clone();
                        finish(&mut stdout, &self.prompt, &line)?;
                        return Ok(ReadOutcome::Line(line));
                    }
                    KeyResult::Interrupted => {
                        finish(&mut stdout, &self.prompt, &state.buffer.text)?;
                        return Ok(ReadOutcome::Interrupted);
                    }
                    KeyResult::EndOfInput => {
                        finish(&mut stdout, &self.prompt, "")?;
                        return Ok(ReadOutcome::EndOfInput);
                    }
                },
                _ => {}
            }
        }
    }

    fn read_fallback(&mut self) -> Result<ReadOutcome> {
        if self.interrupts.take() {
            println!();
            return Ok(ReadOutcome::Interrupted);
        }

        print!("{}", self.prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin()
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        if read == 0 {
            return Ok(ReadOutcome::EndOfInput);
        }
        Ok(ReadOutcome::Line(trim_newline(line)))
    }
}

impl LineReader for TerminalLineEditor {
    /// - 지원 터미널: 실시간 추천 + 방향키 선택
    /// - 미지원 터미널: 일반 라인 입력
    fn read_line(&mut self) -> Result<ReadOutcome> {
        if self.end_of_input.is_signaled() {
            return Ok(ReadOutcome::EndOfInput);
        }
        // 명령 실행 중에 들어온 Ctrl-C
        if self.interrupts.take() {
            return Ok(ReadOutcome::Interrupted);
        }

        let outcome = if supports_raw_input() {
            match self.read_interactive() {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::debug!(error = %err, "raw terminal input failed, falling back");
                    self.read_fallback()?
                }
            }
        } else {
            self.read_fallback()?
        };

        if let ReadOutcome::Line(line) = &outcome {
            self.history.push(line);
        }
        Ok(outcome)
    }
}

/// 블로킹 편집기를 블로킹 스레드 풀에서 돌려 현재 태스크만 대기시킨다.
pub struct AsyncTerminalReader {
    editor: Option<TerminalLineEditor>,
}

impl AsyncTerminalReader {
    pub fn new(editor: TerminalLineEditor) -> Self {
        Self {
            editor: Some(editor),
        }
    }
}

#[async_trait]
impl AsyncLineReader for AsyncTerminalReader {
    async fn read_line(&mut self) -> Result<ReadOutcome> {
        let mut editor = self
            .editor
            .take()
            .context("terminal editor was lost by an earlier failed read")?;
        let (editor, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = editor.read_line();
            (editor, outcome)
        })
        .await
        .context("terminal reader task failed")?;
        self.editor = Some(editor);
        outcome
    }
}

fn supports_raw_input() -> bool {
    if !io::stdout().is_terminal() {
        return false;
    }

    // dumb 터미널에서는 제어 시퀀스 기반 UI를 비활성화한다.
    if let Ok(term) = env::var("TERM")
        && term.eq_ignore_ascii_case("dumb")
    {
        return false;
    }

    true
}

/// 키 입력 한 번의 처리 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyResult {
    Continue,
    Submit,
    Interrupted,
    EndOfInput,
}

/// 문자 단위 커서를 가진 편집 버퍼.
#[derive(Debug, Default)]
struct LineBuffer {
    text: String,
    cursor: usize,
}

impl LineBuffer {
    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn before_cursor(&self) -> &str {
        &self.text[..byte_index_at_char(&self.text, self.cursor)]
    }

    fn after_cursor(&self) -> &str {
        &self.text[byte_index_at_char(&self.text, self.cursor)..]
    }

    fn insert(&mut self, ch: char) {
        let idx = byte_index_at_char(&self.text, self.cursor);
        self.text.insert(idx, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.remove_at_cursor();
        }
    }

    fn remove_at_cursor(&mut self) {
        let start = byte_index_at_char(&self.text, self.cursor);
        let end = byte_index_at_char(&self.text, self.cursor + 1);
        if start < end {
            self.text.replace_range(start..end, "");
        }
    }

    fn clear_before_cursor(&mut self) {
        self.text = self.after_cursor().to_string();
        self.cursor = 0;
    }

    fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.len();
    }
}

/// 한 줄 편집 동안의 상태(버퍼 + 자동완성 메뉴 + 히스토리 탐색).
struct EditState<'a> {
    buffer: LineBuffer,
    completer: &'a dyn CompletionProvider,
    history: &'a mut History,
    menu: Vec<Completion>,
    selected: usize,
    /// 빈 줄이거나 Esc로 닫으면 메뉴를 숨긴다.
    menu_hidden: bool,
}

impl<'a> EditState<'a> {
    fn new(completer: &'a dyn CompletionProvider, history: &'a mut History) -> Self {
        history.reset();
        Self {
            buffer: LineBuffer::default(),
            completer,
            history,
            menu: Vec::new(),
            selected: 0,
            menu_hidden: true,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let before = self.buffer.text.clone();
        let mut recalled = false;

        match key.code {
            KeyCode::Enter => return KeyResult::Submit,
            KeyCode::Char('c') if ctrl => return KeyResult::Interrupted,
            KeyCode::Char('d') if ctrl => {
                if self.buffer.text.is_empty() {
                    return KeyResult::EndOfInput;
                }
                self.buffer.remove_at_cursor();
            }
            KeyCode::Char('a') if ctrl => self.buffer.cursor = 0,
            KeyCode::Char('e') if ctrl => self.buffer.cursor = self.buffer.len(),
            KeyCode::Char('u') if ctrl => self.buffer.clear_before_cursor(),
            KeyCode::Char('p') if ctrl => recalled = self.recall_older(),
            KeyCode::Char('n') if ctrl => recalled = self.recall_newer(),
            KeyCode::Char(ch) if !ctrl && !alt => self.buffer.insert(ch),
            KeyCode::Backspace => self.buffer.backspace(),
            KeyCode::Delete => self.buffer.remove_at_cursor(),
            KeyCode::Left => self.buffer.cursor = self.buffer.cursor.saturating_sub(1),
            KeyCode::Right => self.buffer.cursor = (self.buffer.cursor + 1).min(self.buffer.len()),
            KeyCode::Home => self.buffer.cursor = 0,
            KeyCode::End => self.buffer.cursor = self.buffer.len(),
            KeyCode::Tab => {
                if self.menu_hidden || self.menu.is_empty() {
                    self.menu_hidden = false;
                } else {
                    self.accept_selected();
                }
            }
            KeyCode::BackTab => self.selected = self.selected.saturating_sub(1),
            KeyCode::Up => {
                if self.menu_visible() {
                    self.selected = self.selected.saturating_sub(1);
                } else {
                    recalled = self.recall_older();
                }
            }
            KeyCode::Down => {
                if self.menu_visible() {
                    self.selected = (self.selected + 1).min(self.menu.len() - 1);
                } else {
                    recalled = self.recall_newer();
                }
            }
            KeyCode::Esc => self.menu_hidden = true,
            _ => {}
        }

        if self.buffer.text != before {
            // 히스토리에서 불러온 줄은 메뉴를 열지 않아야 방향키로 계속 탐색할 수 있다.
            self.menu_hidden = recalled || self.buffer.text.is_empty();
            self.selected = 0;
        }
        self.refresh_menu();
        KeyResult::Continue
    }

    fn paste(&mut self, text: &str) {
        for ch in text.chars() {
            // 붙여넣은 개행이 줄을 제출하지 않도록 공백으로 바꾼다.
            self.buffer
                .insert(if matches!(ch, '\n' | '\r') { ' ' } else { ch });
        }
        self.menu_hidden = self.buffer.text.is_empty();
        self.selected = 0;
        self.refresh_menu();
    }

    fn menu_visible(&self) -> bool {
        !self.menu_hidden && !self.menu.is_empty()
    }

    fn refresh_menu(&mut self) {
        if self.menu_hidden {
            self.menu.clear();
            self.selected = 0;
            return;
        }
        self.menu = self.completer.complete(self.buffer.before_cursor()).collect();
        if self.selected >= self.menu.len() {
            self.selected = self.menu.len().saturating_sub(1);
        }
    }

    fn accept_selected(&mut self) {
        let Some(candidate) = self.menu.get(self.selected).cloned() else {
            return;
        };
        let head = candidate.apply_to(self.buffer.before_cursor());
        let cursor = head.chars().count();
        let text = format!("{head}{}", self.buffer.after_cursor());
        self.buffer.text = text;
        self.buffer.cursor = cursor;
    }

    fn recall_older(&mut self) -> bool {
        let Some(line) = self.history.older(&self.buffer.text).map(str::to_string) else {
            return false;
        };
        self.buffer.set(&line);
        true
    }

    fn recall_newer(&mut self) -> bool {
        let Some(line) = self.history.newer().map(str::to_string) else {
            return false;
        };
        self.buffer.set(&line);
        true
    }

    /// 선택 항목이 보이도록 잘라낸 메뉴 구간.
    fn visible_menu(&self, rows: usize) -> (usize, &[Completion]) {
        if !self.menu_visible() {
            return (0, &[]);
        }
        let start = (self.selected + 1).saturating_sub(rows);
        let end = (start + rows).min(self.menu.len());
        (start, &self.menu[start..end])
    }
}

fn render(
    stdout: &mut impl Write,
    prompt: &str,
    state: &EditState<'_>,
    rows: usize,
    width: usize,
) -> Result<()> {
    let available = width.saturating_sub(display_width(prompt)).max(1);
    let shown = tail_with_ellipsis_display(&state.buffer.text, available);
    queue!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::FromCursorDown),
        Print(prompt),
        Print(&shown)
    )?;

    // 메뉴는 입력줄 아래에 그리고 커서를 다시 입력줄로 올린다.
    let (start, items) = state.visible_menu(rows);
    let line_width = width.saturating_sub(1);
    for (offset, item) in items.iter().enumerate() {
        let selected = start + offset == state.selected;
        let marker = if selected { ">" } else { " " };
        let line = clip_line_display(
            &format!(
                "{marker} {:<MENU_TEXT_WIDTH$} {}",
                item.text,
                item.display_meta.as_deref().unwrap_or("")
            ),
            line_width,
        );
        queue!(stdout, Print("\r\n"))?;
        if selected {
            queue!(
                stdout,
                SetBackgroundColor(Color::DarkGrey),
                SetForegroundColor(Color::White),
                Print(pad_line_display(&line, line_width)),
                ResetColor
            )?;
        } else {
            queue!(stdout, SetForegroundColor(Color::Grey), Print(line), ResetColor)?;
        }
    }
    if !items.is_empty() {
        queue!(stdout, cursor::MoveUp(items.len() as u16))?;
    }

    let col = prompt_cursor_col(prompt, &state.buffer, width);
    queue!(stdout, cursor::MoveToColumn(col as u16))?;
    stdout.flush()?;
    Ok(())
}

fn prompt_cursor_col(prompt: &str, buffer: &LineBuffer, width: usize) -> usize {
    let prefix_width = display_width(prompt);
    let available = width.saturating_sub(prefix_width);

    if display_width(&buffer.text) <= available {
        return (prefix_width + display_width(buffer.before_cursor())).min(width.saturating_sub(1));
    }

    // 넘친 입력은 끝부분만 보이므로 커서를 입력 끝쪽으로 정렬한다.
    (prefix_width + display_width(&tail_with_ellipsis_display(&buffer.text, available)))
        .min(width.saturating_sub(1))
}

// 메뉴를 지우고 확정된 줄을 남긴 뒤 다음 줄로 내려간다.
fn finish(stdout: &mut impl Write, prompt: &str, line: &str) -> Result<()> {
    queue!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::FromCursorDown),
        Print(prompt),
        Print(line),
        Print("\r\n")
    )?;
    stdout.flush()?;
    Ok(())
}

struct InputGuard;

impl InputGuard {
    fn enter(stdout: &mut io::Stdout) -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout, EnableBracketedPaste, cursor::Show)?;
        Ok(Self)
    }
}

impl Drop for InputGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableBracketedPaste, cursor::Show, ResetColor);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}
