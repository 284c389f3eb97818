//! Full screen terminal rendering and keyboard input for `browse`.

use std::future::ready;
use std::io::Write;

use anyhow::Result;
use crossterm::event::{
    DisableBracketedPaste,
    EnableBracketedPaste,
    Event,
    EventStream,
    KeyCode,
    KeyEvent,
    KeyEventKind,
    KeyModifiers,
};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use futures::{Stream, StreamExt};
use tracing::{debug, error};
use unicode_width::UnicodeWidthStr;

use crate::search::{Input, View, ViewState};
use crate::utils::render::DisplayProducts;

pub const TITLE: &str = "Product Search";
pub const PROMPT: &str = "Search by Name, SKU, Brand...";
pub const LOADING_MESSAGE: &str = "Loading...";
const HELP: &str = "Esc to quit, Ctrl-U to clear";

/// A line of a rendered frame, tagged with how to style it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Title(String),
    Prompt(String),
    Dim(String),
    Plain(String),
    Error(String),
}

/// Lay out a frame for the given query and state.
pub fn frame(query: &str, state: &ViewState) -> Vec<Line> {
    let prompt = if query.is_empty() {
        Line::Dim(format!("> {PROMPT}"))
    } else {
        Line::Prompt(format!("> {query}"))
    };

    let mut lines = vec![
        Line::Title(TITLE.to_string()),
        prompt,
        Line::Dim(HELP.to_string()),
        Line::Plain(String::new()),
    ];

    match state {
        ViewState::Loading => lines.push(Line::Dim(LOADING_MESSAGE.to_string())),
        ViewState::Failed(message) => lines.push(Line::Error(message.clone())),
        ViewState::Loaded(products) => lines.extend(
            DisplayProducts(products)
                .lines()
                .into_iter()
                .map(Line::Plain),
        ),
    }

    lines
}

/// Renders frames onto a terminal in raw mode.
pub struct TerminalView<W: Write> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> View for TerminalView<W> {
    fn render(&mut self, query: &str, state: &ViewState) -> Result<()> {
        let rows = terminal::size().map(|(_, rows)| rows).unwrap_or(24) as usize;

        queue!(self.out, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
        for line in frame(query, state).into_iter().take(rows.saturating_sub(1)) {
            match line {
                Line::Title(text) => queue!(
                    self.out,
                    SetAttribute(Attribute::Bold),
                    Print(text),
                    SetAttribute(Attribute::Reset)
                )?,
                Line::Prompt(text) | Line::Plain(text) => queue!(self.out, Print(text))?,
                Line::Dim(text) => queue!(
                    self.out,
                    SetForegroundColor(Color::DarkGrey),
                    Print(text),
                    ResetColor
                )?,
                Line::Error(text) => queue!(
                    self.out,
                    SetForegroundColor(Color::Red),
                    Print(text),
                    ResetColor
                )?,
            }
            // raw mode does not translate newlines
            queue!(self.out, Print("\r\n"))?;
        }

        // "> " plus the width of the query in terminal cells
        let column = 2 + query.width();
        queue!(
            self.out,
            cursor::MoveTo(u16::try_from(column).unwrap_or(u16::MAX), 1)
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// Puts the terminal into raw mode on an alternate screen
/// with bracketed paste enabled, and restores it when dropped.
pub struct TerminalGuard(());

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = TerminalGuard(());
        execute!(std::io::stdout(), EnterAlternateScreen, EnableBracketedPaste)?;
        debug!("entered alternate screen");
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = execute!(std::io::stdout(), DisableBracketedPaste, LeaveAlternateScreen) {
            error!("failed to leave alternate screen: {err}");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            error!("failed to disable raw mode: {err}");
        }
    }
}

/// Apply a key press to the search field.
///
/// Returns the input to forward to the session, if any.
pub fn apply_key(query: &mut String, key: KeyEvent) -> Option<Input> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => Some(Input::Quit),
        KeyCode::Char('c' | 'd') if ctrl => Some(Input::Quit),
        KeyCode::Char('u') if ctrl => {
            if query.is_empty() {
                return None;
            }
            query.clear();
            Some(Input::Query(query.clone()))
        },
        KeyCode::Char(c) if !ctrl => {
            query.push(c);
            Some(Input::Query(query.clone()))
        },
        KeyCode::Backspace => {
            query.pop()?;
            Some(Input::Query(query.clone()))
        },
        _ => None,
    }
}

/// Apply a terminal event to the search field.
///
/// Pasted text is appended without its control characters,
/// so a pasted newline does not end up in the query.
/// A failure to read from the terminal quits.
pub fn apply_event(query: &mut String, event: std::io::Result<Event>) -> Option<Input> {
    match event {
        Ok(Event::Key(key)) => apply_key(query, key),
        Ok(Event::Paste(text)) => {
            let before = query.len();
            query.extend(text.chars().filter(|c| !c.is_control()));
            if query.len() == before {
                return None;
            }
            Some(Input::Query(query.clone()))
        },
        Ok(_) => None,
        Err(err) => {
            error!("failed to read terminal input: {err}");
            Some(Input::Quit)
        },
    }
}

/// Keyboard input from the terminal as session [Input]s.
pub fn terminal_inputs() -> impl Stream<Item = Input> + Unpin {
    let mut query = String::new();
    EventStream::new().filter_map(move |event| ready(apply_event(&mut query, event)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use product_catalog::mock::mock_product;

    use super::*;
    use crate::search::SEARCH_FAILED_MESSAGE;
    use crate::utils::render::NO_PRODUCTS_MESSAGE;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn typing_edits_query() {
        let mut query = String::new();

        assert_eq!(
            apply_key(&mut query, press(KeyCode::Char('a'))),
            Some(Input::Query("a".to_string()))
        );
        assert_eq!(
            apply_key(&mut query, press(KeyCode::Char('b'))),
            Some(Input::Query("ab".to_string()))
        );
        assert_eq!(
            apply_key(&mut query, press(KeyCode::Backspace)),
            Some(Input::Query("a".to_string()))
        );
        assert_eq!(
            apply_key(&mut query, ctrl('u')),
            Some(Input::Query(String::new()))
        );
        // nothing left to delete or clear
        assert_eq!(apply_key(&mut query, press(KeyCode::Backspace)), None);
        assert_eq!(apply_key(&mut query, ctrl('u')), None);
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let mut query = "mouse".to_string();
        assert_eq!(apply_key(&mut query, press(KeyCode::Esc)), Some(Input::Quit));
        assert_eq!(apply_key(&mut query, ctrl('c')), Some(Input::Quit));
        assert_eq!(query, "mouse");
    }

    #[test]
    fn key_release_is_ignored() {
        let mut query = String::new();
        let mut release = press(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(apply_key(&mut query, release), None);
        assert!(query.is_empty());
    }

    #[test]
    fn paste_appends_text_without_control_characters() {
        let mut query = "wire".to_string();

        assert_eq!(
            apply_event(&mut query, Ok(Event::Paste("less mouse\r\n".to_string()))),
            Some(Input::Query("wireless mouse".to_string()))
        );
        assert_eq!(query, "wireless mouse");

        // nothing printable was pasted
        assert_eq!(apply_event(&mut query, Ok(Event::Paste("\n\t".to_string()))), None);
        assert_eq!(query, "wireless mouse");
    }

    #[test]
    fn read_error_quits() {
        let mut query = String::new();
        let err = std::io::Error::other("terminal went away");
        assert_eq!(apply_event(&mut query, Err(err)), Some(Input::Quit));
        assert_eq!(
            apply_event(&mut query, Ok(Event::Key(press(KeyCode::Char('x'))))),
            Some(Input::Query("x".to_string()))
        );
    }

    #[test]
    fn cursor_follows_display_width() {
        let mut out = Vec::new();
        let mut view = TerminalView::new(&mut out);
        // two double width characters
        view.render("鼠标", &ViewState::Loading).unwrap();

        // 1-based row 2, column 7
        let written = String::from_utf8(out).unwrap();
        assert!(written.ends_with("\x1b[2;7H"), "cursor not after query: {written:?}");
    }

    #[test]
    fn frame_shows_one_state() {
        let loading = frame("", &ViewState::Loading);
        assert_eq!(loading[1], Line::Dim(format!("> {PROMPT}")));
        assert_eq!(loading.last(), Some(&Line::Dim(LOADING_MESSAGE.to_string())));

        let failed = frame("mouse", &ViewState::Failed(SEARCH_FAILED_MESSAGE.to_string()));
        assert_eq!(failed[1], Line::Prompt("> mouse".to_string()));
        assert_eq!(failed.last(), Some(&Line::Error(SEARCH_FAILED_MESSAGE.to_string())));
        assert!(!failed.contains(&Line::Dim(LOADING_MESSAGE.to_string())));

        let empty = frame("zzz", &ViewState::Loaded(vec![]));
        assert_eq!(empty.last(), Some(&Line::Plain(NO_PRODUCTS_MESSAGE.to_string())));

        let loaded = frame("mouse", &ViewState::Loaded(vec![mock_product(1, "mouse")]));
        assert!(loaded.contains(&Line::Plain("mouse".to_string())));
        assert!(loaded.contains(&Line::Plain("  Price: $25.00".to_string())));
    }

    #[test]
    fn render_writes_frame() {
        let mut out = Vec::new();
        let mut view = TerminalView::new(&mut out);
        view.render("mouse", &ViewState::Loaded(vec![mock_product(1, "mouse")]))
            .unwrap();

        let written = String::from_utf8(out).unwrap();
        assert!(written.contains(TITLE));
        assert!(written.contains("> mouse\r\n"));
        assert!(written.contains("  SKU: SKU-0001\r\n"));
    }
}
