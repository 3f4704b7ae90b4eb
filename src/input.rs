use std::ops::RangeInclusive;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::timer::{DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};

pub const WORK_RANGE: RangeInclusive<i64> = 1..=180;
pub const BREAK_RANGE: RangeInclusive<i64> = 1..=60;

/// Longest text a duration field accepts
const MAX_DIGITS: usize = 4;

/// Events the input surface produces for the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    CommitDurations { work_minutes: i64, break_minutes: i64 },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Work,
    Break,
}

/// Text box holding a minutes value as typed by the user
#[derive(Debug, Clone, PartialEq)]
pub struct DurationField {
    pub text: String,
    range: RangeInclusive<i64>,
    fallback: i64,
}

impl DurationField {
    pub fn new(initial: i64, range: RangeInclusive<i64>, fallback: i64) -> Self {
        Self {
            text: initial.to_string(),
            range,
            fallback,
        }
    }

    pub fn push(&mut self, c: char) {
        if c.is_ascii_digit() && self.text.len() < MAX_DIGITS {
            self.text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Minutes to hand to the controller; anything unparsable or out of
    /// range becomes the field's fallback.
    pub fn minutes(&self) -> i64 {
        match self.text.trim().parse::<i64>() {
            Ok(m) if self.range.contains(&m) => m,
            _ => {
                debug!(text = %self.text, fallback = self.fallback, "invalid duration input");
                self.fallback
            }
        }
    }
}

/// Work/break duration fields plus key handling
#[derive(Debug, Clone)]
pub struct DurationInput {
    pub work: DurationField,
    pub break_: DurationField,
    focus: Option<Field>,
}

impl DurationInput {
    pub fn new(work_minutes: i64, break_minutes: i64) -> Self {
        Self {
            work: DurationField::new(work_minutes, WORK_RANGE, DEFAULT_WORK_MINUTES),
            break_: DurationField::new(break_minutes, BREAK_RANGE, DEFAULT_BREAK_MINUTES),
            focus: None,
        }
    }

    pub fn focus(&self) -> Option<Field> {
        self.focus
    }

    fn field_mut(&mut self, field: Field) -> &mut DurationField {
        match field {
            Field::Work => &mut self.work,
            Field::Break => &mut self.break_,
        }
    }

    /// Parse both fields and normalise their text to the values committed
    fn commit(&mut self) -> Command {
        let work_minutes = self.work.minutes();
        let break_minutes = self.break_.minutes();
        self.work.text = work_minutes.to_string();
        self.break_.text = break_minutes.to_string();
        Command::CommitDurations {
            work_minutes,
            break_minutes,
        }
    }

    /// Translate a key press into a controller command, if any
    pub fn on_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }

        match self.focus {
            Some(field) => match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    self.field_mut(field).push(c);
                    None
                }
                KeyCode::Backspace => {
                    self.field_mut(field).backspace();
                    None
                }
                KeyCode::Tab => {
                    self.focus = Some(match field {
                        Field::Work => Field::Break,
                        Field::Break => Field::Work,
                    });
                    Some(self.commit())
                }
                KeyCode::Enter | KeyCode::Esc => {
                    self.focus = None;
                    Some(self.commit())
                }
                _ => None,
            },
            None => match key.code {
                KeyCode::Char('s') | KeyCode::Char(' ') => Some(Command::Start),
                KeyCode::Char('p') => Some(Command::Pause),
                KeyCode::Char('r') => Some(Command::Reset),
                KeyCode::Char('w') => {
                    self.focus = Some(Field::Work);
                    None
                }
                KeyCode::Char('b') => {
                    self.focus = Some(Field::Break);
                    None
                }
                KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
                _ => None,
            },
        }
    }
}
