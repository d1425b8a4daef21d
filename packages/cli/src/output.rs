//! What a command prints, kept structured until it reaches the terminal.

use nu_ansi_term::{Color, Style};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Heading(String),
    /// A completed change.
    Done(String),
    /// One entry of a listing; `current` marks the selected one.
    Item { current: bool, text: String },
    Text(String),
    /// A next step the user might take.
    Hint(String),
    Json(JsonValue),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    lines: Vec<Line>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Heading(text.into()));
        self
    }

    pub fn done(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Done(text.into()));
        self
    }

    pub fn item(mut self, current: bool, text: impl Into<String>) -> Self {
        self.lines.push(Line::Item {
            current,
            text: text.into(),
        });
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Text(text.into()));
        self
    }

    pub fn hint(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Hint(text.into()));
        self
    }

    pub fn json(mut self, value: JsonValue) -> Self {
        self.lines.push(Line::Json(value));
        self
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The report without colors.
    pub fn plain(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line {
                Line::Heading(text) | Line::Text(text) | Line::Hint(text) => text.clone(),
                Line::Done(text) => format!("✔ {}", text),
                Line::Item { current, text } => {
                    format!("{} {}", if *current { "*" } else { " " }, text)
                }
                Line::Json(value) => pretty(value),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The report for a terminal.
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line {
                Line::Heading(text) => Style::new().bold().paint(text.as_str()).to_string(),
                Line::Done(text) => format!("{} {}", Color::Green.paint("✔"), text),
                Line::Item {
                    current: true,
                    text,
                } => format!("{} {}", Color::Green.paint("*"), Color::Green.bold().paint(text.as_str())),
                Line::Item {
                    current: false,
                    text,
                } => format!("  {}", text),
                Line::Text(text) => text.clone(),
                Line::Hint(text) => Color::DarkGray.paint(text.as_str()).to_string(),
                Line::Json(value) => format_json(value),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `error <message>` with the prefix in red.
pub fn error_line(message: &str) -> String {
    format!("{} {}", Color::Red.bold().paint("error"), message)
}

fn pretty(value: &JsonValue) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Pretty JSON with strings, numbers and keywords highlighted.
fn format_json(value: &JsonValue) -> String {
    let mut result = String::new();
    let mut in_string = false;
    let mut escape_next = false;
    let mut word = String::new();

    let flush = |word: &mut String, result: &mut String| {
        if !word.is_empty() {
            result.push_str(&Color::Yellow.paint(word.as_str()).to_string());
            word.clear();
        }
    };

    for c in pretty(value).chars() {
        if escape_next {
            result.push_str(&Color::Green.paint(c.to_string()).to_string());
            escape_next = false;
            continue;
        }

        if in_string {
            match c {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            result.push_str(&Color::Green.paint(c.to_string()).to_string());
            continue;
        }

        if c.is_ascii_alphabetic() {
            word.push(c);
            continue;
        }
        flush(&mut word, &mut result);

        match c {
            '"' => {
                in_string = true;
                result.push_str(&Color::Green.paint("\"").to_string());
            }
            '{' | '}' | '[' | ']' => {
                result.push_str(&Color::White.bold().paint(c.to_string()).to_string())
            }
            _ if c.is_ascii_digit() || c == '.' || c == '-' => {
                result.push_str(&Color::Cyan.paint(c.to_string()).to_string())
            }
            _ => result.push(c),
        }
    }
    flush(&mut word, &mut result);

    result
}
