//! Chat-style preview of the most recent user/bot exchange

use chrono::{NaiveTime, Timelike};

pub const BOT_NAME: &str = "OneTappe Bot";

/// Share of the pane a bubble may occupy, in percent
const BUBBLE_WIDTH_PCT: usize = 80;

/// The latest exchange; older messages are not kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub user: Option<String>,
    pub bot: Option<String>,
}

impl Transcript {
    /// A transcript holding only a freshly submitted user message
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            user: Some(message.into()),
            bot: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.bot.is_none()
    }
}

/// `HH:MM` stamp shown under each bubble
pub fn format_clock(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Render the transcript into `width` columns.
///
/// The user bubble is right-aligned, the bot bubble left-aligned; both carry
/// the same `now` stamp.
pub fn render_preview(transcript: &Transcript, width: usize, now: NaiveTime) -> Vec<String> {
    let width = width.max(10);
    let bubble_max = width * BUBBLE_WIDTH_PCT / 100;
    let stamp = format_clock(now);

    let mut lines = vec![format!("{} · online", BOT_NAME), String::new()];

    if let Some(user) = transcript.user.as_deref().filter(|m| !m.is_empty()) {
        for line in bubble(user, &stamp, bubble_max) {
            lines.push(format!("{:>width$}", line, width = width));
        }
        lines.push(String::new());
    }

    if let Some(bot) = transcript.bot.as_deref().filter(|m| !m.is_empty()) {
        lines.extend(bubble(bot, &stamp, bubble_max));
        lines.push(String::new());
    }

    lines
}

/// Wrapped text followed by the stamp, all padded to the bubble's width
fn bubble(text: &str, stamp: &str, max: usize) -> Vec<String> {
    let mut lines = wrap(text, max);
    let inner = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(stamp.chars().count());

    for line in &mut lines {
        let pad = inner - line.chars().count();
        line.extend(std::iter::repeat(' ').take(pad));
    }
    lines.push(format!("{:>inner$}", stamp, inner = inner));
    lines
}

/// Greedy word wrap on character counts; words longer than `max` are split
fn wrap(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > max {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = word.split_off(max);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            if line_len > 0 && line_len + 1 + word.len() > max {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line_len += word.len();
            line.extend(word);
        }

        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
