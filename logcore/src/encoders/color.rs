// src/encoders/color.rs
use crate::model::{Severity, RESET};
use once_cell::sync::Lazy;
use regex::Regex;

// Leading `[<Severity>]` tag of a rendered line. `Custom` never matches.
static SEVERITY_DETECTOR: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^\[(Unknown|Info|Warning|Debug|Error)\]").expect("Severity regex should be valid")
});

// A bracketed routing tag closing a line that has a `:` somewhere before it,
// e.g. `accepted tcp:example.com:443 [proxy]`.
static ROUTING_DETECTOR: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?m):.*[^\[].*(\[.*?\])$").expect("Routing regex should be valid")
});

/// Wraps text in the color of one severity.
#[derive(Debug, Clone, Copy)]
pub struct Brush {
  color: &'static str,
}

impl Brush {
  pub fn new(severity: Severity) -> Self {
    Self {
      color: severity.color(),
    }
  }

  /// Wraps `s` in the color escape and a reset.
  ///
  /// A trailing `\n` or `\r\n` is spliced back after the reset so the style
  /// never runs into the next line. Empty input yields empty output.
  pub fn paint(&self, s: &str) -> String {
    if s.is_empty() {
      return String::new();
    }

    let end = line_body_end(s);
    let mut out = String::with_capacity(s.len() + self.color.len() + RESET.len());
    out.push_str(self.color);
    out.push_str(&s[..end]);
    out.push_str(RESET);
    out.push_str(&s[end..]);
    out
  }
}

/// Byte offset where the line terminator (if any) starts.
fn line_body_end(s: &str) -> usize {
  if let Some(body) = s.strip_suffix("\r\n") {
    body.len()
  } else if let Some(body) = s.strip_suffix('\n') {
    body.len()
  } else {
    s.len()
  }
}

/// Finds the severity named by the line's leading `[<Severity>]` tag.
pub fn detect_severity(line: &str) -> Option<Severity> {
  SEVERITY_DETECTOR
    .captures(line)
    .and_then(|caps| caps.get(1))
    .and_then(|m| m.as_str().parse().ok())
}

/// Applies terminal styling to an already-rendered log line.
///
/// The trailing routing tag (if any) is painted with `Custom` first, then the
/// whole line is painted with the color of its severity tag, `Info` when the
/// line carries none.
pub fn colorize_line(line: &str) -> String {
  let mut styled = match ROUTING_DETECTOR.captures(line).and_then(|caps| caps.get(1)) {
    Some(tag) => {
      let mut s = String::with_capacity(line.len() + 16);
      s.push_str(&line[..tag.start()]);
      s.push_str(&Brush::new(Severity::Custom).paint(tag.as_str()));
      s.push_str(&line[tag.end()..]);
      s
    }
    None => line.to_string(),
  };

  let severity = detect_severity(&styled).unwrap_or(Severity::Info);
  styled = Brush::new(severity).paint(&styled);
  styled
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn paint_keeps_terminators_outside_the_escape() {
    let brush = Brush::new(Severity::Error);
    assert_eq!(brush.paint("boom\n"), "\x1b[31mboom\x1b[0m\n");
    assert_eq!(brush.paint("boom\r\n"), "\x1b[31mboom\x1b[0m\r\n");
    assert_eq!(brush.paint("boom"), "\x1b[31mboom\x1b[0m");
  }

  #[test]
  fn paint_of_empty_string_is_empty() {
    assert_eq!(Brush::new(Severity::Info).paint(""), "");
    assert_eq!(colorize_line(""), "");
  }

  #[test]
  fn bare_newline_paints_an_empty_span() {
    assert_eq!(Brush::new(Severity::Debug).paint("\n"), "\x1b[34m\x1b[0m\n");
  }

  #[test]
  fn routing_tag_and_severity_are_both_styled() {
    let out = colorize_line("[Error] failed: boom [route1]\n");
    assert_eq!(
      out,
      "\x1b[31m[Error] failed: boom \x1b[1;33m[route1]\x1b[0m\x1b[0m\n"
    );
  }

  #[test]
  fn untagged_line_defaults_to_info() {
    assert_eq!(colorize_line("hello\n"), "\x1b[36mhello\x1b[0m\n");
  }

  #[test]
  fn brackets_without_colon_are_not_a_routing_tag() {
    assert_eq!(
      colorize_line("[Warning] retrying [later]\n"),
      "\x1b[33m[Warning] retrying [later]\x1b[0m\n"
    );
  }

  #[test]
  fn custom_tag_is_not_a_severity() {
    assert_eq!(detect_severity("[Custom] x"), None);
    assert_eq!(detect_severity("[Debug] x"), Some(Severity::Debug));
    assert_eq!(detect_severity(" [Debug] x"), None);
  }
}
