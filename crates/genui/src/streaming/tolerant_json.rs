//! Tolerant JSON parsing for incomplete input
//!
//! Used only to preview an open json fence while the model is still writing
//! it. Parse errors of a fence are reported after it closes, never from here.

use serde_json::Value;
use std::collections::VecDeque;

/// Earlier cut points tried after closing the whole input fails
const MAX_CUTS: usize = 8;

/// Parse possibly incomplete JSON.
///
/// Closes an unterminated string, drops a dangling separator and closes
/// open brackets. If that still fails, falls back to cutting the input at
/// one of the last few commas. The input is scanned once.
pub fn parse_tolerant_json(json_str: &str) -> Option<Value> {
    let trimmed = json_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Try standard parse first
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    let scanned = scan(trimmed);
    if let Some(value) = close_and_parse(trimmed, &scanned.end) {
        return Some(value);
    }
    scanned.cuts.iter().rev().find_map(|cut| {
        let head = trimmed.get(..cut.offset)?;
        close_and_parse(head, &cut.state)
    })
}

#[derive(Debug, Clone, Default)]
struct State {
    in_string: bool,
    escaped: bool,
    /// Closers for every bracket still open, innermost last
    closers: Vec<char>,
}

/// A comma outside strings and the bracket state just before it
#[derive(Debug)]
struct Cut {
    offset: usize,
    state: State,
}

#[derive(Debug, Default)]
struct Scan {
    end: State,
    /// The last `MAX_CUTS` commas, oldest first
    cuts: VecDeque<Cut>,
}

fn scan(input: &str) -> Scan {
    let mut scan = Scan::default();
    let state = &mut scan.end;
    for (idx, ch) in input.char_indices() {
        if state.in_string {
            if state.escaped {
                state.escaped = false;
            } else if ch == '\\' {
                state.escaped = true;
            } else if ch == '"' {
                state.in_string = false;
            }
            continue;
        }
        match ch {
            '"' => state.in_string = true,
            '{' => state.closers.push('}'),
            '[' => state.closers.push(']'),
            '}' | ']' => {
                state.closers.pop();
            }
            ',' => {
                if scan.cuts.len() == MAX_CUTS {
                    scan.cuts.pop_front();
                }
                scan.cuts.push_back(Cut {
                    offset: idx,
                    state: state.clone(),
                });
            }
            _ => {}
        }
    }
    scan
}

fn close_and_parse(head: &str, state: &State) -> Option<Value> {
    let mut fixed = head.trim_end().to_string();

    // Fix unclosed string
    if state.in_string {
        if state.escaped {
            fixed.pop();
        }
        fixed.push('"');
    }

    // Drop dangling separators
    let len = fixed.trim_end().len();
    fixed.truncate(len);
    if fixed.ends_with(',') {
        fixed.pop();
    } else if fixed.ends_with(':') {
        fixed.push_str("null");
    }

    // Fix unclosed brackets
    for closer in state.closers.iter().rev() {
        fixed.push(*closer);
    }

    serde_json::from_str(&fixed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("", None ; "empty")]
    #[test_case("{\"a\": 1}", Some(json!({"a": 1})) ; "complete")]
    #[test_case("{\"a\": [1, 2", Some(json!({"a": [1, 2]})) ; "open array")]
    #[test_case("{\"a\": \"hel", Some(json!({"a": "hel"})) ; "open string")]
    #[test_case("{\"a\": 1,", Some(json!({"a": 1})) ; "trailing comma")]
    #[test_case("{\"a\":", Some(json!({"a": null})) ; "dangling colon")]
    #[test_case("{\"a\": 1, \"b", Some(json!({"a": 1})) ; "partial key cut at comma")]
    #[test_case("{\"a\": \"x\\", Some(json!({"a": "x"})) ; "dangling escape")]
    fn test_parse_tolerant_json(input: &str, expected: Option<Value>) {
        assert_eq!(parse_tolerant_json(input), expected);
    }

    #[test]
    fn test_brackets_inside_strings_are_ignored() {
        let value = parse_tolerant_json(r#"{"text": "a { [ b", "n": [1"#).unwrap();
        assert_eq!(value, json!({ "text": "a { [ b", "n": [1] }));
    }

    #[test]
    fn test_partial_a2ui_envelope_preview() {
        let partial = r#"{"surfaceUpdate": {"components": [{"id": "t1", "component": {"Timeline": {"data": {"title": {"text": {"headline": "Hist"#;
        let value = parse_tolerant_json(partial).unwrap();
        assert_eq!(
            value["surfaceUpdate"]["components"][0]["component"]["Timeline"]["data"]["title"]
                ["text"]["headline"],
            json!("Hist")
        );
    }

    #[test]
    fn test_only_recent_commas_are_cut_points() {
        let mut input = String::from(r#"{"ok": 1, "bad": tru"#);
        for i in 0..MAX_CUTS + 1 {
            input.push_str(&format!(r#", "k{}": {}"#, i, i));
        }
        assert_eq!(parse_tolerant_json(&input), None);

        let value = parse_tolerant_json(r#"{"a": [1, 2], "b": tru, "c": 3, "d"#).unwrap();
        assert_eq!(value, json!({ "a": [1, 2] }));
    }

    #[test]
    fn test_large_malformed_input_is_scanned_once() {
        let mut input = String::from("{\"surfaceUpdate\": {\"components\": [");
        for i in 0..4000 {
            input.push_str(&format!(r#"{{"id": "c{}", "x": tru}}, "#, i));
        }

        let started = std::time::Instant::now();
        assert_eq!(parse_tolerant_json(&input), None);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_hopeless_input_is_none() {
        assert_eq!(parse_tolerant_json("tru"), None);
    }
}
