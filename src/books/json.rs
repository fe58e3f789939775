//! JSON parsing with located, path-aware error messages for upstream payloads.

use anyhow::Result;

/// Characters of context shown on each side of a parse error.
const SNIPPET_RADIUS: usize = 16;

/// Parse a JSON body, reporting failures with the serde path, a readable type
/// mismatch, and a snippet of the offending line.
pub fn parse_json_with_context<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let inner = err.inner();
        let (line, column) = (inner.line(), inner.column());
        let path = err.path().to_string();

        let message = inner.to_string();
        let location = format!(" at line {line} column {column}");
        let message = message.strip_suffix(&location).unwrap_or(&message);

        let mut report = String::new();
        if !path.is_empty() && path != "." {
            report.push_str(&format!("at path '{path}': "));
        }
        report.push_str(&format!(
            "{} (line {line} col {column})\n{}",
            describe_mismatch(message),
            snippet(body, line, column)
        ));
        anyhow::anyhow!(report)
    })
}

/// Rewrite serde's `invalid type: X, expected Y` as `expected Y, got X`.
fn describe_mismatch(message: &str) -> String {
    message
        .strip_prefix("invalid type: ")
        .and_then(|rest| rest.split_once(", expected "))
        .map(|(actual, expected)| format!("expected {expected}, got {actual}"))
        .unwrap_or_else(|| message.to_owned())
}

/// Excerpt of `line` (1-based) around `column` (1-based, in bytes) with a caret.
///
/// Slices on char boundaries so descriptions with multibyte text never panic.
fn snippet(body: &str, line: usize, column: usize) -> String {
    let Some(text) = body.lines().nth(line.saturating_sub(1)) else {
        return "(end of input)".to_owned();
    };
    if text.is_empty() {
        return "(empty line)".to_owned();
    }

    let error_byte = column.saturating_sub(1).min(text.len());
    let error_char = text
        .char_indices()
        .take_while(|(i, _)| *i < error_byte)
        .count();

    let start = error_char.saturating_sub(SNIPPET_RADIUS);
    let excerpt: String = text
        .chars()
        .skip(start)
        .take(SNIPPET_RADIUS * 2)
        .collect();
    let caret = " ".repeat(error_char - start) + "^";

    format!("...{excerpt}...\n   {caret}")
}
