//! Line classification for the directive grammar.
//!
//! A line is a directive iff, after trimming leading whitespace, it starts
//! with the `.` marker followed by an identifier (`[A-Za-z0-9_]+`) and then
//! end-of-line or whitespace. Everything else is plain text — a marker not
//! followed by a valid identifier stays usable in ordinary prose.

/// Marker character that opens a directive line.
pub(crate) const DIRECTIVE_MARKER: char = '.';

/// One classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineRecord<'a> {
    /// Plain text, passed through untouched.
    Text(&'a str),
    /// A directive invocation.
    Directive {
        command: &'a str,
        /// Remainder of the line after the command token, trimmed.
        argument: &'a str,
        /// The trimmed directive line, as handed to handlers.
        raw: &'a str,
    },
}

/// Classify every line of `text`. Restartable; each call yields a fresh
/// iterator borrowing from `text`.
pub(crate) fn scan(text: &str) -> impl Iterator<Item = LineRecord<'_>> {
    text.lines().map(classify)
}

pub(crate) fn classify(line: &str) -> LineRecord<'_> {
    let trimmed = line.trim_start();
    let Some(rest) = trimmed.strip_prefix(DIRECTIVE_MARKER) else {
        return LineRecord::Text(line);
    };

    let command_end = rest
        .find(|c: char| !is_identifier_char(c))
        .unwrap_or(rest.len());
    if command_end == 0 {
        // marker without an identifier: plain prose
        return LineRecord::Text(line);
    }

    let (command, remainder) = rest.split_at(command_end);
    if !remainder.is_empty() && !remainder.starts_with(char::is_whitespace) {
        return LineRecord::Text(line);
    }

    LineRecord::Directive {
        command,
        argument: remainder.trim(),
        raw: trimmed.trim_end(),
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
