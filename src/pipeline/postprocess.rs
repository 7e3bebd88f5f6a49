//! Post-processing: deterministic cleanup of model and extractor output.
//!
//! Language models occasionally wrap their answer in ```` ```markdown ````
//! fences, emit CRLF line endings or sprinkle zero-width characters into
//! the text. pdfium's text layer has its own quirks (CR-only line breaks,
//! trailing spaces on every line, long blank runs between text objects).
//! The rules below fix these without touching content.
//!
//! Three entry points apply the subset of rules that makes sense for each
//! source:
//!
//! | Function | Used for |
//! |----------|----------|
//! | [`clean_solution`]      | generated solutions (full Markdown cleanup) |
//! | [`clean_transcription`] | OCR output from the vision model |
//! | [`normalise_text`]      | PDF text layer |

use once_cell::sync::Lazy;
use regex::Regex;

/// Full cleanup for generated Markdown solutions.
///
/// Rules (applied in order):
/// 1. Strip outer markdown fences
/// 2. Normalise line endings (CRLF / CR → LF)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Ensure headings outside code blocks have a blank line before them
/// 6. Strip invisible Unicode
/// 7. End with exactly one newline
pub fn clean_solution(input: &str) -> String {
    let s = strip_markdown_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = normalise_heading_spacing(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

/// Cleanup for OCR transcriptions. Leaves no trailing newline.
pub fn clean_transcription(input: &str) -> String {
    let s = strip_markdown_fences(input);
    normalise_text(&s)
}

/// Light normalisation for extracted text: line endings, trailing
/// whitespace, blank-line runs, invisible characters. Leading and trailing
/// blank lines are removed.
pub fn normalise_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    s.trim_matches('\n').to_string()
}

// ── Rule 1: Strip outer markdown fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|md)?\r?\n(.*)\r?\n```\s*$").unwrap());

fn strip_markdown_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 5: Heading spacing ──────────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").unwrap());

/// Insert a blank line before ATX headings. Lines inside fenced code blocks
/// are left alone: a `# comment` in a Python solution is not a heading.
fn normalise_heading_spacing(input: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut in_code = false;

    for line in input.lines() {
        if line.trim_start().starts_with("```") {
            in_code = !in_code;
        } else if !in_code && RE_HEADING.is_match(line) {
            if let Some(prev) = out.last() {
                if !prev.is_empty() {
                    out.push("");
                }
            }
        }
        out.push(line);
    }

    out.join("\n")
}

// ── Rule 6: Remove invisible Unicode characters ─────────────────────────────

// ZWJ and ZWNJ are left alone: they shape Indic and Persian script and
// emoji sequences.

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 7: Single final newline ─────────────────────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fence() {
        let input = "```markdown\n# Q1\nAnswer\n```";
        assert_eq!(strip_markdown_fences(input), "# Q1\nAnswer");
    }

    #[test]
    fn keeps_inner_code_blocks() {
        let input = "# Q1\n```python\nprint(4)\n```\nDone";
        assert_eq!(strip_markdown_fences(input), input);
    }

    #[test]
    fn normalises_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn heading_gets_blank_line() {
        let out = normalise_heading_spacing("Intro\n## Question 1\nText");
        assert_eq!(out, "Intro\n\n## Question 1\nText");
    }

    #[test]
    fn code_comments_are_not_headings() {
        let input = "```python\nx = 2\n# add two\ny = x + 2\n```";
        assert_eq!(normalise_heading_spacing(input), input);
    }

    #[test]
    fn removes_invisible_chars() {
        let input = "2\u{200B}+2\u{FEFF}=4";
        assert_eq!(remove_invisible_chars(input), "2+2=4");
    }

    #[test]
    fn solution_keeps_joiners() {
        let out = clean_solution("क्\u{200D}ष and می\u{200C}خواهم");
        assert_eq!(out, "क्\u{200D}ष and می\u{200C}خواهم\n");
    }

    #[test]
    fn solution_ends_with_single_newline() {
        let out = clean_solution("```markdown\n# Solutions\r\n\r\nQ1: 4   \n\n\n\n\n```");
        assert_eq!(out, "# Solutions\n\nQ1: 4\n");
    }

    #[test]
    fn transcription_has_no_trailing_newline() {
        assert_eq!(clean_transcription("```\nQ1. 2+2=?\n```"), "Q1. 2+2=?");
    }

    #[test]
    fn normalise_text_trims_outer_blank_lines() {
        assert_eq!(normalise_text("\r\n\r\nQ1  \r\nQ2\r\n\r\n"), "Q1\nQ2");
    }

    #[test]
    fn normalise_text_of_whitespace_is_blank() {
        assert!(normalise_text(" \n \r\n\t").trim().is_empty());
    }
}
