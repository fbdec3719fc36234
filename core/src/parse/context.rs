use once_cell::sync::Lazy;
use regex::Regex;

// Classifiers for the text left of the cursor. They decide which resolution
// strategy applies to the token under the cursor.

const OPERATOR_CHARS: &str = "+-*/%&|^!<>=";

/// A declaration context: the fragment mentions `function`/`event` and is not
/// an opening brace line.
pub fn is_function_or_event(line: &str) -> bool {
    let lower = line.to_lowercase();
    (lower.contains("function") || lower.contains("event")) && !line.contains('{')
}

/// Inside an open bracket or parameter list, or right after a statement end.
pub fn is_in_bracket_variable(line: &str) -> bool {
    if line.ends_with('{') || line.ends_with(';') || line.ends_with('(') {
        return true;
    }
    line.rsplit('(')
        .next()
        .map(|tail| tail.trim_end().ends_with(','))
        .unwrap_or(false)
}

pub fn ends_with_operator(line: &str) -> bool {
    line.trim_end()
        .chars()
        .next_back()
        .map(|c| OPERATOR_CHARS.contains(c))
        .unwrap_or(false)
}

static FOREACH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)foreach\s*(.*)").expect("foreach regex"));
static STATIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)static\.").expect("static regex"));

/// Reduce a dotted fragment to the expression chain that determines its
/// receiver type: cut everything up to the last operator, strip a leading
/// `foreach`, and drop `static.` qualifiers.
pub fn strip_context_prefixes(line: &str) -> String {
    let after_operator = match line.rfind(|c: char| OPERATOR_CHARS.contains(c)) {
        Some(position) => line[position + 1..].trim(),
        None => line,
    };
    let after_foreach = FOREACH_RE
        .captures(after_operator)
        .map(|captures| captures[1].trim().to_string())
        .unwrap_or_else(|| after_operator.to_string());
    STATIC_RE.replace_all(&after_foreach, "").into_owned()
}

/// Content of the innermost unclosed `(`, or the whole trimmed line when the
/// parens are balanced. `None` if the line is unbalanced without any `(`.
pub fn extract_unclosed_bracket_content(line: &str) -> Option<String> {
    let mut depth: i32 = 0;
    let mut last_open = None;
    for (index, c) in line.char_indices() {
        if c == '(' {
            depth += 1;
            last_open = Some(index);
        } else if c == ')' {
            depth -= 1;
        }
    }
    if depth == 0 {
        return Some(line.trim().to_string());
    }
    last_open.map(|index| line[index + 1..].trim().to_string())
}
