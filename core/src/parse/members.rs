use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::symbol::{ConstSymbol, FunctionSymbol, StructSymbol, VariableSymbol};

// The grammar is terse, whitespace-insensitive and comment-heavy, so member
// extraction is a tolerant single-pass line scanner rather than a real
// parser. A line that looks like a declaration but does not match is logged
// and skipped; nothing here is fatal.

static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([a-zA-Z0-9()\s]*?)function\s+((coerce)\s*)?([a-zA-Z0-9<>_]*?)\s*([a-zA-Z0-9_-]+)\s*(\(+)(.*)((\s*\))+)\s*(const)?\s*;?\s*(//.*)?",
    )
    .expect("function regex")
});

static EVENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([a-zA-Z0-9()\s]*?)event\s+((coerce)\s*)?([a-zA-Z0-9<>_]*?)\s*([a-zA-Z0-9_-]+)\s*(\(+)(.*)((\s*\))+)\s*(const)?\s*;?\s*(//.*)?",
    )
    .expect("event regex")
});

static CONST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)const\s+([a-zA-Z0-9_]+)\s*=\s*([a-zA-Z0-9"'!_\-.]+);"#).expect("const regex"));

/// Glued generic type and name in one token, e.g. `array<int>intList`.
static GLUED_GENERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+>)([A-Za-z_][A-Za-z0-9_]*)$").expect("glued generic regex"));

/// Member declarations of one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMembers {
    pub functions: Vec<FunctionSymbol>,
    pub variables: Vec<VariableSymbol>,
    pub consts: Vec<ConstSymbol>,
    pub structs: Vec<StructSymbol>,
}

struct MemberScanner<'a> {
    file: &'a Path,
    out: ParsedMembers,
    /// Pending leading comment block; reset by blank lines.
    documentation: String,
    in_cpp_block: bool,
    cpp_depth: usize,
    in_struct: bool,
    /// Variables buffered for the struct currently open.
    struct_variables: Vec<VariableSymbol>,
    /// Set while a signature's argument list has not closed yet.
    awaiting_closing_paren: bool,
    long_line: String,
}

/// Extract the function, variable, const and struct declarations of one
/// file's text.
pub fn parse_members(file: &Path, text: &str) -> ParsedMembers {
    let mut scanner = MemberScanner {
        file,
        out: ParsedMembers::default(),
        documentation: String::new(),
        in_cpp_block: false,
        cpp_depth: 0,
        in_struct: false,
        struct_variables: Vec::new(),
        awaiting_closing_paren: false,
        long_line: String::new(),
    };
    for (index, line) in text.lines().enumerate() {
        scanner.scan_line(index, line);
    }
    scanner.out
}

impl MemberScanner<'_> {
    fn scan_line(&mut self, index: usize, line: &str) {
        let trimmed = line.trim();

        // Documentation never spans a blank line.
        if trimmed.is_empty() {
            self.documentation.clear();
            return;
        }

        if self.in_cpp_block {
            if trimmed == "{" {
                self.cpp_depth += 1;
            } else if trimmed == "}" {
                self.cpp_depth = self.cpp_depth.saturating_sub(1);
            }
            if self.cpp_depth == 0 {
                self.in_cpp_block = false;
            }
            return;
        }
        if trimmed == "cpptext" {
            self.in_cpp_block = true;
            self.cpp_depth = 0;
            return;
        }

        // Closing a struct attaches the buffered variables to the struct
        // created when the block opened.
        if self.in_struct && line.contains("};") {
            self.in_struct = false;
            if let Some(open_struct) = self.out.structs.last_mut() {
                open_struct.members = std::mem::take(&mut self.struct_variables);
            }
            self.struct_variables.clear();
        }

        if trimmed.starts_with("/*") || (trimmed.starts_with('/') && self.documentation.is_empty()) {
            self.documentation = line.to_string();
            return;
        }
        if trimmed.starts_with('*') || trimmed.starts_with("//") {
            if !self.documentation.is_empty() {
                self.documentation.push('\n');
                self.documentation.push_str(line);
            }
            return;
        }

        let left_line = trimmed.split("//").next().unwrap_or("").to_lowercase();

        if self.awaiting_closing_paren {
            if left_line.contains(')') {
                self.awaiting_closing_paren = false;
                self.long_line.push(' ');
                self.long_line.push_str(line);
                let joined = self.long_line.split_whitespace().collect::<Vec<_>>().join(" ");
                if !self.extract_function(&joined, &joined.to_lowercase(), index)
                    && !self.extract_complicated_function(&joined, index)
                {
                    tracing::debug!(file = %self.file.display(), line = index + 1, "unparseable signature: {joined}");
                }
                self.documentation.clear();
                return;
            }
            self.long_line.push(' ');
            self.long_line.push_str(line);
            return;
        }

        let left_tokens: Vec<&str> = left_line.split_whitespace().collect();

        if !self.in_struct && left_tokens.first() == Some(&"struct") {
            self.open_struct(index, line, &left_line);
            self.documentation.clear();
        }

        if left_line.contains("function") || left_line.contains("event") {
            if self.extract_function(line, &left_line, index) {
                self.documentation.clear();
            } else if self.signature_may_continue(&left_tokens) {
                // Argument list not closed on this line; accumulate until a
                // `)` shows up, then retry on the normalized concatenation.
                self.awaiting_closing_paren = true;
                self.long_line = line.to_string();
            } else {
                tracing::debug!(file = %self.file.display(), line = index + 1, "unparseable function/event: {line}");
            }
        } else if left_line.contains("var") {
            self.extract_variables(index, line);
        } else if left_line.contains("const") {
            if self.extract_const(index, line) {
                self.documentation.clear();
            } else {
                tracing::debug!(file = %self.file.display(), line = index + 1, "unparseable const: {line}");
            }
        }
    }

    /// A declaration whose parens are both present but which still failed its
    /// regex is genuinely malformed; only a missing `)` warrants buffering.
    fn signature_may_continue(&self, left_tokens: &[&str]) -> bool {
        for (position, token) in left_tokens.iter().enumerate() {
            if *token == "function" || *token == "event" {
                let remainder = left_tokens[position..].join(" ");
                if remainder.contains('(') && remainder.contains(')') {
                    return false;
                }
                return true;
            }
        }
        false
    }

    fn open_struct(&mut self, index: usize, line: &str, left_line: &str) {
        self.in_struct = true;
        self.struct_variables.clear();

        let trimmed = line.trim();
        let signature = if left_line.contains("extends") {
            split_case_insensitive(trimmed, "extends").trim()
        } else {
            trimmed
        };
        let name = signature
            .trim_end_matches('{')
            .split_whitespace()
            .last()
            .unwrap_or("")
            .to_string();
        self.out.structs.push(StructSymbol {
            name,
            declaration_line: signature.trim_end_matches('{').trim().to_string(),
            line: index + 1,
            file: self.file.to_path_buf(),
            documentation: std::mem::take(&mut self.documentation),
            members: Vec::new(),
        });
    }

    fn extract_function(&mut self, line: &str, left_line: &str, index: usize) -> bool {
        let is_function = if left_line.contains("function") {
            true
        } else if left_line.contains("event") {
            false
        } else {
            return false;
        };
        let regex: &Regex = if is_function { &FUNCTION_RE } else { &EVENT_RE };

        let Some(captures) = regex.captures(line.trim()) else {
            return false;
        };
        let name = captures.get(5).map_or("", |m| m.as_str()).trim().to_string();
        if name.is_empty() {
            return false;
        }
        self.out.functions.push(FunctionSymbol {
            modifiers: captures.get(1).map_or("", |m| m.as_str()).trim().to_string(),
            return_type: captures.get(4).map_or("", |m| m.as_str()).trim().to_string(),
            name,
            arguments: captures.get(7).map_or("", |m| m.as_str()).trim().to_string(),
            line: index + 1,
            file: self.file.to_path_buf(),
            documentation: self.documentation.clone(),
            is_function,
        });
        true
    }

    /// Fallback for signatures with an extra qualifier between the keyword
    /// and the return type: drop one token after the keyword and retry.
    fn extract_complicated_function(&mut self, line: &str, index: usize) -> bool {
        let lower = line.to_lowercase();
        let keyword = if lower.contains("function") {
            "function"
        } else if lower.contains("event") {
            "event"
        } else {
            return false;
        };

        let prefix = split_case_insensitive(line, keyword);
        let after = rest_after_keyword(line, keyword);
        let remainder = after.split_whitespace().skip(1).collect::<Vec<_>>().join(" ");
        let reconstructed = format!("{} {} {}", prefix.trim(), keyword, remainder);
        self.extract_function(&reconstructed, &reconstructed.to_lowercase(), index)
    }

    fn extract_variables(&mut self, index: usize, line: &str) {
        let (declaration, inline_comment) = match line.split_once("//") {
            Some((decl, comment)) => (decl, comment.trim_end()),
            None => match line.split_once("/**") {
                Some((decl, comment)) => (decl, comment.trim_end()),
                None => (line, ""),
            },
        };

        let mut tokens: Vec<String> = declaration.split_whitespace().map(str::to_string).collect();
        let starts_with_var = tokens
            .first()
            .map(|first| first.to_lowercase().contains("var"))
            .unwrap_or(false);
        if !starts_with_var {
            return;
        }

        let Some(last) = tokens.pop() else {
            return;
        };
        let mut names = vec![last.trim_end_matches([';', ',', ' ', '\t']).to_string()];

        // `var int a, b, c;` — keep popping while the preceding token still
        // carries a comma.
        while tokens.last().is_some_and(|token| token.contains(',')) {
            let Some(next) = tokens.pop() else { break };
            names.push(next.trim_end_matches([',', ' ', '\t']).to_string());
        }

        // A generic close glued to the first popped name without a space,
        // e.g. `array<int>intList` — split it back into type and name.
        if let Some(first_name) = names.first_mut() {
            if first_name.contains('>') && !first_name.ends_with('>') {
                if let Some(captures) = GLUED_GENERIC_RE.captures(first_name) {
                    let type_token = captures[1].to_string();
                    *first_name = captures[2].to_string();
                    tokens.push(type_token);
                }
            }
        }

        // Popped right-to-left; restore declaration order.
        names.reverse();

        for name in names {
            if name.is_empty() {
                continue;
            }
            let variable = VariableSymbol {
                modifiers: tokens.clone(),
                name,
                inline_comment: inline_comment.to_string(),
                documentation: self.documentation.clone(),
                line: index + 1,
                file: self.file.to_path_buf(),
            };
            if self.in_struct {
                self.struct_variables.push(variable);
            } else {
                self.out.variables.push(variable);
            }
        }
        self.documentation.clear();
    }

    fn extract_const(&mut self, index: usize, line: &str) -> bool {
        let Some(captures) = CONST_RE.captures(line.trim()) else {
            return false;
        };
        let inline_comment = line
            .split_once("//")
            .map(|(_, comment)| comment.trim().to_string())
            .unwrap_or_default();
        self.out.consts.push(ConstSymbol {
            name: captures[1].to_string(),
            value: captures[2].to_string(),
            documentation: self.documentation.clone(),
            inline_comment,
            line: index + 1,
            file: self.file.to_path_buf(),
        });
        true
    }
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
/// Offsets from a lowered copy would drift on length-changing case folds;
/// the needles are ASCII keywords, so matching over the original bytes
/// always lands on a character boundary.
fn find_ascii_case_insensitive(text: &str, needle: &str) -> Option<usize> {
    text.as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Text before the first case-insensitive occurrence of `needle`.
fn split_case_insensitive<'a>(text: &'a str, needle: &str) -> &'a str {
    match find_ascii_case_insensitive(text, needle) {
        Some(position) => &text[..position],
        None => text,
    }
}

fn rest_after_keyword<'a>(text: &'a str, keyword: &str) -> &'a str {
    match find_ascii_case_insensitive(text, keyword) {
        Some(position) => &text[position + keyword.len()..],
        None => "",
    }
}
