use std::path::PathBuf;

/// A `function` or `event` declaration. Immutable once extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    /// Raw prefix text before the keyword (`simulated`, `native(237) final`, ...).
    pub modifiers: String,
    /// Declared return type, empty for procedures.
    pub return_type: String,
    pub name: String,
    /// Unparsed parameter list text, whitespace-normalized for multi-line
    /// signatures.
    pub arguments: String,
    /// 1-based line of the declaration.
    pub line: usize,
    pub file: PathBuf,
    /// Leading comment block, if any.
    pub documentation: String,
    /// `true` for `function`, `false` for `event`.
    pub is_function: bool,
}

impl FunctionSymbol {
    pub fn keyword(&self) -> &'static str {
        if self.is_function { "function" } else { "event" }
    }

    /// Single-line declaration used for hover and completion details.
    pub fn declaration(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.modifiers.is_empty() {
            parts.push(&self.modifiers);
        }
        parts.push(self.keyword());
        if !self.return_type.is_empty() {
            parts.push(&self.return_type);
        }
        let head = parts.join(" ");
        format!("{} {}({})", head, self.name, self.arguments)
    }

    /// The comment lines of the leading documentation block.
    pub fn documentation_text(&self) -> String {
        self.documentation
            .lines()
            .filter(|line| {
                let trimmed = line.trim_start();
                !trimmed.is_empty() && (trimmed.starts_with('/') || trimmed.starts_with('*'))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A `var` declaration. `modifiers` keeps the qualifier and type tokens in
/// declaration order, e.g. `["var", "config", "array<class<Foo>>"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSymbol {
    pub modifiers: Vec<String>,
    pub name: String,
    /// Trailing `//` or `/**` comment on the declaration line.
    pub inline_comment: String,
    pub documentation: String,
    pub line: usize,
    pub file: PathBuf,
}

impl VariableSymbol {
    pub fn modifier_text(&self) -> String {
        self.modifiers.join(" ")
    }

    pub fn declaration(&self) -> String {
        let comment = if self.inline_comment.trim().is_empty() {
            String::new()
        } else {
            format!(" // {}", self.inline_comment.trim())
        };
        format!("{} {};{}", self.modifier_text(), self.name, comment)
    }

    /// Declared type of the variable, with `level` layers of generic nesting
    /// peeled off.
    ///
    /// Level 0 classifies the outermost type: a plain type names itself, a
    /// generic wrapper collapses to the built-in `array`/`class` keyword.
    /// Each extra level unwraps one `<...>` layer instead:
    /// `array<class<Pawn>>` is `array` at level 0, `class<Pawn>` at level 1
    /// and `Pawn` at level 2.
    pub fn type_at_level(&self, level: usize) -> String {
        let base = self.base_type();
        if level == 0 {
            return classify_wrapper(base);
        }
        let mut ty = base;
        for _ in 0..level {
            let inner: Vec<&str> = ty.split('<').skip(1).collect();
            ty = inner.join("<");
        }
        trim_unbalanced_close(&ty).to_string()
    }

    /// The type portion of the modifier list: everything from the last
    /// generic wrapper token onward, or just the final token.
    fn base_type(&self) -> String {
        let wrapper = self.modifiers.iter().rposition(|token| {
            let lower = token.to_lowercase();
            lower.contains("array<") || lower.contains("class<")
        });
        match wrapper {
            Some(index) => self.modifiers[index..].join(" ").trim().to_string(),
            None => self
                .modifiers
                .last()
                .map(|token| token.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

fn classify_wrapper(ty: String) -> String {
    let lower = ty.to_lowercase();
    if lower.starts_with("class<") {
        return "class".to_string();
    }
    if lower.starts_with("array<") {
        return "array".to_string();
    }
    ty
}

/// Drop trailing `>` left over from splitting a nested generic open.
fn trim_unbalanced_close(ty: &str) -> &str {
    let mut trimmed = ty.trim();
    while trimmed.ends_with('>') {
        let opens = trimmed.matches('<').count();
        let closes = trimmed.matches('>').count();
        if closes <= opens {
            break;
        }
        trimmed = trimmed[..trimmed.len() - 1].trim_end();
    }
    trimmed
}

/// A `const NAME = literal;` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstSymbol {
    pub name: String,
    /// Raw literal text on the right-hand side.
    pub value: String,
    pub documentation: String,
    pub inline_comment: String,
    pub line: usize,
    pub file: PathBuf,
}

impl ConstSymbol {
    pub fn declaration(&self) -> String {
        let comment = if self.inline_comment.trim().is_empty() {
            String::new()
        } else {
            format!("    // {}", self.inline_comment.trim())
        };
        format!("const {} = {};{}", self.name.trim(), self.value, comment)
    }
}

/// A nested value-type `struct` declaration. Members become visible only
/// once the closing `};` of the block has been parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct StructSymbol {
    pub name: String,
    /// Raw header text of the struct, `extends` clause stripped.
    pub declaration_line: String,
    pub line: usize,
    pub file: PathBuf,
    pub documentation: String,
    pub members: Vec<VariableSymbol>,
}

impl StructSymbol {
    pub fn declaration(&self) -> String {
        self.declaration_line.trim().to_string()
    }

    pub fn member(&self, name: &str) -> Option<&VariableSymbol> {
        self.members
            .iter()
            .find(|member| member.name.eq_ignore_ascii_case(name))
    }
}
