use crate::symbol::Symbol;
use crate::table::SymbolTable;

const FENCE: &str = "```UnrealScript";

/// Markdown hover text for a resolved symbol: the declaration in a fenced
/// code block, documentation above it where the symbol carries any.
pub fn hover_text(table: &SymbolTable, symbol: &Symbol) -> String {
    match symbol {
        Symbol::Class(id) => {
            let class = table.class(*id);
            with_documentation(&comment_lines(&class.documentation), &class.declaration())
        }
        Symbol::Function(function) => {
            with_documentation(&function.documentation_text(), &function.declaration())
        }
        Symbol::Variable(variable) => {
            with_documentation(&comment_lines(&variable.documentation), &variable.declaration())
        }
        Symbol::Const(constant) => {
            with_documentation(&comment_lines(&constant.documentation), &constant.declaration())
        }
        Symbol::Struct(structure) => {
            let mut body = format!("{} {{", structure.declaration());
            for member in &structure.members {
                body.push_str("\n    ");
                body.push_str(&member.declaration());
            }
            body.push_str("\n}");
            with_documentation(&comment_lines(&structure.documentation), &body)
        }
    }
}

fn with_documentation(documentation: &str, code: &str) -> String {
    if documentation.is_empty() {
        format!("{FENCE}\n{code}\n```")
    } else {
        format!("{documentation}\n\n{FENCE}\n{code}\n```")
    }
}

/// The comment lines of a raw leading block, dropping declaration text that
/// accumulated alongside them.
fn comment_lines(documentation: &str) -> String {
    documentation
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.is_empty() && (trimmed.starts_with('/') || trimmed.starts_with('*'))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::symbol::{ClassHeader, ConstSymbol, FunctionSymbol, StructSymbol, VariableSymbol};
    use crate::table::SymbolTable;

    fn empty_table() -> SymbolTable {
        SymbolTable::new()
    }

    #[test]
    fn function_hover_is_a_closed_code_block() {
        let function = FunctionSymbol {
            modifiers: "simulated".to_string(),
            return_type: "bool".to_string(),
            name: "DoThing".to_string(),
            arguments: "int a".to_string(),
            line: 3,
            file: PathBuf::from("/src/Test.uc"),
            documentation: "/** does the thing */".to_string(),
            is_function: true,
        };
        let text = hover_text(&empty_table(), &Symbol::Function(function));
        assert!(text.starts_with("/** does the thing */"));
        assert!(text.contains("```UnrealScript\nsimulated function bool DoThing(int a)\n```"));
    }

    #[test]
    fn class_hover_shows_extends_clause() {
        let mut table = SymbolTable::new();
        let id = table.add_class(ClassHeader {
            name: "PlayerPawn".to_string(),
            parent_name: "pawn".to_string(),
            documentation: "/** a player */\nclass PlayerPawn extends Pawn;".to_string(),
            file: Path::new("/src/PlayerPawn.uc").to_path_buf(),
        });
        let text = hover_text(&table, &Symbol::Class(id));
        assert!(text.contains("class PlayerPawn extends pawn"));
        // The header's declaration line never leaks into the doc section.
        assert!(text.starts_with("/** a player */"));
        assert!(text.ends_with("```"));
    }

    #[test]
    fn struct_hover_lists_members_inside_the_block() {
        let structure = StructSymbol {
            name: "Point".to_string(),
            declaration_line: "struct Point".to_string(),
            line: 5,
            file: PathBuf::from("/src/Test.uc"),
            documentation: String::new(),
            members: vec![VariableSymbol {
                modifiers: vec!["var".to_string(), "int".to_string()],
                name: "X".to_string(),
                inline_comment: String::new(),
                documentation: String::new(),
                line: 6,
                file: PathBuf::from("/src/Test.uc"),
            }],
        };
        let text = hover_text(&empty_table(), &Symbol::Struct(structure));
        assert!(text.contains("struct Point {"));
        assert!(text.contains("    var int X;"));
        assert!(text.trim_end().ends_with("```"));
    }

    #[test]
    fn const_hover_keeps_inline_comment() {
        let constant = ConstSymbol {
            name: "MaxPlayers".to_string(),
            value: "32".to_string(),
            documentation: String::new(),
            inline_comment: "engine limit".to_string(),
            line: 2,
            file: PathBuf::from("/src/Test.uc"),
        };
        let text = hover_text(&empty_table(), &Symbol::Const(constant));
        assert!(text.contains("const MaxPlayers = 32;"));
        assert!(text.contains("engine limit"));
    }
}
