use std::path::Path;

use super::members::parse_members;

fn parse(text: &str) -> super::members::ParsedMembers {
    parse_members(Path::new("/src/Test.uc"), text)
}

#[test]
fn simple_function_with_return_type() {
    let members = parse("function bool DoThing(int a, int b);\n");
    assert_eq!(members.functions.len(), 1);
    let func = &members.functions[0];
    assert_eq!(func.name, "DoThing");
    assert_eq!(func.return_type, "bool");
    assert_eq!(func.arguments, "int a, int b");
    assert!(func.is_function);
    assert_eq!(func.line, 1);
}

#[test]
fn event_without_return_type() {
    let members = parse("event Touch(Actor Other);\n");
    assert_eq!(members.functions.len(), 1);
    let event = &members.functions[0];
    assert_eq!(event.name, "Touch");
    assert_eq!(event.return_type, "");
    assert!(!event.is_function);
}

#[test]
fn modifiers_are_kept_as_prefix_text() {
    let members = parse("simulated final function float GetHealth();\n");
    let func = &members.functions[0];
    assert_eq!(func.modifiers, "simulated final");
    assert_eq!(func.return_type, "float");
}

#[test]
fn multiline_signature_is_normalized() {
    let members = parse("function bool DoThing(\n  int a,\n  int b)\n");
    assert_eq!(members.functions.len(), 1);
    let func = &members.functions[0];
    assert_eq!(func.name, "DoThing");
    assert!(func.is_function);
    assert_eq!(func.arguments, "int a, int b");
}

#[test]
fn multi_name_variable_declaration() {
    let members = parse("var int a, b, c;\n");
    let names: Vec<&str> = members.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
    for variable in &members.variables {
        assert_eq!(variable.modifiers, ["var", "int"]);
    }
}

#[test]
fn variable_inline_comment_is_split_off() {
    let members = parse("var config string ServerName; // shown in the browser\n");
    let variable = &members.variables[0];
    assert_eq!(variable.name, "ServerName");
    assert_eq!(variable.modifiers, ["var", "config", "string"]);
    assert_eq!(variable.inline_comment.trim(), "shown in the browser");
}

#[test]
fn glued_generic_is_split_into_type_and_name() {
    let members = parse("var array<int>intList;\n");
    let variable = &members.variables[0];
    assert_eq!(variable.name, "intList");
    assert_eq!(variable.modifiers, ["var", "array<int>"]);
}

#[test]
fn struct_members_attach_only_after_close() {
    let text = "struct Point\n{\nvar int X;\nvar int Y;\n};\n";
    let members = parse(text);
    assert_eq!(members.structs.len(), 1);
    let point = &members.structs[0];
    assert_eq!(point.name, "Point");
    let names: Vec<&str> = point.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["X", "Y"]);
    // Struct members never leak into the file-level variable list.
    assert!(members.variables.is_empty());
}

#[test]
fn unclosed_struct_keeps_members_buffered() {
    let members = parse("struct Point\n{\nvar int X;\n");
    assert_eq!(members.structs.len(), 1);
    assert!(members.structs[0].members.is_empty());
    assert!(members.variables.is_empty());
}

#[test]
fn struct_extends_clause_is_stripped_from_signature() {
    let members = parse("struct HitInfo extends BaseHit\n{\nvar int Damage;\n};\n");
    let hit = &members.structs[0];
    assert_eq!(hit.name, "HitInfo");
    assert_eq!(hit.declaration_line, "struct HitInfo");
}

#[test]
fn length_changing_case_fold_does_not_shift_the_extends_split() {
    // 'İ' lowercases to two code points, so byte offsets taken from a
    // lowered copy would drift past the keyword.
    let members = parse("struct İnfo extends BaseHit\n{\nvar int Damage;\n};\n");
    let info = &members.structs[0];
    assert_eq!(info.name, "İnfo");
    assert_eq!(info.declaration_line, "struct İnfo");
}

#[test]
fn const_with_inline_comment() {
    let members = parse("const MaxPlayers = 32; // engine limit\n");
    assert_eq!(members.consts.len(), 1);
    let constant = &members.consts[0];
    assert_eq!(constant.name, "MaxPlayers");
    assert_eq!(constant.value, "32");
    assert_eq!(constant.inline_comment, "engine limit");
}

#[test]
fn documentation_attaches_to_next_declaration() {
    let text = "/** heals the pawn */\nfunction Heal(int Amount);\n";
    let members = parse(text);
    assert!(members.functions[0].documentation.contains("heals the pawn"));
}

#[test]
fn blank_line_resets_documentation() {
    let text = "/** stale comment */\n\nfunction Heal(int Amount);\n";
    let members = parse(text);
    assert_eq!(members.functions[0].documentation, "");
}

#[test]
fn multi_line_doc_block_accumulates() {
    let text = "/**\n * heals the pawn\n */\nfunction Heal(int Amount);\n";
    let members = parse(text);
    let doc = &members.functions[0].documentation;
    assert!(doc.contains("heals the pawn"));
    assert!(doc.starts_with("/**"));
}

#[test]
fn cpptext_block_is_skipped_entirely() {
    let text = "cpptext\n{\nvoid NativeTick(FLOAT DeltaSeconds);\n}\nfunction Tick(float Delta);\n";
    let members = parse(text);
    assert_eq!(members.functions.len(), 1);
    assert_eq!(members.functions[0].name, "Tick");
}

#[test]
fn comment_only_lines_produce_nothing() {
    let members = parse("// function NotReal(int x);\n* var int ghost;\n");
    assert!(members.functions.is_empty());
    assert!(members.variables.is_empty());
}

#[test]
fn malformed_declaration_is_skipped_non_fatally() {
    let members = parse("function ;;;()\nfunction int Real();\n");
    assert_eq!(members.functions.len(), 1);
    assert_eq!(members.functions[0].name, "Real");
}

#[test]
fn reparse_is_deterministic() {
    let text = "/** doc */\nfunction bool F(int x);\nvar int a, b;\nconst C = 1;\nstruct S\n{\nvar int M;\n};\n";
    let first = parse(text);
    let second = parse(text);
    assert_eq!(first, second);
}
