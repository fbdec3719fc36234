use std::path::PathBuf;

use super::*;

fn variable(modifiers: &[&str]) -> VariableSymbol {
    VariableSymbol {
        modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
        name: "Value".to_string(),
        inline_comment: String::new(),
        documentation: String::new(),
        line: 3,
        file: PathBuf::from("Test.uc"),
    }
}

#[test]
fn plain_type_is_last_modifier_token() {
    let var = variable(&["var", "config", "int"]);
    assert_eq!(var.type_at_level(0), "int");
}

#[test]
fn nested_generic_unwraps_one_level_per_call() {
    let var = variable(&["var", "array<class<Pawn>>"]);
    assert_eq!(var.type_at_level(0), "array");
    assert_eq!(var.type_at_level(1), "class<Pawn>");
    assert_eq!(var.type_at_level(2), "Pawn");
}

#[test]
fn bare_class_wrapper_classifies_as_class() {
    let var = variable(&["var", "class<Weapon>"]);
    assert_eq!(var.type_at_level(0), "class");
    assert_eq!(var.type_at_level(1), "Weapon");
}

#[test]
fn array_of_plain_type_unwraps_to_element() {
    let var = variable(&["var", "array<int>"]);
    assert_eq!(var.type_at_level(0), "array");
    assert_eq!(var.type_at_level(1), "int");
}

#[test]
fn function_declaration_renders_keyword_and_args() {
    let func = FunctionSymbol {
        modifiers: "simulated".to_string(),
        return_type: "bool".to_string(),
        name: "DoThing".to_string(),
        arguments: "int a, int b".to_string(),
        line: 10,
        file: PathBuf::from("Test.uc"),
        documentation: "/** does the thing */".to_string(),
        is_function: true,
    };
    assert_eq!(func.declaration(), "simulated function bool DoThing(int a, int b)");

    let event = FunctionSymbol {
        is_function: false,
        modifiers: String::new(),
        return_type: String::new(),
        name: "Tick".to_string(),
        arguments: "float DeltaTime".to_string(),
        ..func
    };
    assert_eq!(event.declaration(), "event Tick(float DeltaTime)");
}

#[test]
fn documentation_text_keeps_only_comment_lines() {
    let func = FunctionSymbol {
        modifiers: String::new(),
        return_type: String::new(),
        name: "F".to_string(),
        arguments: String::new(),
        line: 1,
        file: PathBuf::from("Test.uc"),
        documentation: "/** summary\n * details\nnot a comment\n*/".to_string(),
        is_function: true,
    };
    assert_eq!(func.documentation_text(), "/** summary\n * details\n*/");
}

#[test]
fn const_declaration_includes_comment_when_present() {
    let constant = ConstSymbol {
        name: "MaxHealth".to_string(),
        value: "100".to_string(),
        documentation: String::new(),
        inline_comment: "upper bound".to_string(),
        line: 4,
        file: PathBuf::from("Test.uc"),
    };
    assert_eq!(constant.declaration(), "const MaxHealth = 100;    // upper bound");
}

#[test]
fn struct_member_lookup_is_case_insensitive() {
    let point = StructSymbol {
        name: "Point".to_string(),
        declaration_line: "struct Point".to_string(),
        line: 7,
        file: PathBuf::from("Test.uc"),
        documentation: String::new(),
        members: vec![variable(&["var", "int"])],
    };
    assert!(point.member("value").is_some());
    assert!(point.member("missing").is_none());
}
