use std::path::PathBuf;

use super::{ClassId, ConstSymbol, FunctionSymbol, StructSymbol, VariableSymbol};

/// Identity of a class as extracted from its file header, before any member
/// parsing has happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassHeader {
    pub name: String,
    /// Lower-cased parent class name, empty for root/built-in classes.
    pub parent_name: String,
    /// Raw leading text of the file up to and including the class line.
    pub documentation: String,
    pub file: PathBuf,
}

/// A class registered in the symbol table arena.
///
/// Two-phase lifecycle: the header registers the class; member lists stay
/// empty until the first `parse_members` populates them wholesale. Once
/// parsed, the member lists are flattened over the ancestor chain so lookups
/// need no per-call chain walking.
#[derive(Debug, Clone)]
pub struct ClassSymbol {
    pub name: String,
    pub parent_name: String,
    pub documentation: String,
    pub file: PathBuf,
    /// Source text for classes bundled with the tool instead of read from
    /// the workspace.
    pub builtin_source: Option<&'static str>,

    pub parent: Option<ClassId>,
    pub children: Vec<ClassId>,

    pub functions: Vec<FunctionSymbol>,
    pub variables: Vec<VariableSymbol>,
    pub consts: Vec<ConstSymbol>,
    pub structs: Vec<StructSymbol>,

    pub parsed: bool,
    pub parsing_in_progress: bool,
}

impl ClassSymbol {
    pub fn from_header(header: ClassHeader) -> Self {
        Self {
            name: header.name,
            parent_name: header.parent_name,
            documentation: header.documentation,
            file: header.file,
            builtin_source: None,
            parent: None,
            children: Vec::new(),
            functions: Vec::new(),
            variables: Vec::new(),
            consts: Vec::new(),
            structs: Vec::new(),
            parsed: false,
            parsing_in_progress: false,
        }
    }

    pub fn declaration(&self) -> String {
        if self.parent_name.is_empty() {
            format!("class {}", self.name)
        } else {
            format!("class {} extends {}", self.name, self.parent_name)
        }
    }

    /// Definition jump target for a class is the top of its file.
    pub fn line(&self) -> usize {
        1
    }

    /// Clear member state but keep the header identity, so children links
    /// into this class stay valid.
    pub fn clear_members(&mut self) {
        self.functions.clear();
        self.variables.clear();
        self.consts.clear();
        self.structs.clear();
        self.parsed = false;
    }
}
