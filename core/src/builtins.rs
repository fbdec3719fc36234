use std::path::PathBuf;

use crate::parse;
use crate::table::SymbolTable;

/// Classes bundled with the tool: intrinsics the engine provides without a
/// source file, declared as embedded stubs so member lookups on them work
/// like on any workspace class.
pub struct BuiltinClass {
    pub name: &'static str,
    pub source: &'static str,
}

pub const BUILTIN_CLASSES: [BuiltinClass; 3] = [
    BuiltinClass { name: "Array", source: include_str!("../assets/Array.uc") },
    BuiltinClass { name: "Class", source: include_str!("../assets/Class.uc") },
    BuiltinClass { name: "HiddenFunctions", source: include_str!("../assets/HiddenFunctions.uc") },
];

/// Register every bundled class. Workspace classes registered first keep
/// priority; a tree that ships its own `Array.uc` wins.
pub fn register(table: &mut SymbolTable) {
    for builtin in &BUILTIN_CLASSES {
        let path = PathBuf::from(format!("builtin/{}.uc", builtin.name));
        match parse::collect_header(&path, builtin.source) {
            Some(header) => {
                table.add_builtin_class(header, builtin.source);
            }
            None => {
                tracing::warn!(class = builtin.name, "bundled class stub has no class header");
            }
        }
    }
}
