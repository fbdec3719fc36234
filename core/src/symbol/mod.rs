mod class;
mod members;

pub use class::{ClassHeader, ClassSymbol};
pub use members::{ConstSymbol, FunctionSymbol, StructSymbol, VariableSymbol};

/// Index of a class in the symbol table arena. All cross-references between
/// classes (parent, children) are ids resolved through the table, never
/// embedded pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub(crate) usize);

impl ClassId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A resolved symbol. Classes stay in the arena and are referenced by id;
/// member symbols are small owned values cloned out of their class.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Class(ClassId),
    Function(FunctionSymbol),
    Variable(VariableSymbol),
    Const(ConstSymbol),
    Struct(StructSymbol),
}

impl Symbol {
    pub fn name<'a>(&'a self, class_name: impl FnOnce(ClassId) -> &'a str) -> &'a str {
        match self {
            Symbol::Class(id) => class_name(*id),
            Symbol::Function(f) => &f.name,
            Symbol::Variable(v) => &v.name,
            Symbol::Const(c) => &c.name,
            Symbol::Struct(s) => &s.name,
        }
    }
}

#[cfg(test)]
mod symbol_test;
