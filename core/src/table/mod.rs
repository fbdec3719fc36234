use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::parse;
use crate::reader;
use crate::symbol::{
    ClassHeader, ClassId, ClassSymbol, FunctionSymbol, Symbol, VariableSymbol,
};
use crate::util::fast_map::{fast_hash_set_new, FastHashMap, FastHashSet};

/// Name of the designated built-in class that seeds the global fallback
/// function/variable lists.
pub const HIDDEN_FUNCTIONS_CLASS: &str = "hiddenfunctions";

/// Outcome of a member lookup. `Pending` means the class exists but its
/// members have not been parsed yet; callers trigger the parse and retry
/// instead of treating it as a miss.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Pending(ClassId),
    Missing,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Arena of every discovered class, indexed case-insensitively by name and
/// by source file. Parent/children links are ids into the arena.
#[derive(Debug, Default)]
pub struct SymbolTable {
    classes: Vec<ClassSymbol>,
    by_name: FastHashMap<String, ClassId>,
    by_file: FastHashMap<PathBuf, ClassId>,

    global_functions: Vec<FunctionSymbol>,
    global_variables: Vec<VariableSymbol>,
    globals_seeded: bool,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class header. First registration wins; a duplicate name
    /// returns the already-registered class untouched.
    pub fn add_class(&mut self, header: ClassHeader) -> ClassId {
        let key = header.name.to_lowercase();
        if let Some(&existing) = self.by_name.get(&key) {
            tracing::debug!(class = %header.name, "duplicate class registration ignored");
            return existing;
        }
        let id = ClassId(self.classes.len());
        self.by_file.insert(header.file.clone(), id);
        self.classes.push(ClassSymbol::from_header(header));
        self.by_name.insert(key, id);
        id
    }

    /// Register a class bundled with the tool rather than found on disk.
    /// A workspace class already registered under the name keeps priority
    /// and stays file-backed.
    pub fn add_builtin_class(&mut self, header: ClassHeader, source: &'static str) -> ClassId {
        let before = self.classes.len();
        let id = self.add_class(header);
        if self.classes.len() > before {
            self.classes[id.0].builtin_source = Some(source);
        }
        id
    }

    pub fn class(&self, id: ClassId) -> &ClassSymbol {
        &self.classes[id.0]
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassSymbol)> {
        self.classes.iter().enumerate().map(|(index, class)| (ClassId(index), class))
    }

    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    pub fn class_by_file(&self, file: &Path) -> Option<ClassId> {
        self.by_file.get(file).copied()
    }

    /// Resolve every registered class's parent name to a live link. Safe to
    /// call once all headers of a tree are in, in any registration order.
    pub fn link_parents(&mut self) {
        for index in 0..self.classes.len() {
            self.link_to_parent(ClassId(index));
        }
    }

    /// Resolve one class's parent link, maintaining the parent's children
    /// set bidirectionally. Reassignment removes the class from the old
    /// parent's children first.
    pub fn link_to_parent(&mut self, id: ClassId) {
        let parent_name = self.classes[id.0].parent_name.clone();
        if parent_name.is_empty() {
            return;
        }
        let Some(parent_id) = self.lookup(&parent_name) else {
            return;
        };
        if parent_id == id {
            tracing::warn!(class = %self.classes[id.0].name, "class declares itself as parent");
            return;
        }
        let previous = self.classes[id.0].parent;
        if previous == Some(parent_id) {
            return;
        }
        if let Some(old_parent) = previous {
            self.classes[old_parent.0].children.retain(|&child| child != id);
        }
        self.classes[id.0].parent = Some(parent_id);
        if !self.classes[parent_id.0].children.contains(&id) {
            self.classes[parent_id.0].children.push(id);
        }
    }

    /// Parent link, resolving it lazily from the parent name if it has not
    /// been linked yet.
    pub fn safe_load_parent(&mut self, id: ClassId) -> Option<ClassId> {
        if self.classes[id.0].parent.is_none() {
            self.link_to_parent(id);
        }
        self.classes[id.0].parent
    }

    /// Replace a class's parentage and header documentation after its file
    /// changed on disk.
    pub fn update_class(&mut self, id: ClassId, parent_name: String, documentation: String) {
        let class = &mut self.classes[id.0];
        let reparented = !class.parent_name.eq_ignore_ascii_case(&parent_name);
        class.documentation = documentation;
        if reparented {
            if let Some(old_parent) = class.parent.take() {
                self.classes[old_parent.0].children.retain(|&child| child != id);
            }
            self.classes[id.0].parent_name = parent_name;
            self.link_to_parent(id);
        }
    }

    /// Parse a class's members from its source file and flatten the
    /// ancestor chain onto its lists, so later lookups need no chain walk.
    ///
    /// Guarded by `parsing_in_progress`: a second request while a parse is
    /// underway is a no-op and lets the first request populate the table.
    pub fn parse_members(&mut self, id: ClassId) -> Result<()> {
        if self.classes[id.0].parsed || self.classes[id.0].parsing_in_progress {
            return Ok(());
        }
        let mut visited = fast_hash_set_new();
        visited.insert(id);
        self.classes[id.0].parsing_in_progress = true;
        let result = self.parse_members_inner(id, &mut visited);
        self.classes[id.0].parsing_in_progress = false;
        result
    }

    fn parse_members_inner(&mut self, id: ClassId, visited: &mut FastHashSet<ClassId>) -> Result<()> {
        let file = self.classes[id.0].file.clone();
        let text = match self.classes[id.0].builtin_source {
            Some(source) => source.to_string(),
            None => reader::read_source(&file)?,
        };
        let parsed = parse::parse_members(&file, &text);
        {
            let class = &mut self.classes[id.0];
            class.functions = parsed.functions;
            class.variables = parsed.variables;
            class.consts = parsed.consts;
            class.structs = parsed.structs;
        }

        if let Some(parent_id) = self.safe_load_parent(id) {
            if parent_id == id || !visited.insert(parent_id) {
                // Cyclic extends chain; stop flattening here rather than
                // recursing forever.
                tracing::warn!(class = %self.classes[id.0].name, "inheritance cycle detected, truncating");
            } else {
                if !self.classes[parent_id.0].parsed {
                    if self.classes[parent_id.0].parsing_in_progress {
                        tracing::debug!(
                            class = %self.classes[parent_id.0].name,
                            "parent parse already in progress, skipping merge"
                        );
                    } else {
                        self.classes[parent_id.0].parsing_in_progress = true;
                        let parent_result = self.parse_members_inner(parent_id, visited);
                        self.classes[parent_id.0].parsing_in_progress = false;
                        if let Err(error) = parent_result {
                            tracing::warn!(
                                class = %self.classes[parent_id.0].name,
                                "failed to parse parent: {error:#}"
                            );
                        }
                    }
                }
                let (functions, variables, consts, structs) = {
                    let parent = &self.classes[parent_id.0];
                    (
                        parent.functions.clone(),
                        parent.variables.clone(),
                        parent.consts.clone(),
                        parent.structs.clone(),
                    )
                };
                let class = &mut self.classes[id.0];
                class.functions.extend(functions);
                class.variables.extend(variables);
                class.consts.extend(consts);
                class.structs.extend(structs);
            }
        }

        self.classes[id.0].parsed = true;
        tracing::debug!(class = %self.classes[id.0].name, "members parsed");
        Ok(())
    }

    /// Case-insensitive function lookup: own (flattened) list first, then
    /// the parent chain for classes whose flatten has not caught up yet.
    pub fn get_function(&self, name: &str, id: ClassId) -> Lookup<FunctionSymbol> {
        let mut visited = fast_hash_set_new();
        self.get_function_guarded(name, id, &mut visited)
    }

    fn get_function_guarded(
        &self,
        name: &str,
        id: ClassId,
        visited: &mut FastHashSet<ClassId>,
    ) -> Lookup<FunctionSymbol> {
        if !visited.insert(id) {
            return Lookup::Missing;
        }
        let class = &self.classes[id.0];
        if !class.parsed {
            return Lookup::Pending(id);
        }
        if let Some(function) = class
            .functions
            .iter()
            .find(|function| function.name.eq_ignore_ascii_case(name))
        {
            return Lookup::Found(function.clone());
        }
        match self.parent_of(id) {
            Some(parent_id) => self.get_function_guarded(name, parent_id, visited),
            None => Lookup::Missing,
        }
    }

    /// Case-insensitive lookup across a class's value members: variables,
    /// consts and structs.
    pub fn get_variable(&self, name: &str, id: ClassId) -> Lookup<Symbol> {
        let mut visited = fast_hash_set_new();
        self.get_variable_guarded(name, id, &mut visited)
    }

    fn get_variable_guarded(
        &self,
        name: &str,
        id: ClassId,
        visited: &mut FastHashSet<ClassId>,
    ) -> Lookup<Symbol> {
        if !visited.insert(id) {
            return Lookup::Missing;
        }
        let class = &self.classes[id.0];
        if !class.parsed {
            return Lookup::Pending(id);
        }
        if let Some(variable) = class
            .variables
            .iter()
            .find(|variable| variable.name.eq_ignore_ascii_case(name))
        {
            return Lookup::Found(Symbol::Variable(variable.clone()));
        }
        if let Some(constant) = class
            .consts
            .iter()
            .find(|constant| constant.name.eq_ignore_ascii_case(name))
        {
            return Lookup::Found(Symbol::Const(constant.clone()));
        }
        if let Some(structure) = class
            .structs
            .iter()
            .find(|structure| structure.name.eq_ignore_ascii_case(name))
        {
            return Lookup::Found(Symbol::Struct(structure.clone()));
        }
        match self.parent_of(id) {
            Some(parent_id) => self.get_variable_guarded(name, parent_id, visited),
            None => Lookup::Missing,
        }
    }

    /// Parent link without mutating the table; falls back to a name lookup
    /// when the link has not been made yet.
    pub fn parent_of(&self, id: ClassId) -> Option<ClassId> {
        let class = &self.classes[id.0];
        class
            .parent
            .or_else(|| {
                if class.parent_name.is_empty() {
                    None
                } else {
                    self.lookup(&class.parent_name)
                }
            })
            .filter(|&parent_id| parent_id != id)
    }

    /// Clear a removed file's members but keep the class header, so links
    /// from children stay valid.
    pub fn remove_file(&mut self, file: &Path) -> Option<ClassId> {
        let id = self.class_by_file(file)?;
        self.classes[id.0].clear_members();
        tracing::debug!(class = %self.classes[id.0].name, "members cleared for removed file");
        Some(id)
    }

    /// Seed the global fallback lists from the hidden-functions built-in.
    /// Returns `Pending` until that class has been member-parsed.
    pub fn seed_globals(&mut self) -> Lookup<()> {
        if self.globals_seeded {
            return Lookup::Found(());
        }
        let Some(id) = self.lookup(HIDDEN_FUNCTIONS_CLASS) else {
            return Lookup::Missing;
        };
        if !self.classes[id.0].parsed {
            return Lookup::Pending(id);
        }
        self.global_functions = self.classes[id.0].functions.clone();
        self.global_variables = self.classes[id.0].variables.clone();
        self.globals_seeded = true;
        Lookup::Found(())
    }

    pub fn global_functions(&self) -> &[FunctionSymbol] {
        &self.global_functions
    }

    pub fn global_variables(&self) -> &[VariableSymbol] {
        &self.global_variables
    }

    pub fn global_function(&self, name: &str) -> Option<&FunctionSymbol> {
        self.global_functions
            .iter()
            .find(|function| function.name.eq_ignore_ascii_case(name))
    }

    pub fn global_variable(&self, name: &str) -> Option<&VariableSymbol> {
        self.global_variables
            .iter()
            .find(|variable| variable.name.eq_ignore_ascii_case(name))
    }
}
