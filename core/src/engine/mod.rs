use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::task::spawn_blocking;

use crate::builtins;
use crate::cache;
use crate::hover;
use crate::parse::{self, context, ParsedMembers};
use crate::reader;
use crate::resolve::{self, Receiver, ReceiverResolution, Resolution};
use crate::symbol::{ClassId, Symbol};
use crate::table::SymbolTable;

/// Lookups retry this many times when they hit a class whose members are
/// still unparsed, parsing it between attempts.
const MAX_PARSE_RETRIES: usize = 4;

/// Placeholder completion entry while the active class's parse is underway.
const PARSING_PLACEHOLDER: &str = "parsing...";

/// Jump target of a go-to-definition request. `line` is 1-based. The line
/// scanner does not track where on the line a declaration starts, so
/// `column` is always 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionTarget {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl DefinitionTarget {
    fn new(file: PathBuf, line: usize) -> Self {
        Self { file, line, column: 0 }
    }
}

/// The symbol engine of one workspace: the shared table plus the I/O that
/// feeds it. Cheap reads and table mutations are short critical sections
/// behind one async mutex; file reads happen on blocking threads.
pub struct Engine {
    table: Mutex<SymbolTable>,
    source_root: PathBuf,
}

impl Engine {
    /// Discover the workspace's classes and build the header-level table.
    ///
    /// A readable class cache replaces the directory walk entirely; member
    /// parsing stays lazy either way. After a real walk the cache is
    /// rewritten for the next session.
    pub async fn activate(workspace: &Path) -> Result<Engine> {
        let source_root = find_source_root(workspace);
        tracing::info!(root = %source_root.display(), "activating workspace");

        let mut table = SymbolTable::new();
        let mut from_cache = false;
        match cache::load(&source_root) {
            Ok(Some(cached)) => {
                for entry in cached {
                    table.add_class(entry.into_header());
                }
                from_cache = true;
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!("ignoring class cache: {error:#}");
            }
        }

        if !from_cache {
            let files = reader::walk_source_files(&source_root)?;
            let tasks: Vec<_> = files
                .into_iter()
                .map(|file| {
                    spawn_blocking(move || -> Result<_> {
                        let text = reader::read_source(&file)?;
                        Ok(parse::collect_header(&file, &text))
                    })
                })
                .collect();
            for outcome in join_all(tasks).await {
                match outcome {
                    Ok(Ok(Some(header))) => {
                        table.add_class(header);
                    }
                    Ok(Ok(None)) => {}
                    Ok(Err(error)) => tracing::warn!("skipping unreadable file: {error:#}"),
                    Err(error) => tracing::warn!("header task failed: {error}"),
                }
            }
        }

        builtins::register(&mut table);
        table.link_parents();

        if !from_cache {
            if let Err(error) = cache::save(&source_root, table.classes().map(|(_, class)| class)) {
                tracing::warn!("could not persist class cache: {error:#}");
            }
        }

        tracing::info!(classes = table.len(), from_cache, "workspace activated");
        Ok(Engine { table: Mutex::new(table), source_root })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Name and parent of every known class, for workspace overviews.
    pub async fn class_overview(&self) -> Vec<(String, String)> {
        let table = self.table.lock().await;
        table
            .classes()
            .map(|(_, class)| (class.name.clone(), class.parent_name.clone()))
            .collect()
    }

    /// Re-read a saved file: refresh the class's header, drop its members
    /// and parse them again from the new content.
    pub async fn on_file_saved(&self, file: &Path) -> Result<()> {
        let path = file.to_path_buf();
        let header = spawn_blocking(move || -> Result<_> {
            let text = reader::read_source(&path)?;
            Ok(parse::collect_header(&path, &text))
        })
        .await
        .context("header task failed")??;

        let mut table = self.table.lock().await;
        match header {
            Some(header) => {
                let id = match table.class_by_file(file) {
                    Some(id) => {
                        table.remove_file(file);
                        table.update_class(id, header.parent_name, header.documentation);
                        id
                    }
                    None => {
                        let id = table.add_class(header);
                        table.link_to_parent(id);
                        id
                    }
                };
                table.parse_members(id)?;
            }
            None => {
                // The file no longer declares a class; keep the header but
                // drop the stale members.
                table.remove_file(file);
            }
        }
        Ok(())
    }

    /// Forget a deleted file's members. The class entry itself stays so
    /// children keep a valid parent link.
    pub async fn on_file_removed(&self, file: &Path) {
        let mut table = self.table.lock().await;
        table.remove_file(file);
    }

    /// Resolve the symbol under the cursor to its declaration site.
    /// `line` is 1-based, `column` a 0-based byte offset into the line.
    pub async fn definition_at(
        &self,
        file: &Path,
        line: usize,
        column: usize,
    ) -> Result<Option<DefinitionTarget>> {
        let Some(resolved) = self.resolve_at(file, line, column).await? else {
            return Ok(None);
        };
        let table = self.table.lock().await;
        Ok(Some(match resolved {
            Symbol::Class(id) => {
                let class = table.class(id);
                DefinitionTarget::new(class.file.clone(), class.line())
            }
            Symbol::Function(f) => DefinitionTarget::new(f.file, f.line),
            Symbol::Variable(v) => DefinitionTarget::new(v.file, v.line),
            Symbol::Const(c) => DefinitionTarget::new(c.file, c.line),
            Symbol::Struct(s) => DefinitionTarget::new(s.file, s.line),
        }))
    }

    /// Markdown hover text for the symbol under the cursor.
    pub async fn hover_at(&self, file: &Path, line: usize, column: usize) -> Result<Option<String>> {
        let Some(resolved) = self.resolve_at(file, line, column).await? else {
            return Ok(None);
        };
        let table = self.table.lock().await;
        Ok(Some(hover::hover_text(&table, &resolved)))
    }

    /// Completion entries for the cursor position, one `name\tdetail` line
    /// per entry.
    pub async fn autocomplete(&self, file: &Path, line: usize, column: usize) -> Result<Vec<String>> {
        let Some(open) = self.open_file(file, line).await? else {
            return Ok(Vec::new());
        };
        // Columns arrive as byte offsets and can land inside a multi-byte
        // character; clamp back to the previous boundary before slicing.
        let mut cursor = column.min(open.line_text.len());
        while !open.line_text.is_char_boundary(cursor) {
            cursor -= 1;
        }
        // The partly-typed word filters the list; everything left of it
        // decides whose members are listed.
        let (left_raw, word) = split_trailing_word(&open.line_text[..cursor]);
        let fragment = context::extract_unclosed_bracket_content(left_raw)
            .unwrap_or_else(|| left_raw.trim().to_string());
        let stripped = context::strip_context_prefixes(&fragment);
        let stripped = stripped.trim();

        self.ensure_globals().await;
        let mut table = self.table.lock().await;
        let Some(active) = table.class_by_file(file) else {
            return Ok(Vec::new());
        };
        if table.class(active).parsing_in_progress {
            return Ok(vec![PARSING_PLACEHOLDER.to_string()]);
        }
        if let Err(error) = table.parse_members(active) {
            tracing::warn!("cannot parse open file's class: {error:#}");
        }

        let entries = if stripped.to_lowercase().ends_with("class'") {
            let mut entries: Vec<String> = table
                .classes()
                .map(|(_, class)| format!("{}\tClass {}", class.name, class.name))
                .collect();
            entries.sort();
            entries
        } else if stripped.ends_with('.') {
            receiver_entries(&mut table, stripped, active, &open.locals)
        } else {
            scope_entries(&table, active, &open.locals)
        };
        Ok(filter_entries(entries, word))
    }

    /// Resolve the token at a cursor position, parsing pending classes
    /// between bounded retries.
    async fn resolve_at(&self, file: &Path, line: usize, column: usize) -> Result<Option<Symbol>> {
        let Some(open) = self.open_file(file, line).await? else {
            return Ok(None);
        };
        let Some((start, token)) = token_at(&open.line_text, column) else {
            return Ok(None);
        };
        let left_raw = &open.line_text[..start];
        let left = context::extract_unclosed_bracket_content(left_raw)
            .unwrap_or_else(|| left_raw.trim().to_string());
        let token = token.to_string();

        self.ensure_globals().await;
        let active = {
            let table = self.table.lock().await;
            table.class_by_file(file)
        };
        let Some(active) = active else {
            tracing::debug!(file = %file.display(), "cursor file is not a known class");
            return Ok(None);
        };
        self.ensure_parsed(active).await;

        for _ in 0..=MAX_PARSE_RETRIES {
            let resolution = {
                let table = self.table.lock().await;
                resolve::resolve(&table, &left, &token, active, &open.locals)
            };
            match resolution {
                Resolution::Found(symbol) => return Ok(Some(symbol)),
                Resolution::NotFound => return Ok(None),
                Resolution::Pending(pending) => self.ensure_parsed(pending).await,
            }
        }
        tracing::debug!(token, "giving up on pending scopes");
        Ok(None)
    }

    /// Read the cursor's file once: the requested line plus a fresh parse of
    /// its declarations, so resolution sees the file as it is on disk now.
    async fn open_file(&self, file: &Path, line: usize) -> Result<Option<OpenFile>> {
        let path = file.to_path_buf();
        let text = spawn_blocking(move || reader::read_source(&path))
            .await
            .context("read task failed")??;
        let Some(line_text) = text.lines().nth(line.saturating_sub(1)) else {
            return Ok(None);
        };
        Ok(Some(OpenFile {
            line_text: line_text.to_string(),
            locals: parse::parse_members(file, &text),
        }))
    }

    async fn ensure_parsed(&self, id: ClassId) {
        let mut table = self.table.lock().await;
        if let Err(error) = table.parse_members(id) {
            tracing::warn!(class = %table.class(id).name, "member parse failed: {error:#}");
        }
    }

    /// Seed the global fallback lists on first use.
    async fn ensure_globals(&self) {
        let mut table = self.table.lock().await;
        if let Some(id) = table.lookup(crate::table::HIDDEN_FUNCTIONS_CLASS) {
            if let Err(error) = table.parse_members(id) {
                tracing::warn!("cannot parse global stubs: {error:#}");
            }
            table.seed_globals();
        }
    }
}

struct OpenFile {
    line_text: String,
    locals: ParsedMembers,
}

/// The root all class discovery starts from. An Unreal project keeps its
/// script packages under `Development/Src`; when the workspace contains that
/// layout the walk is narrowed to it, otherwise the workspace itself is the
/// root.
pub fn find_source_root(workspace: &Path) -> PathBuf {
    if workspace.ends_with("Src") {
        return workspace.to_path_buf();
    }
    let nested = workspace.join("Development").join("Src");
    if nested.is_dir() {
        return nested;
    }
    workspace.to_path_buf()
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Split the partly-typed identifier off the end of the cursor's left text.
fn split_trailing_word(left: &str) -> (&str, &str) {
    let bytes = left.as_bytes();
    let mut start = bytes.len();
    while start > 0 && is_ident_byte(bytes[start - 1]) {
        start -= 1;
    }
    (&left[..start], &left[start..])
}

/// Case-insensitive substring filter on the entry names.
fn filter_entries(entries: Vec<String>, word: &str) -> Vec<String> {
    if word.is_empty() {
        return entries;
    }
    let needle = word.to_lowercase();
    entries
        .into_iter()
        .filter(|entry| {
            entry
                .split('\t')
                .next()
                .unwrap_or("")
                .to_lowercase()
                .contains(&needle)
        })
        .collect()
}

/// The identifier covering a 0-based byte column, with its start offset.
/// A cursor sitting just past a word still hits it.
fn token_at(line: &str, column: usize) -> Option<(usize, &str)> {
    let bytes = line.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut index = column.min(bytes.len() - 1);
    if !is_ident_byte(bytes[index]) {
        if index > 0 && is_ident_byte(bytes[index - 1]) {
            index -= 1;
        } else {
            return None;
        }
    }
    let mut start = index;
    while start > 0 && is_ident_byte(bytes[start - 1]) {
        start -= 1;
    }
    let mut end = index + 1;
    while end < bytes.len() && is_ident_byte(bytes[end]) {
        end += 1;
    }
    Some((start, &line[start..end]))
}

/// Completion entries for a dotted receiver, parsing pending classes along
/// the chain inline.
fn receiver_entries(
    table: &mut SymbolTable,
    fragment: &str,
    active: ClassId,
    locals: &ParsedMembers,
) -> Vec<String> {
    for _ in 0..=MAX_PARSE_RETRIES {
        match resolve::resolve_chain(table, fragment, active, locals) {
            ReceiverResolution::Found(Receiver::Class(id)) => {
                if let Err(error) = table.parse_members(id) {
                    tracing::warn!("cannot parse receiver class: {error:#}");
                }
                return class_member_entries(table, id);
            }
            ReceiverResolution::Found(Receiver::Struct(structure)) => {
                return structure.members.iter().map(variable_entry).collect();
            }
            ReceiverResolution::Pending(pending) => {
                if let Err(error) = table.parse_members(pending) {
                    tracing::warn!("cannot parse pending class: {error:#}");
                    return Vec::new();
                }
            }
            ReceiverResolution::NotFound => return Vec::new(),
        }
    }
    Vec::new()
}

fn class_member_entries(table: &SymbolTable, id: ClassId) -> Vec<String> {
    let class = table.class(id);
    let mut entries = Vec::new();
    for variable in &class.variables {
        entries.push(variable_entry(variable));
    }
    for function in &class.functions {
        entries.push(function_entry(function));
    }
    for constant in &class.consts {
        entries.push(format!("{}\t= {}", constant.name, constant.value));
    }
    for structure in &class.structs {
        entries.push(format!("{}\t{}", structure.name, structure.declaration()));
    }
    entries
}

/// Bare-scope completion: the active class's flattened members, the global
/// fallbacks, every class name, and the open file's own declarations last.
fn scope_entries(table: &SymbolTable, active: ClassId, locals: &ParsedMembers) -> Vec<String> {
    let mut entries = class_member_entries(table, active);
    for function in table.global_functions() {
        entries.push(function_entry(function));
    }
    for variable in table.global_variables() {
        entries.push(variable_entry(variable));
    }
    for (_, class) in table.classes() {
        entries.push(format!("{}\tClass {}", class.name, class.name));
    }
    for variable in &locals.variables {
        entries.push(variable_entry(variable));
    }
    for function in &locals.functions {
        entries.push(function_entry(function));
    }
    entries
}

fn variable_entry(variable: &crate::symbol::VariableSymbol) -> String {
    format!("{}\t{} {}", variable.name, variable.modifier_text(), variable.name)
}

fn function_entry(function: &crate::symbol::FunctionSymbol) -> String {
    format!("{}\t({})", function.name, function.arguments)
}
