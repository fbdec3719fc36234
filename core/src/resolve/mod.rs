use crate::parse::context;
use crate::parse::ParsedMembers;
use crate::symbol::{ClassId, StructSymbol, Symbol};
use crate::table::{Lookup, SymbolTable};

// Resolution works on the text left of the cursor: classify the fragment,
// reduce a dotted chain to its receiver, then look the token up in that
// receiver's scope. Lookups never mutate the table; a `Pending` result tells
// the caller which class still needs a member parse.

/// Outcome of resolving one token against the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(Symbol),
    /// The scope the token lives in exists but has not been member-parsed.
    Pending(ClassId),
    NotFound,
}

/// The scope a dotted chain reduces to.
#[derive(Debug, Clone, PartialEq)]
pub enum Receiver {
    Class(ClassId),
    Struct(StructSymbol),
}

/// Outcome of reducing a dotted chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiverResolution {
    Found(Receiver),
    Pending(ClassId),
    NotFound,
}

/// Filters for a bare-name search, for callers that only want a subset of
/// the scope (e.g. completion after `class'`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectQuery {
    pub no_classes: bool,
    pub no_functions: bool,
    pub no_variables: bool,
}

/// Resolve `token` given `left`, the text on its line up to the token.
///
/// `active` is the class of the open file and `locals` its freshly parsed
/// declarations, so an unsaved buffer resolves against what the editor shows
/// rather than the table's last snapshot.
pub fn resolve(
    table: &SymbolTable,
    left: &str,
    token: &str,
    active: ClassId,
    locals: &ParsedMembers,
) -> Resolution {
    let left = left.trim();

    // Declaration context: an override of an ancestor member, or a type
    // name in the signature.
    if context::is_function_or_event(left) {
        if let Some(parent) = table.parent_of(active) {
            match member_in_class(table, token, parent) {
                Resolution::NotFound => {}
                other => return other,
            }
        }
        return class_by_name(table, token);
    }

    let stripped = context::strip_context_prefixes(left);
    let stripped = stripped.trim();
    let lower = stripped.to_lowercase();

    if stripped.is_empty()
        || context::is_in_bracket_variable(left)
        || context::ends_with_operator(left)
    {
        if token.eq_ignore_ascii_case("self") {
            return Resolution::Found(Symbol::Class(active));
        }
        if token.eq_ignore_ascii_case("super") {
            return match table.parent_of(active) {
                Some(parent) => Resolution::Found(Symbol::Class(parent)),
                None => Resolution::NotFound,
            };
        }
        return get_object(table, token, active, locals, ObjectQuery::default());
    }

    if lower.ends_with("class'") {
        return class_by_name(table, token);
    }

    if lower == "self." {
        return member_in_class(table, token, active);
    }

    if lower == "super." {
        return match table.parent_of(active) {
            Some(parent) => match member_in_class(table, token, parent) {
                Resolution::NotFound => class_by_name(table, token),
                other => other,
            },
            None => Resolution::NotFound,
        };
    }
    if let Some(named) = super_class_name(&lower) {
        return match table.lookup(named) {
            Some(id) => member_in_class(table, token, id),
            None => Resolution::NotFound,
        };
    }

    if stripped.ends_with('.') {
        return match resolve_chain(table, stripped, active, locals) {
            ReceiverResolution::Found(Receiver::Class(id)) => member_in_class(table, token, id),
            ReceiverResolution::Found(Receiver::Struct(structure)) => structure
                .member(token)
                .cloned()
                .map(Symbol::Variable)
                .map(Resolution::Found)
                .unwrap_or(Resolution::NotFound),
            ReceiverResolution::Pending(id) => Resolution::Pending(id),
            ReceiverResolution::NotFound => Resolution::NotFound,
        };
    }

    // Anything else is an expression tail without receiver syntax; fall back
    // to a bare-name search.
    get_object(table, token, active, locals, ObjectQuery::default())
}

fn class_by_name(table: &SymbolTable, name: &str) -> Resolution {
    match table.lookup(name) {
        Some(id) => Resolution::Found(Symbol::Class(id)),
        None => Resolution::NotFound,
    }
}

/// `super(actor).` -> `actor`.
fn super_class_name(lower: &str) -> Option<&str> {
    let inner = lower.strip_prefix("super(")?.strip_suffix(").")?;
    let inner = inner.trim();
    (!inner.is_empty()).then_some(inner)
}

/// Bare-name search across the active scope: local declarations first, then
/// the active class's flattened members, the global fallbacks and finally
/// class names.
pub fn get_object(
    table: &SymbolTable,
    name: &str,
    active: ClassId,
    locals: &ParsedMembers,
    query: ObjectQuery,
) -> Resolution {
    if !query.no_variables {
        if let Some(variable) = locals
            .variables
            .iter()
            .find(|variable| variable.name.eq_ignore_ascii_case(name))
        {
            return Resolution::Found(Symbol::Variable(variable.clone()));
        }
    }
    if !query.no_functions {
        if let Some(function) = locals
            .functions
            .iter()
            .find(|function| function.name.eq_ignore_ascii_case(name))
        {
            return Resolution::Found(Symbol::Function(function.clone()));
        }
    }

    if !query.no_functions {
        match table.get_function(name, active) {
            Lookup::Found(function) => return Resolution::Found(Symbol::Function(function)),
            Lookup::Pending(id) => return Resolution::Pending(id),
            Lookup::Missing => {}
        }
    }
    if !query.no_variables {
        match table.get_variable(name, active) {
            Lookup::Found(symbol) => return Resolution::Found(symbol),
            Lookup::Pending(id) => return Resolution::Pending(id),
            Lookup::Missing => {}
        }
    }

    if !query.no_functions {
        if let Some(function) = table.global_function(name) {
            return Resolution::Found(Symbol::Function(function.clone()));
        }
    }
    if !query.no_variables {
        if let Some(variable) = table.global_variable(name) {
            return Resolution::Found(Symbol::Variable(variable.clone()));
        }
    }

    if !query.no_classes {
        if let Some(id) = table.lookup(name) {
            return Resolution::Found(Symbol::Class(id));
        }
    }
    Resolution::NotFound
}

/// Reduce a dotted fragment ending in `.` to the scope its final `.` opens.
///
/// Each segment resolves in the scope produced by the previous one; the
/// first resolves like a bare name. A call segment contributes its return
/// type, and each `[` index peels one generic layer off a variable's type.
pub fn resolve_chain(
    table: &SymbolTable,
    fragment: &str,
    active: ClassId,
    locals: &ParsedMembers,
) -> ReceiverResolution {
    let mut segments: Vec<&str> = fragment.split('.').collect();
    // The trailing `.` leaves an empty final segment.
    if segments.last().map(|last| last.trim().is_empty()).unwrap_or(false) {
        segments.pop();
    }
    if segments.is_empty() {
        return ReceiverResolution::NotFound;
    }

    let mut receiver = Receiver::Class(active);
    let mut scope = active;

    for (position, raw_segment) in segments.iter().enumerate() {
        let segment = raw_segment.trim();
        let lower = segment.to_lowercase();
        let secondary_level = segment.matches('[').count();

        if position == 0 {
            if lower == "self" {
                continue;
            }
            if lower == "super" {
                match table.parent_of(active) {
                    Some(parent) => {
                        receiver = Receiver::Class(parent);
                        scope = parent;
                        continue;
                    }
                    None => return ReceiverResolution::NotFound,
                }
            }
            if let Some(named) = lower.strip_prefix("super(").and_then(|rest| rest.strip_suffix(')')) {
                match table.lookup(named.trim()) {
                    Some(id) => {
                        receiver = Receiver::Class(id);
                        scope = id;
                        continue;
                    }
                    None => return ReceiverResolution::NotFound,
                }
            }
        }
        if let Some(literal) = class_literal_name(segment) {
            match table.lookup(literal) {
                Some(id) => {
                    receiver = Receiver::Class(id);
                    scope = id;
                    continue;
                }
                None => return ReceiverResolution::NotFound,
            }
        }

        let name = segment_name(segment);
        if name.is_empty() {
            return ReceiverResolution::NotFound;
        }

        let symbol = if position == 0 {
            get_object(table, name, active, locals, ObjectQuery::default())
        } else {
            match &receiver {
                Receiver::Class(id) => member_in_class(table, name, *id),
                Receiver::Struct(structure) => structure
                    .member(name)
                    .cloned()
                    .map(Symbol::Variable)
                    .map(Resolution::Found)
                    .unwrap_or(Resolution::NotFound),
            }
        };
        let symbol = match symbol {
            Resolution::Found(symbol) => symbol,
            Resolution::Pending(id) => return ReceiverResolution::Pending(id),
            Resolution::NotFound => return ReceiverResolution::NotFound,
        };

        let next = match symbol {
            Symbol::Class(id) => ReceiverResolution::Found(Receiver::Class(id)),
            Symbol::Struct(structure) => ReceiverResolution::Found(Receiver::Struct(structure)),
            Symbol::Variable(variable) => {
                receiver_for_type(table, &variable.type_at_level(secondary_level), scope)
            }
            Symbol::Function(function) => receiver_for_type(table, &function.return_type, scope),
            Symbol::Const(_) => ReceiverResolution::NotFound,
        };
        match next {
            ReceiverResolution::Found(found) => {
                if let Receiver::Class(id) = &found {
                    scope = *id;
                }
                receiver = found;
            }
            other => return other,
        }
    }
    ReceiverResolution::Found(receiver)
}

/// `class'Pawn'` -> `Pawn`.
fn class_literal_name(segment: &str) -> Option<&str> {
    let lower = segment.to_lowercase();
    if !lower.starts_with("class'") {
        return None;
    }
    segment["class'".len()..].split('\'').next()
}

/// The identifier a segment resolves by: text before any call or index
/// suffix.
fn segment_name(segment: &str) -> &str {
    segment
        .split(|c| c == '(' || c == '[')
        .next()
        .unwrap_or("")
        .trim()
}

/// Map a type name to a receiver: a class by name, or a struct declared in
/// the enclosing scope.
fn receiver_for_type(table: &SymbolTable, type_name: &str, scope: ClassId) -> ReceiverResolution {
    let type_name = type_name.trim();
    if type_name.is_empty() {
        return ReceiverResolution::NotFound;
    }
    if let Some(id) = table.lookup(type_name) {
        return ReceiverResolution::Found(Receiver::Class(id));
    }
    match table.get_variable(type_name, scope) {
        Lookup::Found(Symbol::Struct(structure)) => {
            ReceiverResolution::Found(Receiver::Struct(structure))
        }
        Lookup::Pending(id) => ReceiverResolution::Pending(id),
        _ => ReceiverResolution::NotFound,
    }
}

/// Member lookup in one class: functions first, then value members.
fn member_in_class(table: &SymbolTable, name: &str, id: ClassId) -> Resolution {
    match table.get_function(name, id) {
        Lookup::Found(function) => return Resolution::Found(Symbol::Function(function)),
        Lookup::Pending(pending) => return Resolution::Pending(pending),
        Lookup::Missing => {}
    }
    match table.get_variable(name, id) {
        Lookup::Found(symbol) => Resolution::Found(symbol),
        Lookup::Pending(pending) => Resolution::Pending(pending),
        Lookup::Missing => Resolution::NotFound,
    }
}
