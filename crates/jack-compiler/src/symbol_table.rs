//! Class-scope and subroutine-scope symbol tables, and the VM segment each
//! kind maps to.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Var,
}

impl Kind {
    /// Field→this, Static→static, Arg→argument, Var→local. The VM writer
    /// only ever needs the lowercase segment word, since `jack-compiler`
    /// emits `.vm` text rather than calling into `hack-vm`.
    pub fn segment_name(self) -> &'static str {
        match self {
            Kind::Static => "static",
            Kind::Field => "this",
            Kind::Arg => "argument",
            Kind::Var => "local",
        }
    }

    fn is_class_scope(self) -> bool {
        matches!(self, Kind::Static | Kind::Field)
    }
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub type_name: String,
    pub kind: Kind,
    pub index: u16,
}

/// Two independent scopes, each with its own per-kind running counters.
/// Subroutine scope is cleared (and its counters reset) by
/// [`SymbolTable::start_subroutine`]; class scope persists for the whole
/// class.
pub struct SymbolTable {
    class_scope: HashMap<String, Entry>,
    subroutine_scope: HashMap<String, Entry>,
    static_count: u16,
    field_count: u16,
    arg_count: u16,
    var_count: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            class_scope: HashMap::new(),
            subroutine_scope: HashMap::new(),
            static_count: 0,
            field_count: 0,
            arg_count: 0,
            var_count: 0,
        }
    }

    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.arg_count = 0;
        self.var_count = 0;
    }

    pub fn define(&mut self, name: &str, type_name: &str, kind: Kind) {
        let index = match kind {
            Kind::Static => {
                let i = self.static_count;
                self.static_count += 1;
                i
            }
            Kind::Field => {
                let i = self.field_count;
                self.field_count += 1;
                i
            }
            Kind::Arg => {
                let i = self.arg_count;
                self.arg_count += 1;
                i
            }
            Kind::Var => {
                let i = self.var_count;
                self.var_count += 1;
                i
            }
        };
        let entry = Entry {
            type_name: type_name.to_string(),
            kind,
            index,
        };
        if kind.is_class_scope() {
            self.class_scope.insert(name.to_string(), entry);
        } else {
            self.subroutine_scope.insert(name.to_string(), entry);
        }
    }

    pub fn var_count(&self, kind: Kind) -> u16 {
        match kind {
            Kind::Static => self.static_count,
            Kind::Field => self.field_count,
            Kind::Arg => self.arg_count,
            Kind::Var => self.var_count,
        }
    }

    /// Subroutine scope shadows class scope.
    pub fn lookup(&self, name: &str) -> Option<&Entry> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense_per_kind() {
        let mut table = SymbolTable::new();
        table.define("x", "int", Kind::Field);
        table.define("y", "int", Kind::Field);
        table.define("count", "int", Kind::Static);
        assert_eq!(table.lookup("x").unwrap().index, 0);
        assert_eq!(table.lookup("y").unwrap().index, 1);
        assert_eq!(table.lookup("count").unwrap().index, 0);
        assert_eq!(table.var_count(Kind::Field), 2);
    }

    #[test]
    fn subroutine_scope_shadows_class_scope() {
        let mut table = SymbolTable::new();
        table.define("x", "int", Kind::Field);
        table.start_subroutine();
        table.define("x", "int", Kind::Var);
        assert_eq!(table.lookup("x").unwrap().kind, Kind::Var);
    }

    #[test]
    fn start_subroutine_resets_arg_and_var_but_not_class_counters() {
        let mut table = SymbolTable::new();
        table.define("a", "int", Kind::Field);
        table.start_subroutine();
        table.define("p", "int", Kind::Arg);
        table.start_subroutine();
        assert_eq!(table.var_count(Kind::Arg), 0);
        assert_eq!(table.var_count(Kind::Field), 1);
        assert!(table.lookup("p").is_none());
        assert!(table.lookup("a").is_some());
    }
}
