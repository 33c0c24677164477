//! Class metadata registry.
//!
//! Rust has no runtime reflection, so reflective queries run against a
//! registry of [`ClassMeta`] records built ahead of time (normally by the
//! source scanner). [`ClassHandle`] resolves the inheritance chain on top of
//! the declared records: visible members, nearest declaration first, with the
//! declaring class tracked per member.

use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::Error;

/// Member visibility as declared in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// Declared structure of one class, as recorded by the scanner.
#[derive(Debug, Clone, Default)]
pub struct ClassMeta {
    /// Fully qualified name.
    pub name: String,
    pub parent: Option<String>,
    /// Interface names from the `implements` clause.
    pub interfaces: Vec<String>,
    /// Raw docblock text attached to the class declaration.
    pub doc: Option<String>,
    /// Declared methods, in declaration order.
    pub methods: Vec<MethodMeta>,
    /// Declared constants, in declaration order.
    pub constants: Vec<ConstantMeta>,
}

#[derive(Debug, Clone, Default)]
pub struct MethodMeta {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConstantMeta {
    pub name: String,
    pub visibility: Visibility,
    pub value: Value,
    pub doc: Option<String>,
}

/// All classes known to one extraction run, keyed by fully qualified name.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassMeta>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, meta: ClassMeta) {
        self.classes.insert(meta.name.clone(), meta);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name.trim_start_matches('\\'))
    }

    /// Registered class names, sorted for deterministic iteration.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a class. An unknown identity is the one fatal condition of
    /// the extraction pipeline, surfaced here so no later query can fail.
    pub fn handle<'a>(&'a self, name: &str) -> Result<ClassHandle<'a>, Error> {
        let key = name.trim_start_matches('\\');
        self.classes
            .get(key)
            .map(|meta| ClassHandle {
                registry: self,
                meta,
            })
            .ok_or_else(|| Error::UnknownClass(name.to_string()))
    }
}

/// Resolved view over one registered class.
#[derive(Debug, Clone, Copy)]
pub struct ClassHandle<'a> {
    registry: &'a ClassRegistry,
    meta: &'a ClassMeta,
}

impl<'a> ClassHandle<'a> {
    pub fn name(&self) -> &'a str {
        &self.meta.name
    }

    pub fn raw_doc(&self) -> &'a str {
        self.meta.doc.as_deref().unwrap_or("")
    }

    pub fn parent_class_name(&self) -> Option<&'a str> {
        self.meta.parent.as_deref()
    }

    /// Handle for the parent class. `None` when the class has no parent or
    /// the parent was never registered; member queries degrade to empty in
    /// that case rather than failing.
    pub fn parent(&self) -> Option<ClassHandle<'a>> {
        let name = self.meta.parent.as_deref()?;
        self.registry.handle(name).ok()
    }

    /// Interface names implemented by this class, including those declared
    /// by registered ancestors. Own declarations first, deduplicated.
    pub fn interface_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for meta in self.ancestor_chain() {
            for interface in &meta.interfaces {
                if seen.insert(interface.clone()) {
                    names.push(interface.clone());
                }
            }
        }
        names
    }

    /// Public methods visible on this class: own declarations in declaration
    /// order, then inherited ones walking up the chain. A name declared
    /// closer to this class shadows any declaration further up.
    pub fn public_methods(&self) -> Vec<MethodHandle<'a>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut methods = Vec::new();
        for meta in self.ancestor_chain() {
            for method in &meta.methods {
                if !method.visibility.is_public() {
                    continue;
                }
                if seen.insert(method.name.as_str()) {
                    methods.push(MethodHandle {
                        declaring_class: &meta.name,
                        meta: method,
                    });
                }
            }
        }
        methods
    }

    /// Public constants visible on this class, same resolution as methods.
    pub fn public_constants(&self) -> Vec<ConstantHandle<'a>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut constants = Vec::new();
        for meta in self.ancestor_chain() {
            for constant in &meta.constants {
                if !constant.visibility.is_public() {
                    continue;
                }
                if seen.insert(constant.name.as_str()) {
                    constants.push(ConstantHandle {
                        declaring_class: &meta.name,
                        meta: constant,
                    });
                }
            }
        }
        constants
    }

    /// This class followed by its registered ancestors, nearest first.
    /// Guards against inheritance cycles in hand-built registries.
    fn ancestor_chain(&self) -> Vec<&'a ClassMeta> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(self.meta);
        while let Some(meta) = current {
            if !visited.insert(meta.name.as_str()) {
                break;
            }
            chain.push(meta);
            current = meta
                .parent
                .as_deref()
                .and_then(|p| self.registry.handle(p).ok())
                .map(|h| h.meta);
        }
        chain
    }
}

/// One public method as seen from a resolved class view.
#[derive(Debug, Clone, Copy)]
pub struct MethodHandle<'a> {
    declaring_class: &'a str,
    meta: &'a MethodMeta,
}

impl<'a> MethodHandle<'a> {
    pub fn name(&self) -> &'a str {
        &self.meta.name
    }

    pub fn declaring_class(&self) -> &'a str {
        self.declaring_class
    }

    pub fn is_static(&self) -> bool {
        self.meta.is_static
    }

    pub fn is_final(&self) -> bool {
        self.meta.is_final
    }

    pub fn raw_doc(&self) -> &'a str {
        self.meta.doc.as_deref().unwrap_or("")
    }

    /// `Class::method` identity used to key the external reference index.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.declaring_class, self.meta.name)
    }
}

/// One public constant as seen from a resolved class view.
#[derive(Debug, Clone, Copy)]
pub struct ConstantHandle<'a> {
    declaring_class: &'a str,
    meta: &'a ConstantMeta,
}

impl<'a> ConstantHandle<'a> {
    pub fn name(&self) -> &'a str {
        &self.meta.name
    }

    pub fn declaring_class(&self) -> &'a str {
        self.declaring_class
    }

    pub fn value(&self) -> &'a Value {
        &self.meta.value
    }

    pub fn raw_doc(&self) -> &'a str {
        self.meta.doc.as_deref().unwrap_or("")
    }
}
