//! Test class registry: explicit class and member declarations used for member lookup.
//!
//! Test classes (and the interfaces they implement) are declared up front
//! with a [`ClassRegistryBuilder`]. Each declaration names its base class,
//! its interfaces and its provider members. The resulting [`ClassRegistry`]
//! is immutable; [`ClassRef`] is the handle data sources resolve against.

use crate::provider::{IntoProvider, MemberFn, ParamSpec, ProviderError, ProviderOutput};
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors raised while declaring classes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate class name: {0}")]
    DuplicateClassName(String),

    #[error("unknown base class `{base}` for `{class}`")]
    UnknownBase { class: String, base: String },

    #[error("unknown interface `{interface}` for `{class}`")]
    UnknownInterface { class: String, interface: String },

    #[error("`{class}` cannot extend `{base}`: it is an interface")]
    BaseIsInterface { class: String, base: String },

    #[error("`{class}` cannot implement `{interface}`: it is not an interface")]
    NotAnInterface { class: String, interface: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(u32);

impl ClassId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Property,
}

/// A member declared on a class or interface.
#[derive(Debug, Clone)]
pub struct MemberDef {
    pub name: String,
    pub kind: MemberKind,
    pub is_static: bool,
    pub params: Vec<ParamSpec>,
    invoke: MemberFn,
}

impl MemberDef {
    /// Number of parameters without a default.
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| !p.is_optional()).count()
    }

    /// Whether the given arguments can be passed to this member.
    ///
    /// Properties take no arguments. Methods need every required parameter
    /// supplied, no surplus arguments, and each argument assignable to its
    /// parameter type.
    pub fn accepts(&self, args: &[Value]) -> bool {
        if self.kind == MemberKind::Property {
            return args.is_empty();
        }
        if args.len() < self.required_params() || args.len() > self.params.len() {
            return false;
        }
        self.params
            .iter()
            .zip(args)
            .all(|(param, arg)| param.ty.accepts(arg))
    }

    /// Invoke with the given arguments, filling omitted trailing parameters
    /// from their defaults.
    pub fn invoke(&self, args: &[Value]) -> Result<ProviderOutput, ProviderError> {
        let mut full = args.to_vec();
        for param in self.params.iter().skip(args.len()) {
            match &param.default {
                Some(default) => full.push(default.clone()),
                None => {
                    return Err(ProviderError::ArgumentCount {
                        expected: self.required_params(),
                        actual: args.len(),
                    })
                }
            }
        }
        self.invoke.call(&full)
    }
}

/// A class or interface definition.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub id: ClassId,
    pub name: String,
    pub is_interface: bool,
    pub base: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub members: Vec<MemberDef>,
}

/// Immutable set of declared test classes.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassDef>,
    names: HashMap<String, ClassId>,
}

impl ClassRegistry {
    pub fn builder() -> ClassRegistryBuilder {
        ClassRegistryBuilder::default()
    }

    /// Look up a class or interface by name.
    pub fn class(&self, name: &str) -> Option<ClassRef<'_>> {
        self.names.get(name).map(|&id| self.get(id))
    }

    fn get(&self, id: ClassId) -> ClassRef<'_> {
        ClassRef {
            registry: self,
            def: &self.classes[id.index()],
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Handle to a class inside its registry.
#[derive(Clone, Copy)]
pub struct ClassRef<'r> {
    registry: &'r ClassRegistry,
    def: &'r ClassDef,
}

impl<'r> ClassRef<'r> {
    pub fn id(&self) -> ClassId {
        self.def.id
    }

    pub fn name(&self) -> &'r str {
        &self.def.name
    }

    pub fn is_interface(&self) -> bool {
        self.def.is_interface
    }

    pub fn base(&self) -> Option<ClassRef<'r>> {
        self.def.base.map(|id| self.registry.get(id))
    }

    /// Interfaces declared directly on this class.
    pub fn interfaces(&self) -> impl Iterator<Item = ClassRef<'r>> + 'r {
        let registry = self.registry;
        self.def.interfaces.iter().map(move |&id| registry.get(id))
    }

    pub fn members(&self) -> &'r [MemberDef] {
        &self.def.members
    }

    /// Every type searched for members, nearest first: the class, each
    /// ancestor, then every interface reachable from that chain (including
    /// interfaces of interfaces), each once, in first-encounter order.
    pub fn lineage(&self) -> Vec<ClassRef<'r>> {
        let mut chain = Vec::new();
        let mut pending = Vec::new();

        let mut current = Some(*self);
        while let Some(class) = current {
            chain.push(class);
            pending.extend(class.interfaces());
            current = class.base();
        }

        let mut seen: HashSet<ClassId> = chain.iter().map(ClassRef::id).collect();
        let mut next = 0;
        while next < pending.len() {
            let interface = pending[next];
            next += 1;
            if seen.insert(interface.id()) {
                chain.push(interface);
                pending.extend(interface.interfaces());
            }
        }

        chain
    }
}

impl std::fmt::Debug for ClassRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ClassRef").field(&self.def.name).finish()
    }
}

impl PartialEq for ClassRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.registry, other.registry) && self.def.id == other.def.id
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for a [`ClassRegistry`]. Base classes and interfaces must be
/// declared before the classes that reference them.
///
/// ```rust
/// use rstheory::{ClassRegistry, TypedTestData};
///
/// let mut builder = ClassRegistry::builder();
/// builder
///     .add_class("Calc")
///     .static_method("Sums", || {
///         TypedTestData::<(i32, i32, i32)>::from_iter([(1, 2, 3), (-4, -6, -10)])
///     })
///     .done()
///     .unwrap();
/// let registry = builder.build();
/// assert!(registry.class("Calc").is_some());
/// ```
#[derive(Debug, Default)]
pub struct ClassRegistryBuilder {
    classes: Vec<ClassDef>,
    names: HashMap<String, ClassId>,
}

impl ClassRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start declaring a class.
    pub fn add_class(&mut self, name: impl Into<String>) -> ClassBuilder<'_> {
        ClassBuilder::new(self, name.into(), false)
    }

    /// Start declaring an interface. Interfaces can only `implements` other
    /// interfaces.
    pub fn add_interface(&mut self, name: impl Into<String>) -> ClassBuilder<'_> {
        ClassBuilder::new(self, name.into(), true)
    }

    pub fn build(self) -> ClassRegistry {
        ClassRegistry {
            classes: self.classes,
            names: self.names,
        }
    }

    fn lookup(&self, name: &str) -> Option<&ClassDef> {
        self.names.get(name).map(|id| &self.classes[id.index()])
    }
}

/// Builder for one class or interface.
pub struct ClassBuilder<'a> {
    builder: &'a mut ClassRegistryBuilder,
    name: String,
    is_interface: bool,
    base_name: Option<String>,
    interface_names: Vec<String>,
    members: Vec<MemberDef>,
}

impl<'a> ClassBuilder<'a> {
    fn new(builder: &'a mut ClassRegistryBuilder, name: String, is_interface: bool) -> Self {
        ClassBuilder {
            builder,
            name,
            is_interface,
            base_name: None,
            interface_names: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Set the base class.
    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.base_name = Some(base.into());
        self
    }

    /// Add an implemented interface.
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interface_names.push(interface.into());
        self
    }

    /// Add a public static method backed by a typed closure.
    pub fn static_method<Args>(self, name: impl Into<String>, provider: impl IntoProvider<Args>) -> Self {
        let (params, invoke) = provider.into_provider();
        self.member(name.into(), MemberKind::Method, true, params, invoke)
    }

    /// Add a public static method with explicit parameter specs (optional
    /// parameters, `Any`, nullable types) and a raw body.
    pub fn static_method_with(
        self,
        name: impl Into<String>,
        params: Vec<ParamSpec>,
        body: impl Fn(&[Value]) -> Result<ProviderOutput, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        self.member(name.into(), MemberKind::Method, true, params, MemberFn::new(body))
    }

    /// Add a public static property. Its getter takes no arguments.
    pub fn static_property(self, name: impl Into<String>, getter: impl IntoProvider<()>) -> Self {
        let (_, invoke) = getter.into_provider();
        self.member(name.into(), MemberKind::Property, true, Vec::new(), invoke)
    }

    /// Add an instance method. Never selected by member lookup.
    pub fn instance_method<Args>(self, name: impl Into<String>, provider: impl IntoProvider<Args>) -> Self {
        let (params, invoke) = provider.into_provider();
        self.member(name.into(), MemberKind::Method, false, params, invoke)
    }

    fn member(
        mut self,
        name: String,
        kind: MemberKind,
        is_static: bool,
        params: Vec<ParamSpec>,
        invoke: MemberFn,
    ) -> Self {
        self.members.push(MemberDef {
            name,
            kind,
            is_static,
            params,
            invoke,
        });
        self
    }

    /// Finish the declaration and register it.
    pub fn done(self) -> Result<ClassId, RegistryError> {
        if self.builder.names.contains_key(&self.name) {
            return Err(RegistryError::DuplicateClassName(self.name));
        }

        let base = match &self.base_name {
            Some(base_name) => {
                let base = self.builder.lookup(base_name).ok_or_else(|| RegistryError::UnknownBase {
                    class: self.name.clone(),
                    base: base_name.clone(),
                })?;
                if base.is_interface || self.is_interface {
                    return Err(RegistryError::BaseIsInterface {
                        class: self.name.clone(),
                        base: base_name.clone(),
                    });
                }
                Some(base.id)
            }
            None => None,
        };

        let mut interfaces = Vec::new();
        for interface_name in &self.interface_names {
            let interface =
                self.builder
                    .lookup(interface_name)
                    .ok_or_else(|| RegistryError::UnknownInterface {
                        class: self.name.clone(),
                        interface: interface_name.clone(),
                    })?;
            if !interface.is_interface {
                return Err(RegistryError::NotAnInterface {
                    class: self.name.clone(),
                    interface: interface_name.clone(),
                });
            }
            interfaces.push(interface.id);
        }

        let id = ClassId(self.builder.classes.len() as u32);
        self.builder.classes.push(ClassDef {
            id,
            name: self.name.clone(),
            is_interface: self.is_interface,
            base,
            interfaces,
            members: self.members,
        });
        self.builder.names.insert(self.name, id);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::IntoProviderOutput;
    use crate::value::ValueType;

    fn names(lineage: &[ClassRef<'_>]) -> Vec<String> {
        lineage.iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn test_lineage_is_class_chain_then_interfaces() {
        let mut b = ClassRegistry::builder();
        b.add_interface("IRoot").done().unwrap();
        b.add_interface("IShared").implements("IRoot").done().unwrap();
        b.add_interface("IBase").done().unwrap();
        b.add_class("Base").implements("IBase").implements("IShared").done().unwrap();
        b.add_class("Mid").extends("Base").implements("IShared").done().unwrap();
        b.add_class("Leaf").extends("Mid").done().unwrap();
        let registry = b.build();

        let leaf = registry.class("Leaf").unwrap();
        assert_eq!(
            names(&leaf.lineage()),
            vec!["Leaf", "Mid", "Base", "IShared", "IBase", "IRoot"]
        );
    }

    #[test]
    fn test_lookup_is_by_name_within_one_registry() {
        let mut big = ClassRegistry::builder();
        big.add_class("A").done().unwrap();
        big.add_class("B").done().unwrap();
        let c_id = big.add_class("C").done().unwrap();
        let big = big.build();

        let mut small = ClassRegistry::builder();
        let a_id = small.add_class("A").done().unwrap();
        let small = small.build();

        assert_eq!(big.class("C").unwrap().id(), c_id);
        assert_eq!(small.class("A").unwrap().id(), a_id);
        assert!(small.class("C").is_none());
        assert_eq!(small.len(), 1);
    }

    #[test]
    fn test_declaration_errors() {
        let mut b = ClassRegistry::builder();
        b.add_class("A").done().unwrap();
        b.add_interface("I").done().unwrap();

        assert_eq!(
            b.add_class("A").done(),
            Err(RegistryError::DuplicateClassName("A".into()))
        );
        assert!(matches!(
            b.add_class("B").extends("Missing").done(),
            Err(RegistryError::UnknownBase { .. })
        ));
        assert!(matches!(
            b.add_class("B").extends("I").done(),
            Err(RegistryError::BaseIsInterface { .. })
        ));
        assert!(matches!(
            b.add_class("B").implements("A").done(),
            Err(RegistryError::NotAnInterface { .. })
        ));
        assert!(matches!(
            b.add_class("B").implements("J").done(),
            Err(RegistryError::UnknownInterface { .. })
        ));
        assert_eq!(b.build().len(), 2);
    }

    #[test]
    fn test_member_accepts_optional_params() {
        let mut b = ClassRegistry::builder();
        b.add_class("C")
            .static_method_with(
                "Gen",
                vec![
                    ParamSpec::required(ValueType::Int),
                    ParamSpec::optional(ValueType::Int, 10),
                ],
                |args| Ok(vec![args.to_vec()].into_provider_output()),
            )
            .done()
            .unwrap();
        let registry = b.build();
        let member = &registry.class("C").unwrap().members()[0];

        assert!(!member.accepts(&[]));
        assert!(member.accepts(&[Value::Int(1)]));
        assert!(member.accepts(&[Value::Int(1), Value::Int(2)]));
        assert!(!member.accepts(&[Value::Int(1), Value::Int(2), Value::Int(3)]));
        assert!(!member.accepts(&[Value::from("x")]));

        let out = member.invoke(&[Value::Int(1)]).unwrap();
        assert_eq!(out.rows()[0].values(), &[Value::Int(1), Value::Int(10)]);
    }
}
