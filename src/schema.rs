//! Static per-model schemas: the declared contract a process model exposes to
//! the builder.
//!
//! A [`ModelSchema`] maps attribute names to [`TypeDescriptor`]s and is built
//! once per model type through [`SchemaBuilder`]: explicit registration, no
//! runtime introspection. The schema is pure declaration; live instance data
//! never touches it.
//!
//! [`TypeTag`] carries the primary type tag of each attribute as a tagged
//! variant. Direction compatibility is a table lookup on the tag
//! ([`TypeTag::direction`]) rather than a class-hierarchy walk, and a raw
//! literal that reached a type slot upstream stays representable as
//! [`TypeTag::Literal`] so the builder can reject it.

use rustc_hash::FxHashMap;
use std::fmt;

use crate::types::{DType, PortDirection};

/// Concrete port implementation strategies known to the transport layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortImpl {
    VecDense,
    VecSparse,
    ScalarDense,
    ScalarSparse,
}

impl fmt::Display for PortImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortImpl::VecDense => write!(f, "VecDense"),
            PortImpl::VecSparse => write!(f, "VecSparse"),
            PortImpl::ScalarDense => write!(f, "ScalarDense"),
            PortImpl::ScalarSparse => write!(f, "ScalarSparse"),
        }
    }
}

/// Primary type tag of a declared attribute.
///
/// Port attributes carry either a direction base (`InPort`/`OutPort`) or a
/// concrete implementation (`In(..)`/`Out(..)`); state variables carry
/// `Data(..)`. `Literal` preserves a non-type value supplied upstream, which
/// only ever survives until [`check_type_compatibility`] rejects it.
///
/// [`check_type_compatibility`]: crate::builder::ProcessBuilder::check_type_compatibility
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeTag {
    /// The input-port base capability.
    InPort,
    /// The output-port base capability.
    OutPort,
    /// A concrete input-port implementation.
    In(PortImpl),
    /// A concrete output-port implementation.
    Out(PortImpl),
    /// A plain data tag for state variables.
    Data(DType),
    /// A raw value that is not a type at all.
    Literal(i64),
}

impl TypeTag {
    /// Whether this tag names an actual type.
    #[must_use]
    pub fn is_type(&self) -> bool {
        !matches!(self, TypeTag::Literal(_))
    }

    /// The direction capability this tag satisfies, if it is a port type.
    #[must_use]
    pub fn direction(&self) -> Option<PortDirection> {
        match self {
            TypeTag::InPort | TypeTag::In(_) => Some(PortDirection::Input),
            TypeTag::OutPort | TypeTag::Out(_) => Some(PortDirection::Output),
            TypeTag::Data(_) | TypeTag::Literal(_) => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::InPort => write!(f, "InPort"),
            TypeTag::OutPort => write!(f, "OutPort"),
            TypeTag::In(imp) => write!(f, "InPort::{imp}"),
            TypeTag::Out(imp) => write!(f, "OutPort::{imp}"),
            TypeTag::Data(dt) => write!(f, "Data({dt})"),
            TypeTag::Literal(v) => write!(f, "literal {v}"),
        }
    }
}

/// Declared contract of one attribute: primary tag, element type, and the
/// default precision the builder copies onto the built Var.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypeDescriptor {
    pub tag: TypeTag,
    pub dtype: DType,
    pub precision: u32,
}

impl TypeDescriptor {
    pub fn new(tag: TypeTag, dtype: DType, precision: u32) -> Self {
        TypeDescriptor {
            tag,
            dtype,
            precision,
        }
    }
}

/// The static schema of a process-model type: attribute name to descriptor.
///
/// One schema exists per model type, typically behind a
/// `std::sync::LazyLock`:
///
/// ```rust
/// use std::sync::LazyLock;
/// use procmesh::schema::ModelSchema;
/// use procmesh::types::DType;
///
/// static SCHEMA: LazyLock<ModelSchema> = LazyLock::new(|| {
///     ModelSchema::builder("Relay")
///         .input("s_in", DType::Int32, 8)
///         .var("gain", DType::Int32, 27)
///         .output("a_out", DType::Int32, 8)
///         .build()
/// });
///
/// assert!(SCHEMA.contains("gain"));
/// assert_eq!(SCHEMA.len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct ModelSchema {
    model: &'static str,
    attrs: FxHashMap<String, TypeDescriptor>,
}

impl ModelSchema {
    pub fn builder(model: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            model,
            attrs: FxHashMap::default(),
        }
    }

    /// Name of the model type this schema describes.
    pub fn model(&self) -> &'static str {
        self.model
    }

    pub fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.attrs.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// Fluent registration of attribute descriptors.
#[derive(Debug)]
pub struct SchemaBuilder {
    model: &'static str,
    attrs: FxHashMap<String, TypeDescriptor>,
}

impl SchemaBuilder {
    /// Register a state variable with a `Data` tag.
    #[must_use]
    pub fn var(self, name: &str, dtype: DType, precision: u32) -> Self {
        self.attr(
            name,
            TypeDescriptor::new(TypeTag::Data(dtype), dtype, precision),
        )
    }

    /// Register an input port with the dense-vector implementation tag.
    #[must_use]
    pub fn input(self, name: &str, dtype: DType, precision: u32) -> Self {
        self.attr(
            name,
            TypeDescriptor::new(TypeTag::In(PortImpl::VecDense), dtype, precision),
        )
    }

    /// Register an output port with the dense-vector implementation tag.
    #[must_use]
    pub fn output(self, name: &str, dtype: DType, precision: u32) -> Self {
        self.attr(
            name,
            TypeDescriptor::new(TypeTag::Out(PortImpl::VecDense), dtype, precision),
        )
    }

    /// Register an attribute with an explicit descriptor.
    #[must_use]
    pub fn attr(mut self, name: &str, descriptor: TypeDescriptor) -> Self {
        self.attrs.insert(name.to_string(), descriptor);
        self
    }

    pub fn build(self) -> ModelSchema {
        ModelSchema {
            model: self.model,
            attrs: self.attrs,
        }
    }
}
