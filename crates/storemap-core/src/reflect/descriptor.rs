//! Type descriptors.

use std::sync::Arc;

/// Shared handle to a type descriptor.
pub type TypeHandle = Arc<TypeDescriptor>;

/// Coarse classification of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Value type (numeric, boolean, date, enum). Never nullable.
    Value,
    /// UTF-8 string. Supports a maximum length.
    String,
    /// Binary data. Supports a maximum length.
    Bytes,
    /// Identity reference to a mapped object.
    ObjectId,
    /// Reference type participating in a class hierarchy.
    Class,
}

/// Description of one runtime type.
///
/// Descriptors are immutable and shared as [`TypeHandle`]s; base links point
/// strictly upward, so a descriptor chain never cycles.
#[derive(Debug)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    base: Option<TypeHandle>,
    persistence_root: bool,
    mixin_base: bool,
    open_generic_params: bool,
}

impl TypeDescriptor {
    fn build(name: impl Into<String>, kind: TypeKind) -> TypeDescriptor {
        TypeDescriptor {
            name: name.into(),
            kind,
            base: None,
            persistence_root: false,
            mixin_base: false,
            open_generic_params: false,
        }
    }

    /// Create a value type.
    pub fn value(name: impl Into<String>) -> TypeHandle {
        Arc::new(Self::build(name, TypeKind::Value))
    }

    /// Create the string type.
    pub fn string() -> TypeHandle {
        Arc::new(Self::build("String", TypeKind::String))
    }

    /// Create the binary type.
    pub fn bytes() -> TypeHandle {
        Arc::new(Self::build("Bytes", TypeKind::Bytes))
    }

    /// Create the identity-reference type.
    pub fn object_id() -> TypeHandle {
        Arc::new(Self::build("ObjectId", TypeKind::ObjectId))
    }

    /// Create the persistence root type all mapped classes derive from.
    pub fn persistence_root(name: impl Into<String>) -> TypeHandle {
        let mut descriptor = Self::build(name, TypeKind::Class);
        descriptor.persistence_root = true;
        Arc::new(descriptor)
    }

    /// Create a class type deriving from `base`.
    pub fn class(name: impl Into<String>, base: &TypeHandle) -> TypeHandle {
        let mut descriptor = Self::build(name, TypeKind::Class);
        descriptor.base = Some(base.clone());
        Arc::new(descriptor)
    }

    /// Create a reference type outside the persistence hierarchy.
    pub fn plain_class(name: impl Into<String>) -> TypeHandle {
        Arc::new(Self::build(name, TypeKind::Class))
    }

    /// Create the marker type persistence-relevant mixins derive from.
    pub fn mixin_base(name: impl Into<String>) -> TypeHandle {
        let mut descriptor = Self::build(name, TypeKind::Class);
        descriptor.mixin_base = true;
        Arc::new(descriptor)
    }

    /// Create a mixin type deriving from `base`.
    pub fn mixin(name: impl Into<String>, base: &TypeHandle) -> TypeHandle {
        Self::class(name, base)
    }

    /// Create a mixin type with unbound generic type parameters.
    pub fn open_generic_mixin(name: impl Into<String>, base: &TypeHandle) -> TypeHandle {
        let mut descriptor = Self::build(name, TypeKind::Class);
        descriptor.base = Some(base.clone());
        descriptor.open_generic_params = true;
        Arc::new(descriptor)
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type kind.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Base type, if any.
    pub fn base(&self) -> Option<&TypeHandle> {
        self.base.as_ref()
    }

    /// Check if this is a value type.
    pub fn is_value_type(&self) -> bool {
        self.kind == TypeKind::Value
    }

    /// Check if this type supports a maximum length constraint.
    pub fn supports_max_length(&self) -> bool {
        matches!(self.kind, TypeKind::String | TypeKind::Bytes)
    }

    /// Check if this is the identity-reference type.
    pub fn is_object_id(&self) -> bool {
        self.kind == TypeKind::ObjectId
    }

    /// Check if this is a reference (class) type.
    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    /// Check if this is the persistence root type.
    pub fn is_persistence_root(&self) -> bool {
        self.persistence_root
    }

    /// Check if this type has unbound generic type parameters.
    pub fn has_open_generic_params(&self) -> bool {
        self.open_generic_params
    }

    /// Check if this type strictly derives from `other` (compared by name).
    pub fn derives_from(&self, other: &TypeDescriptor) -> bool {
        let mut current = self.base.as_ref();
        while let Some(ancestor) = current {
            if ancestor.name == other.name {
                return true;
            }
            current = ancestor.base.as_ref();
        }
        false
    }

    /// Check if this type is `other` or strictly derives from it.
    pub fn is_same_or_derived_from(&self, other: &TypeDescriptor) -> bool {
        self.name == other.name || self.derives_from(other)
    }

    /// Check if a strict ancestor of this type is the persistence root.
    pub fn derives_from_persistence_root(&self) -> bool {
        let mut current = self.base.as_ref();
        while let Some(ancestor) = current {
            if ancestor.persistence_root {
                return true;
            }
            current = ancestor.base.as_ref();
        }
        false
    }

    /// Check if this type is or derives from the persistence-mixin marker.
    pub fn is_persistent_mixin(&self) -> bool {
        if self.mixin_base {
            return true;
        }
        let mut current = self.base.as_ref();
        while let Some(ancestor) = current {
            if ancestor.mixin_base {
                return true;
            }
            current = ancestor.base.as_ref();
        }
        false
    }
}
