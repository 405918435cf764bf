//! Field introspection.
//!
//! [`fields`] computes the ordered set of serializable fields of a type: its own
//! fields in declaration order, then each ancestor's fields from nearest to furthest.
//! When a name appears more than once the most-derived declaration wins. The
//! host-internal names in [`INTERNAL_FIELDS`] are always dropped, whatever the
//! [`SerializabilityPolicy`] says.
//!
//! The result only depends on static type descriptions, so it is recomputed on
//! demand rather than cached.

use std::any::Any;
use std::collections::HashSet;

use crate::info::{FieldDescriptor, FieldShape, TypeInfo};
use crate::value::{Value, ValueRef};
use crate::{Error, Result};

/// Field names owned by host runtimes; never serialized.
pub const INTERNAL_FIELDS: &[&str] = &["m_CachedPtr", "m_InstanceID", "m_UnityRuntimeErrorString"];

/// Decides which declared fields take part in serialization.
pub trait SerializabilityPolicy {
    fn is_eligible(&self, field: &FieldDescriptor) -> bool;
}

/// Every field except those declared `transient`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPolicy;

impl SerializabilityPolicy for DefaultPolicy {
    fn is_eligible(&self, field: &FieldDescriptor) -> bool {
        field.is_serializable()
    }
}

/// Every field, transient ones included.
#[derive(Clone, Copy, Debug, Default)]
pub struct IncludeTransient;

impl SerializabilityPolicy for IncludeTransient {
    fn is_eligible(&self, _field: &FieldDescriptor) -> bool {
        true
    }
}

/// Adapts a closure into a policy.
///
/// # Examples
///
/// ```rust
/// use cd_json::PolicyFn;
///
/// let skip_secrets = PolicyFn(|field: &cd_json::FieldDescriptor| {
///     field.is_serializable() && !field.name().starts_with("secret")
/// });
/// # let _ = skip_secrets;
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PolicyFn<F>(pub F);

impl<F> SerializabilityPolicy for PolicyFn<F>
where
    F: Fn(&FieldDescriptor) -> bool,
{
    fn is_eligible(&self, field: &FieldDescriptor) -> bool {
        (self.0)(field)
    }
}

impl<P: SerializabilityPolicy + ?Sized> SerializabilityPolicy for &P {
    fn is_eligible(&self, field: &FieldDescriptor) -> bool {
        (**self).is_eligible(field)
    }
}

/// A field resolved against a concrete type, possibly declared by an ancestor.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    descriptor: &'static FieldDescriptor,
    owner: &'static TypeInfo,
    root: &'static TypeInfo,
    depth: usize,
}

impl Field {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.descriptor.name()
    }

    #[must_use]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    /// The type that declares this field.
    #[must_use]
    pub fn owner(&self) -> &'static TypeInfo {
        self.owner
    }

    #[must_use]
    pub fn shape(&self) -> FieldShape {
        self.descriptor.shape()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.descriptor.is_leaf()
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.descriptor.is_collection()
    }

    /// Reads the field from an instance of the type it was resolved against.
    pub fn get<'a>(&self, instance: &'a dyn Any) -> Option<ValueRef<'a>> {
        self.descriptor.get(self.root.upcast(instance, self.depth)?)
    }

    /// Assigns the field on an instance of the type it was resolved against.
    pub fn set(&self, instance: &mut dyn Any, value: Value) -> Result<()> {
        let target = self
            .root
            .upcast_mut(instance, self.depth)
            .ok_or_else(|| Error::type_mismatch(self.root.name(), "unrelated instance"))?;
        self.descriptor.set(target, value)
    }
}

fn eligible<P>(descriptor: &FieldDescriptor, policy: &P) -> bool
where
    P: SerializabilityPolicy + ?Sized,
{
    policy.is_eligible(descriptor) && !INTERNAL_FIELDS.contains(&descriptor.name())
}

/// Returns the ordered, deduplicated serializable fields of `ty`.
///
/// # Examples
///
/// ```rust
/// use cd_json::{composite, fields, DefaultPolicy, Typed};
///
/// #[derive(Debug, Default)]
/// struct Base { id: i32, label: String }
/// composite! { Base => "demo.Base" { id: i32, label: String } }
///
/// #[derive(Debug, Default)]
/// struct Derived { base: Base, label: String, extra: bool }
/// composite! { Derived => "demo.Derived" extends Base [base] { label: String, extra: bool } }
///
/// let names: Vec<_> = fields(Derived::type_info(), &DefaultPolicy)
///     .iter()
///     .map(|f| f.name())
///     .collect();
/// assert_eq!(names, ["label", "extra", "id"]);
/// ```
pub fn fields<P>(ty: &'static TypeInfo, policy: &P) -> Vec<Field>
where
    P: SerializabilityPolicy + ?Sized,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (depth, owner) in ty.ancestors().enumerate() {
        for descriptor in owner.own_fields() {
            if !eligible(descriptor, policy) || !seen.insert(descriptor.name()) {
                continue;
            }
            out.push(Field {
                descriptor,
                owner,
                root: ty,
                depth,
            });
        }
    }
    out
}

/// Resolves a single field by name with the same rules as [`fields`].
pub fn find_field<P>(ty: &'static TypeInfo, name: &str, policy: &P) -> Option<Field>
where
    P: SerializabilityPolicy + ?Sized,
{
    ty.ancestors().enumerate().find_map(|(depth, owner)| {
        owner
            .own_fields()
            .iter()
            .find(|descriptor| descriptor.name() == name && eligible(*descriptor, policy))
            .map(|descriptor| Field {
                descriptor,
                owner,
                root: ty,
                depth,
            })
    })
}
