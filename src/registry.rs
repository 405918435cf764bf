//! Type registry and instance construction.
//!
//! - [`TypeRegistry`]: maps type-tag names to [`TypeInfo`]s, populated before use
//! - [`Construction`]: how blank instances of a registered type are obtained
//! - [`InstanceFactory`]: creates blank instances during reconstruction
//!     - [`DefaultFactory`]: ordinary construction only
//!     - [`HostFactory`]: hands host-managed types to a host callback
//!
//! The registry is built once and then shared by reference; it is never global.
//!
//! ## Examples
//!
//! ```rust
//! use cd_json::{composite, TypeRegistry};
//!
//! #[derive(Debug, Default)]
//! struct Point { x: i32, y: i32 }
//! composite! { Point => "demo.Point" { x: i32, y: i32 } }
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Point>().unwrap();
//! assert!(registry.contains("demo.Point"));
//! assert!(registry.resolve("demo.Missing").is_none());
//! ```

use indexmap::IndexMap;

use crate::info::{TypeInfo, TYPE_TAG};
use crate::{Error, Object, Result, Typed};

/// Construction strategy for blank instances of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Construction {
    /// Built by the type's own constructor.
    #[default]
    Ordinary,
    /// Lifecycle owned by a host runtime; must go through a host-aware factory.
    HostManaged,
}

/// A registered type and how to construct it.
#[derive(Clone, Copy, Debug)]
pub struct Registration {
    info: &'static TypeInfo,
    construction: Construction,
}

impl Registration {
    #[must_use]
    pub fn info(&self) -> &'static TypeInfo {
        self.info
    }

    #[must_use]
    pub fn construction(&self) -> Construction {
        self.construction
    }
}

/// Lookup table from type-tag names to type descriptions.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<&'static str, Registration>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` with ordinary construction.
    pub fn register<T: Typed>(&mut self) -> Result<&mut Self> {
        self.register_info(T::type_info(), Construction::Ordinary)
    }

    /// Registers `T` as host-managed.
    pub fn register_managed<T: Typed>(&mut self) -> Result<&mut Self> {
        self.register_info(T::type_info(), Construction::HostManaged)
    }

    /// Registers a type description directly.
    ///
    /// Registering the same type twice replaces its construction strategy. A
    /// different type under an already registered name is rejected, as is any type
    /// in the chain declaring a field named like the type tag.
    pub fn register_info(
        &mut self,
        info: &'static TypeInfo,
        construction: Construction,
    ) -> Result<&mut Self> {
        for ty in info.ancestors() {
            if let Some(field) = ty.own_fields().iter().find(|f| f.name() == TYPE_TAG) {
                return Err(Error::ReservedName {
                    type_name: ty.name().to_string(),
                    field: field.name().to_string(),
                });
            }
        }

        if let Some(existing) = self.types.get(info.name()) {
            if !std::ptr::eq(existing.info, info) {
                return Err(Error::DuplicateType(info.name().to_string()));
            }
        }

        log::debug!("registered type {} ({:?})", info.name(), construction);
        self.types
            .insert(info.name(), Registration { info, construction });
        Ok(self)
    }

    /// Looks up a type by its type-tag name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Registration> {
        self.types.get(name)
    }

    /// Returns the construction strategy for `info`, `Ordinary` if it is not registered.
    #[must_use]
    pub fn construction_of(&self, info: &TypeInfo) -> Construction {
        self.types
            .get(info.name())
            .map_or(Construction::Ordinary, Registration::construction)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates registrations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.types.values()
    }
}

/// Produces blank instances for the materializer.
pub trait InstanceFactory {
    /// Creates an instance of `info` whose fields will be assigned afterwards.
    ///
    /// `display_name` is the value of the `m_Name` property when the input carried one.
    fn create_blank(
        &self,
        info: &'static TypeInfo,
        construction: Construction,
        display_name: Option<&str>,
    ) -> Result<Box<dyn Object>>;
}

impl<F: InstanceFactory + ?Sized> InstanceFactory for &F {
    fn create_blank(
        &self,
        info: &'static TypeInfo,
        construction: Construction,
        display_name: Option<&str>,
    ) -> Result<Box<dyn Object>> {
        (**self).create_blank(info, construction, display_name)
    }
}

fn construct_ordinary(info: &'static TypeInfo, display_name: Option<&str>) -> Result<Box<dyn Object>> {
    let mut object = info
        .construct()
        .ok_or_else(|| Error::instantiation(info.name(), "type is abstract"))?;
    if let Some(name) = display_name {
        object.set_display_name(name.to_string());
    }
    Ok(object)
}

/// Ordinary construction through each type's constructor.
///
/// Host-managed types cannot be created without a host and fail with
/// [`Error::Instantiation`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFactory;

impl InstanceFactory for DefaultFactory {
    fn create_blank(
        &self,
        info: &'static TypeInfo,
        construction: Construction,
        display_name: Option<&str>,
    ) -> Result<Box<dyn Object>> {
        match construction {
            Construction::Ordinary => construct_ordinary(info, display_name),
            Construction::HostManaged => Err(Error::instantiation(
                info.name(),
                "host-managed type requires a host factory",
            )),
        }
    }
}

/// Delegates host-managed types to a host callback.
///
/// The callback returns `None` when the host cannot create the type. The display
/// name is assigned after the callback returns. Ordinary types are constructed as
/// by [`DefaultFactory`].
///
/// # Examples
///
/// ```rust
/// use cd_json::{composite, Construction, HostFactory, InstanceFactory, Object, Typed};
///
/// #[derive(Debug, Default)]
/// struct Texture { name: String, width: u32 }
/// composite! { Texture => "demo.Texture" named [name] { width: u32 } }
///
/// let factory = HostFactory::new(|info| info.construct());
/// let texture = factory
///     .create_blank(Texture::type_info(), Construction::HostManaged, Some("grass"))
///     .unwrap();
/// assert_eq!(texture.display_name(), Some("grass"));
/// ```
pub struct HostFactory<F> {
    create: F,
}

impl<F> HostFactory<F>
where
    F: Fn(&'static TypeInfo) -> Option<Box<dyn Object>>,
{
    pub fn new(create: F) -> Self {
        HostFactory { create }
    }
}

impl<F> InstanceFactory for HostFactory<F>
where
    F: Fn(&'static TypeInfo) -> Option<Box<dyn Object>>,
{
    fn create_blank(
        &self,
        info: &'static TypeInfo,
        construction: Construction,
        display_name: Option<&str>,
    ) -> Result<Box<dyn Object>> {
        match construction {
            Construction::Ordinary => construct_ordinary(info, display_name),
            Construction::HostManaged => {
                log::trace!("asking host for a {} instance", info.name());
                let mut object = (self.create)(info)
                    .ok_or_else(|| Error::instantiation(info.name(), "host declined to create instance"))?;
                if object.object_type() != info {
                    return Err(Error::instantiation(
                        info.name(),
                        &format!("host returned an instance of {}", object.object_type().name()),
                    ));
                }
                if let Some(name) = display_name {
                    object.set_display_name(name.to_string());
                }
                Ok(object)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldDescriptor, FieldValue, Value, ValueRef};

    #[derive(Debug, Default)]
    struct Widget {
        size: i32,
    }

    crate::composite! {
        Widget => "test.Widget" { size: i32 }
    }

    #[derive(Debug)]
    struct Frame {
        depth: i32,
    }

    crate::composite! {
        abstract Frame => "test.Frame" { depth: i32 }
    }

    #[derive(Debug, Default)]
    struct Sprite {
        name: String,
        layer: i32,
    }

    crate::composite! {
        Sprite => "test.Sprite" named [name] { layer: i32 }
    }

    fn tag_get(_instance: &dyn std::any::Any) -> Option<ValueRef<'_>> {
        None
    }

    fn tag_set(_instance: &mut dyn std::any::Any, _value: Value) -> Result<()> {
        Ok(())
    }

    static RESERVED_FIELDS: &[FieldDescriptor] = &[FieldDescriptor::new(
        TYPE_TAG,
        <String as FieldValue>::shape,
        tag_get,
        tag_set,
    )];

    static RESERVED: TypeInfo = TypeInfo::new("test.Reserved", RESERVED_FIELDS, None, None);

    static IMPOSTOR: TypeInfo = TypeInfo::new("test.Widget", &[], None, None);

    #[test]
    fn test_register_and_resolve() {
        let mut registry = TypeRegistry::new();
        registry.register::<Widget>().unwrap().register_managed::<Sprite>().unwrap();
        assert_eq!(registry.len(), 2);
        let sprite = registry.resolve("test.Sprite").unwrap();
        assert_eq!(sprite.info().name(), "test.Sprite");
        assert_eq!(sprite.construction(), Construction::HostManaged);
        assert_eq!(registry.construction_of(Widget::type_info()), Construction::Ordinary);
        let names: Vec<_> = registry.iter().map(|r| r.info().name()).collect();
        assert_eq!(names, ["test.Widget", "test.Sprite"]);
    }

    #[test]
    fn test_reregistering_same_type_is_allowed() {
        let mut registry = TypeRegistry::new();
        registry.register::<Widget>().unwrap();
        registry.register_managed::<Widget>().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.construction_of(Widget::type_info()), Construction::HostManaged);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register::<Widget>().unwrap();
        let err = registry
            .register_info(&IMPOSTOR, Construction::Ordinary)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateType(name) if name == "test.Widget"));
    }

    #[test]
    fn test_reserved_field_name_rejected() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .register_info(&RESERVED, Construction::Ordinary)
            .unwrap_err();
        assert!(matches!(err, Error::ReservedName { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_default_factory() {
        let widget = DefaultFactory
            .create_blank(Widget::type_info(), Construction::Ordinary, None)
            .unwrap();
        assert_eq!(widget.object_type().name(), "test.Widget");

        let err = DefaultFactory
            .create_blank(Frame::type_info(), Construction::Ordinary, None)
            .unwrap_err();
        assert!(matches!(err, Error::Instantiation { .. }));

        let err = DefaultFactory
            .create_blank(Sprite::type_info(), Construction::HostManaged, Some("s"))
            .unwrap_err();
        assert!(matches!(err, Error::Instantiation { .. }));
    }

    #[test]
    fn test_host_factory_assigns_display_name() {
        let factory = HostFactory::new(|info: &'static TypeInfo| info.construct());
        let sprite = factory
            .create_blank(Sprite::type_info(), Construction::HostManaged, Some("player"))
            .unwrap();
        assert_eq!(sprite.display_name(), Some("player"));

        let declining = HostFactory::new(|_: &'static TypeInfo| None);
        assert!(declining
            .create_blank(Sprite::type_info(), Construction::HostManaged, None)
            .is_err());
    }
}
