/// Describes a struct to the codec.
///
/// Generates [`Typed`](crate::Typed), [`Object`](crate::Object),
/// [`FieldValue`](crate::FieldValue) and [`Element`](crate::Element) for an existing
/// struct from a list of its serialized fields.
///
/// ```text
/// composite! {
///     [abstract] Type => "qualified.Name"
///         [extends Base [base_field]]
///         [named [name_field]]
///     { field: Type, ... }
///     [transient { field: Type, ... }]
/// }
/// ```
///
/// - `extends Base [base_field]`: `Type` embeds its parent in `base_field`; the parent's
///   fields are serialized after `Type`'s own.
/// - `named [name_field]`: a `String` field holding the host-assigned display name,
///   written as the `m_Name` property and handed to host-managed construction.
/// - `transient { .. }`: fields described but excluded by the default policy.
/// - `abstract`: the type is never constructed by the codec and does not need `Default`.
///
/// Concrete types must implement `Default` and `Debug`.
///
/// # Examples
///
/// ```rust
/// use cd_json::{composite, to_string};
///
/// #[derive(Debug, Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// composite! {
///     Point => "Point" { x: i32, y: i32 }
/// }
///
/// let text = to_string(&Point { x: 3, y: 4 }).unwrap();
/// assert_eq!(text, r#"{"cd_json_type":"Point","x":3,"y":4}"#);
/// ```
#[macro_export]
macro_rules! composite {
    (@impl [$($construct:tt)*] $ty:ident => $name:literal
        $(extends $base:ident [$via:ident])?
        $(named [$named:ident])?
        { $($field:ident : $fty:ty),* }
        $(transient { $($tfield:ident : $tty:ty),* })?
    ) => {
        impl $crate::Typed for $ty {
            fn type_info() -> &'static $crate::TypeInfo {
                static FIELDS: &[$crate::FieldDescriptor] = &[
                    $( $crate::composite!(@field $ty, $field, $fty), )*
                    $($( $crate::composite!(@field $ty, $tfield, $tty).transient(), )*)?
                ];
                static INFO: $crate::TypeInfo = $crate::TypeInfo::new(
                    $name,
                    FIELDS,
                    $crate::composite!(@base $ty $(, $base, $via)?),
                    $($construct)*,
                );
                &INFO
            }
        }

        impl $crate::Object for $ty {
            fn object_type(&self) -> &'static $crate::TypeInfo {
                <$ty as $crate::Typed>::type_info()
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
                self
            }

            $(
                fn display_name(&self) -> ::core::option::Option<&str> {
                    ::core::option::Option::Some(self.$named.as_str())
                }

                fn set_display_name(&mut self, name: ::std::string::String) {
                    self.$named = name;
                }
            )?
        }

        impl $crate::FieldValue for $ty {
            fn shape() -> $crate::FieldShape {
                $crate::FieldShape::Composite(<$ty as $crate::Typed>::type_info)
            }

            fn to_value_ref(&self) -> $crate::ValueRef<'_> {
                $crate::ValueRef::Object(self)
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                $crate::field::composite_value::<$ty>(value)
            }
        }

        impl $crate::Element for $ty {
            fn element_shape() -> $crate::ElementShape {
                $crate::ElementShape::Composite(<$ty as $crate::Typed>::type_info)
            }
        }
    };

    (@field $ty:ident, $field:ident, $fty:ty) => {
        $crate::FieldDescriptor::new(
            ::core::stringify!($field),
            <$fty as $crate::FieldValue>::shape,
            {
                fn get(
                    instance: &dyn ::core::any::Any,
                ) -> ::core::option::Option<$crate::ValueRef<'_>> {
                    instance
                        .downcast_ref::<$ty>()
                        .map(|this| <$fty as $crate::FieldValue>::to_value_ref(&this.$field))
                }
                get
            },
            {
                fn set(
                    instance: &mut dyn ::core::any::Any,
                    value: $crate::Value,
                ) -> $crate::Result<()> {
                    let this = instance.downcast_mut::<$ty>().ok_or_else(|| {
                        $crate::Error::type_mismatch(
                            <$ty as $crate::Typed>::type_info().name(),
                            "unrelated instance",
                        )
                    })?;
                    this.$field = <$fty as $crate::FieldValue>::from_value(value)?;
                    ::core::result::Result::Ok(())
                }
                set
            },
        )
    };

    (@base $ty:ident) => {
        ::core::option::Option::None
    };

    (@base $ty:ident, $base:ident, $via:ident) => {{
        fn upcast(instance: &dyn ::core::any::Any) -> ::core::option::Option<&dyn ::core::any::Any> {
            instance.downcast_ref::<$ty>().map(|this| {
                let base: &$base = &this.$via;
                base as &dyn ::core::any::Any
            })
        }
        fn upcast_mut(
            instance: &mut dyn ::core::any::Any,
        ) -> ::core::option::Option<&mut dyn ::core::any::Any> {
            instance.downcast_mut::<$ty>().map(|this| {
                let base: &mut $base = &mut this.$via;
                base as &mut dyn ::core::any::Any
            })
        }
        fn into_base(
            instance: ::std::boxed::Box<dyn ::core::any::Any>,
        ) -> ::core::option::Option<::std::boxed::Box<dyn ::core::any::Any>> {
            instance.downcast::<$ty>().ok().map(|this| {
                let base: $base = this.$via;
                ::std::boxed::Box::new(base) as ::std::boxed::Box<dyn ::core::any::Any>
            })
        }
        ::core::option::Option::Some($crate::BaseLink::new(
            <$base as $crate::Typed>::type_info,
            upcast,
            upcast_mut,
            into_base,
        ))
    }};

    (abstract $ty:ident => $name:literal
        $(extends $base:ident [$via:ident])?
        $(named [$named:ident])?
        { $($field:ident : $fty:ty),* $(,)? }
        $(transient { $($tfield:ident : $tty:ty),* $(,)? })?
    ) => {
        $crate::composite! {
            @impl [::core::option::Option::None] $ty => $name
            $(extends $base [$via])?
            $(named [$named])?
            { $($field : $fty),* }
            $(transient { $($tfield : $tty),* })?
        }
    };

    ($ty:ident => $name:literal
        $(extends $base:ident [$via:ident])?
        $(named [$named:ident])?
        { $($field:ident : $fty:ty),* $(,)? }
        $(transient { $($tfield:ident : $tty:ty),* $(,)? })?
    ) => {
        $crate::composite! {
            @impl [::core::option::Option::Some({
                fn construct() -> ::std::boxed::Box<dyn $crate::Object> {
                    ::std::boxed::Box::new(<$ty as ::core::default::Default>::default())
                }
                construct as fn() -> ::std::boxed::Box<dyn $crate::Object>
            })] $ty => $name
            $(extends $base [$via])?
            $(named [$named])?
            { $($field : $fty),* }
            $(transient { $($tfield : $tty),* })?
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{FieldShape, LeafKind, Object, Typed};

    #[derive(Debug, Default)]
    struct Plain {
        flag: bool,
        items: Vec<i32>,
    }

    crate::composite! {
        Plain => "test.Plain" { flag: bool, items: Vec<i32>, }
    }

    #[derive(Debug)]
    struct Shape {
        label: String,
    }

    crate::composite! {
        abstract Shape => "test.Shape" { label: String }
    }

    #[derive(Debug, Default)]
    struct Asset {
        name: String,
        scratch: i64,
        size: u32,
    }

    crate::composite! {
        Asset => "test.Asset" named [name] { size: u32 } transient { scratch: i64 }
    }

    #[test]
    fn test_descriptor_table() {
        let info = Plain::type_info();
        assert_eq!(info.name(), "test.Plain");
        assert_eq!(info.own_fields().len(), 2);
        assert!(matches!(
            info.own_fields()[0].shape(),
            FieldShape::Leaf(LeafKind::Bool)
        ));
        assert!(info.own_fields()[1].is_collection());
        assert!(info.base().is_none());
        assert!(!info.is_abstract());
    }

    #[test]
    fn test_construct_produces_default_instance() {
        let blank = Plain::type_info().construct().unwrap();
        assert_eq!(blank.object_type().name(), "test.Plain");
        let plain = blank.as_any().downcast_ref::<Plain>().unwrap();
        assert!(!plain.flag);
        assert!(plain.items.is_empty());
    }

    #[test]
    fn test_abstract_type_has_no_constructor() {
        assert!(Shape::type_info().is_abstract());
        assert!(Shape::type_info().construct().is_none());
        let shape = Shape {
            label: "s".to_string(),
        };
        assert_eq!(shape.object_type().name(), "test.Shape");
    }

    #[test]
    fn test_named_and_transient() {
        let mut asset = Asset::default();
        asset.set_display_name("hero".to_string());
        assert_eq!(asset.display_name(), Some("hero"));
        assert_eq!(asset.name, "hero");

        let fields = Asset::type_info().own_fields();
        assert_eq!(fields.len(), 2);
        assert!(fields[0].is_serializable());
        assert!(!fields[1].is_serializable());
        assert_eq!(fields[1].name(), "scratch");
    }
}
