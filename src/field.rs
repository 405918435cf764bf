//! Conversions between Rust field types and codec values.
//!
//! [`FieldValue`] is the leaf classifier of this crate: every supported field type
//! reports a [`FieldShape`] and converts to and from [`Value`].
//!
//! | Rust type | Shape |
//! |-----------|-------|
//! | `bool`, `i8`..`i64`, `u8`..`u32`, `f32`, `f64`, `String` | leaf |
//! | `Option<leaf>` | nullable leaf |
//! | composite `T`, `Box<T>`, `Dyn<B>` | composite |
//! | `Option<Box<T>>`, `Option<Dyn<B>>` | nullable composite |
//! | `Vec<E>`, `[E; N]` | collection, never `null` |
//! | `Option<Vec<E>>`, `Option<[E; N]>` | collection, `null` when absent |
//!
//! Collection elements implement [`Element`]; collections themselves do not, so
//! arrays of arrays cannot be declared.
//!
//! Enumerations are not leaves out of the box. A type opts in by implementing
//! [`FieldValue`] and [`Element`] with a leaf shape.

use crate::info::{ElementShape, FieldShape, LeafKind};
use crate::object::{downcast_object, Dyn, Typed};
use crate::value::{Leaf, LeafRef, Value, ValueRef};
use crate::{Error, Result};

/// A Rust type that can be stored in a serialized field.
pub trait FieldValue: Sized + 'static {
    fn shape() -> FieldShape;

    fn to_value_ref(&self) -> ValueRef<'_>;

    fn from_value(value: Value) -> Result<Self>;
}

/// A [`FieldValue`] that may appear inside a collection.
pub trait Element: FieldValue {
    fn element_shape() -> ElementShape;
}

/// `true` if `T` is a boolean, integer, floating-point or string field type.
///
/// # Examples
///
/// ```rust
/// use cd_json::{is_collection, is_leaf};
///
/// assert!(is_leaf::<f32>());
/// assert!(is_leaf::<Option<String>>());
/// assert!(!is_leaf::<Vec<i32>>());
/// assert!(is_collection::<[bool; 3]>());
/// ```
#[must_use]
pub fn is_leaf<T: FieldValue>() -> bool {
    T::shape().is_leaf()
}

#[must_use]
pub fn is_collection<T: FieldValue>() -> bool {
    T::shape().is_collection()
}

fn mismatch(expected: &str, found: &Value) -> Error {
    Error::type_mismatch(expected, found.kind_name())
}

fn int_from(value: Value) -> Result<i64> {
    match value {
        Value::Leaf(Leaf::Int(i)) => Ok(i),
        Value::Leaf(Leaf::Float(f))
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < -(i64::MIN as f64) =>
        {
            Ok(f as i64)
        }
        other => Err(mismatch(LeafKind::Int.name(), &other)),
    }
}

fn float_from(value: Value) -> Result<f64> {
    match value {
        Value::Leaf(Leaf::Float(f)) => Ok(f),
        Value::Leaf(Leaf::Int(i)) => Ok(i as f64),
        Value::Leaf(Leaf::Str(s)) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(Error::type_mismatch(LeafKind::Float.name(), &format!("string {s:?}"))),
        },
        other => Err(mismatch(LeafKind::Float.name(), &other)),
    }
}

fn bool_from(value: Value) -> Result<bool> {
    match value {
        Value::Leaf(Leaf::Bool(b)) => Ok(b),
        Value::Leaf(Leaf::Str(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::Leaf(Leaf::Str(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(mismatch(LeafKind::Bool.name(), &other)),
    }
}

fn str_from(value: Value) -> Result<String> {
    match value {
        Value::Leaf(Leaf::Str(s)) => Ok(s),
        other => Err(mismatch(LeafKind::Str.name(), &other)),
    }
}

fn optional<T>(value: Value, convert: impl FnOnce(Value) -> Result<T>) -> Result<Option<T>> {
    if value.is_null() {
        Ok(None)
    } else {
        convert(value).map(Some)
    }
}

fn optional_ref<T: FieldValue>(value: &Option<T>) -> ValueRef<'_> {
    value.as_ref().map_or(ValueRef::Null, FieldValue::to_value_ref)
}

macro_rules! impl_leaf {
    ($kind:ident, $ty:ty, |$this:ident| $to:expr, |$value:ident| $from:expr) => {
        impl FieldValue for $ty {
            fn shape() -> FieldShape {
                FieldShape::Leaf(LeafKind::$kind)
            }

            fn to_value_ref(&self) -> ValueRef<'_> {
                let $this = self;
                ValueRef::Leaf($to)
            }

            fn from_value($value: Value) -> Result<Self> {
                $from
            }
        }

        impl Element for $ty {
            fn element_shape() -> ElementShape {
                ElementShape::Leaf(LeafKind::$kind)
            }
        }

        impl FieldValue for Option<$ty> {
            fn shape() -> FieldShape {
                FieldShape::Leaf(LeafKind::$kind)
            }

            fn to_value_ref(&self) -> ValueRef<'_> {
                optional_ref(self)
            }

            fn from_value(value: Value) -> Result<Self> {
                optional(value, <$ty as FieldValue>::from_value)
            }
        }

        impl Element for Option<$ty> {
            fn element_shape() -> ElementShape {
                ElementShape::Leaf(LeafKind::$kind)
            }
        }
    };
}

macro_rules! impl_int_leaf {
    ($($ty:ty),*) => {
        $(
            impl_leaf!(Int, $ty, |this| LeafRef::Int(i64::from(*this)), |value| {
                let wide = int_from(value)?;
                <$ty>::try_from(wide)
                    .map_err(|_| Error::type_mismatch(stringify!($ty), &wide.to_string()))
            });
        )*
    };
}

impl_int_leaf!(i8, i16, i32, i64, u8, u16, u32);

impl_leaf!(Bool, bool, |this| LeafRef::Bool(*this), |value| bool_from(value));
impl_leaf!(Float, f64, |this| LeafRef::Float(*this), |value| float_from(value));
impl_leaf!(Float, f32, |this| LeafRef::Float(f64::from(*this)), |value| {
    float_from(value).map(|f| f as f32)
});
impl_leaf!(Str, String, |this| LeafRef::Str(this.as_str()), |value| str_from(value));

fn composite_from<T: Typed>(value: Value) -> Result<Option<T>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(object) => downcast_object::<T>(object).map(Some),
        other => Err(mismatch(T::type_info().name(), &other)),
    }
}

fn dyn_from<B: Typed>(value: Value) -> Result<Option<Dyn<B>>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(object) => Dyn::from_box(object).map(Some),
        other => Err(mismatch(B::type_info().name(), &other)),
    }
}

fn required<T>(value: Option<T>, expected: &str) -> Result<T> {
    value.ok_or_else(|| Error::type_mismatch(expected, "null"))
}

/// Converts an owned value into a composite `T`; used by [`composite!`](crate::composite).
#[doc(hidden)]
pub fn composite_value<T: Typed>(value: Value) -> Result<T> {
    required(composite_from::<T>(value)?, T::type_info().name())
}

impl<T: Typed> FieldValue for Box<T> {
    fn shape() -> FieldShape {
        FieldShape::Composite(T::type_info)
    }

    fn to_value_ref(&self) -> ValueRef<'_> {
        ValueRef::Object(&**self)
    }

    fn from_value(value: Value) -> Result<Self> {
        composite_value::<T>(value).map(Box::new)
    }
}

impl<T: Typed> Element for Box<T> {
    fn element_shape() -> ElementShape {
        ElementShape::Composite(T::type_info)
    }
}

impl<T: Typed> FieldValue for Option<Box<T>> {
    fn shape() -> FieldShape {
        FieldShape::Composite(T::type_info)
    }

    fn to_value_ref(&self) -> ValueRef<'_> {
        match self {
            Some(object) => ValueRef::Object(&**object),
            None => ValueRef::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(composite_from::<T>(value)?.map(Box::new))
    }
}

impl<T: Typed> Element for Option<Box<T>> {
    fn element_shape() -> ElementShape {
        ElementShape::Composite(T::type_info)
    }
}

impl<B: Typed> FieldValue for Dyn<B> {
    fn shape() -> FieldShape {
        FieldShape::Composite(B::type_info)
    }

    fn to_value_ref(&self) -> ValueRef<'_> {
        ValueRef::Object(self.get())
    }

    fn from_value(value: Value) -> Result<Self> {
        required(dyn_from::<B>(value)?, B::type_info().name())
    }
}

impl<B: Typed> Element for Dyn<B> {
    fn element_shape() -> ElementShape {
        ElementShape::Composite(B::type_info)
    }
}

impl<B: Typed> FieldValue for Option<Dyn<B>> {
    fn shape() -> FieldShape {
        FieldShape::Composite(B::type_info)
    }

    fn to_value_ref(&self) -> ValueRef<'_> {
        match self {
            Some(object) => ValueRef::Object(object.get()),
            None => ValueRef::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        dyn_from::<B>(value)
    }
}

impl<B: Typed> Element for Option<Dyn<B>> {
    fn element_shape() -> ElementShape {
        ElementShape::Composite(B::type_info)
    }
}

fn list_ref<E: Element>(items: &[E]) -> ValueRef<'_> {
    ValueRef::List(items.iter().map(FieldValue::to_value_ref).collect())
}

fn list_from<E: Element>(value: Value) -> Result<Option<Vec<E>>> {
    match value {
        Value::Null => Ok(None),
        Value::List(items) => items
            .into_iter()
            .map(E::from_value)
            .collect::<Result<Vec<_>>>()
            .map(Some),
        other => Err(mismatch("array", &other)),
    }
}

fn array_from<E: Element, const N: usize>(value: Value) -> Result<Option<[E; N]>> {
    match list_from::<E>(value)? {
        None => Ok(None),
        Some(items) => {
            let len = items.len();
            items.try_into().map(Some).map_err(|_| {
                Error::type_mismatch(&format!("array of {N} elements"), &format!("{len} elements"))
            })
        }
    }
}

impl<E: Element> FieldValue for Vec<E> {
    fn shape() -> FieldShape {
        FieldShape::Collection(E::element_shape())
    }

    fn to_value_ref(&self) -> ValueRef<'_> {
        list_ref(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        required(list_from(value)?, "array")
    }
}

impl<E: Element> FieldValue for Option<Vec<E>> {
    fn shape() -> FieldShape {
        FieldShape::Collection(E::element_shape())
    }

    fn to_value_ref(&self) -> ValueRef<'_> {
        self.as_deref().map_or(ValueRef::Null, list_ref)
    }

    fn from_value(value: Value) -> Result<Self> {
        list_from(value)
    }
}

impl<E: Element, const N: usize> FieldValue for [E; N] {
    fn shape() -> FieldShape {
        FieldShape::Collection(E::element_shape())
    }

    fn to_value_ref(&self) -> ValueRef<'_> {
        list_ref(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        required(array_from(value)?, "array")
    }
}

impl<E: Element, const N: usize> FieldValue for Option<[E; N]> {
    fn shape() -> FieldShape {
        FieldShape::Collection(E::element_shape())
    }

    fn to_value_ref(&self) -> ValueRef<'_> {
        self.as_ref().map_or(ValueRef::Null, |items| list_ref(items))
    }

    fn from_value(value: Value) -> Result<Self> {
        array_from(value)
    }
}
