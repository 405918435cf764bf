//! Wire Format Reference
//!
//! This module documents the text format written by the [`Serializer`](crate::Serializer)
//! and read by the [`Reconstructor`](crate::Reconstructor).
//!
//! # Overview
//!
//! The format is a JSON-shaped text in which every object is *tagged* with the name of
//! its runtime type. Output of the serializer is valid JSON; the reader accepts a
//! practical subset of JSON large enough for that output and for hand edits of it.
//!
//! ## Design Philosophy
//!
//! - **Polymorphism**: a field declared as a base type keeps the derived instance,
//!   because the tag records what was actually stored
//! - **Tolerance**: properties the reading type does not know are skipped, so old and
//!   new versions of a type can exchange data
//! - **No recursion on read**: nesting is tracked with an explicit stack
//!
//! # Objects
//!
//! ```text
//! {"cd_json_type":"Wrapper","label":"a","points":[{"cd_json_type":"Point","x":1,"y":2},null]}
//! ```
//!
//! **Rules**:
//! - The first property is always `cd_json_type`, a string holding the fully-qualified
//!   type name as registered in the [`TypeRegistry`](crate::TypeRegistry)
//! - Host-managed objects that report a display name write it next as `m_Name`
//! - Fields follow in introspection order: the type's own fields in declaration order,
//!   then each ancestor's fields, nearest ancestor first
//! - A field redeclared by a derived type appears once, with the derived value
//! - `m_CachedPtr`, `m_InstanceID` and `m_UnityRuntimeErrorString` are never written
//!
//! ## Type resolution on read
//!
//! | Tag | Requested type | Result |
//! |-----|----------------|--------|
//! | registered, same or derived type | any | tagged type |
//! | registered, unrelated type | any | error |
//! | unknown or missing | concrete | requested type (unknown tags are logged) |
//! | unknown or missing | abstract | error |
//!
//! # Leaves
//!
//! | Type | Syntax | Example |
//! |------|--------|---------|
//! | Null | `null` | `"s": null` |
//! | Boolean | `true` / `false`, or `"TRUE"` / `"FALSE"` | `"on": true` |
//! | Integer | Decimal digits, optional `-` | `"count": 42` |
//! | Float | Decimal with `.` or exponent | `"ratio": 0.25` |
//! | Non-finite float | `"NaN"`, `"Infinity"`, `"-Infinity"` | `"limit": "Infinity"` |
//! | String | `"quoted"` | `"name": "Alice"` |
//!
//! The quoted boolean form is written with
//! [`BoolStyle::Sentinel`](crate::BoolStyle::Sentinel); both forms are always accepted.
//! An integer is accepted by a float field and an integral float by an integer field.
//!
//! ## Strings
//!
//! Strings are always quoted. Inside a string `"` and `\` are escaped with a backslash,
//! as are newline, carriage return and tab (`\n`, `\r`, `\t`); other control
//! characters use `\u00XX`. The reader also accepts `\/`, `\b`, `\f` and any `\uXXXX`.
//!
//! # Collections
//!
//! ```text
//! "tags": ["a", "b"]
//! "points": [{"cd_json_type":"Point","x":1,"y":2}, null]
//! "missing": null
//! "empty": []
//! ```
//!
//! **Rules**:
//! - An absent collection is `null`; an empty one is `[]`
//! - Elements are `null`, leaves, or tagged objects
//! - Arrays of arrays are not supported in either direction
//!
//! # Layout
//!
//! Compact output has no whitespace at all. Pretty output puts every property and
//! element on its own line, indented by [`CodecOptions::indent`](crate::CodecOptions)
//! spaces per level, with a space after each colon:
//!
//! ```text
//! {
//!   "cd_json_type": "Point",
//!   "x": 1,
//!   "y": 2
//! }
//! ```
//!
//! The reader ignores whitespace between tokens and reports errors with 1-based line
//! and column numbers.
//!
//! # Limitations
//!
//! - **Cycles**: object graphs are trees; shared or cyclic references are not expressible
//! - **Arrays of arrays**: rejected with [`Error::UnsupportedShape`](crate::Error::UnsupportedShape)
//! - **Depth**: nesting of objects and arrays is bounded by
//!   [`CodecOptions::max_depth`](crate::CodecOptions)
//! - **Streaming**: the whole input is read before reconstruction starts
//! - **Comments**: not supported

// This module contains only documentation; no implementation code
