//! Tree reconstruction.
//!
//! [`Reconstructor`] turns text into a [`Node`] tree without recursion. It visits
//! the classified fragments in order and keeps one [`PendingParentFrame`] per
//! enclosing scope: opening a nested object or array pushes the current scope
//! together with the field the child belongs to, and the matching closing
//! delimiter pops it and attaches the finished child.
//!
//! The result is untyped; [`materialize`](crate::materialize) resolves type tags
//! and builds live objects from it.
//!
//! ## Usage
//!
//! ```rust
//! use cd_json::{Node, Reconstructor};
//!
//! let text = r#"{"cd_json_type": "Wrapper", "points": [{"cd_json_type": "Point", "x": 1}, null]}"#;
//! let node = Reconstructor::from_str(text).reconstruct().unwrap();
//!
//! let wrapper = node.as_object().unwrap();
//! let points = wrapper.get("points").and_then(Node::as_array).unwrap();
//! assert_eq!(points.len(), 2);
//! assert!(points[1].is_null());
//! ```

use crate::info::TYPE_TAG;
use crate::lexer::{fragments, parse_literal, unquote, Fragment, TokenKind};
use crate::node::{Node, ObjectNode};
use crate::options::DEFAULT_MAX_DEPTH;
use crate::{Error, Result};

/// A scope under construction.
#[derive(Debug)]
enum Scope {
    Object(ObjectNode),
    Array(Vec<Node>),
}

impl Scope {
    fn for_kind(kind: TokenKind) -> Self {
        match kind {
            TokenKind::ArrayOpen => Scope::Array(Vec::new()),
            _ => Scope::Object(ObjectNode::new()),
        }
    }

    fn closes_with(&self, kind: TokenKind) -> bool {
        matches!(
            (self, kind),
            (Scope::Object(_), TokenKind::ObjectClose) | (Scope::Array(_), TokenKind::ArrayClose)
        )
    }

    fn into_node(self) -> Node {
        match self {
            Scope::Object(object) => Node::Object(object),
            Scope::Array(items) => Node::Array(items),
        }
    }
}

/// An enclosing scope waiting for a nested value to complete.
#[derive(Debug)]
struct PendingParentFrame {
    parent: Scope,
    /// Property the child is assigned to; `None` when the parent is an array.
    field: Option<String>,
}

/// Name announced by a `"name":` fragment, waiting for its `{` or `[`.
struct Announced {
    name: String,
    line: usize,
    col: usize,
}

/// Builds a [`Node`] tree from text with an explicit frame stack.
pub struct Reconstructor<'a> {
    text: &'a str,
    max_depth: usize,
}

impl<'a> Reconstructor<'a> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &'a str) -> Self {
        Reconstructor {
            text,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limits the number of simultaneously open scopes.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Consumes the whole input and returns the root node.
    pub fn reconstruct(self) -> Result<Node> {
        let fragments = fragments(self.text)?;
        let mut state = State {
            max_depth: self.max_depth,
            stack: Vec::new(),
            current: None,
            announced: None,
            root: None,
            needs_separator: false,
            after_separator: false,
        };
        for fragment in &fragments {
            log::trace!("{:?} at {}:{}", fragment.kind, fragment.line, fragment.col);
            state.accept(fragment)?;
        }
        state.finish(self.text)
    }
}

struct State {
    max_depth: usize,
    stack: Vec<PendingParentFrame>,
    current: Option<Scope>,
    announced: Option<Announced>,
    root: Option<Node>,
    /// The current scope just received a value; only `,` or a close may follow.
    needs_separator: bool,
    /// A `,` was just consumed; a value must follow.
    after_separator: bool,
}

fn error_at(fragment: &Fragment<'_>, msg: &str) -> Error {
    Error::format(fragment.line, fragment.col, msg)
}

impl State {
    fn accept(&mut self, fragment: &Fragment<'_>) -> Result<()> {
        if self.root.is_some() {
            return Err(error_at(fragment, "trailing content after the root value"));
        }
        match fragment.kind {
            TokenKind::LeafOrNullAssignment => self.assignment(fragment),
            TokenKind::CompositeFieldAnnounce => self.announce(fragment),
            TokenKind::ObjectOpen | TokenKind::ArrayOpen => self.open(fragment),
            TokenKind::ObjectClose | TokenKind::ArrayClose => self.close(fragment),
            TokenKind::Separator => self.separator(fragment),
            TokenKind::None => self.bare_value(fragment),
        }
    }

    fn expect_value_slot(&self, fragment: &Fragment<'_>) -> Result<()> {
        if self.needs_separator {
            return Err(error_at(fragment, "expected ',' before the next value"));
        }
        if self.announced.is_some() {
            return Err(error_at(fragment, "expected '{' or '[' after the property name"));
        }
        Ok(())
    }

    fn value_stored(&mut self) {
        self.needs_separator = true;
        self.after_separator = false;
    }

    fn current_object(&mut self, fragment: &Fragment<'_>) -> Result<&mut ObjectNode> {
        match self.current.as_mut() {
            Some(Scope::Object(object)) => Ok(object),
            Some(Scope::Array(_)) => Err(error_at(fragment, "property assignment inside an array")),
            None => Err(error_at(fragment, "property assignment outside an object")),
        }
    }

    fn assignment(&mut self, fragment: &Fragment<'_>) -> Result<()> {
        self.expect_value_slot(fragment)?;
        let (name, value) = fragment
            .split_assignment()
            .ok_or_else(|| error_at(fragment, "expected a property assignment"))?;
        let name = unquote(name, fragment.line, fragment.col)?;
        let value = parse_literal(value, fragment.line, fragment.col)?;

        let object = self.current_object(fragment)?;
        if name == TYPE_TAG {
            match value {
                Node::Str(tag) => object.set_type_tag(tag),
                other => {
                    return Err(error_at(
                        fragment,
                        &format!("type tag must be a string, found {}", other.kind_name()),
                    ))
                }
            }
        } else if object.insert(name, value).is_some() {
            log::debug!(
                "duplicate property at {}:{}, keeping the last value",
                fragment.line,
                fragment.col
            );
        }
        self.value_stored();
        Ok(())
    }

    fn announce(&mut self, fragment: &Fragment<'_>) -> Result<()> {
        self.expect_value_slot(fragment)?;
        let (name, _) = fragment
            .split_assignment()
            .ok_or_else(|| error_at(fragment, "expected a property name"))?;
        let name = unquote(name, fragment.line, fragment.col)?;
        self.current_object(fragment)?;
        if name == TYPE_TAG {
            return Err(error_at(fragment, "type tag must be a string"));
        }
        self.announced = Some(Announced {
            name,
            line: fragment.line,
            col: fragment.col,
        });
        Ok(())
    }

    fn open(&mut self, fragment: &Fragment<'_>) -> Result<()> {
        if self.needs_separator {
            return Err(error_at(fragment, "expected ',' before the next value"));
        }
        let child = Scope::for_kind(fragment.kind);

        let Some(parent) = self.current.take() else {
            self.current = Some(child);
            self.after_separator = false;
            return Ok(());
        };

        let field = match &parent {
            Scope::Object(_) => match self.announced.take() {
                Some(announced) => Some(announced.name),
                None => {
                    self.current = Some(parent);
                    return Err(error_at(fragment, "expected a property name before a nested value"));
                }
            },
            Scope::Array(_) if fragment.kind == TokenKind::ArrayOpen => {
                return Err(Error::unsupported_shape(&format!(
                    "array of arrays at line {}, column {}",
                    fragment.line, fragment.col
                )));
            }
            Scope::Array(_) => None,
        };

        if self.stack.len() + 2 > self.max_depth {
            return Err(Error::unsupported_shape(&format!(
                "nesting deeper than {} levels at line {}, column {}",
                self.max_depth, fragment.line, fragment.col
            )));
        }
        self.stack.push(PendingParentFrame { parent, field });
        self.current = Some(child);
        self.after_separator = false;
        Ok(())
    }

    fn close(&mut self, fragment: &Fragment<'_>) -> Result<()> {
        if let Some(announced) = &self.announced {
            return Err(Error::format(
                announced.line,
                announced.col,
                &format!("property {:?} has no value", announced.name),
            ));
        }
        if self.after_separator {
            return Err(error_at(fragment, "trailing ','"));
        }
        let completed = match self.current.take() {
            Some(scope) if scope.closes_with(fragment.kind) => scope.into_node(),
            Some(scope) => {
                self.current = Some(scope);
                return Err(error_at(fragment, "mismatched closing delimiter"));
            }
            None => return Err(error_at(fragment, "unexpected closing delimiter")),
        };

        match self.stack.pop() {
            None => self.root = Some(completed),
            Some(PendingParentFrame { mut parent, field }) => {
                match (&mut parent, field) {
                    (Scope::Object(object), Some(name)) => {
                        object.insert(name, completed);
                    }
                    (Scope::Array(items), None) => items.push(completed),
                    _ => return Err(error_at(fragment, "corrupt parent frame")),
                }
                self.current = Some(parent);
            }
        }
        self.value_stored();
        Ok(())
    }

    fn separator(&mut self, fragment: &Fragment<'_>) -> Result<()> {
        if self.current.is_none() || !self.needs_separator {
            return Err(error_at(fragment, "unexpected ','"));
        }
        self.needs_separator = false;
        self.after_separator = true;
        Ok(())
    }

    fn bare_value(&mut self, fragment: &Fragment<'_>) -> Result<()> {
        self.expect_value_slot(fragment)?;
        match self.current.as_mut() {
            Some(Scope::Array(items)) => {
                items.push(parse_literal(fragment.text, fragment.line, fragment.col)?);
                self.value_stored();
                Ok(())
            }
            Some(Scope::Object(_)) => Err(error_at(
                fragment,
                &format!("expected a property, found {}", fragment.text),
            )),
            None => {
                self.root = Some(parse_literal(fragment.text, fragment.line, fragment.col)?);
                Ok(())
            }
        }
    }

    fn finish(self, text: &str) -> Result<Node> {
        let line = 1 + text.matches('\n').count();
        let col = 1 + text.rsplit('\n').next().map_or(0, |last| last.chars().count());
        if self.current.is_some() {
            return Err(Error::format(
                line,
                col,
                &format!("unexpected end of input with {} open scope(s)", self.stack.len() + 1),
            ));
        }
        self.root
            .ok_or_else(|| Error::format(line, col, "unexpected end of input"))
    }
}
