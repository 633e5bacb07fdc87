//! The syntax tree produced by the [parser](crate::parser).
//!
//! Values form a tree only through [`Value::Concatenation`]; every other node is a leaf.
//! The [`Display`](std::fmt::Display) implementations render nodes back to `.bib` syntax.
use std::borrow::Cow;
use std::fmt;

/// A field value, possibly built from several pieces joined with `#`.
///
/// Chains of concatenations are cloned, compared, rendered and dropped without recursing along
/// the right operand, so their length is not limited by the stack.
#[derive(Debug)]
pub enum Value<'s> {
    /// A bare word. This is a macro reference if a macro of that name exists, and literal text
    /// otherwise.
    Literal(Cow<'s, str>),
    /// A number, which is always literal text.
    Number(Cow<'s, str>),
    /// Text which was delimited by braces or quotes.
    Quoted(Cow<'s, str>),
    /// `lhs # rhs`.
    Concatenation(Box<Value<'s>>, Box<Value<'s>>),
}

impl<'s> Value<'s> {
    pub fn concat(lhs: Value<'s>, rhs: Value<'s>) -> Self {
        Value::Concatenation(Box::new(lhs), Box::new(rhs))
    }

    /// Detach the value from the source text.
    pub fn into_owned(mut self) -> Value<'static> {
        let mut heads = Vec::new();
        while let Value::Concatenation(lhs, rhs) = &mut self {
            heads.push(lhs.take().into_owned());
            let next = rhs.take();
            self = next;
        }
        let tail = match &mut self {
            Value::Literal(s) => Value::Literal(Cow::Owned(std::mem::take(s).into_owned())),
            Value::Number(s) => Value::Number(Cow::Owned(std::mem::take(s).into_owned())),
            Value::Quoted(s) => Value::Quoted(Cow::Owned(std::mem::take(s).into_owned())),
            Value::Concatenation(..) => Value::Quoted(Cow::Borrowed("")),
        };
        fold_right(heads, tail)
    }

    /// Move the value out, leaving an empty leaf behind.
    fn take(&mut self) -> Value<'s> {
        std::mem::replace(self, Value::Quoted(Cow::Borrowed("")))
    }
}

/// Rebuild `heads[0] # (heads[1] # (... # tail))`.
fn fold_right<'s>(heads: Vec<Value<'s>>, tail: Value<'s>) -> Value<'s> {
    heads
        .into_iter()
        .rev()
        .fold(tail, |rhs, lhs| Value::concat(lhs, rhs))
}

impl Drop for Value<'_> {
    fn drop(&mut self) {
        // detach the right spine one link at a time
        if let Value::Concatenation(_, rhs) = self {
            let mut next = rhs.take();
            while let Value::Concatenation(_, rhs) = &mut next {
                let tail = rhs.take();
                next = tail;
            }
        }
    }
}

impl Clone for Value<'_> {
    fn clone(&self) -> Self {
        let mut heads = Vec::new();
        let mut value = self;
        let tail = loop {
            match value {
                Value::Concatenation(lhs, rhs) => {
                    heads.push(Value::clone(lhs));
                    value = rhs;
                }
                Value::Literal(s) => break Value::Literal(s.clone()),
                Value::Number(s) => break Value::Number(s.clone()),
                Value::Quoted(s) => break Value::Quoted(s.clone()),
            }
        };
        fold_right(heads, tail)
    }
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        let (mut lhs, mut rhs) = (self, other);
        loop {
            match (lhs, rhs) {
                (Value::Concatenation(a, next_a), Value::Concatenation(b, next_b)) => {
                    if a != b {
                        return false;
                    }
                    lhs = next_a;
                    rhs = next_b;
                }
                (Value::Literal(a), Value::Literal(b))
                | (Value::Number(a), Value::Number(b))
                | (Value::Quoted(a), Value::Quoted(b)) => return a == b,
                _ => return false,
            }
        }
    }
}

impl Eq for Value<'_> {}

/// A `key = value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue<'s> {
    pub key: Cow<'s, str>,
    pub value: Value<'s>,
}

/// A regular entry such as `@article{key, ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryNode<'s> {
    pub entry_type: Cow<'s, str>,
    pub key: Cow<'s, str>,
    pub fields: Vec<KeyValue<'s>>,
}

/// A top-level construct of a bibliography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition<'s> {
    /// `@preamble{...}`; the contents may be omitted.
    Preamble { contents: Option<Value<'s>> },
    /// `@string{key = value}`
    String { key: Cow<'s, str>, value: Value<'s> },
    Entry(EntryNode<'s>),
}

/// Whether the brackets in `text` are balanced, so that it can be written as `{text}`.
fn is_balanced(text: &str) -> bool {
    let mut depth = 0usize;
    for b in text.bytes() {
        match b {
            b'{' => depth += 1,
            b'}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut value = self;
        loop {
            match value {
                Value::Concatenation(lhs, rhs) => {
                    write!(f, "{lhs} # ")?;
                    value = rhs;
                }
                Value::Literal(s) | Value::Number(s) => return f.write_str(s),
                Value::Quoted(s) if is_balanced(s) => return write!(f, "{{{s}}}"),
                Value::Quoted(s) => return write!(f, "\"{s}\""),
            }
        }
    }
}

impl fmt::Display for KeyValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

impl fmt::Display for EntryNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@{}{{{},", self.entry_type, self.key)?;
        for field in &self.fields {
            writeln!(f, "  {field},")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Definition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Preamble { contents: None } => f.write_str("@preamble{}"),
            Definition::Preamble {
                contents: Some(value),
            } => write!(f, "@preamble{{ {value} }}"),
            Definition::String { key, value } => write!(f, "@string{{{key} = {value}}}"),
            Definition::Entry(entry) => entry.fmt(f),
        }
    }
}
