//! Reduction of syntax-tree values to plain strings.
use crate::ast::Value;
use crate::macros::MacroDictionary;

/// Resolve a value to a string, expanding macro references and concatenations.
///
/// A bare word which is not a defined macro resolves to itself.
///
/// ```
/// use bibdb::ast::Value;
/// use bibdb::macros::MacroDictionary;
/// use bibdb::resolve::resolve;
///
/// let macros = MacroDictionary::with_months();
/// let value = Value::concat(Value::Literal("may".into()), Value::Quoted(" 4th".into()));
/// assert_eq!(resolve(&value, &macros), "May 4th");
/// ```
pub fn resolve(value: &Value<'_>, macros: &MacroDictionary) -> String {
    let mut out = String::new();
    resolve_into(value, macros, &mut out);
    out
}

fn resolve_into(mut value: &Value<'_>, macros: &MacroDictionary, out: &mut String) {
    // concatenations nest to the right, so only the left operand recurses
    loop {
        match value {
            Value::Literal(name) => {
                out.push_str(macros.get(name).unwrap_or(name));
                return;
            }
            Value::Number(text) | Value::Quoted(text) => {
                out.push_str(text);
                return;
            }
            Value::Concatenation(lhs, rhs) => {
                resolve_into(lhs, macros, out);
                value = rhs;
            }
        }
    }
}
