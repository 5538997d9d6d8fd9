//! Attribute expressions: `${name}` references resolved against a unit.

use std::sync::LazyLock;

use regex::Regex;

use crate::host::ExpressionEvaluator;
use crate::unit::FlowUnit;
use crate::{Error, Result};

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<escape>\$\$\{)|\$\{(?P<name>[^{}]*)\}|(?P<open>\$\{)")
        .expect("attribute reference pattern is valid")
});

/// Evaluator that substitutes `${name}` with the unit's attribute value.
///
/// Missing attributes evaluate to the empty string. `$${` produces a
/// literal `${`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeExpression;

impl ExpressionEvaluator for AttributeExpression {
    fn evaluate(&self, expression: &str, unit: &FlowUnit) -> Result<String> {
        let mut output = String::with_capacity(expression.len());
        let mut last = 0;

        for caps in REFERENCE.captures_iter(expression) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            output.push_str(&expression[last..whole.start()]);
            last = whole.end();

            if caps.name("escape").is_some() {
                output.push_str("${");
                continue;
            }

            if caps.name("open").is_some() {
                return Err(Error::invalid_input().with_message(format!(
                    "unterminated attribute reference at offset {} in {expression:?}",
                    whole.start()
                )));
            }

            let name = caps.name("name").map_or("", |m| m.as_str().trim());
            if name.is_empty() {
                return Err(Error::invalid_input()
                    .with_message(format!("empty attribute reference in {expression:?}")));
            }
            output.push_str(unit.attribute(name).unwrap_or_default());
        }

        output.push_str(&expression[last..]);
        Ok(output)
    }
}
