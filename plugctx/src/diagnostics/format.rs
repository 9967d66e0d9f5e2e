//! Positional trace templates: `"{0} of {1}"`, with `{{` and `}}` escapes.

use std::fmt::{self, Write};

use crate::errors::TransportError;

/// Expands `template`, substituting `{n}` with `args[n]`.
///
/// An unbalanced brace, a non-numeric placeholder or an index past the end
/// of `args` is an error.
pub fn format_template(template: &str, args: &[&dyn fmt::Display]) -> Result<String, TransportError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut index = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    index.push(next);
                }
                if !closed {
                    return Err(TransportError::Format(format!(
                        "unclosed placeholder at position {pos}"
                    )));
                }

                let n: usize = index.trim().parse().map_err(|_| {
                    TransportError::Format(format!("invalid placeholder '{{{index}}}' at position {pos}"))
                })?;
                let arg = args.get(n).ok_or_else(|| {
                    TransportError::Format(format!(
                        "placeholder {{{n}}} has no argument ({} supplied)",
                        args.len()
                    ))
                })?;
                write!(out, "{arg}").map_err(|e| TransportError::Format(e.to_string()))?;
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(TransportError::Format(format!(
                        "unmatched '}}' at position {pos}"
                    )));
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
