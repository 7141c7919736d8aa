//! Placeholder substitution for template text.
//!
//! Texts carry `{name}` fields filled from participant attributes at send
//! time. `{{` and `}}` produce literal braces.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

#[derive(Error, Debug, PartialEq)]
pub enum RenderError {
    #[error("No value for placeholder {{{0}}}")]
    MissingVariable(String),

    #[error("Unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),
}

/// Substitute every `{name}` in `text` with `vars[name]`.
pub fn render(text: &str, vars: &HashMap<String, String>) -> Result<String, RenderError> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in TOKEN.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push_literal(&mut out, text, last, whole.start())?;

        match caps.get(1) {
            Some(name) => {
                let value = vars
                    .get(name.as_str())
                    .ok_or_else(|| RenderError::MissingVariable(name.as_str().to_string()))?;
                out.push_str(value);
            }
            None => out.push_str(&whole.as_str()[..1]),
        }
        last = whole.end();
    }

    push_literal(&mut out, text, last, text.len())?;
    Ok(out)
}

fn push_literal(out: &mut String, text: &str, start: usize, end: usize) -> Result<(), RenderError> {
    let chunk = &text[start..end];
    if let Some(pos) = chunk.find(&['{', '}'][..]) {
        return Err(RenderError::UnbalancedBrace(start + pos));
    }
    out.push_str(chunk);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_named_fields() {
        let out = render(
            "{name}, this is {nurse} from {clinic}.",
            &vars(&[("name", "Akinyi"), ("nurse", "Mary"), ("clinic", "Ahero")]),
        )
        .unwrap();
        assert_eq!(out, "Akinyi, this is Mary from Ahero.");
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(render("No fields here", &HashMap::new()).unwrap(), "No fields here");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let out = render("{{ok}} {name}", &vars(&[("name", "Atieno")])).unwrap();
        assert_eq!(out, "{ok} Atieno");
    }

    #[test]
    fn missing_variable_is_error() {
        let err = render("Hi {name}", &HashMap::new()).unwrap_err();
        assert_eq!(err, RenderError::MissingVariable("name".into()));
    }

    #[test]
    fn stray_brace_is_error() {
        let err = render("Hi {name", &vars(&[("name", "x")])).unwrap_err();
        assert_eq!(err, RenderError::UnbalancedBrace(3));
    }
}
