// weather-common/src/uri_template.rs
use crate::PluginError;
use regex::Regex;
use std::collections::HashMap;

/// A resource URI with optional `{name}` placeholders, e.g. `users://{user_id}/profile`.
///
/// Each placeholder matches one or more characters up to the next `/`.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    raw: String,
    variables: Vec<String>,
    pattern: Regex,
}

impl UriTemplate {
    pub fn parse(template: &str) -> Result<Self, PluginError> {
        let invalid = |reason: &str| PluginError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut pattern = String::from("^");
        let mut variables = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            let (literal, after) = rest.split_at(start);
            if literal.contains('}') {
                return Err(invalid("unmatched '}'"));
            }
            pattern.push_str(&regex::escape(literal));

            let end = after.find('}').ok_or_else(|| invalid("unclosed '{'"))?;
            let name = &after[1..end];
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("variable names must be non-empty identifiers"));
            }
            if variables.iter().any(|v| v == name) {
                return Err(invalid("duplicate variable"));
            }
            variables.push(name.to_string());
            pattern.push_str("([^/]+)");
            rest = &after[end + 1..];
        }
        if rest.contains('}') {
            return Err(invalid("unmatched '}'"));
        }
        pattern.push_str(&regex::escape(rest));
        pattern.push('$');

        let pattern = Regex::new(&pattern).map_err(|e| invalid(&e.to_string()))?;
        Ok(UriTemplate { raw: template.to_string(), variables, pattern })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the template has no placeholders and names exactly one URI.
    pub fn is_static(&self) -> bool {
        self.variables.is_empty()
    }

    /// Match a concrete URI, returning the captured variables.
    pub fn matches(&self, uri: &str) -> Option<HashMap<String, String>> {
        let caps = self.pattern.captures(uri)?;
        Some(
            self.variables
                .iter()
                .zip(caps.iter().skip(1))
                .filter_map(|(name, m)| m.map(|m| (name.clone(), m.as_str().to_string())))
                .collect(),
        )
    }
}
