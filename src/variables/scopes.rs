use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use super::parser::{parse, Segment};

type Scope = BTreeMap<String, String>;

/// Ordered variable scopes; a later scope overrides an earlier one.
#[derive(Debug, Clone, Default)]
pub struct VariableScopes<'a> {
    layers: Vec<Cow<'a, Scope>>,
}

impl<'a> VariableScopes<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an owned scope above every scope added so far.
    pub fn push(&mut self, scope: Scope) -> &mut Self {
        self.layers.push(Cow::Owned(scope));
        self
    }

    /// Add a borrowed scope above every scope added so far.
    pub fn push_ref(&mut self, scope: &'a Scope) -> &mut Self {
        self.layers.push(Cow::Borrowed(scope));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Value of `name` from the highest scope that defines it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(name))
            .map(String::as_str)
    }

    /// Flatten all scopes into one map, applying override order.
    pub fn collapse(&self) -> HashMap<&str, &str> {
        let mut merged = HashMap::new();
        for layer in &self.layers {
            for (name, value) in layer.iter() {
                merged.insert(name.as_str(), value.as_str());
            }
        }
        merged
    }

    /// Substitute every known placeholder in a single pass. Unknown
    /// placeholders are kept exactly as written and substituted values are
    /// never scanned again.
    pub fn expand(&self, template: &str) -> String {
        let variables = self.collapse();
        let mut output = String::with_capacity(template.len());
        for segment in parse(template) {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder { name, raw } => {
                    output.push_str(variables.get(name).copied().unwrap_or(raw))
                }
            }
        }
        output
    }
}
