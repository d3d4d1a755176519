use std::collections::BTreeMap;

use crate::build::BuildContext;

use super::parser::references;
use super::VariableScopes;

pub const BUILD_RESULT: &str = "BUILD_RESULT";
pub const PROJECT_URL: &str = "PROJECT_URL";
pub const BUILD_NUMBER: &str = "BUILD_NUMBER";
pub const CULPRITS: &str = "CULPRITS";

/// Expands templates against a build: built-in variables first, then the
/// environment scopes, then the build parameter scopes.
#[derive(Debug, Clone, Copy)]
pub struct VariableResolver<'a> {
    context: &'a BuildContext,
}

impl<'a> VariableResolver<'a> {
    pub fn new(context: &'a BuildContext) -> Self {
        Self { context }
    }

    /// Variables computed from the build itself. `CULPRITS` walks build
    /// history, so it is only included when `template` asks for it.
    pub fn builtins(&self, template: &str) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        values.insert(
            BUILD_RESULT.to_string(),
            self.context.result_name().to_string(),
        );
        values.insert(PROJECT_URL.to_string(), self.context.project_url());
        values.insert(
            BUILD_NUMBER.to_string(),
            self.context.build_number.to_string(),
        );

        if references(template, CULPRITS) {
            let culprits = self.context.culprits();
            tracing::debug!(count = culprits.len(), "Resolved culprits");
            values.insert(CULPRITS.to_string(), culprits.join(","));
        }

        values
    }

    /// All scopes for `template` in override order.
    pub fn scopes(&self, template: &str) -> VariableScopes<'a> {
        let mut scopes = VariableScopes::new();
        scopes.push(self.builtins(template));
        for scope in &self.context.environment {
            scopes.push_ref(scope);
        }
        for scope in &self.context.parameters {
            scopes.push_ref(scope);
        }
        scopes
    }

    pub fn resolve(&self, template: &str) -> String {
        self.scopes(template).expand(template)
    }
}
