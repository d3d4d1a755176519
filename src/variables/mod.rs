//! Template variable expansion.
//!
//! This module provides:
//! - A placeholder parser for `$NAME` and `${NAME}` with `$$` escapes
//! - Ordered variable scopes collapsed into one lookup before substitution
//! - A resolver that layers the built-in build variables under the build's
//!   environment and parameters
//!
//! # Example
//!
//! ```
//! use mqtt_build_notifier::build::{BuildContext, BuildResult};
//! use mqtt_build_notifier::variables::VariableResolver;
//!
//! let context = BuildContext::new("demo", 12).with_result(BuildResult::Success);
//! let resolver = VariableResolver::new(&context);
//!
//! assert_eq!(resolver.resolve("jenkins/$PROJECT_URL"), "jenkins/job/demo/");
//! assert_eq!(resolver.resolve("${BUILD_RESULT} #$BUILD_NUMBER"), "SUCCESS #12");
//! ```

mod parser;
mod resolver;
mod scopes;

pub use parser::{parse, placeholders, references, Segment};
pub use resolver::{VariableResolver, BUILD_NUMBER, BUILD_RESULT, CULPRITS, PROJECT_URL};
pub use scopes::VariableScopes;

/// Expand `template` against `scopes`. Never fails; unknown placeholders are
/// left as written.
pub fn expand(template: &str, scopes: &VariableScopes<'_>) -> String {
    scopes.expand(template)
}
