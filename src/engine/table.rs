//! Rule table construction and lookup.
//!
//! # Responsibilities
//! - Compile a rule list into one immutable table generation
//! - Fail the whole build on any template compile error
//! - Resolve a request against the table without locks
//!
//! # Design Decisions
//! - A generation owns its map and its template registry outright; nothing
//!   is shared with earlier generations, so reloads can never alias state
//!   a concurrent render still uses
//! - Duplicate host keys fold last-write-wins, silently
//! - Literal targets are trimmed once at build time, rendered targets are
//!   trimmed per request

use std::collections::HashMap;

use handlebars::{Handlebars, RenderError, TemplateError};
use thiserror::Error;

use crate::engine::rule::Rule;
use crate::engine::template::{self, RequestContext};

/// A rule rejected at table build time, identified by its host key.
///
/// One bad template fails the entire build: the engine keeps serving the
/// previous generation rather than a partially applied rule set.
#[derive(Debug, Error)]
#[error("invalid redirect template for host {host:?}: {source}")]
pub struct BuildError {
    pub host: String,
    #[source]
    pub source: TemplateError,
}

/// A rule's destination after build.
#[derive(Debug)]
enum CompiledTarget {
    /// Returned as-is for every matching request.
    Literal(String),
    /// Rendered per request; the compiled form lives in the generation's
    /// registry under the host key.
    Template,
}

/// One immutable generation of redirect rules.
///
/// Built wholesale by [`RuleTable::build`] and never mutated afterwards;
/// the engine publishes generations atomically and readers resolve against
/// whichever snapshot they loaded.
#[derive(Debug)]
pub struct RuleTable {
    targets: HashMap<String, CompiledTarget>,
    registry: Handlebars<'static>,
}

impl RuleTable {
    /// The table served before the first successful reload: matches nothing.
    pub fn empty() -> Self {
        Self {
            targets: HashMap::new(),
            registry: template::registry(),
        }
    }

    /// Compile `rules` into a new generation.
    ///
    /// Rules are folded in input order; a later rule for the same host
    /// overwrites the earlier one. Any template compile failure aborts the
    /// whole build and names the offending host.
    pub fn build(rules: &[Rule]) -> Result<Self, BuildError> {
        let mut registry = template::registry();
        let mut targets = HashMap::with_capacity(rules.len());

        for rule in rules {
            let target = if rule.is_template {
                registry
                    .register_template_string(&rule.host, &rule.target)
                    .map_err(|source| BuildError {
                        host: rule.host.clone(),
                        source,
                    })?;
                CompiledTarget::Template
            } else {
                CompiledTarget::Literal(rule.target.trim().to_owned())
            };
            targets.insert(rule.host.clone(), target);
        }

        Ok(Self { targets, registry })
    }

    /// Number of distinct hosts in this generation.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Resolve the destination for a request, `None` when no rule matches
    /// the request host exactly.
    pub fn resolve(&self, ctx: &RequestContext<'_>) -> Option<Result<String, RenderError>> {
        let target = self.targets.get(ctx.host())?;
        Some(match target {
            CompiledTarget::Literal(target) => Ok(target.clone()),
            CompiledTarget::Template => self
                .registry
                .render(ctx.host(), &ctx.data())
                .map(|rendered| rendered.trim().to_owned()),
        })
    }
}
