//! Member resolution: find the static provider a member data source names,
//! invoke it and normalize its result to rows.

use crate::config::{DiscoveryConfig, MissingMemberPolicy};
use crate::provider::ProviderError;
use crate::registry::{ClassRef, MemberDef};
use crate::row::{DataRow, MetadataError, TheoryDataRow};
use crate::value::Value;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Discovery-time failures. Each one aborts discovery of a single method.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("the call to method '{class}.{member}' is ambiguous between {candidates} different options for the given arguments")]
    AmbiguousMember {
        class: String,
        member: String,
        candidates: usize,
    },

    #[error("no public static member '{member}' on '{class}' accepts the given arguments")]
    MemberNotFound { class: String, member: String },

    #[error("provider '{class}.{member}' failed: {source}")]
    Provider {
        class: String,
        member: String,
        #[source]
        source: ProviderError,
    },

    #[error("row {row} of '{source_name}': {error}")]
    InvalidRow {
        source_name: String,
        row: usize,
        error: MetadataError,
    },

    #[error("row {row} was rejected for '{method}': {reason}")]
    RowRejected {
        method: String,
        row: usize,
        reason: String,
    },
}

/// Locates and invokes provider members for one test class.
#[derive(Debug, Clone, Copy)]
pub struct MemberResolver<'r> {
    class: ClassRef<'r>,
    config: DiscoveryConfig,
}

impl<'r> MemberResolver<'r> {
    pub fn new(class: ClassRef<'r>, config: DiscoveryConfig) -> Self {
        MemberResolver { class, config }
    }

    /// Find the unique static member named `name` that accepts `args`.
    ///
    /// Types are searched nearest first (see [`ClassRef::lineage`]); the
    /// first type with any compatible candidate decides. Several candidates
    /// on one type are narrowed to the one whose parameter count equals the
    /// argument count; if that does not leave exactly one, the reference is
    /// ambiguous.
    pub fn find(&self, name: &str, args: &[Value]) -> Result<Option<&'r MemberDef>, ResolveError> {
        for ty in self.class.lineage() {
            let candidates: Vec<&MemberDef> = ty
                .members()
                .iter()
                .filter(|m| m.is_static && m.name == name && m.accepts(args))
                .collect();

            match candidates.as_slice() {
                [] => continue,
                [only] => {
                    debug!(class = self.class.name(), owner = ty.name(), member = name, "resolved member");
                    return Ok(Some(*only));
                }
                _ => {
                    let exact: Vec<&MemberDef> = candidates
                        .iter()
                        .copied()
                        .filter(|m| m.params.len() == args.len())
                        .collect();
                    if let [only] = exact.as_slice() {
                        debug!(
                            class = self.class.name(),
                            owner = ty.name(),
                            member = name,
                            overloads = candidates.len(),
                            "resolved overload by exact arity"
                        );
                        return Ok(Some(*only));
                    }
                    return Err(ResolveError::AmbiguousMember {
                        class: self.class.name().to_string(),
                        member: name.to_string(),
                        candidates: candidates.len(),
                    });
                }
            }
        }

        if self.has_instance_member(name) {
            debug!(class = self.class.name(), member = name, "member exists but is not static");
        }
        Ok(None)
    }

    /// Resolve `name`, invoke it with `args` and return its rows.
    ///
    /// A member that cannot be found yields no rows, unless the config
    /// asks for [`MissingMemberPolicy::Error`].
    pub fn resolve_rows(&self, name: &str, args: &[Value]) -> Result<Vec<DataRow>, ResolveError> {
        let Some(member) = self.find(name, args)? else {
            return match self.config.missing_member {
                MissingMemberPolicy::Empty => {
                    warn!(
                        class = self.class.name(),
                        member = name,
                        "member data source matched no static member; producing no rows"
                    );
                    Ok(Vec::new())
                }
                MissingMemberPolicy::Error => Err(ResolveError::MemberNotFound {
                    class: self.class.name().to_string(),
                    member: name.to_string(),
                }),
            };
        };

        let rows = member
            .invoke(args)
            .map_err(|source| ResolveError::Provider {
                class: self.class.name().to_string(),
                member: name.to_string(),
                source,
            })?
            .into_rows();

        for (i, row) in rows.iter().enumerate() {
            trace!(member = name, row = i, arity = row.arity(), "provider row");
            row.metadata()
                .validate()
                .map_err(|error| ResolveError::InvalidRow {
                    source_name: name.to_string(),
                    row: i,
                    error,
                })?;
        }

        debug!(class = self.class.name(), member = name, rows = rows.len(), "member data resolved");
        Ok(rows)
    }

    fn has_instance_member(&self, name: &str) -> bool {
        self.class
            .lineage()
            .iter()
            .any(|ty| ty.members().iter().any(|m| !m.is_static && m.name == name))
    }
}
