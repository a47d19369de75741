//! Get-or-create resolution of nested tag and ingredient specs.
//!
//! Lookups and inserts are always scoped to the acting user, so a recipe can
//! only ever link attributes owned by its own owner.

use std::collections::HashSet;

use tracing::debug;

use super::ports::RecipeTx;
use super::{AttributeId, AttributeKind, AttributeSpec, Error, RecipeAttribute, UserId};

/// Outcome of resolving one spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub attribute: RecipeAttribute,
    /// Whether the attribute was inserted by this call.
    pub created: bool,
}

/// Resolve `spec` to an attribute owned by `owner`, creating it when absent.
///
/// The insert tolerates a concurrent writer: when another transaction wins
/// the unique `(owner, name)` race the winner's row is re-read.
pub async fn get_or_create(
    tx: &mut dyn RecipeTx,
    owner: &UserId,
    kind: AttributeKind,
    spec: &AttributeSpec,
) -> Result<Resolved, Error> {
    if let Some(attribute) = tx.find_attribute(owner, kind, &spec.name).await? {
        return Ok(Resolved {
            attribute,
            created: false,
        });
    }
    if let Some(attribute) = tx.insert_attribute(owner, kind, &spec.name).await? {
        debug!(%owner, %kind, id = %attribute.id(), "created attribute");
        return Ok(Resolved {
            attribute,
            created: true,
        });
    }
    tx.find_attribute(owner, kind, &spec.name)
        .await?
        .map(|attribute| Resolved {
            attribute,
            created: false,
        })
        .ok_or_else(|| {
            Error::internal(format!(
                "{kind} {:?} vanished after a conflicting insert",
                spec.name.as_ref()
            ))
        })
}

/// Resolve every spec and return the distinct attribute ids in input order.
pub async fn resolve_all(
    tx: &mut dyn RecipeTx,
    owner: &UserId,
    kind: AttributeKind,
    specs: &[AttributeSpec],
) -> Result<Vec<AttributeId>, Error> {
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(specs.len());
    for spec in specs {
        let resolved = get_or_create(tx, owner, kind, spec).await?;
        let id = resolved.attribute.id();
        if seen.insert(id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
