//! Identifier mapping.
//!
//! Every top-level clinical statement must carry at least one `id`. The FHIR logical id comes
//! first, followed by each business identifier that has both a system and a value. When a
//! resource has neither, an id is derived from the resource content so that converting the same
//! bundle twice yields the same tree.

use crate::code_systems::map_fhir_system_to_ccda;
use crate::types::CcdaId;
use fhir::Identifier;
use std::fmt::Debug;
use uuid::Uuid;

/// Map an identifier system to a CDA root.
///
/// OID and UUID URNs are unwrapped, registry systems use their OID, and any other system is
/// turned into a name-based UUID so that it stays stable across conversions.
pub fn map_identifier_system(system: &str) -> String {
    if let Some(uuid) = system.strip_prefix("urn:uuid:") {
        return uuid.to_string();
    }
    map_fhir_system_to_ccda(Some(system))
        .unwrap_or_else(|| Uuid::new_v5(&Uuid::NAMESPACE_URL, system.as_bytes()).to_string())
}

/// Collect the ids present on a resource without synthesizing one.
pub fn collect_identifiers(id: Option<&str>, identifiers: Option<&[Identifier]>) -> Vec<CcdaId> {
    let mut result = Vec::new();

    if let Some(id) = id.filter(|id| !id.is_empty()) {
        result.push(CcdaId::root(id));
    }

    for identifier in identifiers.unwrap_or_default() {
        let (Some(system), Some(value)) = (identifier.system.as_deref(), identifier.value.as_deref())
        else {
            continue;
        };
        result.push(CcdaId {
            root: map_identifier_system(system),
            extension: Some(value.to_string()),
        });
    }

    result
}

/// Map a resource's id and identifiers to a non-empty list of CDA ids.
///
/// `source` is the resource the ids belong to; it seeds the fallback id when nothing else is
/// available.
pub fn map_identifiers<T: Debug>(
    id: Option<&str>,
    identifiers: Option<&[Identifier]>,
    source: &T,
) -> Vec<CcdaId> {
    let result = collect_identifiers(id, identifiers);
    if !result.is_empty() {
        return result;
    }
    vec![synthesize_id(source)]
}

/// Derive a stable id from a resource's content.
pub fn synthesize_id<T: Debug>(source: &T) -> CcdaId {
    let seed = format!("{source:?}");
    CcdaId::root(Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()).to_string())
}
