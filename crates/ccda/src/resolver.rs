//! Bundle resolver.
//!
//! Builds a flat index over a bundle's resources once, keyed by `"{resourceType}/{id}"` and by
//! each entry's `fullUrl`. Every cross-reference the builders follow is a lookup in this index;
//! the bundle is never re-scanned and the reference graph is never materialised as owned links.

use fhir::{Bundle, Reference, Resource};
use std::collections::HashMap;

/// Immutable reference-key to resource index over one bundle.
#[derive(Clone, Debug)]
pub struct ResourceIndex<'b> {
    by_key: HashMap<String, &'b Resource>,
}

impl<'b> ResourceIndex<'b> {
    /// Index every resource in `bundle`. The first entry wins when two share a key.
    pub fn new(bundle: &'b Bundle) -> Self {
        let mut by_key = HashMap::new();

        for entry in &bundle.entry {
            let Some(resource) = entry.resource.as_ref() else {
                continue;
            };
            if let Some(key) = resource.reference_key() {
                by_key.entry(key).or_insert(resource);
            }
            if let Some(full_url) = entry.full_url.as_deref().filter(|url| !url.is_empty()) {
                by_key.entry(full_url.to_string()).or_insert(resource);
            }
        }

        Self { by_key }
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Look up a literal reference string.
    pub fn resolve_str(&self, reference: &str) -> Option<&'b Resource> {
        self.by_key.get(reference).copied()
    }

    /// Resolve a FHIR reference to a resource in this bundle.
    ///
    /// Returns `None` for absent references, logical references without a literal `reference`,
    /// and references to resources outside the bundle.
    pub fn resolve(&self, reference: Option<&Reference>) -> Option<&'b Resource> {
        let literal = reference?.reference.as_deref()?;
        self.resolve_str(literal)
    }

    /// Resolve a reference and require the target to have `resource_type`.
    pub fn resolve_typed(
        &self,
        reference: Option<&Reference>,
        resource_type: &str,
    ) -> Option<&'b Resource> {
        self.resolve(reference)
            .filter(|resource| resource.resource_type() == resource_type)
    }

    /// Resolve each reference in order, dropping the ones that do not resolve.
    pub fn resolve_all(&self, references: Option<&[Reference]>) -> Vec<&'b Resource> {
        references
            .unwrap_or_default()
            .iter()
            .filter_map(|reference| self.resolve(Some(reference)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::{BundleEntry, Condition, Encounter, OtherResource};

    fn condition(id: &str) -> Resource {
        Resource::Condition(Condition {
            id: Some(id.into()),
            ..Default::default()
        })
    }

    fn sample_bundle() -> Bundle {
        Bundle {
            id: None,
            type_: Some("document".into()),
            entry: vec![
                BundleEntry {
                    full_url: Some("urn:uuid:c0ffee00-0000-4000-8000-000000000001".into()),
                    resource: Some(condition("cond-1")),
                },
                BundleEntry {
                    full_url: None,
                    resource: Some(Resource::Encounter(Encounter {
                        id: Some("enc-1".into()),
                        ..Default::default()
                    })),
                },
                BundleEntry {
                    full_url: None,
                    resource: Some(Resource::Other(OtherResource {
                        resource_type: "Practitioner".into(),
                        id: Some("pract-1".into()),
                        content: serde_json::Value::Null,
                    })),
                },
                BundleEntry {
                    full_url: None,
                    resource: None,
                },
            ],
        }
    }

    #[test]
    fn resolves_by_type_and_id_and_full_url() {
        let bundle = sample_bundle();
        let index = ResourceIndex::new(&bundle);

        let by_key = index
            .resolve(Some(&Reference::to("Condition/cond-1")))
            .expect("resolve by key");
        let by_url = index
            .resolve(Some(&Reference::to(
                "urn:uuid:c0ffee00-0000-4000-8000-000000000001",
            )))
            .expect("resolve by fullUrl");

        assert!(std::ptr::eq(by_key, by_url));
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn missing_references_resolve_to_none() {
        let bundle = sample_bundle();
        let index = ResourceIndex::new(&bundle);

        assert!(index.resolve(None).is_none());
        assert!(index.resolve(Some(&Reference::default())).is_none());
        assert!(index.resolve(Some(&Reference::to("Condition/missing"))).is_none());
        assert!(index
            .resolve(Some(&Reference::to("https://other.example/fhir/Condition/cond-1")))
            .is_none());
    }

    #[test]
    fn typed_resolution_checks_resource_type() {
        let bundle = sample_bundle();
        let index = ResourceIndex::new(&bundle);

        assert!(index
            .resolve_typed(Some(&Reference::to("Practitioner/pract-1")), "Condition")
            .is_none());
        assert!(index
            .resolve_typed(Some(&Reference::to("Practitioner/pract-1")), "Practitioner")
            .is_some());
    }

    #[test]
    fn resolve_all_preserves_order_and_drops_unresolved() {
        let bundle = sample_bundle();
        let index = ResourceIndex::new(&bundle);
        let references = vec![
            Reference::to("Encounter/enc-1"),
            Reference::to("Condition/missing"),
            Reference::to("Condition/cond-1"),
        ];

        let resolved = index.resolve_all(Some(references.as_slice()));
        let types: Vec<&str> = resolved.iter().map(|r| r.resource_type()).collect();
        assert_eq!(types, vec!["Encounter", "Condition"]);
    }

    #[test]
    fn first_entry_wins_on_duplicate_keys() {
        let first = condition("dup");
        let mut second = Condition {
            id: Some("dup".into()),
            ..Default::default()
        };
        second.recorded_date = Some("2024-01-01".into());
        let bundle = Bundle::from_resources(vec![first.clone(), Resource::Condition(second)]);
        let index = ResourceIndex::new(&bundle);

        let resolved = index.resolve_str("Condition/dup").expect("resolve");
        assert_eq!(resolved, &first);
    }
}
