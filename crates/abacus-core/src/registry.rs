//! In-memory skill registry.
//!
//! Lookup table from skill id to [`SkillDescriptor`], in registration order.
//! Constructed explicitly at startup and shared via `Arc`; a `RwLock` keeps
//! registration after startup safe alongside concurrent lookups.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use abacus_types::error::{EngineError, RegistryError};
use abacus_types::skill::{SkillDescription, SkillSummary};

use crate::schema::{check_schema, default_values, introspect};
use crate::skill::SkillDescriptor;

#[derive(Default)]
struct Inner {
    skills: Vec<Arc<SkillDescriptor>>,
    index: HashMap<String, usize>,
}

#[derive(Default)]
pub struct Registry {
    inner: RwLock<Inner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // Entries are replaced whole, so a poisoned lock still guards a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Validate and insert a descriptor.
    ///
    /// Re-registering an existing id replaces the old descriptor in place
    /// (keeping its position in [`list`](Self::list)) and returns it.
    pub fn register(
        &self,
        descriptor: SkillDescriptor,
    ) -> Result<Option<Arc<SkillDescriptor>>, RegistryError> {
        validate_descriptor(&descriptor)?;

        let id = descriptor.id.clone();
        let descriptor = Arc::new(descriptor);
        let mut inner = self.write();

        if let Some(&pos) = inner.index.get(&id) {
            tracing::warn!(skill_id = %id, "skill re-registered, replacing previous descriptor");
            let previous = std::mem::replace(&mut inner.skills[pos], descriptor);
            return Ok(Some(previous));
        }

        let pos = inner.skills.len();
        inner.skills.push(descriptor);
        inner.index.insert(id.clone(), pos);
        tracing::debug!(skill_id = %id, "skill registered");
        Ok(None)
    }

    pub fn get(&self, id: &str) -> Option<Arc<SkillDescriptor>> {
        let inner = self.read();
        inner.index.get(id).map(|&pos| Arc::clone(&inner.skills[pos]))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().index.contains_key(id)
    }

    /// All descriptors in registration order.
    pub fn list(&self) -> Vec<Arc<SkillDescriptor>> {
        self.read().skills.clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.read().skills.iter().map(|s| s.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Skills matching any of `terms`, case-insensitively, against a tag
    /// (substring), the name, or the description. Registration order is kept.
    pub fn search<S: AsRef<str>>(&self, terms: &[S]) -> Vec<Arc<SkillDescriptor>> {
        let terms: Vec<String> = terms
            .iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return self.list();
        }

        self.read()
            .skills
            .iter()
            .filter(|skill| {
                let name = skill.name.to_lowercase();
                let description = skill.description.to_lowercase();
                terms.iter().any(|term| {
                    skill.tags.iter().any(|tag| tag.to_lowercase().contains(term))
                        || name.contains(term)
                        || description.contains(term)
                })
            })
            .cloned()
            .collect()
    }

    /// Markdown listing of every skill for LLM function selection.
    pub fn prompt_summary(&self) -> String {
        let skills = self.list();
        if skills.is_empty() {
            return String::new();
        }

        let mut out = String::from("## Available skills\n");
        for skill in &skills {
            out.push_str(&format!(
                "\n### {} (`{}`)\n{}\n",
                skill.name, skill.id, skill.description
            ));
            if !skill.tags.is_empty() {
                let tags: Vec<&str> = skill.tags.iter().map(String::as_str).collect();
                out.push_str(&format!("Tags: {}\n", tags.join(", ")));
            }
            if !skill.parameter_descriptions.is_empty() {
                out.push_str("Parameters:\n");
                for (name, desc) in &skill.parameter_descriptions {
                    out.push_str(&format!("- `{name}`: {desc}\n"));
                }
            }
        }
        out
    }

    pub fn summaries(&self) -> Vec<SkillSummary> {
        self.read().skills.iter().map(|s| s.summary()).collect()
    }

    /// Full description with introspected form fields, or `NotFound`
    /// listing the known ids.
    pub fn describe(&self, id: &str) -> Result<SkillDescription, EngineError> {
        let skill = self.get(id).ok_or_else(|| EngineError::NotFound {
            id: id.to_string(),
            known: self.ids(),
        })?;

        let fields = introspect(&skill.input_schema, &skill.parameter_descriptions);
        let default_values = default_values(&fields);
        Ok(SkillDescription {
            summary: skill.summary(),
            fields,
            default_values,
        })
    }
}

// ---------------------------------------------------------------------------
// Descriptor validation
// ---------------------------------------------------------------------------

fn valid_id(id: &str) -> bool {
    let segments: Vec<&str> = id.split('.').collect();
    segments.len() >= 2
        && segments.iter().all(|seg| {
            !seg.is_empty()
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

fn validate_descriptor(descriptor: &SkillDescriptor) -> Result<(), RegistryError> {
    let id = &descriptor.id;
    if !valid_id(id) {
        return Err(RegistryError::InvalidId(id.clone()));
    }
    if descriptor.name.trim().is_empty() {
        return Err(RegistryError::EmptyName(id.clone()));
    }
    if semver::Version::parse(&descriptor.version).is_err() {
        return Err(RegistryError::InvalidVersion {
            id: id.clone(),
            version: descriptor.version.clone(),
        });
    }
    check_schema(&descriptor.input_schema).map_err(|reason| RegistryError::InvalidSchema {
        id: id.clone(),
        reason,
    })?;
    if let Some(output) = &descriptor.output_schema {
        check_schema(output).map_err(|reason| RegistryError::InvalidSchema {
            id: id.clone(),
            reason: format!("output schema: {reason}"),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use abacus_types::schema::SchemaNode;
    use serde_json::json;

    fn skill(id: &str, name: &str, answer: i64) -> SkillDescriptor {
        SkillDescriptor::builder(id, name)
            .description(format!("{name} calculator"))
            .tags(["finance"])
            .input(SchemaNode::object([("amount", SchemaNode::number().min(0.0))]))
            .param("amount", "Amount")
            .handle(move |_| Ok(json!(answer)))
    }

    #[test]
    fn test_re_registration_last_write_wins() {
        let registry = Registry::new();
        assert!(registry.register(skill("tax.calculate", "Tax v1", 1)).unwrap().is_none());
        registry.register(skill("salary.analyze", "Salary", 0)).unwrap();

        let previous = registry
            .register(skill("tax.calculate", "Tax v2", 2))
            .unwrap()
            .expect("replaced descriptor returned");
        assert_eq!(previous.name, "Tax v1");

        assert_eq!(registry.len(), 2);
        let current = registry.get("tax.calculate").unwrap();
        assert_eq!(current.name, "Tax v2");
        assert_eq!(current.invoke(json!({})).unwrap(), json!(2));
        assert_eq!(registry.ids(), vec!["tax.calculate", "salary.analyze"]);
    }

    #[test]
    fn test_list_keeps_registration_order() {
        let registry = Registry::new();
        for id in ["c.one", "a.two", "b.three"] {
            registry.register(skill(id, id, 0)).unwrap();
        }
        let ids: Vec<String> = registry.list().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["c.one", "a.two", "b.three"]);
        assert!(registry.get("missing.skill").is_none());
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_register_rejects_invalid_descriptors() {
        let registry = Registry::new();
        assert_eq!(
            registry.register(skill("nodots", "X", 0)).unwrap_err(),
            RegistryError::InvalidId("nodots".into())
        );
        assert!(matches!(
            registry.register(skill("a..b", "X", 0)),
            Err(RegistryError::InvalidId(_))
        ));
        assert!(matches!(
            registry.register(skill("a.b", "  ", 0)),
            Err(RegistryError::EmptyName(_))
        ));

        let bad_version = SkillDescriptor::builder("a.b", "X").version("one").handle(Ok);
        assert!(matches!(
            registry.register(bad_version),
            Err(RegistryError::InvalidVersion { .. })
        ));

        let bad_schema = SkillDescriptor::builder("a.b", "X")
            .input(SchemaNode::number())
            .handle(Ok);
        assert!(matches!(
            registry.register(bad_schema),
            Err(RegistryError::InvalidSchema { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_search_matches_tags_name_description() {
        let registry = Registry::new();
        registry
            .register(
                SkillDescriptor::builder("mortgage.calculate", "Mortgage")
                    .description("Monthly payment for a home loan")
                    .tags(["loan", "housing"])
                    .handle(Ok),
            )
            .unwrap();
        registry
            .register(
                SkillDescriptor::builder("capital.growth", "Capital Growth")
                    .description("Compound interest projection")
                    .tags(["investment"])
                    .handle(Ok),
            )
            .unwrap();

        let by_tag = registry.search(&["HOUS"]);
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].id, "mortgage.calculate");

        let by_desc = registry.search(&["compound"]);
        assert_eq!(by_desc[0].id, "capital.growth");

        assert_eq!(registry.search(&["loan", "capital"]).len(), 2);
        assert!(registry.search(&["crypto"]).is_empty());
        assert_eq!(registry.search::<&str>(&[]).len(), 2);
    }

    #[test]
    fn test_prompt_summary_lists_skills() {
        let registry = Registry::new();
        assert_eq!(registry.prompt_summary(), "");
        registry.register(skill("tax.calculate", "Tax", 0)).unwrap();
        let summary = registry.prompt_summary();
        assert!(summary.contains("### Tax (`tax.calculate`)"));
        assert!(summary.contains("Tags: finance"));
        assert!(summary.contains("- `amount`: Amount"));
    }

    #[test]
    fn test_describe_builds_fields_and_defaults() {
        let registry = Registry::new();
        registry.register(skill("tax.calculate", "Tax", 0)).unwrap();

        let description = registry.describe("tax.calculate").unwrap();
        assert_eq!(description.summary.id, "tax.calculate");
        assert_eq!(description.fields.len(), 1);
        assert_eq!(description.fields[0].label, "Amount");
        assert_eq!(description.default_values["amount"], json!(0));

        let err = registry.describe("nope.nope").unwrap_err();
        assert_eq!(
            err,
            EngineError::NotFound {
                id: "nope.nope".into(),
                known: vec!["tax.calculate".into()],
            }
        );
    }

    #[test]
    fn test_concurrent_registration_and_lookup() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.register(skill(&format!("t.s{i}"), "S", i)).unwrap();
                    registry.get(&format!("t.s{i}")).is_some()
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(registry.len(), 8);
    }
}
