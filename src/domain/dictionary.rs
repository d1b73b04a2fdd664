// ============================================================
// Layer 3: Template Dictionary
// ============================================================
// Append-only bijection between canonical template strings and
// template IDs.
//
//   assign("disk failure")  -> 0   (new, counter 0 -> 1)
//   assign("link up")       -> 1   (new, counter 1 -> 2)
//   assign("disk failure")  -> 0   (known, no mutation)
//
// The running counter is the length of the ID-ordered table,
// so IDs are dense, strictly increasing, and never reused.
// Map key and table entry share one Rc'd copy of the text.
//
// A dictionary is owned by one pipeline run; nothing shares it
// across threads.

use std::collections::HashMap;

use crate::domain::template::{Template, TemplateId};

/// Mapping template -> ID, plus the reverse table in ID order.
#[derive(Debug, Clone, Default)]
pub struct TemplateDictionary {
    ids:       HashMap<Template, TemplateId>,
    templates: Vec<Template>,
}

impl TemplateDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the ID of `template`, assigning the next unused ID
    /// if it has never been seen. Idempotent for known templates.
    pub fn assign(&mut self, template: Template) -> TemplateId {
        if let Some(&id) = self.ids.get(&template) {
            return id;
        }
        let id = TemplateId::new(self.templates.len());
        self.templates.push(template.clone());
        self.ids.insert(template, id);
        id
    }

    /// Look up a template without inserting it
    pub fn get(&self, template: &str) -> Option<TemplateId> {
        self.ids.get(template).copied()
    }

    /// Number of distinct templates seen so far
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// All entries in ascending ID order
    pub fn iter(&self) -> impl Iterator<Item = (TemplateId, &Template)> {
        self.templates
            .iter()
            .enumerate()
            .map(|(i, t)| (TemplateId::new(i), t))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Template {
        Template::from_canonical(s)
    }

    #[test]
    fn test_ids_follow_first_appearance() {
        let mut d = TemplateDictionary::new();
        assert_eq!(d.assign(t("disk failure")), TemplateId::new(0));
        assert_eq!(d.assign(t("link up")), TemplateId::new(1));
        assert_eq!(d.assign(t("abort")), TemplateId::new(2));
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn test_assign_is_idempotent() {
        let mut d = TemplateDictionary::new();
        let first = d.assign(t("disk failure"));
        d.assign(t("link up"));

        // Re-assigning a known template changes neither size nor IDs
        let again = d.assign(t("disk failure"));
        assert_eq!(first, again);
        assert_eq!(d.len(), 2);
        assert_eq!(d.get("link up"), Some(TemplateId::new(1)));
    }

    #[test]
    fn test_get_does_not_insert() {
        let d = TemplateDictionary::new();
        assert_eq!(d.get("never seen"), None);
        assert!(d.is_empty());
    }

    #[test]
    fn test_iter_is_in_id_order() {
        let mut d = TemplateDictionary::new();
        for s in ["c", "a", "b", "a"] {
            d.assign(t(s));
        }
        let order: Vec<(usize, &str)> = d.iter().map(|(id, t)| (id.index(), t.as_str())).collect();
        assert_eq!(order, vec![(0, "c"), (1, "a"), (2, "b")]);
    }

    #[test]
    fn test_map_and_table_share_template_text() {
        let mut d = TemplateDictionary::new();
        d.assign(t("disk failure"));
        let (key, _) = d.ids.get_key_value("disk failure").unwrap();
        assert!(std::ptr::eq(key.as_str(), d.templates[0].as_str()));
    }

    #[test]
    fn test_empty_template_is_a_valid_key() {
        let mut d = TemplateDictionary::new();
        assert_eq!(d.assign(t("")), TemplateId::new(0));
        assert_eq!(d.get(""), Some(TemplateId::new(0)));
    }
}
