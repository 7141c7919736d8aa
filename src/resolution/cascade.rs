//! Resolution cascade — exact match first, then a fixed sequence of
//! relaxations evaluated against the templates sharing the query's anchor
//! and offset.
//!
//! Specificity, most to least: HIV messaging, clinical condition, messaging
//! group. `second_preg` only takes part in the exact match; no relaxation
//! step ever changes or matches on it.

use serde::{Deserialize, Serialize};

use crate::catalog::TemplateCatalog;
use crate::db::DatabaseError;
use crate::models::enums::{Condition, MessageGroup};
use crate::models::{MessageTemplate, TemplateKey};

use super::query::{normalize_query, parse_description};
use super::ResolveError;

// ──────────────────────────────────────────────
// Types
// ──────────────────────────────────────────────

/// Which cascade step produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CascadeStep {
    /// All six key fields matched.
    Exact,
    /// HIV query answered by the non-HIV template for the same condition/group.
    NonHivSameCondition,
    /// HIV query answered by the HIV template for the normal condition.
    HivNormalCondition,
    /// Condition relaxed to normal.
    NormalCondition,
    /// Two-way group relaxed to one-way, condition kept.
    OneWayGroup,
    /// Last resort: normal condition, one-way group, no HIV messaging.
    OneWayNormal,
}

/// Outcome of resolving a query. `NoMatch` is an expected result; callers
/// skip sending rather than treat it as a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Matched {
        template: MessageTemplate,
        step: CascadeStep,
    },
    NoMatch,
}

impl Resolution {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn template(&self) -> Option<&MessageTemplate> {
        match self {
            Self::Matched { template, .. } => Some(template),
            Self::NoMatch => None,
        }
    }

    pub fn step(&self) -> Option<CascadeStep> {
        match self {
            Self::Matched { step, .. } => Some(*step),
            Self::NoMatch => None,
        }
    }

    pub fn into_template(self) -> Option<MessageTemplate> {
        match self {
            Self::Matched { template, .. } => Some(template),
            Self::NoMatch => None,
        }
    }
}

/// Fields a relaxation step requires of a working-set template.
struct Target {
    condition: Condition,
    group: MessageGroup,
    hiv_messaging: bool,
}

/// One fallback step: when `applies` holds for the query, look for the
/// first working-set template matching `target`.
struct Relaxation {
    step: CascadeStep,
    applies: fn(&TemplateKey) -> bool,
    target: fn(&TemplateKey) -> Target,
}

const RELAXATIONS: &[Relaxation] = &[
    Relaxation {
        step: CascadeStep::NonHivSameCondition,
        applies: |q| q.hiv_messaging,
        target: |q| Target {
            condition: q.condition,
            group: q.group,
            hiv_messaging: false,
        },
    },
    Relaxation {
        step: CascadeStep::HivNormalCondition,
        applies: |q| q.hiv_messaging,
        target: |q| Target {
            condition: Condition::Normal,
            group: q.group,
            hiv_messaging: true,
        },
    },
    Relaxation {
        step: CascadeStep::NormalCondition,
        applies: |q| q.condition != Condition::Normal,
        target: |q| Target {
            condition: Condition::Normal,
            group: q.group,
            hiv_messaging: false,
        },
    },
    Relaxation {
        step: CascadeStep::OneWayGroup,
        applies: |q| q.group == MessageGroup::TwoWay,
        target: |q| Target {
            condition: q.condition,
            group: MessageGroup::OneWay,
            hiv_messaging: false,
        },
    },
    Relaxation {
        step: CascadeStep::OneWayNormal,
        applies: |q| q.condition != Condition::Normal && q.group != MessageGroup::OneWay,
        target: |_| Target {
            condition: Condition::Normal,
            group: MessageGroup::OneWay,
            hiv_messaging: false,
        },
    },
];

// ──────────────────────────────────────────────
// Resolver
// ──────────────────────────────────────────────

/// Read-only view over a catalog that answers resolution queries.
pub struct Resolver<'a, C: TemplateCatalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: TemplateCatalog + ?Sized> Resolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Resolve `query` to the most specific template available.
    ///
    /// Post-date offsets are normalized first. With `exact_only`, a miss on
    /// the full key returns `NoMatch` without trying any relaxation.
    pub fn resolve(
        &self,
        query: &TemplateKey,
        exact_only: bool,
    ) -> Result<Resolution, DatabaseError> {
        let query = normalize_query(query);

        if let Some(template) = self.catalog.exact_lookup(&query)? {
            tracing::debug!(query = %query, "Exact template match");
            return Ok(Resolution::Matched {
                template,
                step: CascadeStep::Exact,
            });
        }

        if exact_only {
            return Ok(Resolution::NoMatch);
        }

        let working_set = self
            .catalog
            .filter_by_offset(query.send_base, query.send_offset)?;

        for relaxation in RELAXATIONS {
            if !(relaxation.applies)(&query) {
                continue;
            }
            let target = (relaxation.target)(&query);
            if let Some(template) = first_matching(&working_set, &target) {
                tracing::debug!(
                    query = %query,
                    matched = %template.key,
                    step = ?relaxation.step,
                    "Template resolved by fallback"
                );
                return Ok(Resolution::Matched {
                    template: template.clone(),
                    step: relaxation.step,
                });
            }
        }

        tracing::debug!(query = %query, "No template for query");
        Ok(Resolution::NoMatch)
    }

    /// Parse a canonical description and resolve it.
    pub fn resolve_description(
        &self,
        description: &str,
        exact_only: bool,
    ) -> Result<Resolution, ResolveError> {
        let query = parse_description(description)?;
        Ok(self.resolve(&query, exact_only)?)
    }

    /// Template stored under exactly `key`, with no offset normalization.
    /// Catalog maintenance (imports) works on literal keys.
    pub fn find_exact(&self, key: &TemplateKey) -> Result<Option<MessageTemplate>, DatabaseError> {
        self.catalog.exact_lookup(key)
    }
}

fn first_matching<'t>(
    working_set: &'t [MessageTemplate],
    target: &Target,
) -> Option<&'t MessageTemplate> {
    working_set.iter().find(|t| {
        t.key.condition == target.condition
            && t.key.group == target.group
            && t.key.hiv_messaging == target.hiv_messaging
    })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MemoryCatalog, SqliteCatalog};
    use crate::models::enums::SendBase;

    fn key(
        group: MessageGroup,
        condition: Condition,
        hiv: bool,
        second: bool,
        offset: i32,
    ) -> TemplateKey {
        TemplateKey::new(SendBase::Edd, group, condition, hiv, second, offset)
    }

    fn template(key: TemplateKey) -> MessageTemplate {
        let mut t = MessageTemplate::new(key);
        t.english = key.description();
        t
    }

    fn catalog_with(keys: &[TemplateKey]) -> MemoryCatalog {
        MemoryCatalog::from_templates(keys.iter().map(|k| template(*k))).unwrap()
    }

    fn resolved_key(resolution: &Resolution) -> Option<TemplateKey> {
        resolution.template().map(|t| t.key)
    }

    use crate::models::enums::Condition::{Art, First, Normal};
    use crate::models::enums::MessageGroup::{OneWay, TwoWay};

    // ── Exact match ──

    #[test]
    fn every_template_resolves_to_itself() {
        let keys = [
            key(TwoWay, Normal, false, false, 0),
            key(OneWay, Normal, false, false, 0),
            key(TwoWay, Art, true, false, 0),
            key(TwoWay, Art, true, true, 0),
            key(OneWay, First, false, true, 3),
        ];
        let catalog = catalog_with(&keys);
        let resolver = Resolver::new(&catalog);

        for k in keys {
            let r = resolver.resolve(&k, false).unwrap();
            assert_eq!(resolved_key(&r), Some(k));
            assert_eq!(r.step(), Some(CascadeStep::Exact));
        }
    }

    #[test]
    fn exact_beats_any_fallback() {
        let exact = key(TwoWay, Art, false, false, 0);
        let catalog = catalog_with(&[
            key(OneWay, Normal, false, false, 0),
            key(TwoWay, Normal, false, false, 0),
            key(OneWay, Art, false, false, 0),
            exact,
        ]);
        let r = Resolver::new(&catalog).resolve(&exact, false).unwrap();
        assert_eq!(resolved_key(&r), Some(exact));
    }

    #[test]
    fn exact_only_skips_cascade() {
        let catalog = catalog_with(&[key(TwoWay, Normal, false, false, 0)]);
        let resolver = Resolver::new(&catalog);
        let query = key(TwoWay, Art, false, false, 0);

        assert_eq!(resolver.resolve(&query, true).unwrap(), Resolution::NoMatch);
        // The same query finds the fallback without exact_only
        assert!(resolver.resolve(&query, false).unwrap().is_match());
    }

    // ── HIV relaxation ──

    #[test]
    fn hiv_prefers_non_hiv_same_condition_over_hiv_normal() {
        let non_hiv = key(TwoWay, Art, false, false, 0);
        let hiv_normal = key(TwoWay, Normal, true, false, 0);
        // Insert the HIV normal variant first so order cannot explain the result
        let catalog = catalog_with(&[hiv_normal, non_hiv]);

        let r = Resolver::new(&catalog)
            .resolve(&key(TwoWay, Art, true, false, 0), false)
            .unwrap();
        assert_eq!(resolved_key(&r), Some(non_hiv));
        assert_eq!(r.step(), Some(CascadeStep::NonHivSameCondition));
    }

    #[test]
    fn hiv_falls_back_to_hiv_normal() {
        let hiv_normal = key(TwoWay, Normal, true, false, 0);
        let catalog = catalog_with(&[key(TwoWay, Normal, false, false, 0), hiv_normal]);

        let r = Resolver::new(&catalog)
            .resolve(&key(TwoWay, Art, true, false, 0), false)
            .unwrap();
        assert_eq!(resolved_key(&r), Some(hiv_normal));
        assert_eq!(r.step(), Some(CascadeStep::HivNormalCondition));
    }

    #[test]
    fn hiv_normal_query_relaxes_to_non_hiv_normal() {
        let plain = key(OneWay, Normal, false, false, 0);
        let catalog = catalog_with(&[plain]);

        let r = Resolver::new(&catalog)
            .resolve(&key(OneWay, Normal, true, false, 0), false)
            .unwrap();
        assert_eq!(resolved_key(&r), Some(plain));
        assert_eq!(r.step(), Some(CascadeStep::NonHivSameCondition));
    }

    // ── Condition and group relaxation ──

    #[test]
    fn end_to_end_art_hiv_two_way_resolves_to_two_way_normal() {
        let two_way = key(TwoWay, Normal, false, false, 0);
        let one_way = key(OneWay, Normal, false, false, 0);
        let catalog = catalog_with(&[two_way, one_way]);

        let r = Resolver::new(&catalog)
            .resolve(&key(TwoWay, Art, true, false, 0), false)
            .unwrap();
        assert_eq!(resolved_key(&r), Some(two_way));
        assert_eq!(r.step(), Some(CascadeStep::NormalCondition));
    }

    #[test]
    fn two_way_relaxes_to_one_way_keeping_condition() {
        let one_way_art = key(OneWay, Art, false, false, 0);
        let catalog = catalog_with(&[key(OneWay, Normal, false, false, 0), one_way_art]);

        let r = Resolver::new(&catalog)
            .resolve(&key(TwoWay, Art, false, false, 0), false)
            .unwrap();
        assert_eq!(resolved_key(&r), Some(one_way_art));
        assert_eq!(r.step(), Some(CascadeStep::OneWayGroup));
    }

    #[test]
    fn final_fallback_one_way_normal() {
        let one_way = key(OneWay, Normal, false, false, 0);
        let catalog = catalog_with(&[one_way, key(OneWay, First, false, false, 0)]);

        let r = Resolver::new(&catalog)
            .resolve(&key(TwoWay, Art, false, false, 0), false)
            .unwrap();
        assert_eq!(resolved_key(&r), Some(one_way));
        assert_eq!(r.step(), Some(CascadeStep::OneWayNormal));
    }

    #[test]
    fn control_group_reaches_final_fallback() {
        let one_way = key(OneWay, Normal, false, false, 0);
        let catalog = catalog_with(&[one_way]);

        let query = key(MessageGroup::Control, Art, false, false, 0);
        let r = Resolver::new(&catalog).resolve(&query, false).unwrap();
        assert_eq!(resolved_key(&r), Some(one_way));
    }

    #[test]
    fn one_way_normal_query_has_no_fallback() {
        let catalog = catalog_with(&[key(TwoWay, Normal, false, false, 0)]);
        let r = Resolver::new(&catalog)
            .resolve(&key(OneWay, Normal, false, false, 0), false)
            .unwrap();
        assert_eq!(r, Resolution::NoMatch);
    }

    #[test]
    fn two_way_normal_query_does_not_reach_final_fallback() {
        // Only the group step applies, and it keeps condition=normal.
        let catalog = catalog_with(&[key(OneWay, Art, false, false, 0)]);
        let r = Resolver::new(&catalog)
            .resolve(&key(TwoWay, Normal, false, false, 0), false)
            .unwrap();
        assert_eq!(r, Resolution::NoMatch);
    }

    #[test]
    fn fallback_never_crosses_offset_or_send_base() {
        let catalog = MemoryCatalog::from_templates([
            template(key(OneWay, Normal, false, false, 1)),
            template(TemplateKey::new(SendBase::Dd, OneWay, Normal, false, false, 0)),
        ])
        .unwrap();

        let r = Resolver::new(&catalog)
            .resolve(&key(TwoWay, Art, true, false, 0), false)
            .unwrap();
        assert_eq!(r, Resolution::NoMatch);
    }

    #[test]
    fn empty_catalog_is_no_match() {
        let catalog = MemoryCatalog::new();
        let r = Resolver::new(&catalog)
            .resolve(&key(TwoWay, Art, true, true, 0), false)
            .unwrap();
        assert_eq!(r, Resolution::NoMatch);
        assert!(r.into_template().is_none());
    }

    // ── second_preg ──

    #[test]
    fn second_preg_is_never_relaxed_directly() {
        // The first-pregnancy variant of the same condition/group exists, but
        // no fallback step targets (art, two-way, non-HIV).
        let first_preg = key(TwoWay, Art, false, false, 0);
        let catalog = catalog_with(&[first_preg]);

        let r = Resolver::new(&catalog)
            .resolve(&key(TwoWay, Art, false, true, 0), false)
            .unwrap();
        assert_eq!(r, Resolution::NoMatch);
    }

    #[test]
    fn fallback_steps_ignore_second_preg_of_candidates() {
        let second = key(TwoWay, Normal, false, true, 0);
        let catalog = catalog_with(&[second]);

        let r = Resolver::new(&catalog)
            .resolve(&key(TwoWay, Art, false, false, 0), false)
            .unwrap();
        assert_eq!(resolved_key(&r), Some(second));
        assert_eq!(r.step(), Some(CascadeStep::NormalCondition));
    }

    #[test]
    fn ties_broken_by_insertion_order() {
        let a = key(OneWay, Normal, false, false, 0);
        let b = key(OneWay, Normal, false, true, 0);
        let catalog = catalog_with(&[b, a]);

        let resolver = Resolver::new(&catalog);
        let query = key(TwoWay, First, false, false, 0);
        let first = resolver.resolve(&query, false).unwrap();
        let second = resolver.resolve(&query, false).unwrap();
        assert_eq!(resolved_key(&first), Some(b));
        assert_eq!(first, second);
    }

    // ── Offset normalization ──

    #[test]
    fn over_offset_normalized_before_exact_lookup() {
        let week_41 = TemplateKey::new(SendBase::Over, TwoWay, Normal, false, false, -1);
        let catalog = catalog_with(&[week_41]);
        let resolver = Resolver::new(&catalog);

        let query = TemplateKey { send_offset: -3, ..week_41 };
        let r = resolver.resolve(&query, true).unwrap();
        assert_eq!(resolved_key(&r), Some(week_41));
        assert_eq!(r.step(), Some(CascadeStep::Exact));

        // find_exact works on literal keys
        assert!(resolver.find_exact(&query).unwrap().is_none());
    }

    #[test]
    fn resolve_description_parses_then_resolves() {
        let two_way = key(TwoWay, Normal, false, false, 0);
        let catalog = catalog_with(&[two_way]);
        let resolver = Resolver::new(&catalog);

        let r = resolver.resolve_description("edd.two-way.art.Y.N.0", false).unwrap();
        assert_eq!(resolved_key(&r), Some(two_way));

        let err = resolver.resolve_description("edd.two-way.art.Y.N", false).unwrap_err();
        assert!(matches!(err, ResolveError::Malformed(_)));
    }

    // ── Backends agree ──

    #[test]
    fn sqlite_catalog_resolves_like_memory() {
        let keys = [
            key(TwoWay, Normal, true, false, 0),
            key(TwoWay, Normal, false, false, 0),
            key(OneWay, Art, false, false, 0),
            key(OneWay, Normal, false, false, 0),
            key(OneWay, Normal, false, true, 0),
        ];
        let memory = catalog_with(&keys);
        let mut sqlite = SqliteCatalog::open_in_memory().unwrap();
        for k in keys {
            sqlite.insert(&template(k)).unwrap();
        }

        let queries = [
            key(TwoWay, Art, true, false, 0),
            key(TwoWay, Art, false, false, 0),
            key(MessageGroup::Control, First, false, false, 0),
            key(OneWay, Art, true, true, 0),
            key(TwoWay, First, true, false, 1),
        ];
        for q in queries {
            let m = Resolver::new(&memory).resolve(&q, false).unwrap();
            let s = Resolver::new(&sqlite).resolve(&q, false).unwrap();
            assert_eq!(resolved_key(&m), resolved_key(&s), "query {q}");
            assert_eq!(m.step(), s.step(), "query {q}");
        }
    }
}
