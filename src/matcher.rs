use crate::model::{InstalledEntity, Inventory};
use crate::query::SearchTerm;
use crate::similarity::{approximately_equal, edit_distance, Tolerance};

pub trait Matcher {
    fn matches(&self, entity: &InstalledEntity, term: &SearchTerm) -> bool;
}

pub struct FuzzyMatcher {
    tolerance: Tolerance,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(Tolerance::Strong)
    }
}

impl FuzzyMatcher {
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }
}

impl Matcher for FuzzyMatcher {
    /// Any single word of the name close to the whole query, as typed or fused.
    fn matches(&self, entity: &InstalledEntity, term: &SearchTerm) -> bool {
        entity.name_tokens().map(str::to_lowercase).any(|token| {
            approximately_equal(&token, &term.original, self.tolerance)
                || approximately_equal(&token, &term.fused, self.tolerance)
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RankedCandidate<'a> {
    pub entity: &'a InstalledEntity,
    pub score: usize, // Lower is better
}

/// Entities whose name matches `term`, in inventory order, without repeats.
pub fn candidates<'a>(
    matcher: &impl Matcher,
    inventory: &'a Inventory,
    term: &SearchTerm,
) -> Vec<&'a InstalledEntity> {
    let mut found: Vec<&InstalledEntity> = Vec::new();
    for entity in inventory {
        if matcher.matches(entity, term) && !found.iter().any(|f| f.same_program(entity)) {
            found.push(entity);
        }
    }
    log::info!("Matcher: query='{}', candidates={}", term.original, found.len());
    found
}

/// Closest name word by edit distance, plus the difference in word count
/// between query and name.
pub fn score(entity: &InstalledEntity, term: &SearchTerm) -> usize {
    let query = &term.normalized;
    let tokens: Vec<String> = entity.name_tokens().map(str::to_lowercase).collect();
    let closest = tokens
        .iter()
        .map(|token| edit_distance(token, query))
        .min()
        .unwrap_or(query.chars().count());
    closest + term.tokens.len().abs_diff(tokens.len())
}

/// Ascending by score. Ties keep candidate order.
pub fn rank<'a>(candidates: &[&'a InstalledEntity], term: &SearchTerm) -> Vec<RankedCandidate<'a>> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|&entity| RankedCandidate {
            entity,
            score: score(entity, term),
        })
        .collect();
    ranked.sort_by_key(|c| c.score);
    ranked
}
