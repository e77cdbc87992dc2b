//! Model candidate selection.
//!
//! Resolves the ordered list of model identifiers a run will try: the
//! operator's override (when set) followed by the fixed fallback chain, with
//! duplicates removed so no model is attempted twice. The list is never
//! empty; with no override and an empty fallback list, a built-in default
//! remains.

use itertools::Itertools;

/// The fixed fallback chain, tried in order after any override.
pub const DEFAULT_FALLBACK_MODELS: &[&str] = &["gpt-5.1", "gpt-4.1", "gpt-4.1-mini"];

/// Last-resort model when both the override and the fallback list are empty.
const BUILTIN_DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Build the ordered, deduplicated candidate list for a run.
///
/// The override (when non-empty) always comes first; a duplicate entry later
/// in the fallback chain is dropped rather than retried.
pub fn candidate_models(override_model: Option<&str>, fallbacks: &[&str]) -> Vec<String> {
    let override_model = override_model.map(str::trim).filter(|m| !m.is_empty());

    let candidates: Vec<String> = override_model
        .into_iter()
        .chain(fallbacks.iter().copied())
        .map(str::to_string)
        .unique()
        .collect();

    if candidates.is_empty() {
        vec![BUILTIN_DEFAULT_MODEL.to_string()]
    } else {
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_comes_first() {
        let list = candidate_models(Some("gpt-x"), &["gpt-4.1", "gpt-4.1-mini"]);
        assert_eq!(list, vec!["gpt-x", "gpt-4.1", "gpt-4.1-mini"]);
    }

    #[test]
    fn test_duplicate_override_not_repeated() {
        let list = candidate_models(Some("gpt-4.1"), &["gpt-4.1", "gpt-4.1-mini"]);
        assert_eq!(list, vec!["gpt-4.1", "gpt-4.1-mini"]);
    }

    #[test]
    fn test_no_override_uses_fallbacks_alone() {
        let list = candidate_models(None, DEFAULT_FALLBACK_MODELS);
        assert_eq!(list.len(), DEFAULT_FALLBACK_MODELS.len());
        assert_eq!(list[0], DEFAULT_FALLBACK_MODELS[0]);
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let list = candidate_models(Some("   "), &["gpt-4.1"]);
        assert_eq!(list, vec!["gpt-4.1"]);
    }

    #[test]
    fn test_never_empty() {
        let list = candidate_models(None, &[]);
        assert_eq!(list, vec![BUILTIN_DEFAULT_MODEL.to_string()]);
    }

    #[test]
    fn test_no_duplicates_for_any_input() {
        let list = candidate_models(Some("m1"), &["m1", "m2", "m2", "m1", "m3"]);
        let mut deduped = list.clone();
        deduped.dedup();
        assert_eq!(list, deduped);
        assert_eq!(list, vec!["m1", "m2", "m3"]);
    }
}
