use crate::{Comparison, Predicate};
use std::collections::{HashMap, HashSet};

/// Operator assumed when a key carries no suffix
pub const DEFAULT_OPERATOR: &str = "eq";

/// Whitelist and renaming rules for one resource's list endpoint.
///
/// Holds three immutable mappings:
/// - `safe_params`: parameter name → operator tokens allowed for it
/// - `column_map`: parameter name → backing-store column, where they differ
/// - `operator_map`: operator token → [`Comparison`]
///
/// A single value is built once per resource type and shared by every
/// request; [`translate`](Self::translate) only reads it.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    safe_params: HashMap<String, HashSet<String>>,
    column_map: HashMap<String, String>,
    operator_map: HashMap<String, Comparison>,
}

impl FilterConfig {
    /// Start a config with the standard `eq/lt/lte/gt/gte` operator tokens.
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::new()
    }

    /// Translate query parameters into predicates.
    ///
    /// Pairs are visited in the order given; repeated keys yield one
    /// predicate each. A pair is dropped when its base name is not
    /// whitelisted or its operator is not allowed for that name. This never
    /// fails.
    pub fn translate<I, K, V>(&self, params: I) -> Vec<Predicate>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut predicates = Vec::new();

        for (key, value) in params {
            let key = key.as_ref();
            let (param, token) = self.split_key(key);

            if !self.is_allowed(param, token) {
                tracing::trace!(key, "Ignoring filter parameter that is not whitelisted");
                continue;
            }

            let Some(operator) = self.operator_map.get(token).copied() else {
                tracing::trace!(key, token, "Ignoring filter with unmapped operator");
                continue;
            };

            predicates.push(Predicate::new(
                self.column_for(param),
                operator,
                value.as_ref(),
            ));
        }

        predicates
    }

    /// Whether `param` may be filtered with operator `token`.
    pub fn is_allowed(&self, param: &str, token: &str) -> bool {
        self.safe_params
            .get(param)
            .is_some_and(|tokens| tokens.contains(token))
    }

    /// Backing-store column for `param`, falling back to the name itself.
    pub fn column_for<'a>(&'a self, param: &'a str) -> &'a str {
        self.column_map
            .get(param)
            .map(String::as_str)
            .unwrap_or(param)
    }

    /// Whitelisted parameter names, sorted.
    pub fn params(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.safe_params.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Split a query key into `(param, operator token)`.
    ///
    /// `field[op]` and `field_op` both name an operator; the underscore form
    /// is only split when the whole key is not itself whitelisted and the
    /// suffix is a known operator token, so names such as `fb_id` survive.
    fn split_key<'k>(&self, key: &'k str) -> (&'k str, &'k str) {
        if let Some((param, token)) = key.strip_suffix(']').and_then(|k| k.split_once('[')) {
            return (param, token);
        }

        if self.safe_params.contains_key(key) {
            return (key, DEFAULT_OPERATOR);
        }

        match key.rsplit_once('_') {
            Some((param, token)) if self.operator_map.contains_key(token) => (param, token),
            _ => (key, DEFAULT_OPERATOR),
        }
    }
}

/// Builder for [`FilterConfig`].
#[derive(Debug, Clone)]
pub struct FilterConfigBuilder {
    config: FilterConfig,
}

impl FilterConfigBuilder {
    fn new() -> Self {
        let operator_map = Comparison::ALL
            .iter()
            .map(|c| (c.token().to_string(), *c))
            .collect();

        Self {
            config: FilterConfig {
                operator_map,
                ..FilterConfig::default()
            },
        }
    }

    /// Whitelist `name` with the given operator tokens.
    pub fn param(mut self, name: &str, operators: &[&str]) -> Self {
        self.config
            .safe_params
            .entry(name.to_string())
            .or_default()
            .extend(operators.iter().map(|op| op.to_string()));
        self
    }

    /// Map parameter `name` onto backing-store `column`.
    pub fn column(mut self, name: &str, column: &str) -> Self {
        self.config
            .column_map
            .insert(name.to_string(), column.to_string());
        self
    }

    /// Register (or override) an operator token.
    pub fn operator(mut self, token: &str, comparison: Comparison) -> Self {
        self.config
            .operator_map
            .insert(token.to_string(), comparison);
        self
    }

    pub fn build(self) -> FilterConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_config() -> FilterConfig {
        FilterConfig::builder()
            .param("name", &["eq"])
            .param("email", &["eq"])
            .param("emailverifiedat", &["eq"])
            .param("currentteamid", &["eq"])
            .param("fbid", &["eq"])
            .column("emailverifiedat", "email_verified_at")
            .column("currentteamid", "current_team_id")
            .column("fbid", "fb_id")
            .build()
    }

    fn ranged_config() -> FilterConfig {
        FilterConfig::builder()
            .param("score", &["eq", "lt", "lte", "gt", "gte"])
            .param("created_at", &["gt", "lt"])
            .column("score", "total_score")
            .build()
    }

    #[test]
    fn test_drops_unknown_params() {
        let predicates = user_config().translate([("name", "Alice"), ("unknown", "x")]);

        assert_eq!(predicates, vec![Predicate::new("name", Comparison::Eq, "Alice")]);
    }

    #[test]
    fn test_renames_through_column_map() {
        let predicates = user_config().translate([("currentteamid", "5")]);

        assert_eq!(
            predicates,
            vec![Predicate::new("current_team_id", Comparison::Eq, "5")]
        );
    }

    #[test]
    fn test_rejects_operator_not_allowed_for_param() {
        let predicates = user_config().translate([("email_lt", "z")]);
        assert!(predicates.is_empty());

        let predicates = user_config().translate([("email[lt]", "z")]);
        assert!(predicates.is_empty());
    }

    #[test]
    fn test_empty_params() {
        let params: Vec<(String, String)> = vec![];
        assert!(user_config().translate(params).is_empty());
    }

    #[test]
    fn test_operator_suffix_resolves_comparison() {
        let predicates = ranged_config().translate([
            ("score_lt", "10"),
            ("score_lte", "11"),
            ("score_gt", "1"),
            ("score_gte", "2"),
            ("score", "5"),
        ]);

        let ops: Vec<_> = predicates.iter().map(|p| p.operator).collect();
        assert_eq!(
            ops,
            vec![
                Comparison::Lt,
                Comparison::Lte,
                Comparison::Gt,
                Comparison::Gte,
                Comparison::Eq
            ]
        );
        assert!(predicates.iter().all(|p| p.column == "total_score"));
    }

    #[test]
    fn test_bracket_and_underscore_forms_match() {
        let config = ranged_config();

        assert_eq!(
            config.translate([("score[gte]", "3")]),
            config.translate([("score_gte", "3")])
        );
    }

    #[test]
    fn test_underscored_param_names_are_not_split() {
        let config = ranged_config();

        // `created_at` has no `eq`, so the bare key is rejected rather than
        // being read as param `created` with operator `at`.
        assert!(config.translate([("created_at", "2024-01-01")]).is_empty());

        let predicates = config.translate([("created_at_gt", "2024-01-01")]);
        assert_eq!(
            predicates,
            vec![Predicate::new("created_at", Comparison::Gt, "2024-01-01")]
        );
    }

    #[test]
    fn test_unknown_operator_suffix_is_dropped() {
        let predicates = ranged_config().translate([("score_ne", "1"), ("score[like]", "%a%")]);
        assert!(predicates.is_empty());
    }

    #[test]
    fn test_repeated_keys_keep_input_order() {
        let predicates = user_config().translate([("name", "Alice"), ("name", "Bob")]);

        let values: Vec<_> = predicates.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(values, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_values_are_passed_through_verbatim() {
        let predicates = user_config().translate([("name", " O'Brien; DROP TABLE users ")]);
        assert_eq!(predicates[0].value, " O'Brien; DROP TABLE users ");
    }

    #[test]
    fn test_translate_is_idempotent() {
        let config = user_config();
        let params = vec![
            ("fbid".to_string(), "123".to_string()),
            ("page".to_string(), "2".to_string()),
            ("emailverifiedat".to_string(), "2024-05-01".to_string()),
        ];

        let first = config.translate(params.iter().map(|(k, v)| (k, v)));
        let second = config.translate(params.iter().map(|(k, v)| (k, v)));

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_every_emitted_predicate_is_whitelisted() {
        let config = user_config();
        let params = [
            ("name", "a"),
            ("name_gt", "b"),
            ("password", "c"),
            ("fbid[eq]", "d"),
            ("fb_id", "e"),
            ("currentteamid_lte", "f"),
            ("", "g"),
            ("[]", "h"),
        ];

        let predicates = config.translate(params);

        assert_eq!(
            predicates,
            vec![
                Predicate::new("name", Comparison::Eq, "a"),
                Predicate::new("fb_id", Comparison::Eq, "d"),
            ]
        );
    }

    #[test]
    fn test_custom_operator_token() {
        let config = FilterConfig::builder()
            .param("age", &["min"])
            .operator("min", Comparison::Gte)
            .build();

        let predicates = config.translate([("age_min", "18")]);
        assert_eq!(predicates, vec![Predicate::new("age", Comparison::Gte, "18")]);
    }

    #[test]
    fn test_params_are_sorted() {
        assert_eq!(
            user_config().params(),
            vec!["currentteamid", "email", "emailverifiedat", "fbid", "name"]
        );
    }

    #[test]
    fn test_column_for_falls_back_to_param() {
        let config = user_config();
        assert_eq!(config.column_for("fbid"), "fb_id");
        assert_eq!(config.column_for("name"), "name");
    }
}
