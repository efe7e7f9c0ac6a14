//! Property-based tests for the sanitizers and the builder.

use crate::*;
use proptest::prelude::*;

fn is_stream_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_trace_char(c: char) -> bool {
    c.is_ascii_hexdigit() || c == '-'
}

fn is_service_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // -------------------------------------------------------------------------
    // Stream names
    // -------------------------------------------------------------------------

    #[test]
    fn prop_valid_stream_names_pass_unchanged(name in "[A-Za-z0-9_]{1,64}") {
        let sanitized = sanitize_stream_name(&name);
        prop_assert_eq!(sanitized.map(Sanitized::into_inner).ok(), Some(name));
    }

    #[test]
    fn prop_stream_names_with_foreign_chars_fail(
        prefix in "[A-Za-z0-9_]{0,16}",
        bad in any::<char>().prop_filter("outside allow-list", |c| !is_stream_char(*c)),
        suffix in "[A-Za-z0-9_]{0,16}",
    ) {
        let name = format!("{prefix}{bad}{suffix}");
        prop_assert!(sanitize_stream_name(&name).is_err());
    }

    // -------------------------------------------------------------------------
    // Trace ids
    // -------------------------------------------------------------------------

    #[test]
    fn prop_uuid_trace_ids_pass_unchanged(
        a in "[0-9a-fA-F]{8}",
        b in "[0-9a-fA-F]{4}",
        c in "[0-9a-fA-F]{4}",
        d in "[0-9a-fA-F]{4}",
        e in "[0-9a-fA-F]{12}",
    ) {
        let id = format!("{a}-{b}-{c}-{d}-{e}");
        prop_assert_eq!(sanitize_trace_id(&id).map(Sanitized::into_inner).ok(), Some(id));
    }

    #[test]
    fn prop_hex_trace_ids_pass(id in "[0-9a-f]{32}") {
        prop_assert!(sanitize_trace_id(&id).is_ok());
    }

    #[test]
    fn prop_trace_ids_with_foreign_chars_fail(
        prefix in "[0-9a-f-]{0,16}",
        bad in any::<char>().prop_filter("outside allow-list", |c| !is_trace_char(*c)),
        suffix in "[0-9a-f-]{0,16}",
    ) {
        let id = format!("{prefix}{bad}{suffix}");
        prop_assert!(sanitize_trace_id(&id).is_err());
    }

    // -------------------------------------------------------------------------
    // Service names
    // -------------------------------------------------------------------------

    #[test]
    fn prop_valid_service_names_pass(name in "[A-Za-z0-9_.-]{1,63}") {
        prop_assert!(sanitize_service_name(&name).is_ok());
    }

    #[test]
    fn prop_service_names_with_foreign_chars_fail(
        prefix in "[a-z.-]{0,16}",
        bad in any::<char>().prop_filter("outside allow-list", |c| !is_service_char(*c)),
    ) {
        let name = format!("{prefix}{bad}");
        prop_assert!(sanitize_service_name(&name).is_err());
    }

    // -------------------------------------------------------------------------
    // Levels and sizes
    // -------------------------------------------------------------------------

    #[test]
    fn prop_only_canonical_levels_pass(level in "[A-Za-z]{1,10}") {
        let canonical = LogLevel::ALL.iter().any(|l| l.as_str() == level);
        prop_assert_eq!(sanitize_log_level(&level).is_ok(), canonical);
    }

    #[test]
    fn prop_sizes_in_range_pass(size in 1i64..=10_000) {
        prop_assert_eq!(sanitize_size(size).map(|s| i64::from(s.get())).ok(), Some(size));
    }

    #[test]
    fn prop_sizes_out_of_range_fail(size in prop_oneof![i64::MIN..1, 10_001i64..i64::MAX]) {
        prop_assert!(sanitize_size(size).is_err());
    }

    // -------------------------------------------------------------------------
    // Builder
    // -------------------------------------------------------------------------

    #[test]
    fn prop_built_queries_never_contain_extra_quotes(
        trace in proptest::option::of("[0-9a-f-]{1,36}"),
        service in proptest::option::of("[A-Za-z0-9_.-]{1,20}"),
        stream in "[A-Za-z0-9_]{1,20}",
        size in 1i64..=10_000,
    ) {
        let sql = build_query(trace.as_deref(), None, service.as_deref(), &stream, size)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let expected_quotes = 2 * (usize::from(trace.is_some()) + usize::from(service.is_some()));
        prop_assert_eq!(sql.matches('\'').count(), expected_quotes);
        let limit = format!(" LIMIT {size}");
        prop_assert!(sql.ends_with(&limit));
    }

    #[test]
    fn prop_any_quote_in_filters_is_rejected(
        trace in "[0-9a-f]{0,8}'[^']{0,16}",
    ) {
        prop_assert!(build_query(Some(&trace), None, None, "default", 10).is_err());
    }
}
