//! Property tests for format resolution and download locations.

use std::path::Path;

use proptest::prelude::*;
use roboflow::format::{aliases, canonical_format, resolve_format_identifier};
use roboflow::location::{dataset_slug, resolve_download_location};

fn is_alias(candidate: &str) -> bool {
    aliases().any(|(alias, _)| alias == candidate)
}

proptest! {
    #[test]
    fn unknown_aliases_pass_through(format in "[a-z][a-z0-9-]{0,24}") {
        prop_assume!(!is_alias(&format));
        prop_assert_eq!(canonical_format(&format), format.as_str());
    }

    #[test]
    fn requested_format_ignores_fallback(
        requested in "[a-z][a-z0-9-]{0,24}",
        fallback in proptest::option::of("[a-z][a-z0-9-]{0,24}"),
    ) {
        let resolved = resolve_format_identifier(Some(requested.as_str()), fallback.as_deref());
        prop_assert_eq!(resolved, Some(canonical_format(&requested).to_string()));
    }

    #[test]
    fn resolution_is_idempotent(format in "[a-z][a-z0-9-]{0,24}") {
        let once = canonical_format(&format).to_string();
        prop_assert_eq!(canonical_format(&once), once.as_str());
    }

    #[test]
    fn slug_has_no_spaces_and_ends_with_version(
        name in "[A-Za-z0-9 ]{1,30}",
        version in 0u32..10_000,
    ) {
        let slug = dataset_slug(&name, version);
        prop_assert!(!slug.contains(' '));
        let suffix = format!("-{version}");
        prop_assert!(slug.ends_with(&suffix));
    }

    #[test]
    fn location_is_slug_under_base(
        name in "[A-Za-z0-9 ]{1,30}",
        version in 0u32..10_000,
    ) {
        let base = Path::new("/my/exports");
        let location = resolve_download_location(Some(base), &name, version);
        prop_assert_eq!(location.parent(), Some(base));
        let expected_slug = dataset_slug(&name, version);
        prop_assert_eq!(
            location.file_name().and_then(|n| n.to_str()),
            Some(expected_slug.as_str())
        );
    }
}
