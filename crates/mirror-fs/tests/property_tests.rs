use mirror_fs::NormalizedPath;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_normalization_invariants(segments in prop::collection::vec("[a-zA-Z0-9_.-]{0,8}", 0..6)) {
        let raw = segments.join("/");
        let path = NormalizedPath::new(&raw);
        let as_str = path.as_str();

        // No empty segments survive normalization
        prop_assert!(!as_str.contains("//"));
        prop_assert!(as_str == "/" || !as_str.ends_with('/'));

        // Normalizing twice is a no-op
        let again = NormalizedPath::new(as_str);
        prop_assert_eq!(&path, &again);

        // Native round trip preserves the key
        let roundtripped = NormalizedPath::new(path.to_native());
        prop_assert_eq!(path, roundtripped);
    }

    #[test]
    fn test_under_and_relative_to_round_trip(rel in "[a-z]{1,6}(/[a-z]{1,6}){0,3}") {
        let root = std::path::Path::new("replica-root");
        let key = NormalizedPath::new(&rel);

        let absolute = key.under(root);
        let back = NormalizedPath::relative_to(root, &absolute).unwrap();

        prop_assert_eq!(back.depth(), rel.split('/').count());
        prop_assert_eq!(back, key);
    }
}
