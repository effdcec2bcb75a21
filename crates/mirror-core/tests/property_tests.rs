use std::collections::{BTreeMap, BTreeSet};

use mirror_core::{ReplicaMutator, TreeComparer};
use mirror_test_utils::TestTree;
use proptest::prelude::*;

fn tree_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    // "d" is only ever a directory, so no name is both a file and a directory
    prop::collection::btree_map("(d/)?f[0-5]", "[xy]{0,3}", 0..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_partition_and_convergence(source in tree_strategy(), replica in tree_strategy()) {
        let tree = TestTree::new();
        for (rel, content) in &source {
            tree.write_source(rel, content);
        }
        for (rel, content) in &replica {
            tree.write_replica(rel, content);
        }

        let comparer = TreeComparer::default();
        let diff = comparer.compare(&tree.source(), &tree.replica()).unwrap();

        let added: BTreeSet<String> = diff.files_to_add.keys().map(|k| k.to_string()).collect();
        let updated: BTreeSet<String> = diff.files_to_update.keys().map(|k| k.to_string()).collect();
        let removed: BTreeSet<String> = diff.files_to_remove.keys().map(|k| k.to_string()).collect();
        let source_paths: BTreeSet<String> = source.keys().cloned().collect();
        let replica_paths: BTreeSet<String> = replica.keys().cloned().collect();

        // add and update are disjoint and drawn from the source
        prop_assert!(added.is_disjoint(&updated));
        prop_assert!(added.is_subset(&source_paths));
        prop_assert!(updated.is_subset(&source_paths));
        // add is exactly "in source, not in replica"
        let expected_added: BTreeSet<String> = source_paths.difference(&replica_paths).cloned().collect();
        prop_assert_eq!(&added, &expected_added);
        // remove is exactly "in replica, not in source"
        let expected_removed: BTreeSet<String> = replica_paths.difference(&source_paths).cloned().collect();
        prop_assert_eq!(&removed, &expected_removed);

        let report = ReplicaMutator::new(tree.replica()).apply(&diff);
        prop_assert!(report.is_success(), "failures: {:?}", report.failures);
        tree.assert_converged();

        let again = comparer.compare(&tree.source(), &tree.replica()).unwrap();
        prop_assert!(again.is_empty(), "second diff not empty: {:?}", again);
    }
}
