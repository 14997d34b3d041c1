mod canonical_tests;
