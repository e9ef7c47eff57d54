mod blacklist_tests;
mod cleanup_tests;
mod validation_tests;
