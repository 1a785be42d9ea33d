
mod detector_tests;
mod extractor_tests;
mod whitelist_tests;
