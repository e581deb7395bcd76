// Test modules for CampusTrade
// Each module covers the corresponding source module; session_tests runs the
// end-to-end gate -> verification -> chat flows

mod helpers;

mod storage_tests;
mod verification_tests;
