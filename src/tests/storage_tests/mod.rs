// Storage Tests Module - Testing the storage module
// Tests organized by storage module functionality:
// - conversation_tests: Conversation and Message structs (append, summary, serialization)
// - app_state_tests: AppState struct (sign-in, save/load, lookups, notifications)
// - settings_tests: Settings (defaults, persistence, partial files)

mod app_state_tests;
mod conversation_tests;
mod settings_tests;
