// Seraph — Les 3 Anges
// Multi-persona assistant backend: three fixed French-speaking personas
// backed by encrypted per-user memory in a TTL'd key-value store, shared
// context across personas, and an OpenAI-compatible completion gateway.

pub mod atoms;
pub mod config;
pub mod engine;
pub mod server;
