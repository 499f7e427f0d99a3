// Seraph Server — Engine Layer
// Everything between the HTTP surface and the bytes on disk.
//
// Module layout:
//   kv          — TTL'd string/list/hash primitives over SQLite
//   vault       — AES-256-GCM record envelope on top of the kv store
//   profile     — per-user profile store (merge updates, 1y retention)
//   context     — cross-persona shared facts/preferences
//   insights    — per-persona dated notes about a user
//   history     — per (user, persona) conversation log + usage counters
//   feedback    — per-user ratings + global per-persona histogram
//   agents      — the three personas and their prompt templates
//   assembler   — prompt context assembly + template rendering
//   chat        — compose → generate → persist orchestration
//   completion  — OpenAI-compatible chat completion client
//   search      — trigger-keyword web lookup (DuckDuckGo HTML)
//   auth        — derived bearer tokens
//   clock       — French-language datetime formatting

pub mod agents;
pub mod assembler;
pub mod auth;
pub mod chat;
pub mod clock;
pub mod completion;
pub mod context;
pub mod feedback;
pub mod history;
pub mod insights;
pub mod kv;
pub mod profile;
pub mod search;
pub mod vault;
