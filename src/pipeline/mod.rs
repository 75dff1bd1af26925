//! Pipeline stages for resume analysis.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ llm ──▶ validate
//! (path/URL) (pdf/docx) (one call) (schema)
//! ```
//!
//! 1. [`input`]    — read a local file or download a URL; settle the media type
//! 2. [`extract`]  — PDF/Word → plain text; runs in `spawn_blocking`
//! 3. [`llm`]      — the single completion round trip; the only stage that
//!    talks to the model service
//! 4. [`validate`] — untrusted reply text → success or error shape

pub mod extract;
pub mod input;
pub mod llm;
pub mod validate;
