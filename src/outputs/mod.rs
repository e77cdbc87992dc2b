//! Output writers for the published page and the debug artifact set.
//!
//! # Submodules
//!
//! - [`page`]: Renders the normalized payload into a standalone HTML page
//!   (with the mandated debug footer) and writes it under the docs directory
//! - [`debug`]: Persists raw HTTP bodies, parsed payloads, and verification
//!   reports under the debug directory for post-hoc audit
//!
//! # Output Structure
//!
//! ```text
//! docs_dir/
//! ├── index.html                       # daily
//! └── weekly.html                      # weekly
//!
//! debug_dir/
//! ├── daily-2026-08-30-raw-http.json        # structured-style attempt log
//! ├── daily-2026-08-30-payload.json         # parsed payload (structured/stub)
//! ├── daily-2026-08-30-chat-raw-http.json   # chat-style attempt log
//! ├── daily-2026-08-30-chat-payload.json    # parsed payload (chat)
//! └── daily-2026-08-30-verify.json          # verification report
//! ```

pub mod debug;
pub mod page;
