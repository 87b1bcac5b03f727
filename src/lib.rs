//! # Resume Harness
//!
//! A local-first resume extraction and keyword cross-search toolkit.
//!
//! Resume Harness decodes PDF/DOCX resumes to text, bounds the work
//! experience section with heading heuristics, extracts a structured
//! career record through a local language model, and lets a user
//! cross-search the cached experience sections by keyword — all against
//! an in-memory session store so repeated interactions never re-run
//! expensive extraction.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────┐   ┌───────────────┐
//! │  PDF / DOCX  │──▶│ decode → normalize │──▶│ SessionStore  │
//! │    bytes     │   │     → segment     │   │  (per doc)    │
//! └──────────────┘   └───────────────────┘   └──────┬────────┘
//!                                                   │
//!                           ┌───────────────────────┤
//!                           ▼                       ▼
//!                    ┌─────────────┐         ┌────────────┐
//!                    │  contract    │         │   search    │
//!                    │ (Ollama LLM)│         │ (keywords)  │
//!                    └─────────────┘         └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rex scan ./resumes                  # ingest and report sections
//! rex section resume.pdf              # print the bounded experience section
//! rex extract resume.pdf              # run model extraction
//! rex match "python, java" ./resumes  # keyword cross-search
//! rex serve                           # start the HTTP session server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`decode`] | PDF/DOCX byte decoding |
//! | [`normalize`] | Line-oriented text normalization |
//! | [`segment`] | Experience-section segmentation |
//! | [`contract`] | Extraction prompt and response decoding |
//! | [`infer`] | Inference collaborator (Ollama client) |
//! | [`session`] | In-memory per-session document cache |
//! | [`ingest`] | File scanning and document creation |
//! | [`search`] | Keyword cross-search |
//! | [`server`] | JSON HTTP session server |

pub mod config;
pub mod contract;
pub mod decode;
pub mod infer;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod search;
pub mod segment;
pub mod server;
pub mod session;
