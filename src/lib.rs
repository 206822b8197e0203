/*!
 * # transub - subtitle translation job pipeline
 *
 * A Rust library for batch-translating subtitle files with AI, built around
 * a durable single-flight job queue.
 *
 * ## Features
 *
 * - Ingest SRT subtitle files into timed, indexed segments
 * - Batch translation through a pluggable engine abstraction:
 *   - Deterministic mock engine for offline use
 *   - OpenAI-compatible network engine with retry, timeout, and caching
 * - Cross-segment consistency passes over overlapping windows
 * - Per-job progress, bounded run logs, and monthly cost accounting
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: CLI command orchestration
 * - `database`: SQLite persistence:
 *   - `database::connection`: async-safe connection handling
 *   - `database::repository`: the repository contract the pipeline consumes
 * - `engine`: translation engine abstraction:
 *   - `engine::chunk`: chunking policies (character budget, sliding windows)
 *   - `engine::prompts`: prompt assembly
 *   - `engine::response`: defensive JSON-from-prose parsing
 *   - `engine::mock` / `engine::openai`: the engine variants
 * - `jobs`: job queue, scheduler, and handlers:
 *   - `jobs::scheduler`: single-flight polling loop
 *   - `jobs::translate` / `jobs::consistency`: the two job types
 * - `subtitle_processor`: SRT parsing and writing
 * - `usage`: token/cost estimation and month keys
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod engine;
pub mod errors;
pub mod jobs;
pub mod language_utils;
pub mod subtitle_processor;
pub mod usage;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use database::{DatabaseConnection, Repository};
pub use engine::{TranslationEngine, create_engine};
pub use errors::{AppError, EngineError, SubtitleError, UsageError};
pub use jobs::JobScheduler;
