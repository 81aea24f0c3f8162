//! HTTP surface of the Zahri corpus: search, statistics and annotation
//! editing over an in-memory [`zahri_corpus::Corpus`].

pub mod handlers;

pub use handlers::{ApiError, AppState, Persistence, router};
