use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use zahri_corpus::{
    AnnotationOutcome, ArticleFilter, Corpus, CorpusError, NameStats, NewspaperSummary,
    SearchResult, Selection, YearCount,
};
use zahri_text::{AnnotatedNames, WordCounter, project};
use zahri_types::{AnnotationKind, Language, NameCounts, WordFrequency};

const DEFAULT_LIMIT: usize = 20;

#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<Corpus>,
    pub max_limit: usize,
    pub context_padding: usize,
    pub persistence: Option<Arc<Persistence>>,
}

/// Writes the corpus back to disk after each edit that changed an article.
/// Saves are serialized so two edits never race on the staging file.
pub struct Persistence {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Persistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn save(&self, corpus: &Corpus) -> anyhow::Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("corpus save lock poisoned"))?;
        corpus.save(&self.path)
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub language: Option<String>,
    pub year: Option<String>,
}

#[derive(Deserialize)]
pub struct StatsQuery {
    pub language: Option<String>,
    pub year: Option<String>,
    pub newspaper: Option<u64>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// Body of an annotation edit. A non-empty `text` selects by snippet,
/// otherwise `plain_start`/`plain_end` give the range. Negative offsets are
/// treated as zero.
#[derive(Deserialize)]
pub struct AnnotationBody {
    pub kind: Option<String>,
    pub text: Option<String>,
    pub approx_start: Option<i64>,
    pub approx_end: Option<i64>,
    pub plain_start: Option<i64>,
    pub plain_end: Option<i64>,
}

/// Outcome of an edit. `warning` is set when the edit is live in memory but
/// could not be written back to the corpus file, so memory and disk differ
/// until the next successful save.
#[derive(Serialize)]
pub struct EditResponse {
    #[serde(flatten)]
    outcome: AnnotationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

#[derive(Serialize)]
pub struct FrequencyResponse {
    top_words: Vec<WordFrequency>,
    total_words: u64,
    unique_words: usize,
    frequency: Vec<WordFrequency>,
}

impl FrequencyResponse {
    fn new(counter: &WordCounter, limit: usize) -> Self {
        let mut frequency = counter.frequencies();
        let unique_words = frequency.len();
        frequency.truncate(limit);
        Self {
            top_words: counter.top_frequencies(),
            total_words: counter.total_words(),
            unique_words,
            frequency,
        }
    }
}

#[derive(Serialize)]
pub struct SpanView {
    kind: AnnotationKind,
    start: usize,
    end: usize,
    text: String,
}

#[derive(Serialize)]
pub struct ArticleResponse {
    id: u64,
    title: String,
    author: Option<String>,
    newspaper: String,
    language: Language,
    published_year: Option<u16>,
    link: Option<String>,
    word_count: usize,
    content: String,
    plain: String,
    annotations: Vec<SpanView>,
    names: AnnotatedNames,
    name_counts: NameCounts,
    unique_name_counts: NameCounts,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/search", get(search))
        .route("/v1/frequency", get(frequency))
        .route("/v1/years", get(years))
        .route("/v1/names", get(names))
        .route("/v1/newspapers", get(newspapers))
        .route("/v1/newspapers/{id}/frequency", get(newspaper_frequency))
        .route("/v1/articles/{id}", get(article))
        .route("/v1/articles/{id}/frequency", get(article_frequency))
        .route("/v1/articles/{id}/annotations", post(annotate))
        .route("/v1/articles/{id}/annotations/remove", post(remove))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResult>, ApiError> {
    let language = params
        .language
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("language is required"))
        .and_then(parse_language)?;
    let query = params.q.unwrap_or_default();
    Ok(Json(state.corpus.search_with_padding(
        &query,
        language,
        params.year.as_deref(),
        state.context_padding,
    )))
}

async fn frequency(
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<FrequencyResponse>, ApiError> {
    let filter = stats_filter(&params)?;
    let limit = clamp_limit(params.limit, state.max_limit)?;
    let counter = state.corpus.word_counter(&filter);
    Ok(Json(FrequencyResponse::new(&counter, limit)))
}

async fn years(State(state): State<AppState>) -> Json<Vec<YearCount>> {
    Json(state.corpus.year_list())
}

async fn newspapers(State(state): State<AppState>) -> Json<Vec<NewspaperSummary>> {
    Json(state.corpus.newspaper_summaries())
}

async fn newspaper_frequency(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<FrequencyResponse>, ApiError> {
    let limit = clamp_limit(params.limit, state.max_limit)?;
    let counter = state.corpus.newspaper_word_counter(id)?;
    Ok(Json(FrequencyResponse::new(&counter, limit)))
}

async fn names(
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<NameStats>, ApiError> {
    let filter = stats_filter(&params)?;
    let limit = clamp_limit(params.limit, state.max_limit)?;
    let mut stats = state.corpus.annotated_name_stats(&filter);
    stats.frequency.truncate(limit);
    Ok(Json(stats))
}

async fn article(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state
        .corpus
        .article(id)
        .ok_or(ApiError::from(CorpusError::ArticleNotFound(id)))?;
    let projection = project(&article.content);
    let annotations = projection
        .annotations
        .iter()
        .map(|span| SpanView {
            kind: span.kind,
            start: span.plain_start,
            end: span.plain_end,
            text: projection
                .plain_slice(span.plain_start, span.plain_end)
                .to_string(),
        })
        .collect();
    let names = AnnotatedNames::from_projection(&projection);
    let newspaper = state
        .corpus
        .newspaper(article.newspaper_id)
        .map(|paper| paper.title.clone())
        .unwrap_or_default();

    Ok(Json(ArticleResponse {
        id: article.id,
        word_count: article.word_count(),
        title: article.title,
        author: article.author,
        newspaper,
        language: article.language,
        published_year: article.published_year,
        link: article.link,
        name_counts: names.counts(),
        unique_name_counts: names.unique_counts(),
        names,
        annotations,
        plain: projection.plain,
        content: article.content,
    }))
}

async fn article_frequency(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<FrequencyResponse>, ApiError> {
    let limit = clamp_limit(params.limit, state.max_limit)?;
    let counter = state.corpus.article_word_counter(id)?;
    Ok(Json(FrequencyResponse::new(&counter, limit)))
}

async fn annotate(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<AnnotationBody>,
) -> Result<Json<EditResponse>, ApiError> {
    let kind = body
        .kind
        .clone()
        .filter(|kind| !kind.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("kind is required"))?;
    let selection = selection_from(&body)?;
    let outcome = state.corpus.annotate(id, &selection, &kind)?;
    let warning = persist(&state, &outcome).await;
    Ok(Json(EditResponse { outcome, warning }))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<AnnotationBody>,
) -> Result<Json<EditResponse>, ApiError> {
    let selection = selection_from(&body)?;
    let outcome = state.corpus.remove_annotations(id, &selection)?;
    let warning = persist(&state, &outcome).await;
    Ok(Json(EditResponse { outcome, warning }))
}

fn selection_from(body: &AnnotationBody) -> Result<Selection, ApiError> {
    if let Some(text) = body.text.as_deref()
        && !text.trim().is_empty()
    {
        return Ok(Selection::Snippet {
            text: text.to_string(),
            approx_start: body.approx_start.map(non_negative),
            approx_end: body.approx_end.map(non_negative),
        });
    }
    match (body.plain_start, body.plain_end) {
        (Some(start), Some(end)) => Ok(Selection::Range {
            start: non_negative(start),
            end: non_negative(end),
        }),
        _ => Err(ApiError::bad_request(
            "either text or plain_start and plain_end are required",
        )),
    }
}

fn non_negative(offset: i64) -> usize {
    usize::try_from(offset).unwrap_or(0)
}

/// Save the corpus after an edit that changed an article. The edit is
/// already applied in memory, so a failed save is reported as a warning
/// rather than an error.
async fn persist(state: &AppState, outcome: &AnnotationOutcome) -> Option<String> {
    let persistence = state.persistence.clone()?;
    if !outcome.changed {
        return None;
    }
    let corpus = Arc::clone(&state.corpus);
    let saved = match tokio::task::spawn_blocking(move || persistence.save(&corpus)).await {
        Ok(saved) => saved,
        Err(err) => Err(anyhow::anyhow!("persist task failed: {err}")),
    };
    match saved {
        Ok(()) => None,
        Err(err) => {
            error!(article_id = outcome.article_id, "failed to persist corpus: {err:#}");
            Some(format!("edit applied but not saved: {err}"))
        }
    }
}

fn parse_language(raw: &str) -> Result<Language, ApiError> {
    Language::parse(raw).ok_or_else(|| ApiError::bad_request(format!("unknown language: {raw}")))
}

fn stats_filter(params: &StatsQuery) -> Result<ArticleFilter, ApiError> {
    let mut filter = ArticleFilter::all();
    if let Some(raw) = params.language.as_deref().filter(|raw| !raw.trim().is_empty()) {
        filter = filter.language(parse_language(raw)?);
    }
    if let Some(raw) = params.year.as_deref().filter(|raw| !raw.trim().is_empty()) {
        let year = raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ApiError::bad_request(format!("invalid year: {raw}")))?;
        filter = filter.year(year);
    }
    if let Some(id) = params.newspaper {
        filter = filter.newspaper(id);
    }
    Ok(filter)
}

fn clamp_limit(limit: Option<usize>, max_limit: usize) -> Result<usize, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 {
        return Err(ApiError::bad_request("limit must be >= 1"));
    }
    Ok(limit.min(max_limit))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl From<CorpusError> for ApiError {
    fn from(err: CorpusError) -> Self {
        match err {
            CorpusError::ArticleNotFound(_) | CorpusError::NewspaperNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            CorpusError::SelectionNotFound(_) => ApiError::Unprocessable(err.to_string()),
            CorpusError::UnknownNewspaper { .. } | CorpusError::DuplicateId { .. } => {
                warn!("unexpected corpus error in request: {err}");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => {
                let body = Json(json!({ "error": "internal server error" }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
