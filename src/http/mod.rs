use std::{convert::Infallible, sync::Arc};

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Extension, FromRequest, Path, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, patch, post, put},
};
use chrono::{SecondsFormat, Utc};
use futures_util::{Stream, stream};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::{
    sync::{Mutex, broadcast},
    time::Duration,
};
use tracing::error;

use crate::{
    backup::{ImportSummary, export_filename},
    chat::{self, ChatClient, ChatReply, ChatTurn},
    credentials::CredentialCheck,
    domain::{
        BlogPost, ContactMessage, DomainError, MessageStatus, Property, SiteSettings, Testimonial,
    },
    id::new_timestamp_id,
    storage::StoreError,
    store::{Collection, ContentStore},
};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ContentStore>>,
    pub changes: broadcast::Sender<()>,
    pub chat: Option<Arc<dyn ChatClient>>,
}

#[derive(Debug)]
pub struct ApiError {
    code: &'static str,
    message: String,
    status: StatusCode,
    details: Map<String, Value>,
}

impl ApiError {
    fn new(code: &'static str, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status,
            details: Map::new(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new("invalid_request", StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal", StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::InvalidImport { .. } => ApiError::invalid_request(value.to_string()),
            StoreError::Io(_) | StoreError::SerdeJson(_) => {
                error!(error = %value, "store operation failed");
                ApiError::internal(value.to_string())
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        match &value {
            DomainError::MissingField { field, .. } => {
                ApiError::invalid_request(value.to_string()).with_detail("field", *field)
            }
            DomainError::NotFound { .. } => ApiError::not_found(value.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    details: Map<String, Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code.to_string(),
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    axum::Json<T>: FromRequest<S>,
    <axum::Json<T> as FromRequest<S>>::Rejection: std::fmt::Display,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_request(e.to_string()))?;
        Ok(Self(value))
    }
}

#[derive(Serialize)]
struct Items<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactFormRequest {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<ChatTurn>,
}

#[derive(Debug, Deserialize)]
struct MessageStatusRequest {
    status: MessageStatus,
}

#[derive(Serialize)]
struct ImportResponse {
    restored: ImportSummary,
}

#[derive(Serialize)]
struct ChangedEvent {
    at: String,
}

pub fn build_router(
    store: ContentStore,
    credentials: Arc<dyn CredentialCheck>,
    chat: Option<Arc<dyn ChatClient>>,
) -> Router {
    let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
    let feed = changes.clone();
    // Drop does not detach the listener; it lives as long as the store.
    let _ = store.subscribe(move || {
        let _ = feed.send(());
    });

    let auth_state = AdminAuthState { credentials };
    let app_state = AppState {
        store: Arc::new(Mutex::new(store)),
        changes,
        chat,
    };

    let admin = Router::new()
        .route(
            "/properties",
            get(list_items::<Property>).post(create_item::<Property>),
        )
        .route(
            "/properties/:id",
            put(update_item::<Property>).delete(delete_item::<Property>),
        )
        .route(
            "/testimonials",
            get(list_items::<Testimonial>).post(create_item::<Testimonial>),
        )
        .route(
            "/testimonials/:id",
            put(update_item::<Testimonial>).delete(delete_item::<Testimonial>),
        )
        .route(
            "/blog",
            get(list_items::<BlogPost>).post(create_item::<BlogPost>),
        )
        .route(
            "/blog/:id",
            put(update_item::<BlogPost>).delete(delete_item::<BlogPost>),
        )
        .route("/messages", get(list_items::<ContactMessage>))
        .route(
            "/messages/:id",
            put(update_item::<ContactMessage>).delete(delete_item::<ContactMessage>),
        )
        .route("/messages/:id/status", patch(admin_set_message_status))
        .route("/settings", get(get_settings).put(admin_put_settings))
        .route("/export", get(admin_export))
        .route("/import", post(admin_import))
        .route("/reset", post(admin_reset))
        .layer(middleware::from_fn_with_state(auth_state, admin_auth));

    let api = Router::new()
        .route("/health", get(health))
        .route("/properties", get(list_items::<Property>))
        .route("/testimonials", get(list_items::<Testimonial>))
        .route("/blog", get(list_items::<BlogPost>))
        .route("/settings", get(get_settings))
        .route("/messages", post(submit_contact_form))
        .route("/chat", post(post_chat))
        .route("/events", get(stream_changes))
        .nest("/admin", admin)
        .fallback(fallback_not_found);

    Router::new()
        .nest("/api", api)
        .fallback(fallback_not_found)
        .layer(Extension(app_state))
}

async fn admin_auth(State(auth): State<AdminAuthState>, req: Request<Body>, next: Next) -> Response {
    let Some(token) = extract_bearer_token(req.headers()) else {
        return ApiError::unauthorized("missing or invalid authorization token").into_response();
    };
    if auth.credentials.verify(&token) {
        return next.run(req).await;
    }
    ApiError::unauthorized("missing or invalid authorization token").into_response()
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?;
    let raw = raw.to_str().ok()?;
    let raw = raw.strip_prefix("Bearer ")?;
    Some(raw.to_string())
}

#[derive(Clone)]
struct AdminAuthState {
    credentials: Arc<dyn CredentialCheck>,
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": crate::version::VERSION,
    }))
}

/// Builds a record from a request body. `path_id` wins over any body id; a
/// create without an id gets a fresh timestamp id.
fn record_from_body<C: Collection>(mut body: Value, path_id: Option<String>) -> Result<C, ApiError> {
    let Some(fields) = body.as_object_mut() else {
        return Err(ApiError::invalid_request(format!(
            "{} must be a json object",
            C::NAME
        )));
    };
    match path_id {
        Some(id) => {
            fields.insert("id".to_string(), Value::String(id));
        }
        None => {
            let missing = fields
                .get("id")
                .and_then(Value::as_str)
                .is_none_or(|id| id.trim().is_empty());
            if missing {
                fields.insert("id".to_string(), Value::String(new_timestamp_id()));
            }
        }
    }

    let item: C = serde_json::from_value(body)
        .map_err(|e| ApiError::invalid_request(format!("invalid {}: {e}", C::NAME)))?;
    item.validate()?;
    Ok(item)
}

async fn list_items<C: Collection + Send + Sync + 'static>(
    Extension(state): Extension<AppState>,
) -> Result<Json<Items<C>>, ApiError> {
    let mut store = state.store.lock().await;
    Ok(Json(Items {
        items: store.list::<C>()?,
    }))
}

async fn create_item<C: Collection + Send + Sync + 'static>(
    Extension(state): Extension<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<C>, ApiError> {
    let item = record_from_body::<C>(body, None)?;
    let mut store = state.store.lock().await;
    store.add(item.clone())?;
    Ok(Json(item))
}

async fn update_item<C: Collection + Send + Sync + 'static>(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<C>, ApiError> {
    let item = record_from_body::<C>(body, Some(id.clone()))?;
    let mut store = state.store.lock().await;
    if !store.update(item.clone())? {
        return Err(DomainError::NotFound {
            collection: C::NAME,
            id,
        }
        .into());
    }
    Ok(Json(item))
}

async fn delete_item<C: Collection + Send + Sync + 'static>(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.lock().await;
    if !store.delete::<C>(&id)? {
        return Err(DomainError::NotFound {
            collection: C::NAME,
            id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn admin_set_message_status(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MessageStatusRequest>,
) -> Result<Json<ContactMessage>, ApiError> {
    let mut store = state.store.lock().await;
    let message = store
        .set_message_status(&id, req.status)?
        .ok_or_else(|| ApiError::not_found(format!("message not found: {id}")))?;
    Ok(Json(message))
}

async fn get_settings(Extension(state): Extension<AppState>) -> Result<Json<SiteSettings>, ApiError> {
    let mut store = state.store.lock().await;
    Ok(Json(store.settings()?))
}

async fn admin_put_settings(
    Extension(state): Extension<AppState>,
    ApiJson(settings): ApiJson<SiteSettings>,
) -> Result<Json<SiteSettings>, ApiError> {
    let mut store = state.store.lock().await;
    store.update_settings(&settings)?;
    Ok(Json(store.settings()?))
}

async fn submit_contact_form(
    Extension(state): Extension<AppState>,
    ApiJson(req): ApiJson<ContactFormRequest>,
) -> Result<Json<ContactMessage>, ApiError> {
    let message = ContactMessage {
        id: new_timestamp_id(),
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        phone: req.phone,
        subject: req.subject,
        message: req.message,
        date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        status: MessageStatus::New,
    };
    message.validate()?;

    let mut store = state.store.lock().await;
    store.add_message(message.clone())?;
    Ok(Json(message))
}

async fn post_chat(
    Extension(state): Extension<AppState>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::invalid_request("message is required"));
    }

    let (properties, settings) = {
        let mut store = state.store.lock().await;
        (store.properties()?, store.settings()?)
    };

    let reply = chat::reply(
        state.chat.as_deref(),
        &properties,
        &settings,
        &req.history,
        &req.message,
    )
    .await;
    Ok(Json(reply))
}

async fn admin_export(Extension(state): Extension<AppState>) -> Result<Response, ApiError> {
    let now = Utc::now();
    let doc = {
        let mut store = state.store.lock().await;
        store.export_document(now)?
    };
    let body = serde_json::to_string_pretty(&doc).map_err(StoreError::from)?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(now));

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

async fn admin_import(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Json<ImportResponse>, ApiError> {
    let text = std::str::from_utf8(&body)
        .map_err(|e| ApiError::invalid_request(format!("backup is not valid utf-8: {e}")))?;
    let mut store = state.store.lock().await;
    let restored = store.import_data(text)?;
    Ok(Json(ImportResponse { restored }))
}

async fn admin_reset(Extension(state): Extension<AppState>) -> Result<StatusCode, ApiError> {
    let mut store = state.store.lock().await;
    store.reset_to_defaults()?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stream_changes(
    Extension(state): Extension<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.changes.subscribe();

    let out_stream = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            // Lagged still means at least one change happened.
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                let payload = ChangedEvent {
                    at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                };
                Some((Ok(sse_json_event("changed", &payload)), rx))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    });

    Sse::new(out_stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(10))
            .text("keepalive"),
    )
}

fn sse_json_event<T: Serialize>(event: &'static str, payload: &T) -> Event {
    match serde_json::to_string(payload) {
        Ok(data) => Event::default().event(event).data(data),
        Err(err) => Event::default().event("error").data(err.to_string()),
    }
}

async fn fallback_not_found() -> ApiError {
    ApiError::not_found("not found")
}
