//! HTTP binding.
//!
//! ## Routes
//!
//! ```text
//! /cgi-bin/account.cgi   - register a console (also patcher.cgi)
//! /cgi-bin/send.cgi      - authenticated mail submission
//! /cgi-bin/check.cgi     - stub
//! /cgi-bin/receive.cgi   - stub
//! /cgi-bin/delete.cgi    - stub
//! /patch                 - browser upload of nwc24msg.cfg
//! /*                     - static patcher site
//! ```
//!
//! Console endpoints always answer 200; the console reads only the body.

use crate::error::UploadError;
use crate::form::MailForm;
use crate::patch::PatchReply;
use crate::server::MailServer;
use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Form, Multipart, Query, Request, State},
    http::{header, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::path::{Component, Path};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::debug;

/// Builds the router for all gateway endpoints.
pub fn router(server: Arc<MailServer>) -> Router {
    let debug = server.config().debug;

    Router::new()
        .route("/cgi-bin/account.cgi", any(account))
        .route("/cgi-bin/patcher.cgi", any(account))
        .route("/cgi-bin/check.cgi", any(mail_stub))
        .route("/cgi-bin/receive.cgi", any(mail_stub))
        .route("/cgi-bin/delete.cgi", any(mail_stub))
        .route("/cgi-bin/send.cgi", any(send))
        .route("/patch", any(patch))
        .fallback(site)
        .layer(middleware::from_fn_with_state(debug, log_request))
        .with_state(server)
}

/// Serves the gateway on `listener` until the server stops.
pub async fn serve(server: Arc<MailServer>, listener: TcpListener) -> std::io::Result<()> {
    axum::serve(listener, router(server)).await
}

async fn log_request(State(debug): State<bool>, request: Request, next: Next) -> Response {
    if debug {
        debug!(method = %request.method(), uri = %request.uri(), "request");
        if let Some(query) = request.uri().query() {
            for (name, value) in query.split('&').filter_map(|pair| pair.split_once('=')) {
                debug!("{name} => {value}");
            }
        }
        let host = request
            .headers()
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        debug!(host, "accessing from");
    }

    next.run(request).await
}

async fn account(
    State(server): State<Arc<MailServer>>,
    query: Option<Query<Vec<(String, String)>>>,
    body: Option<Form<Vec<(String, String)>>>,
) -> Response {
    // Body values precede query values; the first value for a name wins.
    let mut form = MailForm::new();
    let body = body.map(|Form(pairs)| pairs).unwrap_or_default();
    let query = query.map(|Query(pairs)| pairs).unwrap_or_default();
    for (name, value) in body.into_iter().chain(query) {
        form.insert_field(name, value);
    }

    let reply = server.handle_account(&form);
    ([(header::CONTENT_TYPE, "text/plain;charset=utf-8")], reply).into_response()
}

async fn send(
    State(server): State<Arc<MailServer>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> String {
    server.handle_send(collect_form(multipart).await)
}

async fn mail_stub() {}

async fn patch(
    State(server): State<Arc<MailServer>>,
    method: Method,
    multipart: Result<Multipart, MultipartRejection>,
) -> PatchReply {
    if method != Method::POST {
        return server.handle_patch_other();
    }

    server.handle_patch_upload(collect_form(multipart).await)
}

async fn site(State(server): State<Arc<MailServer>>, uri: Uri) -> Response {
    let relative = match uri.path() {
        "/" => "index.html",
        path => path.trim_start_matches('/'),
    };

    let safe = !relative.is_empty()
        && Path::new(relative)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return StatusCode::NOT_FOUND.into_response();
    }

    match tokio::fs::read(server.config().site_dir.join(relative)).await {
        Ok(contents) => ([(header::CONTENT_TYPE, content_type_for(relative))], contents).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Reads every part of a multipart body into a [`MailForm`].
///
/// Parts with a file name are kept as files, all others as text.
async fn collect_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<MailForm, UploadError> {
    let mut multipart = multipart.map_err(|e| UploadError::MalformedForm(e.to_string()))?;
    let mut form = MailForm::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::MalformedForm(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();
        let data = field
            .bytes()
            .await
            .map_err(|e| UploadError::Unreadable(format!("{name}: {e}")))?;

        if is_file {
            form.insert_file(name, data.to_vec());
        } else {
            form.insert_field(name, String::from_utf8_lossy(&data).into_owned());
        }
    }

    Ok(form)
}

impl IntoResponse for PatchReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::OK);
        let mut builder = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, self.content_type());
        if let Some(disposition) = self.content_disposition() {
            builder = builder.header(header::CONTENT_DISPOSITION, disposition);
        }

        builder
            .body(Body::from(self.into_body()))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}
