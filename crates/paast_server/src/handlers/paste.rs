//! Paste creation and retrieval handlers.

use crate::{error::HttpError, AppState};
use axum::{
    body::Bytes,
    extract::{
        rejection::PathRejection, ConnectInfo, FromRequest, Multipart, Path, Request, State,
    },
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use paast_core::{client_key, ip_key, AppError};
use std::net::{IpAddr, SocketAddr};

const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";
const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";

/// Create a paste from the request body.
///
/// The payload is the raw body, or the first part of a `multipart/form-data`
/// body (`curl -F '=<-'`). The client's cooldown is checked after the body is
/// read and before anything is stored. With `trust_proxy_headers` set, the
/// client address, host, and scheme come from the proxy's forwarding headers.
///
/// # Returns
/// `<scheme>://<host>/<identifier>\n` as plain text.
///
/// # Errors
/// 400 for an empty paste, 413 over the size limit, 429 during the cooldown,
/// 500 on storage failure.
pub async fn create_paste(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
) -> Result<Response, HttpError> {
    let headers = request.headers().clone();
    let trust_proxy = state.config.trust_proxy_headers;
    let payload = read_payload(request, &state).await?;

    let client = match forwarded_client_ip(&headers, trust_proxy) {
        Some(ip) => ip_key(ip),
        None => client_key(&peer),
    };
    state.throttle.allow(&client)?.into_result()?;
    let identifier = state.store.allocate(&payload)?;

    let url = format!(
        "{}://{}/{}\n",
        request_scheme(&headers, trust_proxy),
        request_host(&headers, trust_proxy),
        identifier
    );
    Ok((StatusCode::OK, url).into_response())
}

/// Return the raw bytes of a paste.
///
/// # Errors
/// 404 when the identifier is malformed, foreign, or unknown; 500 on read
/// failure.
pub async fn get_paste(
    State(state): State<AppState>,
    uri: Uri,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, HttpError> {
    let id = match path {
        Ok(Path(id)) => id,
        Err(_) => {
            let raw = uri.path().trim_start_matches('/').to_string();
            return Err(AppError::NotFound(raw).into());
        }
    };
    if !state.store.codec().is_identifier_shaped(&id) {
        return Err(AppError::NotFound(id).into());
    }
    let content = state.store.resolve(&id)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        content,
    )
        .into_response())
}

async fn read_payload(request: Request, state: &AppState) -> Result<Bytes, HttpError> {
    let limit = state.config.max_paste_size;
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(MULTIPART_FORM_DATA));

    if !is_multipart {
        return Bytes::from_request(request, state)
            .await
            .map_err(|rejection| body_error(rejection.status(), rejection.body_text(), limit));
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|rejection| body_error(rejection.status(), rejection.body_text(), limit))?;
    let field = multipart
        .next_field()
        .await
        .map_err(|err| body_error(err.status(), err.body_text(), limit))?
        .ok_or_else(|| AppError::BadRequest("no parts in multipart body".to_string()))?;
    field
        .bytes()
        .await
        .map_err(|err| body_error(err.status(), err.body_text(), limit))
}

fn body_error(status: StatusCode, detail: String, limit: usize) -> HttpError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PasteTooLarge { limit }.into()
    } else {
        AppError::BadRequest(detail).into()
    }
}

fn request_scheme(headers: &HeaderMap, trust_proxy_headers: bool) -> &'static str {
    if !trust_proxy_headers {
        return "http";
    }
    let forwarded = headers
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_ascii_lowercase());
    match forwarded.as_deref() {
        Some("https") => "https",
        _ => "http",
    }
}

pub(crate) fn request_host(headers: &HeaderMap, trust_proxy_headers: bool) -> &str {
    let forwarded = if trust_proxy_headers {
        first_header_entry(headers, FORWARDED_HOST)
    } else {
        None
    };
    forwarded
        .or_else(|| first_header_entry(headers, header::HOST.as_str()))
        .unwrap_or("localhost")
}

/// Client address reported by a trusted proxy: the first `X-Forwarded-For`
/// entry, else `X-Real-IP`.
fn forwarded_client_ip(headers: &HeaderMap, trust_proxy_headers: bool) -> Option<IpAddr> {
    if !trust_proxy_headers {
        return None;
    }
    [FORWARDED_FOR, REAL_IP]
        .into_iter()
        .find_map(|name| first_header_entry(headers, name).and_then(parse_forwarded_ip))
}

fn parse_forwarded_ip(value: &str) -> Option<IpAddr> {
    value
        .parse::<IpAddr>()
        .ok()
        .or_else(|| value.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}

fn first_header_entry<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
