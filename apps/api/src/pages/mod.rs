//! Server-side props for the board pages.
//!
//! Every page runs its guard chain before any data is fetched for the
//! response. A denial answers with a redirect or `{"notFound": true}`;
//! otherwise the body is `{"props": {...}}`.

pub mod handlers;

use axum::{
    http::Uri,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::session::guard::{Access, Denial, GuardChain, GuardContext};

#[derive(Debug, Serialize)]
pub struct PageProps<T> {
    pub props: T,
}

pub fn props<T: Serialize>(props: T) -> Response {
    Json(PageProps { props }).into_response()
}

pub fn not_found() -> Response {
    Denial::NotFound.into_response()
}

/// The app path a page request stands for: `/pages/jobs/p1?edit=true`
/// is `/jobs/p1?edit=true`.
pub fn app_path(uri: &Uri) -> String {
    let path = uri.path();
    let path = path.strip_prefix("/pages").unwrap_or(path);
    match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}

/// `Some(response)` when the chain denies the request.
pub async fn run_guards(chain: &GuardChain, ctx: &GuardContext) -> Result<Option<Response>, AppError> {
    Ok(match chain.evaluate(ctx).await? {
        Access::Allowed => None,
        Access::Denied(denial) => Some(denial.into_response()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_path_strips_prefix_and_keeps_query() {
        let uri: Uri = "/pages/jobs/p1?edit=true".parse().unwrap();
        assert_eq!(app_path(&uri), "/jobs/p1?edit=true");

        let uri: Uri = "/pages/applications".parse().unwrap();
        assert_eq!(app_path(&uri), "/applications");
    }
}
