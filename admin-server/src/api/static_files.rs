//! 静态文件回退
//!
//! 所有未匹配 API 的路径都落到这里，映射为工作目录下的文件：
//! `/` → `index.html`，目录路径自动补 `index.html`，
//! 含 `..` 的路径一律 404 (目录穿越防护)。

use std::path::PathBuf;

use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Redirect, Response};

pub async fn fallback(uri: Uri) -> Response {
    serve(uri.path()).await
}

async fn serve(request_path: &str) -> Response {
    // 目录穿越防护
    if request_path.contains("..") {
        tracing::warn!(path = %request_path, "Rejected path traversal attempt");
        return not_found();
    }

    // /admin → /admin/ (再由目录规则补 index.html)
    if request_path == "/admin" {
        return Redirect::permanent("/admin/").into_response();
    }

    let mut path = request_path.to_string();
    if path == "/" {
        path = "/index.html".into();
    } else if path.ends_with('/') {
        path.push_str("index.html");
    }

    let file_path = PathBuf::from(format!(".{}", path));
    if !file_path.is_file() {
        tracing::warn!(path = %request_path, "Static file not found");
        return not_found();
    }

    match tokio::fs::read(&file_path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&file_path).first_or_octet_stream();
            tracing::info!(path = %request_path, mime = %mime, "Serving static file");
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Err(e) => {
            tracing::error!(path = %request_path, error = %e, "Failed to read static file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>500 - Internal Server Error</h1>"),
            )
                .into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html("<h1>404 - File Not Found</h1>")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let response = serve("/../etc/passwd").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = serve("/assets/../../secret").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admin_redirects_to_trailing_slash() {
        let response = serve("/admin").await;
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok());
        assert_eq!(location, Some("/admin/"));
    }

    #[tokio::test]
    async fn missing_file_is_404_html() {
        let response = serve("/definitely-not-here.html").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
