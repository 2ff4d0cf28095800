//! Web form exposing the YAML-to-JSON direction of the converter.
//!
//! One route. GET renders an empty form; POST validates that the `yaml`
//! field is non-empty, converts it, and re-renders the page with the `json`
//! field filled in or with a field-level error. Every request is independent;
//! there is no session or other state.

use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::convert;

#[derive(Debug, Deserialize)]
pub struct ConvertForm {
    #[serde(default)]
    pub yaml: String,
}

/// Build the single-route application.
pub fn router() -> Router {
    Router::new().route("/", get(show_form).post(handle_convert))
}

async fn show_form() -> Html<String> {
    Html(render_page("", None, None))
}

async fn handle_convert(Form(form): Form<ConvertForm>) -> Html<String> {
    if form.yaml.trim().is_empty() {
        return Html(render_page(&form.yaml, None, Some("This field is required.")));
    }
    match convert::yaml_to_json(&form.yaml) {
        Ok(json) => Html(render_page(&form.yaml, Some(&json), None)),
        Err(e) => Html(render_page(&form.yaml, None, Some(&e.to_string()))),
    }
}

fn render_page(yaml: &str, json: Option<&str>, error: Option<&str>) -> String {
    let error_block = match error {
        Some(message) => format!(
            "<p class=\"error\">{}</p>\n",
            escape_html(message)
        ),
        None => String::new(),
    };
    let json_value = json.map(escape_html).unwrap_or_default();
    format!(
        "<!doctype html>\n\
         <html>\n\
         <head><title>YAML to JSON</title></head>\n\
         <body>\n\
         <h1>Convert YAML to JSON</h1>\n\
         <form method=\"post\">\n\
         <label for=\"yaml\">yaml</label>\n\
         <textarea id=\"yaml\" name=\"yaml\" rows=\"20\" cols=\"60\">{yaml}</textarea>\n\
         {error_block}\
         <label for=\"json\">json</label>\n\
         <textarea id=\"json\" name=\"json\" rows=\"20\" cols=\"60\" disabled>{json_value}</textarea>\n\
         <button type=\"submit\">Convert</button>\n\
         </form>\n\
         </body>\n\
         </html>\n",
        yaml = escape_html(yaml),
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::util::ServiceExt;

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn post_form(body: &'static str) -> axum::response::Response {
        router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(
                        header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn get_renders_an_empty_form() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("name=\"yaml\""));
        assert!(!body.contains("class=\"error\""));
    }

    #[tokio::test]
    async fn empty_yaml_field_is_a_validation_error() {
        let response = post_form("yaml=").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("This field is required."));
        assert!(!body.contains("&quot;a&quot;"));
    }

    #[tokio::test]
    async fn valid_yaml_comes_back_as_ordered_json() {
        let response = post_form("yaml=a%3A+1%0Ab%3A+2%0A").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        let a = body.find("&quot;a&quot;: 1").expect("json holds key a");
        let b = body.find("&quot;b&quot;: 2").expect("json holds key b");
        assert!(a < b);
    }

    #[tokio::test]
    async fn malformed_yaml_surfaces_the_parse_error() {
        let response = post_form("yaml=a%3A+%5Bunclosed").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("parse error"));
    }
}
