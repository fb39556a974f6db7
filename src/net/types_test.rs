use super::*;
use serde_json::json;

#[test]
fn api_error_body_reads_error_and_message() {
    let body = ApiErrorBody::from_value(&json!({ "error": "INVALID_TOKEN", "message": "Token expired" }));
    assert_eq!(body.error.as_deref(), Some("INVALID_TOKEN"));
    assert_eq!(body.message.as_deref(), Some("Token expired"));
}

#[test]
fn api_error_body_ignores_non_string_fields() {
    let body = ApiErrorBody::from_value(&json!({ "error": 401, "message": ["x"] }));
    assert_eq!(body, ApiErrorBody::default());
}

#[test]
fn api_error_body_from_non_object_is_empty() {
    assert_eq!(ApiErrorBody::from_value(&json!("Unauthorized")), ApiErrorBody::default());
    assert_eq!(ApiErrorBody::from_value(&Value::Null), ApiErrorBody::default());
}

#[test]
fn multipart_builder_keeps_part_order() {
    let form = MultipartForm::new()
        .text("title", "Spring launch")
        .file("image", "hero.png", Some("image/png".to_owned()), vec![1, 2, 3]);

    assert_eq!(form.parts.len(), 2);
    assert_eq!(form.parts[0].name, "title");
    assert!(matches!(&form.parts[1].body, PartBody::File { file_name, .. } if file_name == "hero.png"));
}

#[test]
fn request_options_builder_accumulates() {
    let options = RequestOptions::default()
        .header("X-Trace", "1")
        .query("page", "2")
        .timeout(Duration::from_secs(3));

    assert_eq!(options.headers, vec![("X-Trace".to_owned(), "1".to_owned())]);
    assert_eq!(options.query, vec![("page".to_owned(), "2".to_owned())]);
    assert_eq!(options.timeout, Some(Duration::from_secs(3)));
}
