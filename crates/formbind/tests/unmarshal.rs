//! End-to-end binding of requests onto derived records.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, Utc};
use formbind::{unmarshal, BindError, Binder, FormBind, RequestContext};
use http::{Method, Uri};
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, FormBind)]
#[serde(default)]
struct Person {
    #[form("id")]
    id: i64,
    #[form("name")]
    name: String,
    #[form("age")]
    age: u32,
}

#[derive(Debug, Default, Serialize, Deserialize, FormBind)]
#[serde(default)]
struct PersonWithExtra {
    id: i64,
    name: String,
    age: u32,
    #[serde(skip)]
    #[form("something,required")]
    something: String,
}

#[derive(Debug, Default, Serialize, Deserialize, FormBind)]
#[serde(default)]
struct Override {
    id: i64,
    #[form("something")]
    something: String,
}

#[derive(Debug, Default, Serialize, Deserialize, FormBind)]
#[serde(default)]
struct Upload {
    #[form("title")]
    title: String,
    #[serde(skip)]
    #[form("picture")]
    picture: Option<DynamicImage>,
    #[serde(skip)]
    #[form("encoded,base64")]
    encoded: Option<DynamicImage>,
    #[form("data")]
    data: Vec<u8>,
    #[form("blob,base64")]
    blob: Vec<u8>,
}

#[derive(Debug, Default, Serialize, Deserialize, FormBind)]
#[serde(default)]
struct Annotated {
    #[form("flags", base = "16")]
    flags: u16,
    #[form("offset", base = "0")]
    offset: i32,
    #[form("ratio")]
    ratio: f32,
    #[form("active")]
    active: Option<bool>,
    #[form("nickname")]
    nickname: Option<String>,
    #[form("when", format = "%Y-%m-%d %H:%M", tz = "America/Chicago")]
    when: Option<DateTime<FixedOffset>>,
    #[form("stamp")]
    stamp: Option<DateTime<Utc>>,
    #[form("-")]
    ignored: String,
    unbound: String,
}

#[derive(Debug, Default, Serialize, Deserialize, FormBind)]
#[serde(default)]
struct Kept {
    #[form("id")]
    id: i64,
    #[form("-")]
    ignored: String,
    unbound: String,
}

#[derive(Debug, Default, Serialize, Deserialize, FormBind)]
struct NoDefault {
    id: i64,
    name: String,
    #[form("something")]
    something: String,
}

fn create_multipart_body(
    boundary: &str,
    parts: &[(&str, &str, Option<&str>, &[u8])],
) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, content_type, filename, data) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());

        if let Some(fname) = filename {
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{fname}\"\r\n")
                    .as_bytes(),
            );
        } else {
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
            );
        }

        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &'static str, parts: &[(&str, &str, Option<&str>, &[u8])]) -> RequestContext {
    let boundary = "formbind-boundary";
    RequestContext::builder()
        .method(Method::POST)
        .uri(Uri::from_static(uri))
        .header(
            "content-type",
            &format!("multipart/form-data; boundary={boundary}"),
        )
        .body(create_multipart_body(boundary, parts))
        .build()
}

fn json_request(uri: &'static str, body: &'static str) -> RequestContext {
    RequestContext::builder()
        .method(Method::POST)
        .uri(Uri::from_static(uri))
        .header("content-type", "application/json")
        .body(body)
        .build()
}

fn gray16_png() -> (DynamicImage, Vec<u8>) {
    let image = ImageBuffer::from_fn(32, 32, |x, y| Luma([((x ^ y) * 2048) as u16]));
    let image = DynamicImage::ImageLuma16(image);
    let mut encoded = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .unwrap();
    (image, encoded)
}

#[tokio::test]
async fn test_urlencoded_body() {
    let ctx = RequestContext::builder()
        .method(Method::POST)
        .uri(Uri::from_static("/page"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("id=1&name=rick&age=39")
        .build();

    let mut person = Person::default();
    unmarshal(&ctx, &mut person).await.unwrap();

    assert_eq!(person.id, 1);
    assert_eq!(person.name, "rick");
    assert_eq!(person.age, 39);
}

#[tokio::test]
async fn test_urlencoded_body_with_query() {
    let ctx = RequestContext::builder()
        .method(Method::POST)
        .uri(Uri::from_static("/page?id=1"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=rick&age=39")
        .build();

    let mut person = Person::default();
    unmarshal(&ctx, &mut person).await.unwrap();

    assert_eq!(person.id, 1);
    assert_eq!(person.name, "rick");
    assert_eq!(person.age, 39);
}

#[tokio::test]
async fn test_multipart_fields() {
    let ctx = multipart_request(
        "/page",
        &[
            ("id", "text/plain", None, b"1"),
            ("name", "text/plain", None, b"rick"),
            ("age", "text/plain", None, b"39"),
        ],
    );

    let mut person = Person::default();
    unmarshal(&ctx, &mut person).await.unwrap();

    assert_eq!(person.id, 1);
    assert_eq!(person.name, "rick");
    assert_eq!(person.age, 39);
}

#[tokio::test]
async fn test_multipart_image() {
    let (image, encoded) = gray16_png();
    let ctx = multipart_request(
        "/upload",
        &[
            ("title", "text/plain", None, b"portrait"),
            ("picture", "image/png", Some("picture.png"), &encoded),
        ],
    );

    let mut upload = Upload::default();
    unmarshal(&ctx, &mut upload).await.unwrap();

    assert_eq!(upload.title, "portrait");
    let picture = upload.picture.unwrap();
    assert_eq!(picture.width(), 32);
    assert_eq!(picture.height(), 32);
    assert_eq!(picture, image);
    assert!(upload.encoded.is_none());
}

#[tokio::test]
async fn test_multipart_base64_image() {
    let (image, encoded) = gray16_png();
    let encoded = STANDARD.encode(encoded);
    let ctx = multipart_request(
        "/upload",
        &[("encoded", "text/plain", Some("picture.b64"), encoded.as_bytes())],
    );

    let mut upload = Upload::default();
    unmarshal(&ctx, &mut upload).await.unwrap();

    assert_eq!(upload.encoded, Some(image));
    assert!(upload.picture.is_none());
}

#[tokio::test]
async fn test_multipart_spooled_image() {
    let (image, encoded) = gray16_png();
    let ctx = multipart_request(
        "/upload",
        &[("picture", "image/png", Some("picture.png"), &encoded)],
    );

    let binder = Binder::new(
        formbind::BinderConfig::new().multipart(formbind::MultipartConfig::new().max_memory(16)),
    );
    let mut upload = Upload::default();
    binder.bind(&ctx, &mut upload).await.unwrap();

    assert_eq!(upload.picture, Some(image));
}

#[tokio::test]
async fn test_bytes_from_form_value() {
    let ctx = RequestContext::builder()
        .uri(Uri::from_static("/upload?data=ABCD"))
        .build();

    let mut upload = Upload::default();
    unmarshal(&ctx, &mut upload).await.unwrap();

    assert_eq!(upload.data, b"ABCD");
}

#[tokio::test]
async fn test_bytes_from_files() {
    let encoded = STANDARD.encode(b"ABCD");
    let ctx = multipart_request(
        "/upload",
        &[
            ("data", "application/octet-stream", Some("data.bin"), b"\x00\x01raw"),
            ("blob", "text/plain", Some("blob.b64"), encoded.as_bytes()),
        ],
    );

    let mut upload = Upload::default();
    unmarshal(&ctx, &mut upload).await.unwrap();

    assert_eq!(upload.data, b"\x00\x01raw");
    assert_eq!(upload.blob, b"ABCD");
}

#[tokio::test]
async fn test_corrupt_image_upload() {
    let ctx = multipart_request(
        "/upload",
        &[("picture", "image/png", Some("picture.png"), b"definitely not a png")],
    );

    let mut upload = Upload::default();
    let err = unmarshal(&ctx, &mut upload).await.unwrap_err();

    assert!(matches!(err, BindError::Image { ref field, .. } if field == "picture"));
}

#[tokio::test]
async fn test_image_from_form_value_is_unsupported() {
    let ctx = RequestContext::builder()
        .uri(Uri::from_static("/upload?picture=abc"))
        .build();

    let mut upload = Upload::default();
    let err = unmarshal(&ctx, &mut upload).await.unwrap_err();

    assert!(matches!(err, BindError::UnsupportedType { ref field, .. } if field == "picture"));
}

#[tokio::test]
async fn test_json_body() {
    let ctx = json_request("/page", r#"{"id":1,"name":"rick","age":39}"#);

    let mut person = Person::default();
    unmarshal(&ctx, &mut person).await.unwrap();

    assert_eq!(person.id, 1);
    assert_eq!(person.name, "rick");
    assert_eq!(person.age, 39);
}

#[tokio::test]
async fn test_json_body_with_query() {
    let ctx = json_request(
        "/page?something=abc",
        r#"{"id":1,"name":"rick","age":39}"#,
    );

    let mut person = PersonWithExtra::default();
    unmarshal(&ctx, &mut person).await.unwrap();

    assert_eq!(person.id, 1);
    assert_eq!(person.name, "rick");
    assert_eq!(person.age, 39);
    assert_eq!(person.something, "abc");
}

#[tokio::test]
async fn test_form_value_overrides_json() {
    let ctx = json_request("/page?something=abc", r#"{"id":1,"something":"json"}"#);

    let mut record = Override::default();
    unmarshal(&ctx, &mut record).await.unwrap();

    assert_eq!(record.id, 1);
    assert_eq!(record.something, "abc");
}

#[tokio::test]
async fn test_json_value_kept_without_form_value() {
    let ctx = json_request("/page", r#"{"id":1,"something":"json"}"#);

    let mut record = Override::default();
    unmarshal(&ctx, &mut record).await.unwrap();

    assert_eq!(record.something, "json");
}

#[tokio::test]
async fn test_json_leaves_skipped_and_unbound_fields() {
    let ctx = json_request("/page", r#"{"id":1}"#);

    let mut record = Kept {
        ignored: "keep".to_string(),
        unbound: "keep".to_string(),
        ..Kept::default()
    };
    unmarshal(&ctx, &mut record).await.unwrap();

    assert_eq!(record.id, 1);
    assert_eq!(record.ignored, "keep");
    assert_eq!(record.unbound, "keep");
}

#[tokio::test]
async fn test_partial_json_body_without_serde_default() {
    let ctx = json_request("/page?something=abc", r#"{"id":1}"#);

    let mut record = NoDefault::default();
    unmarshal(&ctx, &mut record).await.unwrap();

    assert_eq!(record.id, 1);
    assert_eq!(record.name, "");
    assert_eq!(record.something, "abc");
}

#[tokio::test]
async fn test_float_overflow_names_field() {
    let ctx = RequestContext::builder()
        .uri(Uri::from_static("/page?ratio=1e40"))
        .build();

    let mut record = Annotated::default();
    let err = unmarshal(&ctx, &mut record).await.unwrap_err();

    assert!(matches!(err, BindError::Field { ref field, .. } if field == "ratio"));
    assert!(record.ratio.abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_required_field_missing() {
    let ctx = json_request("/page", r#"{"id":1,"name":"rick","age":39}"#);

    let mut person = PersonWithExtra::default();
    let err = unmarshal(&ctx, &mut person).await.unwrap_err();

    assert_eq!(err.to_string(), "missing required field [something]");
    assert_eq!(err.field(), Some("something"));
    assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    // The JSON step ran before the failure.
    assert_eq!(person.id, 1);
}

#[tokio::test]
async fn test_multi_value_rejected() {
    let ctx = RequestContext::builder()
        .uri(Uri::from_static("/page?id=1&name=rick&name=morty&age=39"))
        .build();

    let mut person = Person::default();
    let err = unmarshal(&ctx, &mut person).await.unwrap_err();

    assert!(matches!(
        err,
        BindError::MultiValueUnsupported { ref field, count: 2 } if field == "name"
    ));
    assert_eq!(person.id, 1);
    assert_eq!(person.age, 0);
}

#[tokio::test]
async fn test_query_and_body_values_conflict() {
    let ctx = RequestContext::builder()
        .method(Method::POST)
        .uri(Uri::from_static("/page?id=1"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("id=2")
        .build();

    let mut person = Person::default();
    let err = unmarshal(&ctx, &mut person).await.unwrap_err();

    assert_eq!(err.error_code(), "MULTI_VALUE_UNSUPPORTED");
}

#[tokio::test]
async fn test_annotations() {
    let ctx = RequestContext::builder()
        .uri(Uri::from_static(
            "/page?flags=ff&offset=-0x10&ratio=0.5&active=T&when=2024-01-15+09:30&stamp=2019-10-12T07:20:50.52Z&ignored=x&unbound=y",
        ))
        .build();

    let mut record = Annotated {
        ignored: "keep".to_string(),
        unbound: "keep".to_string(),
        ..Annotated::default()
    };
    unmarshal(&ctx, &mut record).await.unwrap();

    assert_eq!(record.flags, 0xff);
    assert_eq!(record.offset, -16);
    assert!((record.ratio - 0.5).abs() < f32::EPSILON);
    assert_eq!(record.active, Some(true));
    assert_eq!(record.nickname, None);
    assert_eq!(
        record.when.unwrap().to_rfc3339(),
        "2024-01-15T09:30:00-06:00"
    );
    assert_eq!(record.stamp.unwrap().timestamp(), 1_570_864_850);
    assert_eq!(record.ignored, "keep");
    assert_eq!(record.unbound, "keep");
}

#[tokio::test]
async fn test_invalid_integer_names_field() {
    let ctx = RequestContext::builder()
        .uri(Uri::from_static("/page?flags=fffff"))
        .build();

    let mut record = Annotated::default();
    let err = unmarshal(&ctx, &mut record).await.unwrap_err();

    assert!(matches!(err, BindError::Field { ref field, .. } if field == "flags"));
}

#[tokio::test]
async fn test_unparseable_content_type() {
    let ctx = RequestContext::builder()
        .method(Method::POST)
        .uri(Uri::from_static("/page?id=1"))
        .header("content-type", "garbage")
        .build();

    let mut person = Person::default();
    let err = unmarshal(&ctx, &mut person).await.unwrap_err();

    assert!(matches!(err, BindError::MediaType { .. }));
    assert_eq!(person.id, 0);
}

#[test]
fn test_derived_binding_table() {
    let bindings = Annotated::bindings();
    let names: Vec<_> = bindings.iter().map(|b| b.name()).collect();

    assert_eq!(
        names,
        ["flags", "offset", "ratio", "active", "nickname", "when", "stamp", "ignored"]
    );
    assert_eq!(bindings.get("flags").unwrap().options().base.as_deref(), Some("16"));
    assert!(bindings.get("ignored").unwrap().directive().is_skipped());
    assert!(bindings.get("unbound").is_none());
    assert!(std::ptr::eq(bindings, Annotated::bindings()));
}
