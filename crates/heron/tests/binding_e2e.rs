//! End-to-end binding tests.
//!
//! Each test declares routes on an [`ApiRouter`], builds a request the way a
//! host server would after routing, and checks what the handler receives.

use bytes::Bytes;
use heron::core::fixtures::{color_enum, meta_model, order_model, user_model};
use heron::extract::MultipartConfig;
use heron::prelude::*;
use http::{Method, StatusCode, Uri};
use serde_json::{json, Value};

fn echo_router() -> ApiRouter<Value> {
    ApiRouter::new("shop")
}

fn post_json(uri: &'static str, payload: &Value) -> RequestContext {
    RequestContext::builder()
        .method(Method::POST)
        .uri(Uri::from_static(uri))
        .json(payload)
        .build()
}

#[test]
fn test_query_default_without_query_string() {
    let mut router = echo_router();
    let route = router
        .get(
            "/items",
            HandlerSignature::new("list_items").param("page", TypeDesc::Integer, ParamSource::query(1)),
            |args| args.to_json(),
        )
        .unwrap()
        .clone();

    let ctx = RequestContext::builder().uri(Uri::from_static("/items")).build();
    assert_eq!(route.call(&ctx).unwrap(), json!({"page": 1}));
}

#[test]
fn test_single_structured_body_is_whole_payload() {
    let mut router = echo_router();
    let route = router
        .post(
            "/users",
            HandlerSignature::new("create_user").param(
                "user",
                TypeDesc::model(user_model()),
                ParamSource::body_required(),
            ),
            |args| args.get::<Value>("user").unwrap(),
        )
        .unwrap()
        .clone();

    let created = route.call(&post_json("/users", &json!({"name": "a", "age": 3}))).unwrap();
    assert_eq!(created, json!({"name": "a", "age": 3}));

    let err = route.call(&post_json("/users", &json!({"name": "a"}))).unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert!(errors.mentions("age"));
    assert_eq!(route.status_for(&err), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        err.to_body(),
        json!({"detail": [{"loc": ["user", "age"], "msg": "field required", "type": "value_error.missing"}]})
    );
}

#[test]
fn test_two_bodies_do_not_cross_bind() {
    let mut router = echo_router();
    let route = router
        .post(
            "/orders",
            HandlerSignature::new("place_order")
                .param("user", TypeDesc::model(user_model()), ParamSource::body_required().alias("user"))
                .param("meta", TypeDesc::model(meta_model()), ParamSource::body_required().alias("meta")),
            |args| args.to_json(),
        )
        .unwrap()
        .clone();

    let user = json!({"name": "ann", "age": 40});
    let meta = json!({"trace": "t-1", "priority": 2, "tags": ["red"]});

    let in_order = route
        .call(&post_json("/orders", &json!({"user": user, "meta": meta})))
        .unwrap();
    let swapped = route
        .call(&post_json("/orders", &json!({"meta": meta, "user": user})))
        .unwrap();

    assert_eq!(in_order["user"], user);
    assert_eq!(in_order["meta"], meta);
    assert_eq!(in_order, swapped);
}

#[test]
fn test_missing_body_key_only_affects_its_parameter() {
    let mut router = echo_router();
    let route = router
        .post(
            "/orders",
            HandlerSignature::new("place_order")
                .param("user", TypeDesc::model(user_model()), ParamSource::body_required())
                .param("meta", TypeDesc::optional(TypeDesc::model(meta_model())), ParamSource::body(Value::Null)),
            |args| args.to_json(),
        )
        .unwrap()
        .clone();

    let bound = route
        .call(&post_json("/orders", &json!({"user": {"name": "b", "age": 2}})))
        .unwrap();
    assert_eq!(bound, json!({"user": {"name": "b", "age": 2}, "meta": null}));
}

#[test]
fn test_file_reaches_handler_untouched() {
    let mut router: ApiRouter<Option<UploadedFile>> = ApiRouter::new("media");
    let route = router
        .post(
            "/avatars",
            HandlerSignature::new("upload_avatar")
                .param("avatar", TypeDesc::File, ParamSource::file_required())
                .param("caption", TypeDesc::String, ParamSource::form("")),
            |args| args.file("avatar").cloned(),
        )
        .unwrap()
        .clone();

    let upload = UploadedFile::new(
        "avatar",
        Some("me.png".to_string()),
        Some("image/png".to_string()),
        Bytes::from_static(b"\x89PNG\r\n"),
    );
    let ctx = RequestContext::builder()
        .method(Method::POST)
        .uri(Uri::from_static("/avatars"))
        .form_field("caption", "me")
        .file(upload.clone())
        .build();

    assert_eq!(route.call(&ctx).unwrap(), Some(upload));
}

#[tokio::test]
async fn test_multipart_body_binds_fields_and_files() {
    let mut router = echo_router();
    let route = router
        .post(
            "/albums/<int:album_id>/photos",
            HandlerSignature::new("add_photo")
                .param("album_id", TypeDesc::Integer, ParamSource::path(0))
                .param("title", TypeDesc::String, ParamSource::form_required())
                .param("photo", TypeDesc::File, ParamSource::file_required()),
            |args| {
                let photo = args.file("photo").unwrap();
                json!({
                    "title": args.get::<String>("title").unwrap(),
                    "file": photo.file_name(),
                    "size": photo.len(),
                    "album_id": args.value("album_id").cloned(),
                })
            },
        )
        .unwrap()
        .clone();

    let body = concat!(
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"title\"\r\n\r\n",
        "holiday\r\n",
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"photo\"; filename=\"beach.jpg\"\r\n",
        "Content-Type: image/jpeg\r\n\r\n",
        "JPEGDATA\r\n",
        "--XBOUNDARY--\r\n",
    );
    let mut ctx = RequestContext::builder()
        .method(Method::POST)
        .uri(Uri::from_static("/albums/7/photos"))
        .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
        .path_param("album_id", "7")
        .body(body)
        .build();
    ctx.read_form(&MultipartConfig::default()).await.unwrap();

    let bound = route.call(&ctx).unwrap();
    assert_eq!(bound["title"], "holiday");
    assert_eq!(bound["file"], "beach.jpg");
    assert_eq!(bound["size"], 8);
    // form data replaces path values on body-carrying methods
    assert_eq!(bound["album_id"], 0);
}

#[test]
fn test_preserving_sources_keeps_path_values() {
    let mut router: ApiRouter<Value> = ApiRouter::new("albums").binding_options(BindingOptions {
        preserve_sources_on_body_methods: true,
        ..BindingOptions::default()
    });
    let route = router
        .put(
            "/albums/<int:album_id>",
            HandlerSignature::new("rename_album")
                .param("album_id", TypeDesc::Integer, ParamDefault::Missing)
                .param("title", TypeDesc::String, ParamSource::form_encoded_required()),
            |args| args.to_json(),
        )
        .unwrap()
        .clone();

    let ctx = RequestContext::builder()
        .method(Method::PUT)
        .uri(Uri::from_static("/albums/7"))
        .path_param("album_id", "7")
        .form_field("title", "summer")
        .build();
    assert_eq!(route.call(&ctx).unwrap(), json!({"album_id": 7, "title": "summer"}));
}

#[test]
fn test_get_never_parses_payload() {
    let mut router = echo_router();
    let route = router
        .get(
            "/search",
            HandlerSignature::new("search").param("q", TypeDesc::String, ParamSource::query("")),
            |args| args.to_json(),
        )
        .unwrap()
        .clone();

    let ctx = RequestContext::builder()
        .uri(Uri::from_static("/search?q=pen"))
        .header("content-type", "application/json")
        .body("{this is not json")
        .build();
    assert_eq!(route.call(&ctx).unwrap(), json!({"q": "pen"}));
}

#[test]
fn test_enums_normalized_at_top_level_and_nested() {
    let mut router = echo_router();
    let route = router
        .route(
            "/orders",
            &["POST"],
            HandlerSignature::new("create_order")
                .param("order", TypeDesc::model(order_model()), ParamDefault::Missing),
            |args| args.to_json(),
            RouteOptions::new(),
        )
        .unwrap()
        .clone();

    let payload = json!({"item": "pen", "color": "blue", "owner": {"name": "a", "age": 1}});
    let bound = route.call(&post_json("/orders", &payload)).unwrap();
    assert_eq!(
        bound,
        json!({"order": {"item": "pen", "color": "blue", "owner": {"name": "a", "age": 1}, "note": null}})
    );

    let err = route
        .call(&post_json("/orders", &json!({"item": "pen", "color": "mauve", "owner": {"name": "a", "age": 1}})))
        .unwrap_err();
    assert!(err.validation_errors().unwrap().mentions("color"));

    let mut router = echo_router();
    let route = router
        .get(
            "/paint",
            HandlerSignature::new("paint").param(
                "color",
                TypeDesc::enumeration(color_enum()),
                ParamSource::query("red"),
            ),
            |args| args.to_json(),
        )
        .unwrap()
        .clone();
    let ctx = RequestContext::builder().uri(Uri::from_static("/paint?color=green")).build();
    assert_eq!(route.call(&ctx).unwrap(), json!({"color": "green"}));
}

#[test]
fn test_bearer_requirement_checked_before_binding() {
    let mut router = echo_router();
    let route = router
        .route(
            "/me",
            &["GET"],
            HandlerSignature::new("whoami").param("page", TypeDesc::Integer, ParamDefault::Missing),
            |args| args.to_json(),
            RouteOptions::new().security(SecurityRequirement::bearer("bearerAuth")),
        )
        .unwrap()
        .clone();

    // missing credential wins over the missing required query value
    let err = route.call(&RequestContext::builder().uri(Uri::from_static("/me")).build()).unwrap_err();
    assert!(matches!(err, BindError::Unauthorized { .. }));
    assert_eq!(route.status_for(&err), StatusCode::UNAUTHORIZED);

    let ctx = RequestContext::builder()
        .uri(Uri::from_static("/me?page=2"))
        .header("authorization", "Bearer abc")
        .build();
    assert_eq!(route.call(&ctx).unwrap(), json!({"page": 2}));
}

#[test]
fn test_router_security_applies_unless_overridden() {
    let mut router: ApiRouter<Value> =
        ApiRouter::new("admin").security(SecurityRequirement::api_key("adminKey", "X-Admin-Key"));
    let locked = router
        .get("/stats", HandlerSignature::new("stats"), |args| args.to_json())
        .unwrap()
        .clone();
    let bearer = router
        .route(
            "/me",
            &[],
            HandlerSignature::new("me"),
            |args| args.to_json(),
            RouteOptions::new().security(SecurityRequirement::bearer("bearerAuth")),
        )
        .unwrap()
        .clone();

    let plain = RequestContext::builder().build();
    assert!(locked.call(&plain).is_err());
    let keyed = RequestContext::builder().header("x-admin-key", "k").build();
    assert_eq!(locked.call(&keyed).unwrap(), json!({}));
    // the route's own requirement replaces the router's
    assert!(bearer.call(&keyed).is_err());
}

#[test]
fn test_validation_status_override() {
    let mut router: ApiRouter<Value> = ApiRouter::new("legacy").binding_options(BindingOptions {
        validation_status: StatusCode::BAD_REQUEST,
        ..BindingOptions::default()
    });
    let route = router
        .get(
            "/items",
            HandlerSignature::new("list_items").param(
                "page",
                TypeDesc::Integer,
                ParamSource::query(1).ge(1.0),
            ),
            |args| args.to_json(),
        )
        .unwrap()
        .clone();

    let err = route
        .call(&RequestContext::builder().uri(Uri::from_static("/items?page=0")).build())
        .unwrap_err();
    assert_eq!(route.status_for(&err), StatusCode::BAD_REQUEST);
    assert_eq!(
        err.validation_errors().unwrap().errors()[0].msg,
        "ensure this value is greater than or equal to 1"
    );
}

#[test]
fn test_route_dependency_stays_on_its_route() {
    let auth = HandlerSignature::new("auth").param(
        "token",
        TypeDesc::String,
        ParamSource::header_required().alias("X-Token"),
    );

    let mut router = echo_router();
    let guarded = router
        .route(
            "/private",
            &["GET"],
            HandlerSignature::new("private"),
            |args| args.to_json(),
            RouteOptions::new().dependency(auth),
        )
        .unwrap()
        .clone();
    let open = router
        .get("/public", HandlerSignature::new("public"), |args| args.to_json())
        .unwrap()
        .clone();

    assert!(guarded.binding().signature().get("token").is_some());
    assert!(open.binding().signature().get("token").is_none());

    let ctx = RequestContext::builder().header("x-token", "t").build();
    assert_eq!(guarded.call(&ctx).unwrap(), json!({"token": "t"}));
    assert_eq!(open.call(&ctx).unwrap(), json!({}));
}

#[test]
fn test_router_dependency_applies_to_every_route() {
    let tenant = HandlerSignature::new("tenant").param(
        "tenant",
        TypeDesc::String,
        ParamSource::header("public").alias("X-Tenant"),
    );
    let mut router: ApiRouter<Value> = ApiRouter::new("tenants").dependency(tenant);
    router.get("/a", HandlerSignature::new("a"), |args| args.to_json()).unwrap();
    router.get("/b", HandlerSignature::new("b"), |args| args.to_json()).unwrap();

    for route in router.routes() {
        let ctx = RequestContext::builder().header("X-Tenant", "acme").build();
        assert_eq!(route.call(&ctx).unwrap(), json!({"tenant": "acme"}));
    }
}

#[tokio::test]
async fn test_async_handlers_bind_concurrently() {
    use std::future::Future;
    use std::pin::Pin;

    type BoxFuture = Pin<Box<dyn Future<Output = Value> + Send>>;

    let mut router: ApiRouter<BoxFuture> = ApiRouter::new("async");
    let route = router
        .get(
            "/items/<int:id>",
            HandlerSignature::new("get_item").param("id", TypeDesc::Integer, ParamDefault::Missing),
            |args| {
                Box::pin(async move {
                    tokio::task::yield_now().await;
                    args.to_json()
                }) as BoxFuture
            },
        )
        .unwrap()
        .clone();

    let tasks: Vec<_> = (0..16)
        .map(|id| {
            let route = route.clone();
            tokio::spawn(async move {
                let ctx = RequestContext::builder()
                    .path_param("id", id.to_string())
                    .build();
                let future = route.call(&ctx).unwrap();
                (id, future.await)
            })
        })
        .collect();

    for task in tasks {
        let (id, bound) = task.await.unwrap();
        assert_eq!(bound, json!({ "id": id }));
    }
}
