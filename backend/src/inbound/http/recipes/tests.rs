//! Tests for recipe handlers, run against the in-memory adapters.

use super::*;
use crate::inbound::http::attributes::{ingredient_routes, tag_routes};
use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
use crate::inbound::http::users::{login, register};
use crate::test_support::cap_fs;
use crate::test_support::memory_state::MemoryHarness;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .route("/sign-in-as/{id}", web::get().to(sign_in_as))
        .service(
            web::scope("/api/v1")
                .service(register)
                .service(login)
                .service(list_recipes)
                .service(create_recipe)
                .service(get_recipe)
                .service(replace_recipe)
                .service(patch_recipe)
                .service(delete_recipe)
                .service(upload_recipe_image)
                .service(tag_routes())
                .service(ingredient_routes()),
        )
}

async fn sign_in_as(
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, crate::domain::Error> {
    let user_id = crate::domain::UserId::new(path.into_inner()).map_err(|err| {
        crate::domain::Error::invalid_request(err.to_string())
    })?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

#[fixture]
fn harness() -> MemoryHarness {
    MemoryHarness::new().expect("memory harness")
}

async fn sign_up(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> Cookie<'static> {
    let register_req = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({"email": email, "password": "secret", "name": "Cook"}))
        .to_request();
    assert_eq!(
        actix_test::call_service(app, register_req).await.status(),
        StatusCode::CREATED
    );
    let login_req = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({"email": email, "password": "secret"}))
        .to_request();
    let response = actix_test::call_service(app, login_req).await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    cookie: &Cookie<'static>,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let response = actix_test::call_service(app, request.cookie(cookie.clone()).to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

fn soup() -> Value {
    json!({
        "title": "Soup",
        "timeMinutes": 20,
        "price": "4.50",
        "tags": [{"label": "Vegan"}, {"label": "Quick"}],
        "ingredients": [{"name": "Leek"}, {"name": "Potato"}],
    })
}

fn names(collection: &Value, key: &str) -> Vec<String> {
    let mut names: Vec<String> = collection
        .as_array()
        .expect("array")
        .iter()
        .map(|entry| entry[key].as_str().expect("name").to_owned())
        .collect();
    names.sort();
    names
}

#[rstest]
#[actix_web::test]
async fn create_resolves_nested_collections(harness: MemoryHarness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = sign_up(&app, "cook@example.com").await;

    let (status, body) = send(
        &app,
        &cookie,
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .set_json(soup()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Soup");
    assert_eq!(body["timeMinutes"], 20);
    assert_eq!(body["price"], "4.50");
    assert_eq!(body["description"], "");
    assert_eq!(body["image"], Value::Null);
    assert_eq!(names(&body["tags"], "label"), ["Quick", "Vegan"]);
    assert_eq!(names(&body["ingredients"], "name"), ["Leek", "Potato"]);
}

#[rstest]
#[actix_web::test]
async fn existing_tags_are_reused(harness: MemoryHarness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = sign_up(&app, "cook@example.com").await;

    let create = |body: Value| {
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .set_json(body)
    };
    let (_, first) = send(&app, &cookie, create(soup())).await;
    let (_, second) = send(
        &app,
        &cookie,
        create(json!({"title": "Salad", "timeMinutes": 5, "price": 3, "tags": [{"label": "Vegan"}, {"label": "Vegan"}]})),
    )
    .await;

    let vegan_id = |recipe: &Value| {
        recipe["tags"]
            .as_array()
            .expect("tags")
            .iter()
            .find(|tag| tag["label"] == "Vegan")
            .map(|tag| tag["id"].clone())
            .expect("vegan tag")
    };
    assert_eq!(vegan_id(&first), vegan_id(&second));
    assert_eq!(second["tags"].as_array().map(Vec::len), Some(1));

    let (_, tags) = send(&app, &cookie, actix_test::TestRequest::get().uri("/api/v1/tags")).await;
    assert_eq!(names(&tags, "label"), ["Quick", "Vegan"]);
}

#[rstest]
#[actix_web::test]
async fn recipes_are_private_to_their_owner(harness: MemoryHarness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let alice = sign_up(&app, "alice@example.com").await;
    let bob = sign_up(&app, "bob@example.com").await;

    let (_, created) = send(
        &app,
        &alice,
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .set_json(soup()),
    )
    .await;
    let uri = format!("/api/v1/recipes/{}", created["id"]);

    let (status, listed) =
        send(&app, &bob, actix_test::TestRequest::get().uri("/api/v1/recipes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (status, _) = send(&app, &bob, actix_test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, &bob, actix_test::TestRequest::delete().uri(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, bob_tags) = send(&app, &bob, actix_test::TestRequest::get().uri("/api/v1/tags")).await;
    assert_eq!(bob_tags, json!([]));
}

#[rstest]
#[actix_web::test]
async fn list_filters_by_tag_and_ingredient(harness: MemoryHarness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = sign_up(&app, "cook@example.com").await;
    let (_, soup_body) = send(
        &app,
        &cookie,
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .set_json(soup()),
    )
    .await;
    send(
        &app,
        &cookie,
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .set_json(json!({"title": "Toast", "timeMinutes": 3, "price": "1"})),
    )
    .await;

    let vegan = soup_body["tags"]
        .as_array()
        .and_then(|tags| tags.iter().find(|tag| tag["label"] == "Vegan"))
        .map(|tag| tag["id"].clone())
        .expect("vegan tag");

    let (status, all) =
        send(&app, &cookie, actix_test::TestRequest::get().uri("/api/v1/recipes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(2));
    assert_eq!(all[0]["title"], "Toast");
    assert!(all[0].get("description").is_none());

    let (_, filtered) = send(
        &app,
        &cookie,
        actix_test::TestRequest::get().uri(&format!("/api/v1/recipes?tags={vegan}")),
    )
    .await;
    assert_eq!(filtered.as_array().map(Vec::len), Some(1));
    assert_eq!(filtered[0]["title"], "Soup");

    let (status, body) = send(
        &app,
        &cookie,
        actix_test::TestRequest::get().uri("/api/v1/recipes?ingredients=1,x"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "ingredients");
}

#[rstest]
#[actix_web::test]
async fn put_and_patch_update_fields_and_links(harness: MemoryHarness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = sign_up(&app, "cook@example.com").await;
    let (_, created) = send(
        &app,
        &cookie,
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .set_json(soup()),
    )
    .await;
    let uri = format!("/api/v1/recipes/{}", created["id"]);

    let (status, patched) = send(
        &app,
        &cookie,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .set_json(json!({"title": "Leek soup", "tags": [{"label": "Winter"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "Leek soup");
    assert_eq!(patched["timeMinutes"], 20);
    assert_eq!(names(&patched["tags"], "label"), ["Winter"]);
    assert_eq!(names(&patched["ingredients"], "name"), ["Leek", "Potato"]);

    let (status, body) = send(
        &app,
        &cookie,
        actix_test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"title": "Stew"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "required");

    let (status, replaced) = send(
        &app,
        &cookie,
        actix_test::TestRequest::put().uri(&uri).set_json(json!({
            "title": "Stew", "time_minutes": 90, "price": 12.5, "ingredients": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["price"], "12.50");
    assert_eq!(replaced["ingredients"], json!([]));
    assert_eq!(names(&replaced["tags"], "label"), ["Winter"]);
}

#[rstest]
#[actix_web::test]
async fn failed_nested_validation_creates_nothing(harness: MemoryHarness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = sign_up(&app, "cook@example.com").await;

    let (status, body) = send(
        &app,
        &cookie,
        actix_test::TestRequest::post().uri("/api/v1/recipes").set_json(json!({
            "title": "Soup", "timeMinutes": 20, "price": "1",
            "tags": [{"label": "Vegan"}, {"label": ""}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "tags[1].label");

    let (_, recipes) =
        send(&app, &cookie, actix_test::TestRequest::get().uri("/api/v1/recipes")).await;
    assert_eq!(recipes, json!([]));
    let (_, tags) = send(&app, &cookie, actix_test::TestRequest::get().uri("/api/v1/tags")).await;
    assert_eq!(tags, json!([]));
}

#[rstest]
#[actix_web::test]
async fn upload_replaces_the_previous_image(harness: MemoryHarness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = sign_up(&app, "cook@example.com").await;
    let (_, created) = send(
        &app,
        &cookie,
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .set_json(soup()),
    )
    .await;
    let upload_uri = format!(
        "/api/v1/recipes/{}/upload-image?filename=dish.jpg",
        created["id"]
    );
    let upload = || {
        actix_test::TestRequest::post()
            .uri(&upload_uri)
            .insert_header((header::CONTENT_TYPE, "image/jpeg"))
            .set_payload(vec![0xFF, 0xD8, 0xFF])
    };

    let (status, first) = send(&app, &cookie, upload()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], created["id"]);
    let first_path = first["image"].as_str().expect("image path").to_owned();
    assert!(first_path.starts_with("uploads/recipe/"));
    assert!(first_path.ends_with(".jpg"));
    assert_eq!(
        cap_fs::read_file(&harness.media_path(&first_path)).expect("stored image"),
        vec![0xFF, 0xD8, 0xFF]
    );

    let (_, second) = send(&app, &cookie, upload()).await;
    let second_path = second["image"].as_str().expect("image path");
    assert_ne!(second_path, first_path);
    assert!(!cap_fs::path_exists(&harness.media_path(&first_path)));
    assert!(cap_fs::path_exists(&harness.media_path(second_path)));
}

#[rstest]
#[case("text/plain", vec![1, 2, 3], "unsupported_media_type")]
#[case("image/png", Vec::new(), "empty")]
#[case("image/png", vec![0; 16], "too_large")]
#[actix_web::test]
async fn upload_rejects_invalid_bodies(
    #[case] content_type: &str,
    #[case] bytes: Vec<u8>,
    #[case] code: &str,
) {
    let harness = MemoryHarness::new()
        .expect("memory harness")
        .with_max_upload_bytes(8);
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = sign_up(&app, "cook@example.com").await;
    let (_, created) = send(
        &app,
        &cookie,
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .set_json(soup()),
    )
    .await;

    let (status, body) = send(
        &app,
        &cookie,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/recipes/{}/upload-image", created["id"]))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(bytes),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "image");
    assert_eq!(body["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn delete_removes_recipe_but_keeps_tags(harness: MemoryHarness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let cookie = sign_up(&app, "cook@example.com").await;
    let (_, created) = send(
        &app,
        &cookie,
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .set_json(soup()),
    )
    .await;
    let uri = format!("/api/v1/recipes/{}", created["id"]);

    let (status, _) = send(&app, &cookie, actix_test::TestRequest::delete().uri(&uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, &cookie, actix_test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, assigned) = send(
        &app,
        &cookie,
        actix_test::TestRequest::get().uri("/api/v1/tags?assigned_only=1"),
    )
    .await;
    assert_eq!(assigned, json!([]));
    let (_, all) = send(&app, &cookie, actix_test::TestRequest::get().uri("/api/v1/tags")).await;
    assert_eq!(names(&all, "label"), ["Quick", "Vegan"]);
}

#[rstest]
#[actix_web::test]
async fn sessions_for_unknown_accounts_are_unauthorised(harness: MemoryHarness) {
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let ghost = crate::domain::UserId::random();
    let signed_in = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/sign-in-as/{ghost}"))
            .to_request(),
    )
    .await;
    let cookie = session_cookie(&signed_in);

    let (status, body) = send(
        &app,
        &cookie,
        actix_test::TestRequest::post()
            .uri("/api/v1/recipes")
            .set_json(soup()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = send(&app, &cookie, actix_test::TestRequest::get().uri("/api/v1/tags")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
