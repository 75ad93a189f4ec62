//! Wire-shape tests for the users handlers over an in-memory repository.

use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, NewUser, PhoneNumber, UserName, UserPage, UserPatch, UsersService};
use crate::inbound::http::error::{json_config, path_config, query_config};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// In-memory repository honouring the port contract closely enough for
/// handler tests: sequential ids, duplicate-email detection, and an
/// `updated_at` that advances on every real mutation.
#[derive(Default)]
struct InMemoryRepository {
    rows: Mutex<Vec<User>>,
}

impl InMemoryRepository {
    fn seeded(users: Vec<NewUser>) -> Arc<Self> {
        let repository = Arc::new(Self::default());
        {
            let mut rows = repository.rows.lock().expect("rows lock");
            for (index, new_user) in users.into_iter().enumerate() {
                let id = i32::try_from(index).expect("small seed") + 1;
                let at = base_time();
                rows.push(User::new(
                    UserId::new(id),
                    new_user.name,
                    new_user.email,
                    new_user.phone,
                    at,
                    at,
                ));
            }
        }
        repository
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert(&self, new_user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        if rows.iter().any(|row| row.email() == &new_user.email) {
            return Err(UserRepositoryError::duplicate_email("users_email_key"));
        }
        let id = rows.iter().map(|row| row.id().as_i32()).max().unwrap_or(0) + 1;
        let at = base_time() + Duration::seconds(i64::from(id));
        let user = User::new(
            UserId::new(id),
            new_user.name.clone(),
            new_user.email.clone(),
            new_user.phone.clone(),
            at,
            at,
        );
        rows.push(user.clone());
        Ok(user)
    }

    async fn list(&self, page: PageRequest) -> Result<UserPage, UserRepositoryError> {
        let rows = self.rows.lock().expect("rows lock");
        let mut users: Vec<User> = rows.clone();
        users.sort_by_key(|user| std::cmp::Reverse(user.id()));
        let offset = usize::try_from(page.offset()).expect("clamped offset");
        let limit = usize::try_from(page.limit()).expect("clamped limit");
        let users = users.into_iter().skip(offset).take(limit).collect();
        Ok(UserPage {
            users,
            total: i64::try_from(rows.len()).expect("small table"),
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let rows = self.rows.lock().expect("rows lock");
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<User>, UserRepositoryError> {
        let needle = query.to_lowercase();
        let rows = self.rows.lock().expect("rows lock");
        let mut matches: Vec<User> = rows
            .iter()
            .filter(|row| {
                row.name().as_ref().to_lowercase().contains(&needle)
                    || row.email().as_ref().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|user| std::cmp::Reverse(user.id()));
        matches.truncate(usize::try_from(limit).expect("small cap"));
        Ok(matches)
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        if let Some(email) = &patch.email
            && rows.iter().any(|row| row.email() == email && row.id() != id)
        {
            return Err(UserRepositoryError::duplicate_email("users_email_key"));
        }
        let Some(position) = rows.iter().position(|row| row.id() == id) else {
            return Ok(None);
        };
        let current = rows[position].clone();
        let updated = User::new(
            current.id(),
            patch.name.clone().unwrap_or_else(|| current.name().clone()),
            patch
                .email
                .clone()
                .unwrap_or_else(|| current.email().clone()),
            patch.phone.clone().or_else(|| current.phone().cloned()),
            current.created_at(),
            current.updated_at() + Duration::seconds(1),
        );
        rows[position] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        Ok(rows.len() < before)
    }

    async fn ping(&self) -> Result<(), UserRepositoryError> {
        Ok(())
    }
}

fn new_user(name: &str, email: &str, phone: Option<&str>) -> NewUser {
    NewUser {
        name: UserName::new(name).expect("valid name"),
        email: EmailAddress::new(email).expect("valid email"),
        phone: phone.map(|raw| PhoneNumber::new(raw).expect("valid phone")),
    }
}

fn test_app(
    repository: Arc<InMemoryRepository>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(UsersService::new(repository));
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(
            web::scope("/api")
                .service(
                    web::resource("/users")
                        .route(web::post().to(create_user))
                        .route(web::get().to(list_users)),
                )
                .service(web::resource("/users/search").route(web::get().to(search_users)))
                .service(
                    web::resource("/users/{id}")
                        .route(web::get().to(get_user))
                        .route(web::put().to(update_user))
                        .route(web::delete().to(delete_user)),
                ),
        )
}

#[actix_web::test]
async fn create_returns_the_envelope_with_the_stored_record() {
    let app = actix_test::init_service(test_app(InMemoryRepository::seeded(vec![]))).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "555-0100",
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["message"], "User created successfully");
    assert_eq!(value["data"]["id"], 1);
    assert_eq!(value["data"]["name"], "Ada Lovelace");
    assert_eq!(value["data"]["email"], "ada@example.com");
    assert_eq!(value["data"]["phone"], "555-0100");
    assert_eq!(value["data"]["created_at"], value["data"]["updated_at"]);
}

#[actix_web::test]
async fn create_rejects_missing_fields_with_required_details() {
    let app = actix_test::init_service(test_app(InMemoryRepository::seeded(vec![]))).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "phone": "555-0100" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["error"], "Validation failed");
    let fields: Vec<&str> = value["details"]
        .as_array()
        .expect("details array")
        .iter()
        .map(|entry| entry["field"].as_str().expect("field"))
        .collect();
    assert_eq!(fields, vec!["name", "email"]);
}

#[actix_web::test]
async fn create_conflicts_on_duplicate_email() {
    let repository =
        InMemoryRepository::seeded(vec![new_user("Ada", "ada@example.com", None)]);
    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "name": "Other", "email": "ada@example.com" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["error"], "User with this email already exists");
    assert_eq!(value["code"], "duplicate_key");
}

#[actix_web::test]
async fn list_echoes_the_clamped_limit_and_orders_descending() {
    let repository = InMemoryRepository::seeded(vec![
        new_user("Ada", "ada@example.com", None),
        new_user("Grace", "grace@example.com", None),
        new_user("Edsger", "edsger@example.com", None),
    ]);
    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/users?limit=1000&offset=0")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["limit"], 100);
    assert_eq!(value["offset"], 0);
    assert_eq!(value["total"], 3);
    let ids: Vec<i64> = value["users"]
        .as_array()
        .expect("users array")
        .iter()
        .map(|user| user["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[actix_web::test]
async fn list_rejects_unparseable_pagination() {
    let app = actix_test::init_service(test_app(InMemoryRepository::seeded(vec![]))).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/users?limit=abc")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["code"], "invalid_request");
}

#[actix_web::test]
async fn search_returns_results_and_count() {
    let repository = InMemoryRepository::seeded(vec![
        new_user("Ada Lovelace", "ada@example.com", None),
        new_user("Grace Hopper", "grace@navy.mil", None),
    ]);
    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/users/search?q=navy")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["count"], 1);
    assert_eq!(value["results"][0]["email"], "grace@navy.mil");
}

#[actix_web::test]
async fn search_without_query_is_a_validation_failure() {
    let app = actix_test::init_service(test_app(InMemoryRepository::seeded(vec![]))).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/users/search")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["error"], r#"Search query parameter "q" is required"#);
}

#[actix_web::test]
async fn get_returns_the_bare_record() {
    let repository =
        InMemoryRepository::seeded(vec![new_user("Ada", "ada@example.com", Some("555-0100"))]);
    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::get().uri("/api/users/1").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["id"], 1);
    assert_eq!(value["name"], "Ada");
    assert!(value.get("message").is_none());
}

#[actix_web::test]
async fn get_unknown_id_is_not_found() {
    let app = actix_test::init_service(test_app(InMemoryRepository::seeded(vec![]))).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/users/999999")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["error"], "User not found");
}

#[actix_web::test]
async fn update_of_one_field_preserves_the_others() {
    let repository =
        InMemoryRepository::seeded(vec![new_user("Ada", "ada@example.com", Some("555-0100"))]);
    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::put()
        .uri("/api/users/1")
        .set_json(json!({ "phone": "555-0199" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["message"], "User updated successfully");
    assert_eq!(value["data"]["name"], "Ada");
    assert_eq!(value["data"]["email"], "ada@example.com");
    assert_eq!(value["data"]["phone"], "555-0199");
    assert_ne!(value["data"]["updated_at"], value["data"]["created_at"]);
}

#[actix_web::test]
async fn empty_update_returns_the_record_unchanged() {
    let repository =
        InMemoryRepository::seeded(vec![new_user("Ada", "ada@example.com", None)]);
    let app = actix_test::init_service(test_app(repository)).await;
    let request = actix_test::TestRequest::put()
        .uri("/api/users/1")
        .set_json(json!({}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["data"]["updated_at"], value["data"]["created_at"]);
}

#[actix_web::test]
async fn delete_twice_reports_not_found_the_second_time() {
    let repository =
        InMemoryRepository::seeded(vec![new_user("Ada", "ada@example.com", None)]);
    let app = actix_test::init_service(test_app(repository)).await;

    let first = actix_test::TestRequest::delete().uri("/api/users/1").to_request();
    let response = actix_test::call_service(&app, first).await;
    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["message"], "User deleted successfully");

    let second = actix_test::TestRequest::delete().uri("/api/users/1").to_request();
    let response = actix_test::call_service(&app, second).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn repeated_get_returns_identical_bytes() {
    let repository =
        InMemoryRepository::seeded(vec![new_user("Ada", "ada@example.com", None)]);
    let app = actix_test::init_service(test_app(repository)).await;

    let first = actix_test::TestRequest::get().uri("/api/users/1").to_request();
    let first_body = actix_test::read_body(actix_test::call_service(&app, first).await).await;
    let second = actix_test::TestRequest::get().uri("/api/users/1").to_request();
    let second_body = actix_test::read_body(actix_test::call_service(&app, second).await).await;
    assert_eq!(first_body, second_body);
}
