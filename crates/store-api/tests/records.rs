use cg_store_api::{
	auth::{self, AuthToken},
	records, Error, Filter, ListParams, Record, RequestConfig, Sort,
};

use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use axum::{
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
	Json, Router,
};
use serde_json::{json, Value};
use tracing_test::traced_test;

#[derive(Default)]
struct MockStore {
	rows: Mutex<HashMap<String, Vec<Value>>>,
	queries: Mutex<Vec<HashMap<String, String>>>,
	auth_headers: Mutex<Vec<Option<String>>>,
	patches: Mutex<Vec<(String, Value)>>,
}

type Shared = State<Arc<MockStore>>;

fn not_found() -> Response {
	(
		StatusCode::NOT_FOUND,
		Json(json!({ "code": 404, "message": "The requested resource wasn't found.", "data": {} })),
	)
		.into_response()
}

async fn list_records(
	State(store): Shared,
	Path(collection): Path<String>,
	Query(query): Query<HashMap<String, String>>,
	headers: HeaderMap,
) -> Response {
	if collection == "locked" {
		return (
			StatusCode::FORBIDDEN,
			Json(json!({ "code": 403, "message": "Only admins can perform this action.", "data": {} })),
		)
			.into_response();
	}

	store.auth_headers.lock().unwrap().push(
		headers
			.get("authorization")
			.and_then(|v| v.to_str().ok())
			.map(str::to_string),
	);
	store.queries.lock().unwrap().push(query.clone());

	let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
	let per_page: usize = query
		.get("perPage")
		.and_then(|p| p.parse().ok())
		.unwrap_or(30);

	let rows = store.rows.lock().unwrap();
	let items = rows
		.get(&collection)
		.map(|rows| {
			rows.iter()
				.skip((page - 1) * per_page)
				.take(per_page)
				.cloned()
				.collect::<Vec<_>>()
		})
		.unwrap_or_default();

	Json(json!({
		"page": page,
		"perPage": per_page,
		"totalItems": -1,
		"totalPages": -1,
		"items": items,
	}))
	.into_response()
}

async fn get_record(
	State(store): Shared,
	Path((collection, id)): Path<(String, String)>,
) -> Response {
	let rows = store.rows.lock().unwrap();
	rows.get(&collection)
		.and_then(|rows| rows.iter().find(|row| row["id"] == id.as_str()))
		.map(|row| Json(row.clone()).into_response())
		.unwrap_or_else(not_found)
}

async fn update_record(
	State(store): Shared,
	Path((collection, id)): Path<(String, String)>,
	Json(body): Json<Value>,
) -> Response {
	store
		.patches
		.lock()
		.unwrap()
		.push((format!("{collection}/{id}"), body.clone()));

	let mut rows = store.rows.lock().unwrap();
	let Some(row) = rows
		.get_mut(&collection)
		.and_then(|rows| rows.iter_mut().find(|row| row["id"] == id.as_str()))
	else {
		return not_found();
	};

	if let (Some(row), Some(patch)) = (row.as_object_mut(), body.as_object()) {
		for (key, value) in patch {
			row.insert(key.clone(), value.clone());
		}
	}

	Json(row.clone()).into_response()
}

async fn create_record(
	State(store): Shared,
	Path(collection): Path<String>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> Response {
	store.auth_headers.lock().unwrap().push(
		headers
			.get("authorization")
			.and_then(|v| v.to_str().ok())
			.map(str::to_string),
	);

	let mut row = body;
	let mut rows = store.rows.lock().unwrap();
	let rows = rows.entry(collection).or_default();
	if let Some(fields) = row.as_object_mut() {
		fields.insert("id".into(), json!(format!("new{}", rows.len() + 1)));
	}
	rows.push(row.clone());

	Json(row).into_response()
}

async fn delete_record(
	State(store): Shared,
	Path((collection, id)): Path<(String, String)>,
) -> Response {
	let mut rows = store.rows.lock().unwrap();
	let Some(rows) = rows.get_mut(&collection) else {
		return not_found();
	};

	let before = rows.len();
	rows.retain(|row| row["id"] != id.as_str());
	if rows.len() == before {
		return not_found();
	}

	StatusCode::NO_CONTENT.into_response()
}

async fn auth_with_password(Json(body): Json<Value>) -> Response {
	if body["password"] == "correct horse" {
		Json(json!({
			"token": "header.payload.signature",
			"record": { "id": "admin1", "email": body["identity"], "complex_id": "c1" },
		}))
		.into_response()
	} else {
		(
			StatusCode::BAD_REQUEST,
			Json(json!({ "code": 400, "message": "Failed to authenticate.", "data": {} })),
		)
			.into_response()
	}
}

async fn serve(store: Arc<MockStore>) -> RequestConfig {
	let app = Router::new()
		.route(
			"/api/collections/:collection/records",
			get(list_records).post(create_record),
		)
		.route(
			"/api/collections/:collection/records/:id",
			get(get_record).patch(update_record).delete(delete_record),
		)
		.route(
			"/api/collections/:collection/auth-with-password",
			post(auth_with_password),
		)
		.with_state(store);

	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

	RequestConfig {
		client: reqwest::Client::new(),
		api_url: format!("http://{addr}/"),
		auth_token: None,
	}
}

fn apartments(count: usize) -> Vec<Value> {
	(1..=count)
		.map(|n| json!({ "id": format!("apt{n}"), "apartment_number": n.to_string(), "complex_id": "c1" }))
		.collect()
}

#[tokio::test]
#[traced_test]
async fn full_list_follows_pages_and_forwards_params() {
	let store = Arc::new(MockStore::default());
	store
		.rows
		.lock()
		.unwrap()
		.insert("apartment_list".into(), apartments(1203));
	let config = serve(store.clone()).await;

	let params = ListParams::filtered(Filter::eq("complex_id", "c1"))
		.sorted(Some(Sort::asc("apartment_number")));
	let rows: Vec<Record> = records::list(config, "apartment_list", &params)
		.await
		.unwrap();

	assert_eq!(rows.len(), 1203);
	assert_eq!(rows[1202]["id"], "apt1203");

	let queries = store.queries.lock().unwrap();
	assert_eq!(queries.len(), 3);
	for (i, query) in queries.iter().enumerate() {
		assert_eq!(query["page"], (i + 1).to_string());
		assert_eq!(query["perPage"], records::PAGE_SIZE.to_string());
		assert_eq!(query["filter"], r#"complex_id = "c1""#);
		assert_eq!(query["sort"], "+apartment_number");
	}
}

#[tokio::test]
async fn exact_page_multiple_requests_one_extra_page() {
	let store = Arc::new(MockStore::default());
	store
		.rows
		.lock()
		.unwrap()
		.insert("gates".into(), apartments(records::PAGE_SIZE));
	let config = serve(store.clone()).await;

	let rows: Vec<Record> = records::list(config, "gates", &ListParams::default())
		.await
		.unwrap();

	assert_eq!(rows.len(), records::PAGE_SIZE);
	assert_eq!(store.queries.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn get_first_on_empty_result_is_not_found() {
	let store = Arc::new(MockStore::default());
	let config = serve(store.clone()).await;

	let err = records::get_first::<Record>(
		config,
		"gates_user_permissions",
		&Filter::eq("user_id", "u1"),
	)
	.await
	.unwrap_err();

	assert!(err.is_not_found(), "{err:?}");

	let queries = store.queries.lock().unwrap();
	assert_eq!(queries[0]["perPage"], "1");
	assert_eq!(queries[0]["filter"], r#"user_id = "u1""#);
}

#[tokio::test]
async fn get_one_maps_missing_record_to_not_found() {
	let store = Arc::new(MockStore::default());
	let config = serve(store).await;

	let err = records::get_one::<Record>(config, "res_complexes", "nope")
		.await
		.unwrap_err();

	assert!(matches!(err, Error::NotFound { ref collection } if collection == "res_complexes"));
}

#[tokio::test]
async fn forbidden_is_unauthorized_not_not_found() {
	let store = Arc::new(MockStore::default());
	let config = serve(store).await;

	let err = records::list::<Record>(config, "locked", &ListParams::default())
		.await
		.unwrap_err();

	assert!(err.is_unauthorized());
	assert!(!err.is_not_found());
	assert_eq!(
		err.to_string(),
		"request rejected (403): Only admins can perform this action."
	);
}

#[tokio::test]
async fn token_is_sent_in_authorization_header() {
	let store = Arc::new(MockStore::default());
	let mut config = serve(store.clone()).await;
	config.auth_token = Some(AuthToken("tok123".into()));

	let _: Vec<Record> = records::list(config, "gates", &ListParams::default())
		.await
		.unwrap();

	assert_eq!(
		store.auth_headers.lock().unwrap().as_slice(),
		&[Some("tok123".to_string())]
	);
}

#[tokio::test]
async fn update_patches_only_given_fields() {
	let store = Arc::new(MockStore::default());
	store.rows.lock().unwrap().insert(
		"gates_user_permissions".into(),
		vec![json!({ "id": "p1", "user_id": "u1", "gate_ids": ["g1"] })],
	);
	let config = serve(store.clone()).await;

	let mut fields = Record::new();
	fields.insert("gate_ids".into(), json!(["g1", "g2"]));

	let updated: Record = records::update(config, "gates_user_permissions", "p1", &fields)
		.await
		.unwrap();

	assert_eq!(updated["user_id"], "u1");
	assert_eq!(updated["gate_ids"], json!(["g1", "g2"]));
	assert_eq!(
		store.patches.lock().unwrap().as_slice(),
		&[(
			"gates_user_permissions/p1".to_string(),
			json!({ "gate_ids": ["g1", "g2"] })
		)]
	);
}

#[tokio::test]
async fn create_posts_fields_and_returns_the_stored_row() {
	let store = Arc::new(MockStore::default());
	let mut config = serve(store.clone()).await;
	config.auth_token = Some(AuthToken("tok123".into()));

	let mut fields = Record::new();
	fields.insert("user_id".into(), json!("u1"));
	fields.insert("gate_ids".into(), json!(["g1"]));
	fields.insert("complex_id".into(), json!("c1"));

	let created: Record = records::create(config, "gates_user_permissions", &fields)
		.await
		.unwrap();

	assert_eq!(created["id"], "new1");
	assert_eq!(created["gate_ids"], json!(["g1"]));
	assert_eq!(
		store.rows.lock().unwrap()["gates_user_permissions"],
		vec![json!({ "id": "new1", "user_id": "u1", "gate_ids": ["g1"], "complex_id": "c1" })]
	);
	assert_eq!(
		store.auth_headers.lock().unwrap().as_slice(),
		&[Some("tok123".to_string())]
	);
}

#[tokio::test]
async fn delete_removes_the_record_and_reports_missing_ones() {
	let store = Arc::new(MockStore::default());
	store.rows.lock().unwrap().insert(
		"gates_user_permissions".into(),
		vec![
			json!({ "id": "p1", "user_id": "u1", "gate_ids": [] }),
			json!({ "id": "p2", "user_id": "u2", "gate_ids": ["g1"] }),
		],
	);
	let config = serve(store.clone()).await;

	records::delete(config.clone(), "gates_user_permissions", "p1")
		.await
		.unwrap();
	assert_eq!(
		store.rows.lock().unwrap()["gates_user_permissions"],
		vec![json!({ "id": "p2", "user_id": "u2", "gate_ids": ["g1"] })]
	);

	let err = records::delete(config, "gates_user_permissions", "p1")
		.await
		.unwrap_err();
	assert!(matches!(err, Error::NotFound { ref collection } if collection == "gates_user_permissions"));
}

#[tokio::test]
async fn password_auth() {
	let store = Arc::new(MockStore::default());
	let config = serve(store).await;

	let ok = auth::with_password(config.clone(), "users", "admin@example.com", "correct horse")
		.await
		.unwrap();
	assert_eq!(ok.token, AuthToken("header.payload.signature".into()));
	assert_eq!(ok.record["complex_id"], "c1");

	let err = auth::with_password(config, "users", "admin@example.com", "wrong")
		.await
		.unwrap_err();
	assert!(err.is_unauthorized());
}
