use dashboard_lib::adapters::{HttpCourseResource, HttpStudentResource};
use reqwest::Url;
use serde_json::json;
use student_records_core::ports::{CourseResource, PortError, StudentResource};
use student_records_core::{Student, StudentId};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn collection(server: &MockServer, name: &str) -> Url {
    Url::parse(&format!("{}/{}", server.uri(), name)).unwrap()
}

fn students_at(server: &MockServer) -> HttpStudentResource {
    HttpStudentResource::new(reqwest::Client::new(), collection(server, "students"))
}

fn alice() -> Student {
    serde_json::from_value(json!({
        "id": "1",
        "name": "Alice Johnson",
        "email": "alice@gmail.com",
        "course": "React In Depth",
        "profileImage": "",
        "createdAt": "2024-01-15T10:00:00Z"
    }))
    .unwrap()
}

#[tokio::test]
async fn list_accepts_numeric_ids_and_missing_timestamps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Alice", "email": "alice@x.com", "course": "A" },
            { "id": "2", "name": "Bob", "email": "bob@x.com", "course": "B",
              "createdAt": "2024-02-01T00:00:00Z" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let students = students_at(&server).list_students().await.unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0].id, StudentId::new("1"));
    assert!(students[0].created_at.is_none());
    assert_eq!(students[0].profile_image, "");
    assert!(students[1].created_at.is_some());
}

#[tokio::test]
async fn create_posts_without_id_and_adopts_remote_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/students"))
        .and(body_json(json!({
            "name": "Alice Johnson",
            "email": "alice@gmail.com",
            "course": "React In Depth",
            "profileImage": "",
            "createdAt": "2024-01-15T10:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "42" })))
        .expect(1)
        .mount(&server)
        .await;

    let created = students_at(&server).create_student(&alice()).await.unwrap();
    assert_eq!(created.id, StudentId::new("42"));
    assert_eq!(created.name, "Alice Johnson");
}

#[tokio::test]
async fn create_adopts_fields_stamped_by_the_remote() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/students"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 7,
            "name": "Alice Johnson",
            "email": "alice@gmail.com",
            "course": "React In Depth",
            "profileImage": "https://cdn.example.com/alice.png",
            "createdAt": "2024-01-15T10:00:05Z"
        })))
        .mount(&server)
        .await;

    let created = students_at(&server).create_student(&alice()).await.unwrap();
    assert_eq!(created.id, StudentId::new("7"));
    assert_eq!(created.profile_image, "https://cdn.example.com/alice.png");
    assert_eq!(
        created.created_at.unwrap().to_rfc3339(),
        "2024-01-15T10:00:05+00:00"
    );
}

#[tokio::test]
async fn create_keeps_local_id_when_remote_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/students"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .mount(&server)
        .await;

    let created = students_at(&server).create_student(&alice()).await.unwrap();
    assert_eq!(created, alice());
}

#[tokio::test]
async fn replace_and_delete_target_the_item_url() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/students/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/students/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let resource = students_at(&server);
    resource.replace_student(&alice()).await.unwrap();
    resource.delete_student(&StudentId::new("1")).await.unwrap();
}

#[tokio::test]
async fn status_codes_map_to_port_errors() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/students/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/students"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let resource = students_at(&server);
    let err = resource
        .delete_student(&StudentId::new("404"))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));

    let err = resource.list_students().await.unwrap_err();
    let PortError::Unexpected(message) = err else {
        panic!("expected an unexpected error, got {err:?}");
    };
    assert!(message.contains("500"));
    assert!(message.contains("boom"));
}

#[tokio::test]
async fn malformed_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let courses = HttpCourseResource::new(reqwest::Client::new(), collection(&server, "courses"));
    assert!(matches!(
        courses.list_courses().await.unwrap_err(),
        PortError::Unexpected(_)
    ));
}

#[tokio::test]
async fn courses_are_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "React In Depth", "description": "Hooks and more", "duration": "6 weeks" },
            { "id": 2, "name": "JavaScript Pro" }
        ])))
        .mount(&server)
        .await;

    let courses = HttpCourseResource::new(reqwest::Client::new(), collection(&server, "courses"))
        .list_courses()
        .await
        .unwrap();
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0].duration, "6 weeks");
    assert_eq!(courses[1].description, "");
}

#[tokio::test]
async fn unreachable_remote_is_an_error() {
    // Nothing listens on port 9 of localhost.
    let resource = HttpStudentResource::new(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:9/students").unwrap(),
    );
    assert!(matches!(
        resource.list_students().await.unwrap_err(),
        PortError::Unexpected(_)
    ));
}
