use super::build;
use diesel::connection::SimpleConnection;
use panther_db::test_utils::TempDb;
use rocket::{
    figment::Figment,
    http::{ContentType, Status},
    local::blocking::{Client, LocalResponse},
};
use serde_json::{json, Value};

fn client(db: &TempDb) -> Client {
    let figment = Figment::from(rocket::Config::debug_default())
        .merge(("databases.panther.url", db.path().to_string_lossy().to_string()))
        .merge(("log_level", "off"));
    Client::tracked(build(figment)).unwrap()
}

fn body(resp: LocalResponse) -> Value {
    resp.into_json::<Value>().unwrap()
}

fn post(client: &Client, uri: &str, payload: Value) -> (Status, Value) {
    let resp = client
        .post(uri.to_string())
        .header(ContentType::JSON)
        .body(payload.to_string())
        .dispatch();
    (resp.status(), body(resp))
}

fn get(client: &Client, uri: &str) -> (Status, Value) {
    let resp = client.get(uri.to_string()).dispatch();
    (resp.status(), body(resp))
}

fn register(client: &Client, name: &str, email: &str) -> String {
    let (status, resp) = post(
        client,
        "/students/register",
        json!({
            "name": name,
            "email": email,
            "phone": "412-555-0100",
            "password": "strongpasswd",
            "paymentMethod": "venmo"
        }),
    );
    assert_eq!(status, Status::Ok);
    resp["data"].as_str().unwrap().to_string()
}

fn create_listing(client: &Client, seller: &str, title: &str, price: Value) -> String {
    let (status, resp) = post(
        client,
        "/listings",
        json!({
            "studentId": seller,
            "title": title,
            "description": "barely used",
            "price": price,
            "address": "Cathedral of Learning",
            "category": "books",
            "images": ["a.png"]
        }),
    );
    assert_eq!(status, Status::Ok, "{}", resp);
    resp["data"].as_str().unwrap().to_string()
}

#[test]
fn register_and_login() {
    let db = TempDb::new();
    let client = client(&db);
    let id = register(&client, "Alice", "alice@pitt.edu");

    let (status, resp) = post(
        &client,
        "/students/register",
        json!({"name": "Alice", "email": "ALICE@pitt.edu", "phone": "1", "password": "x"}),
    );
    assert_eq!(status, Status::Conflict);
    assert_eq!(resp["success"], false);

    let (status, _) = post(
        &client,
        "/students/register",
        json!({"name": "Bob", "email": "bob@gmail.com", "phone": "1", "password": "x"}),
    );
    assert_eq!(status, Status::BadRequest);

    let (status, _) = post(
        &client,
        "/students/login",
        json!({"email": "alice@pitt.edu", "password": "wrong"}),
    );
    assert_eq!(status, Status::BadRequest);

    let (status, resp) = post(
        &client,
        "/students/login",
        json!({"email": "alice@pitt.edu", "password": "strongpasswd"}),
    );
    assert_eq!(status, Status::Ok);
    assert_eq!(resp["data"]["id"], id.as_str());
    assert_eq!(resp["data"]["roles"]["seller"], true);

    // The session cookie identifies the student
    let (status, resp) = get(&client, "/students/me/listings");
    assert_eq!(status, Status::Ok);
    assert_eq!(resp["data"]["selling"].as_array().unwrap().len(), 0);

    get(&client, "/students/logout");
    let (status, resp) = get(&client, "/students/me/listings");
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(resp["success"], false);
}

#[test]
fn malformed_body() {
    let db = TempDb::new();
    let client = client(&db);
    let (status, resp) = post(&client, "/students/register", json!({"name": "Alice"}));
    assert_eq!(status, Status::BadRequest);
    assert_eq!(resp["success"], false);

    let (status, resp) = get(&client, "/nowhere");
    assert_eq!(status, Status::NotFound);
    assert_eq!(resp["success"], false);
}

#[test]
fn listings_and_search() {
    let db = TempDb::new();
    let client = client(&db);
    let seller = register(&client, "Alice", "alice@pitt.edu");
    let buyer = register(&client, "Bob", "bob@pitt.edu");

    let textbook = create_listing(&client, &seller, "Calculus Textbook", json!("25.50"));
    create_listing(&client, &seller, "Desk Lamp", json!(10));

    let (status, _) = post(
        &client,
        "/listings",
        json!({
            "studentId": seller,
            "title": "Chair",
            "description": "sturdy",
            "price": "cheap",
            "address": "Hillman"
        }),
    );
    assert_eq!(status, Status::BadRequest);

    let (status, resp) = get(&client, "/search/keyword/calc");
    assert_eq!(status, Status::Ok);
    assert_eq!(resp["data"]["count"], 1);
    assert_eq!(resp["data"]["listings"][0]["title"], "Calculus Textbook");
    assert_eq!(resp["data"]["listings"][0]["price"], 25.5);

    let (_, resp) = get(&client, "/search/category/books");
    assert_eq!(resp["data"]["count"], 2);

    let (_, resp) = get(&client, "/listings/sort/asc");
    assert_eq!(resp["data"][0]["title"], "Desk Lamp");
    let (_, resp) = get(&client, "/listings/sort/desc");
    assert_eq!(resp["data"][0]["title"], "Calculus Textbook");

    let (status, _) = post(
        &client,
        "/listings/tag",
        json!({"studentId": buyer, "listingId": textbook, "tags": ["math"]}),
    );
    assert_eq!(status, Status::Forbidden);
    let (status, _) = post(
        &client,
        "/listings/tag",
        json!({"studentId": seller, "listingId": textbook, "tags": ["math", " math ", "used"]}),
    );
    assert_eq!(status, Status::Ok);

    let (status, resp) = post(
        &client,
        "/listings/save",
        json!({"studentId": buyer, "listingId": textbook}),
    );
    assert_eq!(status, Status::Ok);
    assert_eq!(resp["data"], true);

    let (_, resp) = get(&client, &format!("/listings/{}?viewer={}", textbook, buyer));
    assert_eq!(resp["data"]["tags"], json!(["math", "used"]));
    assert_eq!(resp["data"]["seller"]["name"], "Alice");
    assert_eq!(resp["data"]["isSaved"], true);
    assert_eq!(resp["data"]["isSeller"], false);
    assert_eq!(resp["data"]["status"], "active");
    assert_eq!(resp["data"]["images"], json!(["a.png"]));

    let (_, resp) = get(&client, &format!("/listings/saved/{}", buyer));
    assert_eq!(resp["data"].as_array().unwrap().len(), 1);

    let (status, _) = post(
        &client,
        "/listings/save",
        json!({"studentId": seller, "listingId": textbook}),
    );
    assert_eq!(status, Status::BadRequest);

    let (status, _) = post(
        &client,
        "/listings/unsave",
        json!({"studentId": buyer, "listingId": textbook}),
    );
    assert_eq!(status, Status::Ok);
    let (_, resp) = get(&client, &format!("/listings/saved/{}", buyer));
    assert_eq!(resp["data"].as_array().unwrap().len(), 0);

    let (status, _) = get(&client, "/listings/no-such-listing");
    assert_eq!(status, Status::NotFound);
}

#[test]
fn delete_listing() {
    let db = TempDb::new();
    let client = client(&db);
    let seller = register(&client, "Alice", "alice@pitt.edu");
    let other = register(&client, "Bob", "bob@pitt.edu");
    let lamp = create_listing(&client, &seller, "Desk Lamp", json!(10));

    let delete = |student: &str| {
        let resp = client
            .delete(format!("/listings/{}", lamp))
            .header(ContentType::JSON)
            .body(json!({ "studentId": student }).to_string())
            .dispatch();
        resp.status()
    };
    assert_eq!(delete(&other), Status::Forbidden);
    assert_eq!(delete(&seller), Status::Ok);
    assert_eq!(delete(&seller), Status::NotFound);

    let (_, resp) = get(&client, "/listings");
    assert_eq!(resp["data"].as_array().unwrap().len(), 0);
}

#[test]
fn purchase_flow() {
    let db = TempDb::new();
    let client = client(&db);
    let seller = register(&client, "Alice", "alice@pitt.edu");
    let buyer = register(&client, "Bob", "bob@pitt.edu");
    let textbook = create_listing(&client, &seller, "Calculus Textbook", json!(25.5));

    let (status, _) = post(
        &client,
        "/orders/purchase",
        json!({"studentId": seller, "listingId": textbook}),
    );
    assert_eq!(status, Status::BadRequest);

    let (status, resp) = post(
        &client,
        "/orders/purchase",
        json!({"studentId": buyer, "listingId": textbook}),
    );
    assert_eq!(status, Status::Ok);
    assert_eq!(resp["data"], true);

    let (status, resp) = post(
        &client,
        "/orders/purchase",
        json!({"studentId": buyer, "listingId": textbook}),
    );
    assert_eq!(status, Status::BadRequest);
    assert_eq!(resp["success"], false);

    let (_, resp) = get(&client, "/listings");
    assert_eq!(resp["data"].as_array().unwrap().len(), 0);

    let (_, resp) = get(&client, &format!("/orders/of/{}", buyer));
    assert_eq!(resp["data"][0]["price"], 25.5);
    assert_eq!(resp["data"][0]["paymentMethod"], "venmo");

    let (_, resp) = get(&client, &format!("/messages/inbox/{}", seller));
    assert_eq!(
        resp["data"][0]["content"],
        "Bob bought your product Calculus Textbook"
    );
    assert_eq!(resp["data"][0]["senderId"], buyer.as_str());
}

#[test]
fn messaging() {
    let db = TempDb::new();
    let client = client(&db);
    let alice = register(&client, "Alice", "alice@pitt.edu");
    let bob = register(&client, "Bob", "bob@pitt.edu");

    let (status, _) = post(
        &client,
        "/messages/send",
        json!({"senderId": alice, "receiverId": bob, "content": "   "}),
    );
    assert_eq!(status, Status::BadRequest);
    let (status, _) = post(
        &client,
        "/messages/send",
        json!({"senderId": alice, "receiverId": "nobody", "content": "hi"}),
    );
    assert_eq!(status, Status::NotFound);

    let (status, _) = post(
        &client,
        "/messages/send",
        json!({"senderId": alice, "receiverId": bob, "content": "Is the lamp available?"}),
    );
    assert_eq!(status, Status::Ok);

    post(
        &client,
        "/students/login",
        json!({"email": "bob@pitt.edu", "password": "strongpasswd"}),
    );
    let (status, resp) = get(&client, "/messages/inbox");
    assert_eq!(status, Status::Ok);
    assert_eq!(resp["data"][0]["sender"], "Alice");
    assert_eq!(resp["data"][0]["email"], "alice@pitt.edu");

    let (status, resp) = get(&client, &format!("/messages/chat?user_id={}", alice));
    assert_eq!(status, Status::Ok);
    assert_eq!(resp["data"][0]["body"], "Is the lamp available?");
}

#[test]
fn session_lookup_failure() {
    let db = TempDb::new();
    let client = client(&db);
    register(&client, "Bob", "bob@pitt.edu");
    post(
        &client,
        "/students/login",
        json!({"email": "bob@pitt.edu", "password": "strongpasswd"}),
    );
    let (status, _) = get(&client, "/messages/inbox");
    assert_eq!(status, Status::Ok);

    // A broken store is a server fault, not a reason to log in again
    db.connect()
        .batch_execute("ALTER TABLE students RENAME TO students_gone")
        .unwrap();
    let (status, resp) = get(&client, "/messages/inbox");
    assert_eq!(status, Status::InternalServerError);
    assert_eq!(resp["success"], false);
}
