use criterion::{criterion_group, criterion_main, Criterion};
use panther_db::{
    listings::*,
    test_utils::{establish_connection, register_student},
    users::*,
    Order,
};

fn login_user(c: &mut Criterion) {
    let mut conn = establish_connection();
    register_student(&mut conn, "Kanyang Ying", "testuser@pitt.edu");

    c.bench_function("login an user", |b| {
        b.iter(|| UserId::login(&mut conn, "testuser@pitt.edu", "strongpasswd").unwrap())
    });
}

fn listings(c: &mut Criterion) {
    let mut conn = establish_connection();
    // our seller
    let user_id = register_student(&mut conn, "Kanyang Ying", "testuser@pitt.edu");

    IncompleteListing::new(
        "Krugman's Economics 2nd Edition",
        "A very great book on the subject of Economics",
        70.0,
        "Posvar Hall",
    )
    .category("Books")
    .create(&mut conn, &user_id)
    .unwrap();

    // Another different economics book
    IncompleteListing::new(
        "The Economics",
        "I finally had got a different econ textbook!",
        60.0,
        "Posvar Hall",
    )
    .category("Books")
    .create(&mut conn, &user_id)
    .unwrap();

    // Feynman's Lecture on Physics!
    for i in 1..200 {
        IncompleteListing::new(
            "Feynman's Lecture on Physics",
            "A very masterpiece on the theory of the universe",
            f64::from(i),
            "Cathedral of Learning",
        )
        .category("Physics")
        .create(&mut conn, &user_id)
        .unwrap();
    }

    c.bench_function("search listings by keyword", |b| {
        b.iter(|| Listings::search_by_keyword(&mut conn, "textbook").unwrap())
    });

    c.bench_function("search listings by category", |b| {
        b.iter(|| Listings::search_by_category(&mut conn, "Physics").unwrap())
    });

    c.bench_function("sort listings by price", |b| {
        b.iter(|| Listings::sort_by_price(&mut conn, Order::Desc).unwrap())
    });
}

criterion_group!(benches, login_user, listings);
criterion_main!(benches);
