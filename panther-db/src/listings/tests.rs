use super::*;
use crate::{
    saved::SavedListings,
    tags::{TagMappingFinder, Tags},
    test_utils::{establish_connection, register_student},
};

fn textbook() -> IncompleteListing {
    IncompleteListing::new(
        "Calculus Textbook",
        "Stewart, 8th edition, barely used",
        20.0,
        "Hillman Library",
    )
    .category("Books")
}

#[test]
fn create_listing() {
    let mut conn = establish_connection();
    let seller = register_student(&mut conn, "Seller", "seller@pitt.edu");
    let id = textbook()
        .images(["https://img.example/1.png", "  ", "https://img.example/2.png"])
        .create(&mut conn, &seller)
        .unwrap();

    let info = id.get_info(&mut conn).unwrap();
    assert_eq!(info.get_title(), "Calculus Textbook");
    assert_eq!(info.get_price(), 20.0);
    assert_eq!(info.get_category(), Some("Books"));
    assert_eq!(info.get_listing_status(), ListingStatus::Active);
    assert_eq!(info.get_buyer_id(), None);
    assert!(info.is_owned_by(&seller));
    // Blank image entries are dropped, order is kept
    assert_eq!(
        info.get_images().unwrap(),
        vec!["https://img.example/1.png", "https://img.example/2.png"]
    );
    assert_eq!(ListingFinder::list(&mut conn).unwrap().len(), 1);
}

#[test]
fn create_listing_invalid() {
    let mut conn = establish_connection();
    let seller = register_student(&mut conn, "Seller", "seller@pitt.edu");

    for price in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let mut listing = textbook();
        listing.price = price;
        assert!(matches!(
            listing.create(&mut conn, &seller).unwrap_err(),
            PantherDbError::InvalidField("price")
        ));
    }

    let mut listing = textbook();
    listing.title = "x".repeat(101);
    assert!(matches!(
        listing.create(&mut conn, &seller).unwrap_err(),
        PantherDbError::InvalidField("title")
    ));

    let mut listing = textbook();
    listing.description = " ".to_string();
    assert!(matches!(
        listing.create(&mut conn, &seller).unwrap_err(),
        PantherDbError::InvalidField("description")
    ));

    // Unknown seller
    let ghost = register_student(&mut conn, "Ghost", "ghost@pitt.edu");
    {
        use crate::schema::{buyers, inboxes, sellers, students};
        diesel::delete(inboxes::table).execute(&mut conn).unwrap();
        diesel::delete(buyers::table).execute(&mut conn).unwrap();
        diesel::delete(sellers::table).execute(&mut conn).unwrap();
        diesel::delete(students::table.filter(students::id.eq(ghost.get_id())))
            .execute(&mut conn)
            .unwrap();
    }
    assert!(matches!(
        textbook().create(&mut conn, &ghost).unwrap_err(),
        PantherDbError::StudentNotFound
    ));

    assert_eq!(ListingFinder::list(&mut conn).unwrap().len(), 0);
}

#[test]
fn search_listings() {
    let mut conn = establish_connection();
    let seller = register_student(&mut conn, "Seller", "seller@pitt.edu");

    let calculus = textbook().create(&mut conn, &seller).unwrap();
    let physics = IncompleteListing::new(
        "Feynman's Lectures on Physics",
        "A TEXTBOOK masterpiece on the theory of the universe",
        90.0,
        "Cathedral of Learning",
    )
    .category("Books")
    .create(&mut conn, &seller)
    .unwrap();
    let lamp = IncompleteListing::new("Desk lamp", "Warm light, 100% working", 8.5, "Forbes Ave")
        .category("Furniture")
        .create(&mut conn, &seller)
        .unwrap();

    // Title or description, any case, newest first
    let found = Listings::search_by_keyword(&mut conn, "textbook").unwrap();
    assert_eq!(
        found.iter().map(ListingInfo::to_id).collect::<Vec<_>>(),
        vec![physics.clone(), calculus.clone()]
    );

    // LIKE wildcards are taken literally
    let found = Listings::search_by_keyword(&mut conn, "100%").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].to_id(), lamp);
    assert!(Listings::search_by_keyword(&mut conn, "_")
        .unwrap()
        .is_empty());

    let found = Listings::search_by_category(&mut conn, "Books").unwrap();
    assert_eq!(
        found.iter().map(ListingInfo::to_id).collect::<Vec<_>>(),
        vec![physics.clone(), calculus.clone()]
    );
    assert!(Listings::search_by_category(&mut conn, "books")
        .unwrap()
        .is_empty());

    let by_price = Listings::sort_by_price(&mut conn, Order::from_direction("desc")).unwrap();
    assert_eq!(
        by_price.iter().map(ListingInfo::get_price).collect::<Vec<_>>(),
        vec![90.0, 20.0, 8.5]
    );
    // Unknown direction falls back to ascending
    let by_price = Listings::sort_by_price(&mut conn, Order::from_direction("sideways")).unwrap();
    assert_eq!(
        by_price.iter().map(ListingInfo::get_price).collect::<Vec<_>>(),
        vec![8.5, 20.0, 90.0]
    );

    assert_eq!(Listings::list_all(&mut conn, None).unwrap().len(), 3);
    assert_eq!(
        Listings::list_all(&mut conn, Some("Furniture")).unwrap().len(),
        1
    );
    assert_eq!(
        ListingFinder::new(&mut conn, None)
            .seller(seller.get_id())
            .count()
            .unwrap(),
        3
    );
}

#[test]
fn list_active_hides_sold() {
    let mut conn = establish_connection();
    let seller = register_student(&mut conn, "Seller", "seller@pitt.edu");
    let buyer = register_student(&mut conn, "Buyer", "buyer@pitt.edu");
    let sold = textbook().create(&mut conn, &seller).unwrap();
    textbook().create(&mut conn, &seller).unwrap();

    crate::orders::Orders::purchase(&mut conn, &sold, &buyer, None).unwrap();

    assert_eq!(Listings::list_active(&mut conn, None).unwrap().len(), 1);
    assert_eq!(Listings::list_active(&mut conn, Some("Books")).unwrap().len(), 1);
    // No status filter here
    assert_eq!(Listings::list_all(&mut conn, None).unwrap().len(), 2);
    assert_eq!(
        ListingFinder::new(&mut conn, None)
            .buyer(buyer.get_id())
            .search()
            .unwrap(),
        vec![sold]
    );
}

#[test]
fn delete_listing() {
    let mut conn = establish_connection();
    let seller = register_student(&mut conn, "Seller", "seller@pitt.edu");
    let fan = register_student(&mut conn, "Fan", "fan@pitt.edu");
    let id = textbook().create(&mut conn, &seller).unwrap();
    let other = textbook().create(&mut conn, &seller).unwrap();

    Tags::replace_for(&mut conn, &id, &seller, &["math", "calculus"]).unwrap();
    Tags::replace_for(&mut conn, &other, &seller, &["math"]).unwrap();
    assert!(SavedListings::toggle(&mut conn, &fan, &id).unwrap());

    // Only the seller may delete
    assert!(matches!(
        id.delete_owned(&mut conn, &fan).unwrap_err(),
        PantherDbError::NotOwner
    ));
    assert_eq!(id.get_info(&mut conn).unwrap().get_title(), "Calculus Textbook");
    assert_eq!(SavedListings::count_for_listing(&mut conn, &id).unwrap(), 1);

    id.delete_owned(&mut conn, &seller).unwrap();
    assert!(matches!(
        ListingId::find(&mut conn, id.get_id()).unwrap_err(),
        PantherDbError::ListingNotFound
    ));
    // No orphans left behind
    assert_eq!(
        TagMappingFinder::new(&mut conn, None)
            .listing(&id)
            .count()
            .unwrap(),
        0
    );
    assert_eq!(SavedListings::count_for_listing(&mut conn, &id).unwrap(), 0);
    // The other listing keeps its tags
    assert_eq!(Tags::of_listing(&mut conn, &other).unwrap().len(), 1);
}
