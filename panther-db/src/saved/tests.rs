use super::*;
use crate::{
    listings::IncompleteListing,
    orders::Orders,
    test_utils::{establish_connection, register_student},
};

#[test]
fn toggle_saved() {
    let mut conn = establish_connection();
    let seller = register_student(&mut conn, "Seller", "seller@pitt.edu");
    let fan = register_student(&mut conn, "Fan", "fan@pitt.edu");
    let lamp = IncompleteListing::new("Desk lamp", "Warm light", 8.5, "Forbes Ave")
        .create(&mut conn, &seller)
        .unwrap();

    assert!(SavedListings::toggle(&mut conn, &fan, &lamp).unwrap());
    assert!(SavedListings::is_saved(&mut conn, &fan, &lamp).unwrap());
    assert_eq!(SavedListings::list(&mut conn, &fan).unwrap().len(), 1);

    // Saving again takes it back
    assert!(!SavedListings::toggle(&mut conn, &fan, &lamp).unwrap());
    assert!(SavedListings::list(&mut conn, &fan).unwrap().is_empty());

    // Unsaving twice is fine
    SavedListings::toggle(&mut conn, &fan, &lamp).unwrap();
    SavedListings::unsave(&mut conn, &fan, &lamp).unwrap();
    SavedListings::unsave(&mut conn, &fan, &lamp).unwrap();
    assert_eq!(SavedListings::count_for_listing(&mut conn, &lamp).unwrap(), 0);
}

#[test]
fn self_favorite() {
    let mut conn = establish_connection();
    let seller = register_student(&mut conn, "Seller", "seller@pitt.edu");
    let buyer = register_student(&mut conn, "Buyer", "buyer@pitt.edu");
    let lamp = IncompleteListing::new("Desk lamp", "Warm light", 8.5, "Forbes Ave")
        .create(&mut conn, &seller)
        .unwrap();

    assert!(matches!(
        SavedListings::toggle(&mut conn, &seller, &lamp).unwrap_err(),
        PantherDbError::SelfFavorite
    ));

    // Regardless of the listing state
    Orders::purchase(&mut conn, &lamp, &buyer, None).unwrap();
    assert!(matches!(
        SavedListings::toggle(&mut conn, &seller, &lamp).unwrap_err(),
        PantherDbError::SelfFavorite
    ));
    assert!(matches!(
        SavedListings::toggle(&mut conn, &buyer, &lamp).unwrap_err(),
        PantherDbError::ListingNotActive
    ));
    assert_eq!(SavedListings::count_for_listing(&mut conn, &lamp).unwrap(), 0);
}

#[test]
fn sold_listings_hidden() {
    let mut conn = establish_connection();
    let seller = register_student(&mut conn, "Seller", "seller@pitt.edu");
    let fan = register_student(&mut conn, "Fan", "fan@pitt.edu");
    let lamp = IncompleteListing::new("Desk lamp", "Warm light", 8.5, "Forbes Ave")
        .create(&mut conn, &seller)
        .unwrap();
    SavedListings::toggle(&mut conn, &fan, &lamp).unwrap();

    // Flip the status behind the back of the purchase flow, leaving the favorite row in place
    {
        use crate::schema::listings::dsl::*;
        diesel::update(listings.filter(id.eq(lamp.get_id())))
            .set(listing_status.eq(ListingStatus::Sold))
            .execute(&mut conn)
            .unwrap();
    }
    assert_eq!(SavedListings::count_for_listing(&mut conn, &lamp).unwrap(), 1);
    assert!(SavedListings::list(&mut conn, &fan).unwrap().is_empty());

    // A lingering favorite can still be removed by toggling
    assert!(!SavedListings::toggle(&mut conn, &fan, &lamp).unwrap());
    assert_eq!(SavedListings::count_for_listing(&mut conn, &lamp).unwrap(), 0);
}

#[test]
fn missing_listing() {
    let mut conn = establish_connection();
    let fan = register_student(&mut conn, "Fan", "fan@pitt.edu");
    let seller = register_student(&mut conn, "Seller", "seller@pitt.edu");
    let lamp = IncompleteListing::new("Desk lamp", "Warm light", 8.5, "Forbes Ave")
        .create(&mut conn, &seller)
        .unwrap();
    lamp.delete_owned(&mut conn, &seller).unwrap();

    assert!(matches!(
        SavedListings::toggle(&mut conn, &fan, &lamp).unwrap_err(),
        PantherDbError::ListingNotFound
    ));
}
