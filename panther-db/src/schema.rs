diesel::table! {
    students (id) {
        id -> Text,
        name -> Text,
        email -> Text,
        phone -> Text,
        hashed_passwd -> Text,
        payment_method -> Nullable<Text>,
        payment_info -> Nullable<Text>,
    }
}

diesel::table! {
    buyers (id) {
        id -> Text,
    }
}

diesel::table! {
    sellers (id) {
        id -> Text,
    }
}

diesel::table! {
    inboxes (id) {
        id -> Text,
        student_id -> Text,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use crate::enums::ListingStatusMapping;

    listings (id) {
        id -> Text,
        seller_id -> Text,
        buyer_id -> Nullable<Text>,
        title -> Text,
        description -> Text,
        price -> Double,
        address -> Text,
        category -> Nullable<Text>,
        images -> Text,
        listing_status -> ListingStatusMapping,
        time_posted -> Timestamp,
    }
}

diesel::table! {
    tags (id) {
        id -> Text,
        name -> Text,
    }
}

diesel::table! {
    tagmappings (id) {
        id -> Text,
        tag -> Text,
        listing -> Text,
    }
}

diesel::table! {
    saved_listings (student_id, listing_id) {
        student_id -> Text,
        listing_id -> Text,
    }
}

diesel::table! {
    messages (id) {
        id -> Text,
        send -> Text,
        recv -> Text,
        body -> Text,
        time_sent -> Timestamp,
    }
}

diesel::table! {
    inbox_messages (inbox_id, message_id) {
        inbox_id -> Text,
        message_id -> Text,
    }
}

diesel::table! {
    orders (id) {
        id -> Text,
        buyer -> Text,
        seller -> Text,
        listing -> Text,
        title -> Text,
        price -> Double,
        payment_method -> Nullable<Text>,
        time_placed -> Timestamp,
    }
}

diesel::joinable!(inboxes -> students (student_id));
diesel::joinable!(tagmappings -> tags (tag));
diesel::joinable!(tagmappings -> listings (listing));
diesel::joinable!(saved_listings -> listings (listing_id));
diesel::joinable!(inbox_messages -> inboxes (inbox_id));
diesel::joinable!(inbox_messages -> messages (message_id));

diesel::allow_tables_to_appear_in_same_query!(
    students,
    buyers,
    sellers,
    inboxes,
    listings,
    tags,
    tagmappings,
    saved_listings,
    messages,
    inbox_messages,
    orders,
);
