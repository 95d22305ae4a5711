diesel::table! {
    accounts (id) {
        id -> Int4,
        user_id -> Int4,
        #[sql_name = "type"]
        account_type -> Text,
        provider -> Text,
        provider_account_id -> Text,
        access_token -> Nullable<Text>,
        expires_at -> Nullable<Timestamp>,
        id_token -> Nullable<Text>,
        scope -> Nullable<Text>,
        token_type -> Nullable<Text>,
        refresh_token -> Nullable<Text>,
    }
}

diesel::table! {
    bookmarks (id) {
        id -> Int4,
        user_id -> Int4,
        post_id -> Int4,
        created_at -> Timestamp,
    }
}

diesel::table! {
    categories (id) {
        id -> Int4,
        name -> Text,
        description -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    comments (id) {
        id -> Int4,
        content -> Text,
        user_id -> Int4,
        post_id -> Int4,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    follows (follower_id, following_id) {
        follower_id -> Int4,
        following_id -> Int4,
    }
}

diesel::table! {
    likes (user_id, post_id) {
        user_id -> Int4,
        post_id -> Int4,
    }
}

diesel::table! {
    post_categories (post_id, category_id) {
        post_id -> Int4,
        category_id -> Int4,
    }
}

diesel::table! {
    post_tags (post_id, tag_id) {
        post_id -> Int4,
        tag_id -> Int4,
    }
}

diesel::table! {
    posts (id) {
        id -> Int4,
        title -> Text,
        slug -> Text,
        excerpt -> Text,
        content -> Text,
        author_id -> Int4,
        featured_image -> Nullable<Text>,
        featured -> Bool,
        status -> Text,
        likes -> Int4,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    sessions (session_token) {
        session_token -> Text,
        user_id -> Int4,
        expires -> Timestamp,
    }
}

diesel::table! {
    tags (id) {
        id -> Int4,
        name -> Text,
    }
}

diesel::table! {
    users (id) {
        id -> Int4,
        name -> Text,
        email -> Text,
        password -> Text,
        profile_picture -> Nullable<Text>,
        bio -> Nullable<Text>,
        github -> Nullable<Text>,
        twitter -> Nullable<Text>,
        linkedin -> Nullable<Text>,
        website -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    verification_tokens (identifier, token) {
        identifier -> Text,
        token -> Text,
        expires -> Timestamp,
    }
}

diesel::joinable!(accounts -> users (user_id));
diesel::joinable!(bookmarks -> posts (post_id));
diesel::joinable!(bookmarks -> users (user_id));
diesel::joinable!(comments -> posts (post_id));
diesel::joinable!(comments -> users (user_id));
diesel::joinable!(likes -> posts (post_id));
diesel::joinable!(likes -> users (user_id));
diesel::joinable!(post_categories -> categories (category_id));
diesel::joinable!(post_categories -> posts (post_id));
diesel::joinable!(post_tags -> posts (post_id));
diesel::joinable!(post_tags -> tags (tag_id));
diesel::joinable!(posts -> users (author_id));
diesel::joinable!(sessions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    bookmarks,
    categories,
    comments,
    follows,
    likes,
    post_categories,
    post_tags,
    posts,
    sessions,
    tags,
    users,
    verification_tokens,
);
