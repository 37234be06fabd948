//! Filter whitelist for the users listing.

use database::postgres::ColumnType;
use query_filter::FilterConfig;
use std::sync::LazyLock;

static USER_FILTER: LazyLock<FilterConfig> = LazyLock::new(|| {
    FilterConfig::builder()
        .param("name", &["eq"])
        .param("email", &["eq"])
        .param("emailverifiedat", &["eq"])
        .param("twofactorconfirmedat", &["eq"])
        .param("currentteamid", &["eq"])
        .param("profilephotopath", &["eq"])
        .param("fbid", &["eq"])
        .param("profilephotourl", &["eq"])
        .column("emailverifiedat", "email_verified_at")
        .column("twofactorconfirmedat", "two_factor_confirmed_at")
        .column("currentteamid", "current_team_id")
        .column("profilephotopath", "profile_photo_path")
        .column("fbid", "fb_id")
        .column("profilephotourl", "profile_photo_url")
        .build()
});

/// Shared filter configuration for `GET /users`.
pub fn user_filter() -> &'static FilterConfig {
    &USER_FILTER
}

/// SQL type each filterable `users` column is compared as.
pub fn column_type(column: &str) -> Option<ColumnType> {
    match column {
        "email" => Some(ColumnType::CaseInsensitiveText),
        "email_verified_at" | "two_factor_confirmed_at" | "created_at" | "updated_at" => {
            Some(ColumnType::TimestampTz)
        }
        "current_team_id" => Some(ColumnType::BigInt),
        "is_admin" => Some(ColumnType::Boolean),
        _ => None,
    }
}
