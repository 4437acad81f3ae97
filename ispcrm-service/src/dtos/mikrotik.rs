use serde::Deserialize;
use validator::Validate;

/// Body of `POST /api/mikrotik/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRouterUserRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub profile: Option<String>,

    pub service: Option<String>,
}

/// Body of `PUT /api/mikrotik/users/:username`. Absent fields are left
/// unchanged on the router.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRouterUserRequest {
    pub password: Option<String>,
    pub profile: Option<String>,
    pub disabled: Option<bool>,
}
