use serde::{Deserialize, Serialize};

/// Login form body.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Signup form body.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// What a client needs to draw a login or signup form.
#[derive(Debug, Serialize)]
pub struct FormDescriptor {
    pub form: &'static str,
    pub action: &'static str,
    pub fields: &'static [&'static str],
}

pub const LOGIN_FORM: FormDescriptor = FormDescriptor {
    form: "Sign In",
    action: "/login",
    fields: &["username", "password"],
};

pub const SIGNUP_FORM: FormDescriptor = FormDescriptor {
    form: "Sign Up",
    action: "/signup",
    fields: &["email", "username", "password", "confirm_password"],
};
