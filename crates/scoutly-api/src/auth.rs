use secrecy::SecretString;

/// Credentials for authenticating with the Scout API.
///
/// The password never leaves the [`SecretString`] except at the moment
/// the login request body is built.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }
}

/// An authenticated session: the JWT returned by `POST /auth`.
///
/// Scout tokens are bearer-style and sent verbatim in the `Authorization`
/// header. The API does not publish an expiry; consumers detect expiry by
/// a 401 response (`Error::is_auth_expired`) and re-authenticate.
#[derive(Debug, Clone)]
pub struct AuthSession {
    token: SecretString,
}

impl AuthSession {
    pub(crate) fn new(token: SecretString) -> Self {
        Self { token }
    }

    pub(crate) fn token(&self) -> &SecretString {
        &self.token
    }
}
