use crate::entities::users;

/// A stored account. `password_hash` is the hasher's opaque output, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub password_hash: String,
}

impl From<users::Model> for Account {
    fn from(model: users::Model) -> Self {
        Self {
            username: model.username,
            password_hash: model.password_hash,
        }
    }
}
