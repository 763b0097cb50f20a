use parley_shared::users::UserSearchHit;

///
/// Model to fetch the display safe columns of a user from the database with.
///
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserModel {
    pub id: i64,
    pub name: String,
    pub login: String,
    pub email: String,
}

impl From<UserModel> for UserSearchHit {
    fn from(val: UserModel) -> Self {
        Self {
            id: val.id,
            name: val.name,
            login: val.login,
            email: val.email,
        }
    }
}
