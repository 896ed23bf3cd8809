use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::database::repository::Repository;

pub type UserRepository<'c> = Repository<'c, User>;

impl Repository<'_, User> {
    /// Exact, case-sensitive match on the login name.
    pub async fn find_by_name(&mut self, user_name: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_name = ?")
            .bind(user_name)
            .fetch_optional(self.connection())
            .await?;
        Ok(user)
    }
}
