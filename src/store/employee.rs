use async_trait::async_trait;
use sqlx::MySqlPool;

use super::{EmployeeDirectory, StoreError};

pub struct MySqlEmployeeDirectory {
    pool: MySqlPool,
}

impl MySqlEmployeeDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlEmployeeDirectory {
    async fn employee_for_user(&self, user_id: u64) -> Result<Option<u64>, StoreError> {
        let employee_id = sqlx::query_scalar::<_, u64>(
            r#"
            SELECT e.id
            FROM users u
            JOIN employees e ON e.id = u.employee_id
            WHERE u.id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee_id)
    }
}
