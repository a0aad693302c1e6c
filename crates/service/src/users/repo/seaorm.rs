use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use models::user;

use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::storage::resource_store::next_timestamp;
use crate::users::domain::{validate_name, NewUser, User};
use crate::users::repository::UserRepository;

/// SeaORM-backed repository over the `users` table.
pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        User {
            id: m.id,
            email: m.email,
            name: m.name,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

fn db_err(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::already_exists("user"),
        _ => ServiceError::Db(e.to_string()),
    }
}

/// `%keyword%` with LIKE metacharacters escaped, so the keyword matches literally.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn new_active_model(input: NewUser) -> user::ActiveModel {
    let now = Utc::now().into();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(input.email),
        name: Set(input.name),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, input: NewUser) -> Result<User, ServiceError> {
        input.validate()?;
        let created = new_active_model(input).insert(&self.db).await.map_err(db_err)?;
        Ok(created.into())
    }

    async fn create_batch(&self, inputs: Vec<NewUser>) -> Result<Vec<User>, ServiceError> {
        let mut seen = HashSet::new();
        for input in &inputs {
            input.validate()?;
            if !seen.insert(input.email.as_str()) {
                return Err(ServiceError::already_exists("user"));
            }
        }
        drop(seen);

        // dropping the transaction on an early return rolls it back
        let txn = self.db.begin().await.map_err(db_err)?;
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let m = new_active_model(input).insert(&txn).await.map_err(db_err)?;
            created.push(m.into());
        }
        txn.commit().await.map_err(db_err)?;
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<User, ServiceError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(User::from)
            .ok_or_else(|| ServiceError::not_found("user"))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, ServiceError> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(User::from)
            .ok_or_else(|| ServiceError::not_found("user"))
    }

    async fn list(&self) -> Result<Vec<User>, ServiceError> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn list_page(&self, page: Pagination) -> Result<(Vec<User>, u64), ServiceError> {
        let (page_idx, per_page) = page.normalize();
        let paginator = user::Entity::find()
            .order_by_asc(user::Column::CreatedAt)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await.map_err(db_err)?;
        let users = paginator.fetch_page(page_idx).await.map_err(db_err)?;
        Ok((users.into_iter().map(User::from).collect(), total))
    }

    async fn search(&self, keyword: &str) -> Result<Vec<User>, ServiceError> {
        let pattern = contains_pattern(keyword);
        let users = user::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Name)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Email)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            )
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<User, ServiceError> {
        validate_name(name)?;
        let found = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ServiceError::not_found("user"))?;
        let updated_at = next_timestamp(found.updated_at.with_timezone(&Utc));
        let mut am: user::ActiveModel = found.into();
        am.name = Set(name.to_string());
        am.updated_at = Set(updated_at.into());
        let updated = am.update(&self.db).await.map_err(db_err)?;
        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let res = user::Entity::delete_by_id(id).exec(&self.db).await.map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("user"));
        }
        Ok(())
    }
}
