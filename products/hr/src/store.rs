use async_trait::async_trait;
use entity::employees;
use platform_db::DbPool;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{Set, Unchanged},
    ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, SqlErr,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{StoreError, StoreResult},
    model::{Employee, NewEmployee},
};

/// Persistence contract the employee service depends on.
///
/// Implementations perform no validation of their own beyond whatever
/// constraints the backing storage enforces.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Persist a new record and assign its id.
    async fn insert(&self, employee: NewEmployee) -> StoreResult<Employee>;

    /// Replace the fields of an existing record. Fails with
    /// [`StoreError::NotFound`] when the id is unknown.
    async fn update(&self, employee: Employee) -> StoreResult<Employee>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Employee>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Employee>>;

    async fn find_by_name(&self, first_name: &str, last_name: &str)
    -> StoreResult<Vec<Employee>>;

    async fn find_all(&self) -> StoreResult<Vec<Employee>>;

    /// Remove a record; succeeds when the id is already absent.
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()>;
}

/// [`EmployeeStore`] over the `employees` table.
#[derive(Clone, Debug)]
pub struct SeaOrmEmployeeStore {
    pool: DbPool,
}

impl SeaOrmEmployeeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn write_error(err: DbErr, email: &str) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict(email.to_string()),
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl EmployeeStore for SeaOrmEmployeeStore {
    async fn insert(&self, employee: NewEmployee) -> StoreResult<Employee> {
        let email = employee.email.clone();
        let model = employees::ActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: Set(employee.first_name),
            last_name: Set(employee.last_name),
            email: Set(employee.email),
        };
        let saved = model
            .insert(&self.pool)
            .await
            .map_err(|err| write_error(err, &email))?;
        Ok(saved.into())
    }

    async fn update(&self, employee: Employee) -> StoreResult<Employee> {
        let id = employee.id;
        let email = employee.email.clone();
        let model = employees::ActiveModel {
            id: Unchanged(id),
            first_name: Set(employee.first_name),
            last_name: Set(employee.last_name),
            email: Set(employee.email),
        };
        match model.update(&self.pool).await {
            Ok(updated) => Ok(updated.into()),
            Err(DbErr::RecordNotUpdated | DbErr::RecordNotFound(_)) => {
                Err(StoreError::NotFound(id))
            }
            Err(err) => Err(write_error(err, &email)),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Employee>> {
        let found = employees::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(found.map(Employee::from))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        let found = employees::Entity::find()
            .filter(employees::Column::Email.eq(email))
            .one(&self.pool)
            .await?;
        Ok(found.map(Employee::from))
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<Vec<Employee>> {
        let rows = employees::Entity::find()
            .filter(employees::Column::FirstName.eq(first_name))
            .filter(employees::Column::LastName.eq(last_name))
            .order_by_asc(employees::Column::Email)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn find_all(&self) -> StoreResult<Vec<Employee>> {
        let rows = employees::Entity::find()
            .order_by_asc(employees::Column::LastName)
            .order_by_asc(employees::Column::FirstName)
            .order_by_asc(employees::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()> {
        let result = employees::Entity::delete_by_id(id).exec(&self.pool).await?;
        debug!(%id, rows_affected = result.rows_affected, "employee delete executed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn sqlite_store() -> SeaOrmEmployeeStore {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&pool, None).await.unwrap();
        SeaOrmEmployeeStore::new(pool)
    }

    fn rodrigo() -> NewEmployee {
        NewEmployee::new("Rodrigo", "Rivera", "rodrigo.rivera@gmail.com")
    }

    #[tokio::test]
    async fn insert_assigns_id_and_round_trips() {
        let store = sqlite_store().await;
        let saved = store.insert(rodrigo()).await.unwrap();
        assert_eq!(saved, rodrigo().with_id(saved.id));

        let found = store.find_by_id(saved.id).await.unwrap();
        assert_eq!(found, Some(saved.clone()));

        let by_email = store.find_by_email("rodrigo.rivera@gmail.com").await.unwrap();
        assert_eq!(by_email, Some(saved));
    }

    #[tokio::test]
    async fn unique_index_reports_conflict() {
        let store = sqlite_store().await;
        store.insert(rodrigo()).await.unwrap();
        let err = store
            .insert(NewEmployee::new("Other", "Person", "rodrigo.rivera@gmail.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(email) if email == "rodrigo.rivera@gmail.com"));
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_id() {
        let store = sqlite_store().await;
        let saved = store.insert(rodrigo()).await.unwrap();
        let mut changed = saved.clone();
        changed.email = "rivera.rodrigo@gmail.com".into();
        changed.first_name = "Domingo".into();

        let updated = store.update(changed.clone()).await.unwrap();
        assert_eq!(updated, changed);
        assert_eq!(updated.last_name, "Rivera");
        assert!(store.find_by_email("rodrigo.rivera@gmail.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_onto_taken_email_reports_conflict() {
        let store = sqlite_store().await;
        store.insert(rodrigo()).await.unwrap();
        let other = store
            .insert(NewEmployee::new("Rodrigo", "Orellana", "rodrigo.orelana@gmail.com"))
            .await
            .unwrap();

        let mut changed = other.clone();
        changed.email = "rodrigo.rivera@gmail.com".into();
        let err = store.update(changed).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(email) if email == "rodrigo.rivera@gmail.com"));
        assert_eq!(store.find_by_id(other.id).await.unwrap(), Some(other));
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let store = sqlite_store().await;
        let ghost = rodrigo().with_id(Uuid::new_v4());
        let err = store.update(ghost.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == ghost.id));
    }

    #[tokio::test]
    async fn find_by_name_matches_first_and_last() {
        let store = sqlite_store().await;
        store.insert(rodrigo()).await.unwrap();
        store
            .insert(NewEmployee::new("Rodrigo", "Orellana", "rodrigo.orelana@gmail.com"))
            .await
            .unwrap();

        let hits = store.find_by_name("Rodrigo", "Rivera").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "rodrigo.rivera@gmail.com");
        assert!(store.find_by_name("Rivera", "Rodrigo").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_forgiving() {
        let store = sqlite_store().await;
        let saved = store.insert(rodrigo()).await.unwrap();
        store.delete_by_id(saved.id).await.unwrap();
        store.delete_by_id(saved.id).await.unwrap();
        assert!(store.find_by_id(saved.id).await.unwrap().is_none());
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
