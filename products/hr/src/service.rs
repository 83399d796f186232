use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{HrError, HrResult, StoreError},
    model::{Employee, NewEmployee},
    store::EmployeeStore,
};

/// Business rules over an [`EmployeeStore`].
///
/// Emails are normalised with [`normalize_email`](crate::normalize_email)
/// before they reach the store, so uniqueness is case-insensitive. The check
/// here fails early; the store's unique constraint settles concurrent writers.
pub struct EmployeeService<S: EmployeeStore> {
    store: Arc<S>,
}

impl<S: EmployeeStore> Clone for EmployeeService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EmployeeStore> EmployeeService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[instrument(skip_all, fields(email = %employee.email))]
    pub async fn create(&self, employee: NewEmployee) -> HrResult<Employee> {
        let employee = employee.normalized();
        if self.store.find_by_email(&employee.email).await?.is_some() {
            warn!("employee email already registered");
            return Err(HrError::duplicate(employee.email));
        }
        match self.store.insert(employee).await {
            Ok(saved) => {
                info!(employee_id = %saved.id, "employee created");
                Ok(saved)
            }
            Err(StoreError::Conflict(email)) => {
                warn!("employee email claimed by a concurrent create");
                Err(HrError::duplicate(email))
            }
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip_all)]
    pub async fn list_all(&self) -> HrResult<Vec<Employee>> {
        let employees = self.store.find_all().await?;
        debug!(count = employees.len(), "listed employees");
        Ok(employees)
    }

    /// `None` when no record has this id.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: Uuid) -> HrResult<Option<Employee>> {
        Ok(self.store.find_by_id(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> HrResult<Vec<Employee>> {
        Ok(self.store.find_by_name(first_name, last_name).await?)
    }

    /// Rejects an email already held by a different record. An unknown id
    /// surfaces as [`StoreError::NotFound`] from the store.
    #[instrument(skip_all, fields(employee_id = %employee.id))]
    pub async fn update(&self, employee: Employee) -> HrResult<Employee> {
        let employee = employee.normalized();
        if let Some(holder) = self.store.find_by_email(&employee.email).await? {
            if holder.id != employee.id {
                warn!("employee email held by another record");
                return Err(HrError::duplicate(employee.email));
            }
        }
        match self.store.update(employee).await {
            Ok(updated) => {
                info!("employee updated");
                Ok(updated)
            }
            Err(StoreError::Conflict(email)) => Err(HrError::duplicate(email)),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: Uuid) -> HrResult<()> {
        self.store.delete_by_id(id).await?;
        info!("employee deleted");
        Ok(())
    }
}
