use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::models::{DomainCitizen, NewCitizen};
use crate::storage::traits::CitizenStorage;

/// Gateway to the durable record store
#[derive(Clone)]
pub struct CitizenService {
    storage: Arc<dyn CitizenStorage>,
}

impl CitizenService {
    pub fn new(storage: Arc<dyn CitizenStorage>) -> Self {
        Self { storage }
    }

    /// Persist a finished record and return the id the store assigned.
    ///
    /// Clearing the draft afterwards is the caller's job, and only once this
    /// has returned `Ok`.
    pub async fn commit(&self, citizen: NewCitizen) -> Result<i64> {
        info!("Committing record with code {}", citizen.generated_code);

        match self.storage.insert_citizen(&citizen).await {
            Ok(id) => {
                info!("Stored record {} with code {}", id, citizen.generated_code);
                Ok(id)
            }
            Err(e) => {
                warn!("Failed to store record with code {}: {:#}", citizen.generated_code, e);
                Err(e)
            }
        }
    }

    /// All committed records, ascending by code
    pub async fn list_all(&self) -> Result<Vec<DomainCitizen>> {
        let citizens = self.storage.list_citizens_by_code().await?;
        info!("Found {} committed records", citizens.len());
        Ok(citizens)
    }

    pub async fn update(&self, citizen: &DomainCitizen) -> Result<()> {
        if !self.storage.update_citizen(citizen).await? {
            return Err(anyhow::anyhow!("Record not found: {}", citizen.id));
        }
        info!("Updated record {}", citizen.id);
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.storage.delete_citizen(id).await? {
            return Err(anyhow::anyhow!("Record not found: {}", id));
        }
        info!("Deleted record {}", id);
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<u64> {
        let deleted = self.storage.delete_all_citizens().await?;
        info!("Deleted all {} committed records", deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::{CitizenRepository, DbConnection};

    async fn setup_test() -> CitizenService {
        let db = DbConnection::open_in_memory().await.expect("Failed to create test database");
        CitizenService::new(Arc::new(CitizenRepository::new(db)))
    }

    fn new_citizen(code: &str) -> NewCitizen {
        NewCitizen {
            birth_date: "02/02/1990".to_string(),
            paternal_surname: "PEREZ".to_string(),
            maternal_surname: "JIMENEZ".to_string(),
            given_name: "ANA".to_string(),
            qr_image_encoded: String::new(),
            generated_code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_commit_then_list() {
        let service = setup_test().await;

        let id = service.commit(new_citizen("PJA-02021990")).await.unwrap();
        let all = service.list_all().await.unwrap();

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].generated_code, "PJA-02021990");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_record() {
        let service = setup_test().await;
        let id = service.commit(new_citizen("PJA-02021990")).await.unwrap();

        let mut citizen = new_citizen("PJA-03021990").with_id(id);
        service.update(&citizen).await.unwrap();
        assert_eq!(service.list_all().await.unwrap()[0].generated_code, "PJA-03021990");

        citizen.id = id + 1;
        assert!(service.update(&citizen).await.is_err());
        assert!(service.delete(id + 1).await.is_err());
        service.delete(id).await.unwrap();
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_all() {
        let service = setup_test().await;
        service.commit(new_citizen("A-01012000")).await.unwrap();
        service.commit(new_citizen("B-01012000")).await.unwrap();

        assert_eq!(service.delete_all().await.unwrap(), 2);
        assert!(service.list_all().await.unwrap().is_empty());
    }
}
