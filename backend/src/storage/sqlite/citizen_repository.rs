use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{DomainCitizen, NewCitizen};
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::CitizenStorage;

/// SQLite repository for the `ciudadano` table
#[derive(Clone)]
pub struct CitizenRepository {
    db: DbConnection,
}

impl CitizenRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_citizen(row: &SqliteRow) -> DomainCitizen {
        DomainCitizen {
            id: row.get("id"),
            birth_date: row.get("fecha_nac"),
            paternal_surname: row.get("paterno"),
            maternal_surname: row.get("materno"),
            given_name: row.get("nombre"),
            qr_image_encoded: row.get("qr"),
            generated_code: row.get("codigo"),
        }
    }
}

#[async_trait]
impl CitizenStorage for CitizenRepository {
    async fn insert_citizen(&self, citizen: &NewCitizen) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO ciudadano (fecha_nac, paterno, materno, nombre, qr, codigo)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&citizen.birth_date)
        .bind(&citizen.paternal_surname)
        .bind(&citizen.maternal_surname)
        .bind(&citizen.given_name)
        .bind(&citizen.qr_image_encoded)
        .bind(&citizen.generated_code)
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted ciudadano {} with code {}", id, citizen.generated_code);
        Ok(id)
    }

    async fn update_citizen(&self, citizen: &DomainCitizen) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE ciudadano
            SET fecha_nac = ?, paterno = ?, materno = ?, nombre = ?, qr = ?, codigo = ?
            WHERE id = ?
            "#,
        )
        .bind(&citizen.birth_date)
        .bind(&citizen.paternal_surname)
        .bind(&citizen.maternal_surname)
        .bind(&citizen.given_name)
        .bind(&citizen.qr_image_encoded)
        .bind(&citizen.generated_code)
        .bind(citizen.id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_citizen(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ciudadano WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_citizens_by_code(&self) -> Result<Vec<DomainCitizen>> {
        let rows = sqlx::query(
            r#"
            SELECT id, fecha_nac, paterno, materno, nombre, qr, codigo
            FROM ciudadano
            ORDER BY codigo ASC, id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::row_to_citizen).collect())
    }

    async fn delete_all_citizens(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM ciudadano")
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_test() -> CitizenRepository {
        let db = DbConnection::open_in_memory().await.expect("Failed to create test database");
        CitizenRepository::new(db)
    }

    fn new_citizen(code: &str) -> NewCitizen {
        NewCitizen {
            birth_date: "01/01/2000".to_string(),
            paternal_surname: "LOPEZ".to_string(),
            maternal_surname: "PEREZ".to_string(),
            given_name: "JUAN".to_string(),
            qr_image_encoded: "iVBORw0KGgo=".to_string(),
            generated_code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let repo = setup_test().await;

        let first = repo.insert_citizen(&new_citizen("LPJ-01012000")).await.unwrap();
        let second = repo.insert_citizen(&new_citizen("LPJ-01012000")).await.unwrap();

        assert!(second > first);
        let all = repo.list_citizens_by_code().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], new_citizen("LPJ-01012000").with_id(first));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_code() {
        let repo = setup_test().await;
        for code in ["PJ-02021990", "ABC-01011950", "MGA-31121980"] {
            repo.insert_citizen(&new_citizen(code)).await.unwrap();
        }

        let codes: Vec<String> = repo
            .list_citizens_by_code()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.generated_code)
            .collect();
        assert_eq!(codes, vec!["ABC-01011950", "MGA-31121980", "PJ-02021990"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = setup_test().await;
        let id = repo.insert_citizen(&new_citizen("LPJ-01012000")).await.unwrap();

        let mut citizen = new_citizen("LPJ-01012000").with_id(id);
        citizen.given_name = "JOSE".to_string();
        citizen.generated_code = "LPJ-02012000".to_string();
        assert!(repo.update_citizen(&citizen).await.unwrap());
        assert_eq!(repo.list_citizens_by_code().await.unwrap(), vec![citizen.clone()]);

        citizen.id = id + 100;
        assert!(!repo.update_citizen(&citizen).await.unwrap());

        assert!(repo.delete_citizen(id).await.unwrap());
        assert!(!repo.delete_citizen(id).await.unwrap());
        assert!(repo.list_citizens_by_code().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_reports_count() {
        let repo = setup_test().await;
        assert_eq!(repo.delete_all_citizens().await.unwrap(), 0);

        repo.insert_citizen(&new_citizen("A-01012000")).await.unwrap();
        repo.insert_citizen(&new_citizen("B-01012000")).await.unwrap();
        assert_eq!(repo.delete_all_citizens().await.unwrap(), 2);
        assert!(repo.list_citizens_by_code().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete_all_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registro_civil.db");

        let db = DbConnection::open(&path).await.unwrap();
        let repo = CitizenRepository::new(db.clone());
        let first = repo.insert_citizen(&new_citizen("A-01012000")).await.unwrap();
        repo.delete_all_citizens().await.unwrap();
        db.close().await;

        let repo = CitizenRepository::new(DbConnection::open(&path).await.unwrap());
        let second = repo.insert_citizen(&new_citizen("A-01012000")).await.unwrap();
        assert!(second > first);
    }
}
