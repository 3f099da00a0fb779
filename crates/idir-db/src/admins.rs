use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Connection as SqlConnection, QueryBuilder, Sqlite};
use tracing::info;

use idir_data::{
    password, Admin, AdminFilter, AdminRole, Delete, Insert, Query, Retrieve,
};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<Admin> for Connection {
    type Filter = AdminFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Admin>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "SELECT uid, email, name, role, password_hash FROM admins WHERE 1",
        );
        if let Some(uid) = filter.uid.clone() {
            qry.push(" AND uid = ").push_bind(uid);
        }
        if let Some(email) = filter.email.clone() {
            qry.push(" AND email = ").push_bind(email);
        }
        if let Some(role) = filter.role {
            qry.push(" AND role = ").push_bind(role);
        }
        qry.push(" ORDER BY email");

        let admins: Vec<Admin> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(admins)
    }
}

#[async_trait]
impl Retrieve<Admin> for Connection {
    type Key = String;

    async fn retrieve(&self, uid: Self::Key) -> Result<Admin> {
        let filter = AdminFilter {
            uid: Some(uid),
            ..Default::default()
        };
        let admin = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(admin)
    }
}

#[async_trait]
impl Insert<Admin> for Connection {
    /// Create a back-office account. Fails if the email is taken.
    async fn insert(&self, admin: Admin) -> Result<Admin> {
        {
            let mut conn = self.lock().await;
            let existing: Option<Id<String>> =
                sqlx::query_as("SELECT uid AS id FROM admins WHERE email = ?")
                    .bind(&admin.email)
                    .fetch_optional(&mut *conn)
                    .await?;
            if existing.is_some() {
                return Err(QueryError::Duplicate(admin.email).into());
            }
            sqlx::query(
                r#"
                INSERT INTO admins (uid, email, name, role, password_hash)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&admin.uid)
            .bind(&admin.email)
            .bind(&admin.name)
            .bind(admin.role)
            .bind(&admin.password_hash)
            .execute(&mut *conn)
            .await?;
        }
        info!(email = %admin.email, "created admin account");
        self.retrieve(admin.uid).await
    }
}

#[async_trait]
impl Delete<Admin> for Connection {
    /// Delete an account. Refuses to remove the last superAdmin;
    /// the count and the delete run in one transaction.
    async fn delete(&self, admin: Admin) -> Result<()> {
        let mut conn = self.lock().await;
        let mut tx = conn.begin().await?;

        if admin.is_super() {
            let supers: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM admins WHERE role = 'superAdmin'",
            )
            .fetch_one(&mut *tx)
            .await?;
            if supers <= 1 {
                return Err(QueryError::LastSuperAdmin.into());
            }
        }

        sqlx::query("DELETE FROM admins WHERE uid = ?")
            .bind(&admin.uid)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

impl Connection {
    pub async fn admin_by_email(&self, email: &str) -> Result<Admin> {
        let admin = self
            .query(&AdminFilter {
                email: Some(email.to_string()),
                ..Default::default()
            })
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(admin)
    }

    /// Check credentials. Blocked accounts always fail.
    pub async fn verify_login(&self, email: &str, pass: &str) -> Result<Admin> {
        let admin = match self.admin_by_email(email).await {
            Ok(admin) => admin,
            Err(_) => return Err(QueryError::InvalidCredentials.into()),
        };
        if admin.role == AdminRole::Blocked {
            return Err(QueryError::InvalidCredentials.into());
        }
        if !password::verify_password(pass, &admin.password_hash) {
            return Err(QueryError::InvalidCredentials.into());
        }
        Ok(admin)
    }

    /// Change an account's role. Demoting the last superAdmin is
    /// refused; the check and the write share a transaction so two
    /// concurrent demotions cannot both pass the count.
    pub async fn set_admin_role(&self, uid: &str, role: AdminRole) -> Result<Admin> {
        {
            let mut conn = self.lock().await;
            let mut tx = conn.begin().await?;

            let admin: Option<Admin> =
                sqlx::query_as("SELECT * FROM admins WHERE uid = ?")
                    .bind(uid)
                    .fetch_optional(&mut *tx)
                    .await?;
            let admin = admin.ok_or(QueryError::NotFound)?;

            if admin.is_super() && role != AdminRole::SuperAdmin {
                let supers: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM admins WHERE role = 'superAdmin'",
                )
                .fetch_one(&mut *tx)
                .await?;
                if supers <= 1 {
                    return Err(QueryError::LastSuperAdmin.into());
                }
            }

            sqlx::query("UPDATE admins SET role = ? WHERE uid = ?")
                .bind(role)
                .bind(uid)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
        }
        self.retrieve(uid.to_string()).await
    }

    /// Store a new password hash for an account.
    pub async fn reset_admin_password(&self, uid: &str, pass: &str) -> Result<Admin> {
        {
            let hash = password::hash_password(pass);
            let mut conn = self.lock().await;
            let result = sqlx::query("UPDATE admins SET password_hash = ? WHERE uid = ?")
                .bind(hash)
                .bind(uid)
                .execute(&mut *conn)
                .await?;
            if result.rows_affected() == 0 {
                return Err(QueryError::NotFound.into());
            }
        }
        self.retrieve(uid.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn add_admin(db: &Connection, email: &str, role: AdminRole) -> Admin {
        db.insert(Admin {
            uid: password::generate_uid(),
            email: email.to_string(),
            name: email.split('@').next().unwrap().to_string(),
            role,
            password_hash: password::hash_password("s3cret"),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_admin_insert_duplicate_email() {
        let db = Connection::open_test().await;
        add_admin(&db, "chair@idir.org", AdminRole::SuperAdmin).await;

        let err = db
            .insert(Admin {
                uid: password::generate_uid(),
                email: "chair@idir.org".to_string(),
                ..Admin::default()
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_verify_login() {
        let db = Connection::open_test().await;
        add_admin(&db, "chair@idir.org", AdminRole::SuperAdmin).await;

        let admin = db.verify_login("chair@idir.org", "s3cret").await.unwrap();
        assert_eq!(admin.email, "chair@idir.org");

        assert!(db.verify_login("chair@idir.org", "wrong").await.is_err());
        assert!(db.verify_login("nobody@idir.org", "s3cret").await.is_err());
    }

    #[tokio::test]
    async fn test_blocked_admin_cannot_login() {
        let db = Connection::open_test().await;
        let admin = add_admin(&db, "ex@idir.org", AdminRole::Blocked).await;
        assert!(db.verify_login(&admin.email, "s3cret").await.is_err());
    }

    #[tokio::test]
    async fn test_last_superadmin_cannot_be_demoted() {
        let db = Connection::open_test().await;
        let chair = add_admin(&db, "chair@idir.org", AdminRole::SuperAdmin).await;

        let err = db
            .set_admin_role(&chair.uid, AdminRole::RegularAdmin)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("superAdmin must remain"));

        // With a second superAdmin the demotion goes through
        add_admin(&db, "deputy@idir.org", AdminRole::SuperAdmin).await;
        let chair = db
            .set_admin_role(&chair.uid, AdminRole::RegularAdmin)
            .await
            .unwrap();
        assert_eq!(chair.role, AdminRole::RegularAdmin);
    }

    #[tokio::test]
    async fn test_last_superadmin_cannot_be_deleted() {
        let db = Connection::open_test().await;
        let chair = add_admin(&db, "chair@idir.org", AdminRole::SuperAdmin).await;

        let err = db.delete(chair.clone()).await.unwrap_err();
        assert!(err.to_string().contains("superAdmin must remain"));

        add_admin(&db, "deputy@idir.org", AdminRole::SuperAdmin).await;
        db.delete(chair).await.unwrap();

        let remaining: Vec<Admin> = db.query(&AdminFilter::default()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].email, "deputy@idir.org");
    }

    #[tokio::test]
    async fn test_reset_password() {
        let db = Connection::open_test().await;
        let admin = add_admin(&db, "chair@idir.org", AdminRole::SuperAdmin).await;

        db.reset_admin_password(&admin.uid, "n3w-pass").await.unwrap();
        assert!(db.verify_login("chair@idir.org", "s3cret").await.is_err());
        db.verify_login("chair@idir.org", "n3w-pass").await.unwrap();
    }
}
