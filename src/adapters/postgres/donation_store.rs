//! PostgreSQL implementation of DonationStore.
//!
//! `deactivate_fund` runs in one transaction and locks the fund row, so the
//! fund and its donations change together or not at all.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::donation::{Donation, DonationPayment, Fund};
use crate::domain::foundation::{DomainError, DonationId, DonorId, ErrorCode, FundId};
use crate::ports::DonationStore;

pub struct PostgresDonationStore {
    pool: PgPool,
}

impl PostgresDonationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FundRow {
    id: Uuid,
    name: String,
    active: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct DonationRow {
    id: Uuid,
    fund_id: Uuid,
    donor_id: Uuid,
    remote_subscription_id: Option<String>,
    recurring: bool,
    active: bool,
}

impl From<DonationRow> for Donation {
    fn from(row: DonationRow) -> Self {
        Donation {
            id: DonationId::from_uuid(row.id),
            fund_id: FundId::from_uuid(row.fund_id),
            donor_id: DonorId::from_uuid(row.donor_id),
            remote_subscription_id: row.remote_subscription_id,
            recurring: row.recurring,
            active: row.active,
        }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, e))
}

fn donation_not_found(subscription_id: &str) -> DomainError {
    DomainError::new(ErrorCode::DonationNotFound, "Donation not found")
        .with_detail("subscription_id", subscription_id)
}

async fn set_donation_active(
    pool: &PgPool,
    subscription_id: &str,
    active: bool,
) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE donations SET active = $2, updated_at = NOW()
        WHERE remote_subscription_id = $1
        "#,
    )
    .bind(subscription_id)
    .bind(active)
    .execute(pool)
    .await
    .map_err(|e| db_error("Failed to update donation", e))?;

    if result.rows_affected() == 0 {
        return Err(donation_not_found(subscription_id));
    }
    Ok(())
}

async fn upsert_donation(
    tx: &mut Transaction<'_, Postgres>,
    donation: &Donation,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO donations (id, fund_id, donor_id, remote_subscription_id, recurring, active)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE SET
            fund_id = EXCLUDED.fund_id,
            remote_subscription_id = EXCLUDED.remote_subscription_id,
            recurring = EXCLUDED.recurring,
            active = EXCLUDED.active,
            updated_at = NOW()
        "#,
    )
    .bind(donation.id.as_uuid())
    .bind(donation.fund_id.as_uuid())
    .bind(donation.donor_id.as_uuid())
    .bind(&donation.remote_subscription_id)
    .bind(donation.recurring)
    .bind(donation.active)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to save donation", e))?;
    Ok(())
}

#[async_trait]
impl DonationStore for PostgresDonationStore {
    async fn save_fund(&self, fund: &Fund) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO funds (id, name, active) VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                active = EXCLUDED.active,
                updated_at = NOW()
            "#,
        )
        .bind(fund.id.as_uuid())
        .bind(&fund.name)
        .bind(fund.active)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to save fund", e))?;

        for donation in &fund.donations {
            upsert_donation(&mut tx, donation).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(())
    }

    async fn find_fund(&self, fund_id: &FundId) -> Result<Option<Fund>, DomainError> {
        let row: Option<FundRow> =
            sqlx::query_as("SELECT id, name, active FROM funds WHERE id = $1")
                .bind(fund_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find fund", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let donations: Vec<DonationRow> = sqlx::query_as(
            r#"
            SELECT id, fund_id, donor_id, remote_subscription_id, recurring, active
            FROM donations WHERE fund_id = $1 ORDER BY id
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load donations", e))?;

        Ok(Some(Fund {
            id: FundId::from_uuid(row.id),
            name: row.name,
            active: row.active,
            donations: donations.into_iter().map(Donation::from).collect(),
        }))
    }

    async fn deactivate_fund(&self, fund_id: &FundId) -> Result<Vec<Donation>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let fund = sqlx::query("UPDATE funds SET active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(fund_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to deactivate fund", e))?;

        if fund.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::FundNotFound, "Fund not found")
                .with_detail("fund_id", fund_id.to_string()));
        }

        let rows: Vec<DonationRow> = sqlx::query_as(
            r#"
            UPDATE donations SET active = FALSE, updated_at = NOW()
            WHERE fund_id = $1
            RETURNING id, fund_id, donor_id, remote_subscription_id, recurring, active
            "#,
        )
        .bind(fund_id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to deactivate donations", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(rows.into_iter().map(Donation::from).collect())
    }

    async fn reactivate_donation_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<(), DomainError> {
        set_donation_active(&self.pool, subscription_id, true).await
    }

    async fn deactivate_donation_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<(), DomainError> {
        set_donation_active(&self.pool, subscription_id, false).await
    }

    async fn find_donation_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Donation>, DomainError> {
        let row: Option<DonationRow> = sqlx::query_as(
            r#"
            SELECT id, fund_id, donor_id, remote_subscription_id, recurring, active
            FROM donations WHERE remote_subscription_id = $1
            "#,
        )
        .bind(subscription_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find donation", e))?;

        Ok(row.map(Donation::from))
    }

    async fn record_payment(&self, payment: &DonationPayment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO donation_payments (id, donation_id, provider_payment_id, amount_cents, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (provider_payment_id) DO NOTHING
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.donation_id.as_uuid())
        .bind(&payment.provider_payment_id)
        .bind(payment.amount_cents)
        .bind(payment.recorded_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to record payment", e))?;
        Ok(())
    }
}
