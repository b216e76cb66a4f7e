use anyhow::anyhow;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};

use edusys_core::capabilities::modules;
use edusys_core::{AppError, PaginationMeta};
use edusys_models::{
    CreateSchoolDto, PaginatedSchoolsResponse, School, SchoolFilterParams, SchoolId,
    UpdateSchoolDto,
};

use crate::metrics::track_record_created;

const SCHOOL_COLUMNS: &str = "id, name, code, address, city, state, zip_code, country, \
     phone_number, email, is_active, description, created_at, updated_at";

fn map_write_error(e: sqlx::Error, code: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        warn!(school.code = %code, "School code already in use");
        return AppError::conflict(anyhow!("School code already exists"));
    }
    error!(error = %e, "Database error writing school");
    AppError::from(e)
}

pub struct SchoolService;

impl SchoolService {
    #[instrument(skip(db, dto), fields(school.code = %dto.code, db.operation = "INSERT", db.table = "schools"))]
    pub async fn create_school(db: &PgPool, dto: CreateSchoolDto) -> Result<School, AppError> {
        let now = Utc::now();

        let school = sqlx::query_as::<_, School>(&format!(
            "INSERT INTO schools (id, name, code, address, city, state, zip_code, country,
                                  phone_number, email, is_active, description, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
             RETURNING {SCHOOL_COLUMNS}"
        ))
        .bind(SchoolId::new())
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(&dto.address)
        .bind(&dto.city)
        .bind(&dto.state)
        .bind(&dto.zip_code)
        .bind(&dto.country)
        .bind(&dto.phone_number)
        .bind(&dto.email)
        .bind(dto.is_active)
        .bind(&dto.description)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &dto.code))?;

        track_record_created(modules::SCHOOLS);
        info!(school.id = %school.id, school.name = %school.name, "School created");

        Ok(school)
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "schools"))]
    pub async fn get_all_schools(
        db: &PgPool,
        filters: SchoolFilterParams,
    ) -> Result<PaginatedSchoolsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();
        let name = filters.name.as_ref().map(|n| format!("%{}%", n));

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM schools WHERE ($1::TEXT IS NULL OR name ILIKE $1)",
        )
        .bind(&name)
        .fetch_one(db)
        .await?;

        let schools = sqlx::query_as::<_, School>(&format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools
             WHERE ($1::TEXT IS NULL OR name ILIKE $1)
             ORDER BY created_at DESC, id
             LIMIT $2 OFFSET $3"
        ))
        .bind(&name)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        debug!(total, returned = schools.len(), "Schools fetched");

        Ok(PaginatedSchoolsResponse {
            data: schools,
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "schools"))]
    pub async fn get_school_by_id(db: &PgPool, id: SchoolId) -> Result<School, AppError> {
        sqlx::query_as::<_, School>(&format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("School not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "schools"))]
    pub async fn update_school(
        db: &PgPool,
        id: SchoolId,
        dto: UpdateSchoolDto,
    ) -> Result<School, AppError> {
        let mut school = Self::get_school_by_id(db, id).await?;
        school.apply(dto);

        let updated = sqlx::query_as::<_, School>(&format!(
            "UPDATE schools
             SET name = $2, code = $3, address = $4, city = $5, state = $6, zip_code = $7,
                 country = $8, phone_number = $9, email = $10, is_active = $11,
                 description = $12, updated_at = $13
             WHERE id = $1
             RETURNING {SCHOOL_COLUMNS}"
        ))
        .bind(id)
        .bind(&school.name)
        .bind(&school.code)
        .bind(&school.address)
        .bind(&school.city)
        .bind(&school.state)
        .bind(&school.zip_code)
        .bind(&school.country)
        .bind(&school.phone_number)
        .bind(&school.email)
        .bind(school.is_active)
        .bind(&school.description)
        .bind(Utc::now())
        .fetch_optional(db)
        .await
        .map_err(|e| map_write_error(e, &school.code))?
        .ok_or_else(|| AppError::not_found(anyhow!("School not found")))?;

        info!(school.id = %id, "School updated");

        Ok(updated)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "schools"))]
    pub async fn delete_school(db: &PgPool, id: SchoolId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM schools WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::conflict(anyhow!("School still has enrolled students"));
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("School not found")));
        }

        info!(school.id = %id, "School deleted");

        Ok(())
    }
}
