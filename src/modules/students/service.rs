use anyhow::anyhow;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};

use edusys_core::capabilities::modules;
use edusys_core::{AppError, PaginationMeta, cpf};
use edusys_models::{
    CreateStudentDto, PaginatedStudentsResponse, Student, StudentFilterParams, StudentId,
    UpdateStudentDto,
};

use crate::metrics::track_record_created;

const STUDENT_COLUMNS: &str = "id, full_name, enrollment_code, email, phone_number, date_of_birth, \
     cpf, rg, address, city, state, zip_code, country, school_id, grade, class_room, shift, \
     enrollment_date, guardian_name, guardian_phone, guardian_email, guardian_cpf, is_active, \
     observations, created_at, updated_at";

fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let message = match db_err.constraint() {
                Some(c) if c.contains("cpf") => "A student with this CPF already exists",
                _ => "A student with this enrollment code already exists",
            };
            warn!(constraint = ?db_err.constraint(), "Duplicate student");
            return AppError::conflict(anyhow!(message));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::unprocessable(anyhow!("School does not exist"));
        }
    }
    error!(error = %e, "Database error writing student");
    AppError::from(e)
}

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db, dto), fields(student.enrollment_code = %dto.enrollment_code, db.operation = "INSERT", db.table = "students"))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let now = Utc::now();

        let student = sqlx::query_as::<_, Student>(&format!(
            "INSERT INTO students (id, full_name, enrollment_code, email, phone_number, date_of_birth,
                                   cpf, rg, address, city, state, zip_code, country, school_id, grade,
                                   class_room, shift, enrollment_date, guardian_name, guardian_phone,
                                   guardian_email, guardian_cpf, is_active, observations,
                                   created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                     $18, $19, $20, $21, $22, $23, $24, $25, $25)
             RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(StudentId::new())
        .bind(&dto.full_name)
        .bind(&dto.enrollment_code)
        .bind(&dto.email)
        .bind(&dto.phone_number)
        .bind(dto.date_of_birth)
        .bind(cpf::format(&dto.cpf))
        .bind(&dto.rg)
        .bind(&dto.address)
        .bind(&dto.city)
        .bind(&dto.state)
        .bind(&dto.zip_code)
        .bind(&dto.country)
        .bind(dto.school_id)
        .bind(&dto.grade)
        .bind(&dto.class_room)
        .bind(dto.shift)
        .bind(dto.enrollment_date)
        .bind(&dto.guardian_name)
        .bind(&dto.guardian_phone)
        .bind(&dto.guardian_email)
        .bind(cpf::format(&dto.guardian_cpf))
        .bind(dto.is_active)
        .bind(&dto.observations)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(map_write_error)?;

        track_record_created(modules::STUDENTS);
        info!(student.id = %student.id, school.id = %student.school_id, "Student created");

        Ok(student)
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "students"))]
    pub async fn get_all_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM students WHERE ($1::UUID IS NULL OR school_id = $1)",
        )
        .bind(filters.school_id)
        .fetch_one(db)
        .await?;

        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students
             WHERE ($1::UUID IS NULL OR school_id = $1)
             ORDER BY full_name, id
             LIMIT $2 OFFSET $3"
        ))
        .bind(filters.school_id)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        debug!(total, returned = students.len(), school.id = ?filters.school_id, "Students fetched");

        Ok(PaginatedStudentsResponse {
            data: students,
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "students"))]
    pub async fn get_student_by_id(db: &PgPool, id: StudentId) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "students"))]
    pub async fn update_student(
        db: &PgPool,
        id: StudentId,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let mut student = Self::get_student_by_id(db, id).await?;
        student.apply(dto);

        let updated = sqlx::query_as::<_, Student>(&format!(
            "UPDATE students
             SET full_name = $2, enrollment_code = $3, email = $4, phone_number = $5,
                 date_of_birth = $6, cpf = $7, rg = $8, address = $9, city = $10, state = $11,
                 zip_code = $12, country = $13, school_id = $14, grade = $15, class_room = $16,
                 shift = $17, enrollment_date = $18, guardian_name = $19, guardian_phone = $20,
                 guardian_email = $21, guardian_cpf = $22, is_active = $23, observations = $24,
                 updated_at = $25
             WHERE id = $1
             RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(id)
        .bind(&student.full_name)
        .bind(&student.enrollment_code)
        .bind(&student.email)
        .bind(&student.phone_number)
        .bind(student.date_of_birth)
        .bind(&student.cpf)
        .bind(&student.rg)
        .bind(&student.address)
        .bind(&student.city)
        .bind(&student.state)
        .bind(&student.zip_code)
        .bind(&student.country)
        .bind(student.school_id)
        .bind(&student.grade)
        .bind(&student.class_room)
        .bind(student.shift)
        .bind(student.enrollment_date)
        .bind(&student.guardian_name)
        .bind(&student.guardian_phone)
        .bind(&student.guardian_email)
        .bind(&student.guardian_cpf)
        .bind(student.is_active)
        .bind(&student.observations)
        .bind(Utc::now())
        .fetch_optional(db)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        info!(student.id = %id, "Student updated");

        Ok(updated)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "students"))]
    pub async fn delete_student(db: &PgPool, id: StudentId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        info!(student.id = %id, "Student deleted");

        Ok(())
    }
}
