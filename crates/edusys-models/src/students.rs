//! Students, with their address, enrollment and guardian details kept as flat
//! columns on a single row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use edusys_core::PaginationMeta;
use edusys_core::cpf;
use edusys_core::pagination::PaginationParams;

use crate::ids::{SchoolId, StudentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "student_shift", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub full_name: String,
    pub enrollment_code: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub cpf: String,
    pub rg: String,

    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,

    pub school_id: SchoolId,
    pub grade: String,
    pub class_room: String,
    pub shift: Shift,
    pub enrollment_date: NaiveDate,

    pub guardian_name: String,
    pub guardian_phone: String,
    pub guardian_email: String,
    pub guardian_cpf: String,

    pub is_active: bool,
    pub observations: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn valid_cpf(value: &str) -> Result<(), ValidationError> {
    if cpf::is_valid(value) {
        Ok(())
    } else {
        Err(ValidationError::new("cpf"))
    }
}

fn not_in_future(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Utc::now().date_naive() {
        return Err(ValidationError::new("future_date"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, message = "full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "enrollment code is required"))]
    pub enrollment_code: String,
    #[validate(email(message = "invalid student email"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone number is required"))]
    pub phone_number: String,
    #[validate(custom(function = "not_in_future", message = "date of birth cannot be in the future"))]
    pub date_of_birth: NaiveDate,
    #[validate(custom(function = "valid_cpf", message = "invalid student cpf"))]
    pub cpf: String,
    #[validate(length(min = 1, message = "rg is required"))]
    pub rg: String,

    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "state is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "zip code is required"))]
    pub zip_code: String,
    #[validate(length(min = 1, message = "country is required"))]
    pub country: String,

    pub school_id: SchoolId,
    #[validate(length(min = 1, message = "grade is required"))]
    pub grade: String,
    #[validate(length(min = 1, message = "class room is required"))]
    pub class_room: String,
    pub shift: Shift,
    pub enrollment_date: NaiveDate,

    #[validate(length(min = 1, message = "guardian name is required"))]
    pub guardian_name: String,
    #[validate(length(min = 1, message = "guardian phone is required"))]
    pub guardian_phone: String,
    #[validate(length(min = 1, message = "guardian email is required"))]
    pub guardian_email: String,
    #[validate(custom(function = "valid_cpf", message = "invalid guardian cpf"))]
    pub guardian_cpf: String,

    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub observations: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, message = "full name cannot be empty"))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, message = "enrollment code cannot be empty"))]
    pub enrollment_code: Option<String>,
    #[validate(email(message = "invalid student email"))]
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[validate(custom(function = "not_in_future", message = "date of birth cannot be in the future"))]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(custom(function = "valid_cpf", message = "invalid student cpf"))]
    pub cpf: Option<String>,
    pub rg: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,

    pub school_id: Option<SchoolId>,
    pub grade: Option<String>,
    pub class_room: Option<String>,
    pub shift: Option<Shift>,
    pub enrollment_date: Option<NaiveDate>,

    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
    #[validate(custom(function = "valid_cpf", message = "invalid guardian cpf"))]
    pub guardian_cpf: Option<String>,

    pub is_active: Option<bool>,
    pub observations: Option<String>,
}

impl Student {
    /// Merges a partial update. CPFs are stored in their formatted form.
    pub fn apply(&mut self, dto: UpdateStudentDto) {
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = dto.$field { self.$field = value; })*
            };
        }
        set!(
            full_name,
            enrollment_code,
            email,
            phone_number,
            date_of_birth,
            rg,
            address,
            city,
            state,
            zip_code,
            country,
            school_id,
            grade,
            class_room,
            shift,
            enrollment_date,
            guardian_name,
            guardian_phone,
            guardian_email,
            is_active,
            observations,
        );
        if let Some(value) = dto.cpf {
            self.cpf = cpf::format(&value);
        }
        if let Some(value) = dto.guardian_cpf {
            self.guardian_cpf = cpf::format(&value);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFilterParams {
    pub school_id: Option<SchoolId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<Student>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "full_name": "Maria Souza",
            "enrollment_code": "2025-0001",
            "email": "maria@example.com",
            "phone_number": "+55 11 90000-0000",
            "date_of_birth": "2012-04-09",
            "cpf": "529.982.247-25",
            "rg": "12.345.678-9",
            "address": "Rua B, 20",
            "city": "São Paulo",
            "state": "SP",
            "zip_code": "01000-000",
            "country": "BR",
            "school_id": SchoolId::new(),
            "grade": "7",
            "class_room": "7A",
            "shift": "morning",
            "enrollment_date": "2025-02-01",
            "guardian_name": "João Souza",
            "guardian_phone": "+55 11 98888-0000",
            "guardian_email": "joao@example.com",
            "guardian_cpf": "11144477735"
        })
    }

    fn dto() -> CreateStudentDto {
        serde_json::from_value(payload()).unwrap()
    }

    #[test]
    fn test_valid_student() {
        let dto = dto();
        assert!(dto.validate().is_ok());
        assert!(dto.is_active);
        assert_eq!(dto.observations, "");
        assert_eq!(dto.shift, Shift::Morning);
    }

    #[test]
    fn test_unknown_shift_fails_to_deserialize() {
        let mut value = payload();
        value["shift"] = json!("night");
        assert!(serde_json::from_value::<CreateStudentDto>(value).is_err());
    }

    #[test]
    fn test_invalid_cpfs_are_reported_separately() {
        let mut dto = dto();
        dto.cpf = "111.111.111-11".into();
        dto.guardian_cpf = "123".into();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["cpf"][0].message.as_deref(), Some("invalid student cpf"));
        assert_eq!(
            fields["guardian_cpf"][0].message.as_deref(),
            Some("invalid guardian cpf")
        );
    }

    #[test]
    fn test_birth_date_in_future_rejected() {
        let mut dto = dto();
        dto.date_of_birth = Utc::now().date_naive() + Days::new(1);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_missing_full_name() {
        let mut dto = dto();
        dto.full_name = String::new();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("full_name"));
    }

    #[test]
    fn test_update_rejects_invalid_cpf() {
        let dto = UpdateStudentDto {
            cpf: Some("52998224724".into()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }
}
