use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

pub const SUGGESTED_GENDERS: [&str; 3] = ["Male", "Female", "Other"];
pub const SUGGESTED_DEPARTMENTS: [&str; 4] = ["Bcom", "BA", "BSC", "BCA"];

/// Store-assigned identity of a student. Opaque to everything but the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct StudentId(Uuid);

impl StudentId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for StudentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(alias = "_id")]
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub department: String,
    pub address: String,
}

/// Everything about a student except their id. Used as the body of both
/// creates and updates - updates always overwrite all five fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFields {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub department: String,
    pub address: String,
}

impl StudentRecord {
    pub fn from_fields(id: StudentId, fields: StudentFields) -> Self {
        let StudentFields {
            first_name,
            last_name,
            gender,
            department,
            address,
        } = fields;

        Self {
            id,
            first_name,
            last_name,
            gender,
            department,
            address,
        }
    }

    pub fn fields(&self) -> StudentFields {
        StudentFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender.clone(),
            department: self.department.clone(),
            address: self.address.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_camel_case_on_the_wire() {
        let record = StudentRecord::from_fields(
            StudentId::new_random(),
            StudentFields {
                first_name: "Anna".into(),
                last_name: "Smith".into(),
                gender: "Female".into(),
                department: "BCA".into(),
                address: "1 Main St".into(),
            },
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["firstName"], "Anna");
        assert_eq!(json["lastName"], "Smith");
        assert_eq!(json["id"], record.id.to_string());
    }

    #[test]
    fn underscore_id_is_accepted() {
        let id = StudentId::new_random();
        let json = serde_json::json!({
            "_id": id.to_string(),
            "firstName": "Bob",
            "lastName": "Anderson",
            "gender": "Male",
            "department": "BA",
            "address": "",
        });

        let record: StudentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.id, id);
    }

    #[test]
    fn fields_missing_a_key_are_rejected() {
        let json = serde_json::json!({
            "firstName": "Bob",
            "lastName": "Anderson",
            "gender": "Male",
            "department": "BA",
        });

        assert!(serde_json::from_value::<StudentFields>(json).is_err());
    }

    #[test]
    fn ids_parse_and_reject_garbage() {
        let id = StudentId::new_random();
        assert_eq!(id.to_string().parse::<StudentId>().unwrap(), id);
        assert!("65a1f0c2e4b0a1b2c3d4e5f6".parse::<StudentId>().is_err());
    }
}
