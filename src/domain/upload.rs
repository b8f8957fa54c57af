// Upload domain models - CSV import history and receipts
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Batch,
    Qc,
    Complaint,
    Capa,
    Equipment,
    Environmental,
    RawMaterial,
    Stability,
}

impl DataType {
    pub const ALL: [DataType; 8] = [
        DataType::Batch,
        DataType::Qc,
        DataType::Complaint,
        DataType::Capa,
        DataType::Equipment,
        DataType::Environmental,
        DataType::RawMaterial,
        DataType::Stability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Batch => "batch",
            DataType::Qc => "qc",
            DataType::Complaint => "complaint",
            DataType::Capa => "capa",
            DataType::Equipment => "equipment",
            DataType::Environmental => "environmental",
            DataType::RawMaterial => "raw_material",
            DataType::Stability => "stability",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown data type: {0}")]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownDataType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub filename: String,
    pub records_count: u32,
    pub data_type: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub filename: String,
    pub records_imported: u32,
    #[serde(default)]
    pub data_type: Option<String>,
}

// The backend serialises naive UTC timestamps without an offset
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
