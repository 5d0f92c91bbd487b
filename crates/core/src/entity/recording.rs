use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::CollectionKind;
use crate::convention::{Timestamp, Timestamps};
use crate::storage::schema::{CUSTOMER_ID, ID, TM_CREATE, TM_DELETE, TM_UPDATE};
use crate::storage::{Column, EntitySchema, FieldValue, RepositoryError, Result, Row};

use super::{enum_from_text, enum_to_text, read_timestamps, write_timestamps, Entity};

pub const REFERENCE_TYPE: &str = "reference_type";
pub const REFERENCE_ID: &str = "reference_id";
pub const STATUS: &str = "status";
pub const FORMAT: &str = "format";
pub const FILENAMES: &str = "filenames";
pub const TM_START: &str = "tm_start";
pub const TM_END: &str = "tm_end";

static COLUMNS: [Column; 12] = [
    Column::id(ID),
    Column::id(CUSTOMER_ID),
    Column::text(REFERENCE_TYPE),
    Column::id(REFERENCE_ID),
    Column::text(STATUS),
    Column::text(FORMAT),
    Column::list(FILENAMES),
    Column::timestamp(TM_START),
    Column::timestamp(TM_END),
    Column::timestamp(TM_CREATE),
    Column::timestamp(TM_UPDATE),
    Column::timestamp(TM_DELETE),
];

pub static SCHEMA: EntitySchema = EntitySchema {
    entity_type: "Recording",
    table: "call_recordings",
    cache_prefix: "recording",
    columns: &COLUMNS,
    secondary_keys: &[],
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    #[default]
    Call,
    Conference,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    #[default]
    Initiating,
    Recording,
    Stopping,
    Ended,
}

impl FromStr for RecordingStatus {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "initiating" => Ok(Self::Initiating),
            "recording" => Ok(Self::Recording),
            "stopping" => Ok(Self::Stopping),
            "ended" => Ok(Self::Ended),
            other => Err(RepositoryError::InvalidStatus {
                entity_type: SCHEMA.entity_type,
                status: other.to_string(),
            }),
        }
    }
}

/// A call or conference recording and the files it produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub reference_type: ReferenceType,
    pub reference_id: Uuid,
    pub status: RecordingStatus,
    pub format: String,
    pub filenames: Vec<String>,
    pub tm_start: Timestamp,
    pub tm_end: Timestamp,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Recording {
    pub fn new(customer_id: Uuid, reference_type: ReferenceType, reference_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            reference_type,
            reference_id,
            format: "wav".to_string(),
            ..Self::default()
        }
    }

    /// Sets a specific ID for this recording (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// Fields written when a recording moves to `status`.
///
/// Entering `recording` stamps the start time and entering `ended` stamps the
/// end time. The source status is not checked. `initiating` is only ever an
/// initial status and is rejected as a target.
pub fn transition_fields(
    status: RecordingStatus,
    now: Timestamp,
) -> Result<Vec<(&'static str, FieldValue)>> {
    let status_field = (STATUS, enum_to_text(&status)?);
    match status {
        RecordingStatus::Recording => Ok(vec![status_field, (TM_START, now.into())]),
        RecordingStatus::Stopping => Ok(vec![status_field]),
        RecordingStatus::Ended => Ok(vec![status_field, (TM_END, now.into())]),
        RecordingStatus::Initiating => Err(RepositoryError::InvalidStatus {
            entity_type: SCHEMA.entity_type,
            status: "initiating".to_string(),
        }),
    }
}

impl Entity for Recording {
    const SCHEMA: &'static EntitySchema = &SCHEMA;

    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn to_row(&self) -> Result<Row> {
        let mut row = Row::new()
            .with(ID, self.id)
            .with(CUSTOMER_ID, self.customer_id)
            .with(REFERENCE_TYPE, enum_to_text(&self.reference_type)?)
            .with(REFERENCE_ID, self.reference_id)
            .with(STATUS, enum_to_text(&self.status)?)
            .with(FORMAT, self.format.as_str())
            .with(
                FILENAMES,
                FieldValue::collection(CollectionKind::List, &self.filenames)?,
            )
            .with(TM_START, self.tm_start)
            .with(TM_END, self.tm_end);
        write_timestamps(&mut row, &self.timestamps);
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.id(ID)?,
            customer_id: row.id(CUSTOMER_ID)?,
            reference_type: enum_from_text(row, REFERENCE_TYPE)?,
            reference_id: row.id(REFERENCE_ID)?,
            status: enum_from_text(row, STATUS)?,
            format: row.text(FORMAT)?,
            filenames: row.collection(FILENAMES)?,
            tm_start: row.timestamp(TM_START)?,
            tm_end: row.timestamp(TM_END)?,
            timestamps: read_timestamps(row)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ErrorClass;

    fn now() -> Timestamp {
        "2024-06-15 10:30:00.000000".parse().unwrap()
    }

    #[test]
    fn test_schema_conventions() {
        assert!(SCHEMA.check_conventions().is_ok());
    }

    #[test]
    fn test_row_mapping() {
        let mut recording = Recording::new(
            Uuid::from_u128(1),
            ReferenceType::Conference,
            Uuid::from_u128(2),
        );
        recording.filenames = vec!["a.wav".to_string(), "b.wav".to_string()];
        recording.tm_start = now();

        let row = recording.to_row().unwrap();
        assert_eq!(Recording::from_row(&row).unwrap(), recording);
    }

    #[test]
    fn test_transition_to_recording_stamps_start() {
        let fields = transition_fields(RecordingStatus::Recording, now()).unwrap();
        assert_eq!(
            fields,
            vec![
                (STATUS, FieldValue::Text("recording".to_string())),
                (TM_START, FieldValue::Timestamp(now())),
            ]
        );
    }

    #[test]
    fn test_transition_to_stopping_writes_status_only() {
        let fields = transition_fields(RecordingStatus::Stopping, now()).unwrap();
        assert_eq!(fields, vec![(STATUS, FieldValue::Text("stopping".to_string()))]);
    }

    #[test]
    fn test_transition_to_ended_stamps_end() {
        let fields = transition_fields(RecordingStatus::Ended, now()).unwrap();
        assert_eq!(
            fields,
            vec![
                (STATUS, FieldValue::Text("ended".to_string())),
                (TM_END, FieldValue::Timestamp(now())),
            ]
        );
    }

    #[test]
    fn test_transition_to_initiating_is_rejected() {
        let err = transition_fields(RecordingStatus::Initiating, now()).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Caller);
    }

    #[test]
    fn test_parse_unknown_status() {
        assert_eq!("ended".parse::<RecordingStatus>().unwrap(), RecordingStatus::Ended);
        assert_eq!(
            "paused".parse::<RecordingStatus>(),
            Err(RepositoryError::InvalidStatus {
                entity_type: "Recording",
                status: "paused".to_string(),
            })
        );
    }
}
