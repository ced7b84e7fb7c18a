use uuid::Uuid;

use crate::error::{AppError, Result};

pub fn parse_record_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        AppError::BadRequest(format!(
            "Cast to UUID failed for value \"{raw}\" (type string) at path \"_id\""
        ))
    })
}
