//! SQLite serialization for typed enums
//!
//! Every enum is stored as its display text, which is also the wire value
//! (`Created`, `Construction`, `LLC`, ...), so rows written by other clients
//! of the same schema read back unchanged.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::core::entity::{
    AuthorType, BidStatus, OrganizationType, ServiceType, TenderStatus, Verdict,
};

macro_rules! text_column {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.to_string()))
                }
            }

            impl FromSql for $ty {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    let s = value.as_str()?;
                    s.parse()
                        .map_err(|e: String| FromSqlError::Other(Box::new(std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            e,
                        ))))
                }
            }
        )+
    };
}

text_column!(
    TenderStatus,
    BidStatus,
    ServiceType,
    AuthorType,
    Verdict,
    OrganizationType,
);
