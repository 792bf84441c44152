//! Typed IDs for ledger records.
//!
//! Each record kind gets its own UUID newtype, so a `DocumentId` cannot be
//! passed where a `CompanyId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh time-ordered (v7) ID.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Underlying UUID, as stored in the database.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        // Rows loaded from the database
        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        // Command-line arguments
        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

typed_id!(CompanyId, "Company (dossier) owning a ledger.");
typed_id!(AccountId, "Chart of accounts entry.");
typed_id!(JournalId, "Accounting journal.");
typed_id!(EntryId, "Journal entry.");
typed_id!(EntryLineId, "Line of a journal entry.");
typed_id!(DocumentId, "Imported source document.");
typed_id!(TemplateId, "Registered report template.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
