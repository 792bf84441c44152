//! `SeaORM` entity definitions.

pub mod accounts;
pub mod documents;
pub mod entries;
pub mod entry_lines;
pub mod journals;
pub mod report_templates;

pub mod prelude {
    //! Entity re-exports.
    pub use super::accounts::Entity as Accounts;
    pub use super::documents::Entity as Documents;
    pub use super::entries::Entity as Entries;
    pub use super::entry_lines::Entity as EntryLines;
    pub use super::journals::Entity as Journals;
    pub use super::report_templates::Entity as ReportTemplates;
}
