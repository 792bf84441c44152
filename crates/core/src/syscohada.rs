//! SYSCOHADA chart-of-accounts conventions.
//!
//! Accounts are identified by a numeric-prefixed code whose first digit is
//! the account class:
//!
//! | Class | Content |
//! |-------|---------|
//! | 1 | Ressources durables (equity, long-term debt) |
//! | 2 | Actif immobilisé |
//! | 3 | Stocks |
//! | 4 | Tiers (receivables, payables) |
//! | 5 | Trésorerie |
//! | 6 | Charges |
//! | 7 | Produits |
//! | 8 | Autres charges et produits (HAO) |
//! | 9 | Comptabilité analytique |

use auditia_shared::types::CompanyId;
use tracing::info;

use crate::ledger::{LedgerError, LedgerStore, NewAccount};

/// Class code used when a code has no leading digit.
pub const UNKNOWN_CLASS: u8 = 0;

/// Returns the SYSCOHADA class of an account code (first digit, 0 if none).
#[must_use]
pub fn class_of(code: &str) -> u8 {
    code.trim()
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .and_then(|d| u8::try_from(d).ok())
        .unwrap_or(UNKNOWN_CLASS)
}

/// Returns true for classes 1 to 9.
#[must_use]
pub fn is_known_class(class_code: u8) -> bool {
    (1..=9).contains(&class_code)
}

/// Balance sheet classes (1 to 5).
#[must_use]
pub fn is_balance_sheet_class(class_code: u8) -> bool {
    (1..=5).contains(&class_code)
}

/// Income statement classes (6 to 8).
#[must_use]
pub fn is_income_class(class_code: u8) -> bool {
    (6..=8).contains(&class_code)
}

/// An account of the reference chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardAccount {
    /// Account code.
    pub code: &'static str,
    /// Account name.
    pub name: &'static str,
}

impl StandardAccount {
    /// Class derived from the code.
    #[must_use]
    pub fn class_code(&self) -> u8 {
        class_of(self.code)
    }
}

/// Core accounts of the SYSCOHADA révisé chart, classes 1 to 7.
pub const STANDARD_CHART: &[StandardAccount] = &[
    // Classe 1 : ressources durables
    StandardAccount { code: "101", name: "Capital social" },
    StandardAccount { code: "111", name: "Réserves légales" },
    StandardAccount { code: "121", name: "Report à nouveau créditeur" },
    StandardAccount { code: "131", name: "Résultat net : Bénéfice" },
    StandardAccount { code: "139", name: "Résultat net : Perte" },
    // Classe 2 : actif immobilisé
    StandardAccount { code: "211", name: "Terrains" },
    StandardAccount { code: "212", name: "Agencements et aménagements de terrains" },
    StandardAccount { code: "213", name: "Constructions" },
    StandardAccount { code: "215", name: "Installations techniques, matériels et outillages" },
    StandardAccount { code: "218", name: "Autres immobilisations corporelles" },
    // Classe 3 : stocks
    StandardAccount { code: "311", name: "Marchandises" },
    StandardAccount { code: "321", name: "Matières premières et fournitures" },
    // Classe 4 : tiers
    StandardAccount { code: "401", name: "Fournisseurs, dettes en compte" },
    StandardAccount { code: "411", name: "Clients" },
    StandardAccount { code: "441", name: "État, impôt sur les bénéfices" },
    StandardAccount { code: "443", name: "État, TVA facturée" },
    StandardAccount { code: "444", name: "État, Impôts et taxes dus" },
    StandardAccount { code: "445", name: "État, TVA récupérable" },
    // Classe 5 : trésorerie
    StandardAccount { code: "521", name: "Banques" },
    StandardAccount { code: "571", name: "Caisse" },
    // Classe 6 : charges
    StandardAccount { code: "601", name: "Achats de marchandises" },
    StandardAccount { code: "602", name: "Achats de matières premières" },
    StandardAccount { code: "604", name: "Achats d'études et prestations de services" },
    StandardAccount { code: "605", name: "Autres achats" },
    StandardAccount { code: "611", name: "Transports" },
    StandardAccount { code: "621", name: "Services extérieurs A" },
    StandardAccount { code: "622", name: "Services extérieurs B" },
    StandardAccount { code: "631", name: "Frais de personnel" },
    // Classe 7 : produits
    StandardAccount { code: "701", name: "Ventes de marchandises" },
    StandardAccount { code: "706", name: "Services vendus" },
];

/// Seeds the reference chart for a company.
///
/// Does nothing when the company already has accounts. Returns the number of
/// accounts created.
pub async fn seed_standard_chart(
    store: &dyn LedgerStore,
    company_id: CompanyId,
) -> Result<usize, LedgerError> {
    if !store.list_accounts(company_id).await?.is_empty() {
        info!(%company_id, "chart already present, seeding skipped");
        return Ok(0);
    }

    let mut created = 0;
    for standard in STANDARD_CHART {
        let (_, was_created) = store
            .get_or_create_account(NewAccount::new(company_id, standard.code, standard.name))
            .await?;
        if was_created {
            created += 1;
        }
    }

    info!(%company_id, created, "standard chart seeded");
    Ok(created)
}
