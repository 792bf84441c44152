//! Column role resolution.
//!
//! Named columns are classified into keyword families. When several columns
//! qualify as debit or credit, closing balances ("solde") win over plain
//! amounts, which win over period movements, which win over opening
//! balances ("à-nouveaux").

use super::header::tokens;
use super::types::ColumnMap;

const LABEL_TOKENS: &[&str] = &[
    "libelle", "intitule", "label", "designation", "description", "nom", "name",
];
const ACCOUNT_TOKENS: &[&str] = &[
    "compte", "comptes", "account", "numero", "num", "no", "code", "cpte", "acct",
];
const DEBIT_TOKENS: &[&str] = &["debit", "debits", "debiteur", "dr"];
const CREDIT_TOKENS: &[&str] = &["credit", "credits", "crediteur", "cr"];
const BALANCE_TOKENS: &[&str] = &["solde", "soldes", "balance", "net", "montant", "amount"];
const CLOSING_TOKENS: &[&str] = &["solde", "soldes", "balance", "closing", "final", "cloture", "fin"];
const MOVEMENT_TOKENS: &[&str] = &[
    "mouvement", "mouvements", "mvt", "mvts", "movement", "movements", "periode", "period", "flux",
];
const OPENING_TOKENS: &[&str] = &[
    "an", "anterieur", "anterieurs", "ouverture", "opening", "initial", "report", "nouveaux",
];

/// Which side of the trial balance a column reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum AmountKind {
    Opening,
    Movement,
    Plain,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Account,
    Label,
    Amount(Side, AmountKind),
    Balance,
}

fn has_any(tokens: &[String], family: &[&str]) -> bool {
    tokens.iter().any(|t| family.contains(&t.as_str()))
}

fn amount_kind(tokens: &[String]) -> AmountKind {
    if has_any(tokens, CLOSING_TOKENS) {
        AmountKind::Closing
    } else if has_any(tokens, MOVEMENT_TOKENS) {
        AmountKind::Movement
    } else if has_any(tokens, OPENING_TOKENS) {
        AmountKind::Opening
    } else {
        AmountKind::Plain
    }
}

fn side(tokens: &[String]) -> Option<Side> {
    if has_any(tokens, DEBIT_TOKENS) {
        return Some(Side::Debit);
    }
    if has_any(tokens, CREDIT_TOKENS) {
        return Some(Side::Credit);
    }

    // "SD"/"SC" abbreviations, and single letters qualified by a kind ("Solde D", "AN C").
    let qualified = tokens.len() > 1 && amount_kind(tokens) != AmountKind::Plain;
    tokens.iter().find_map(|t| match t.as_str() {
        "sd" => Some(Side::Debit),
        "sc" => Some(Side::Credit),
        "d" if qualified => Some(Side::Debit),
        "c" if qualified => Some(Side::Credit),
        _ => None,
    })
}

fn classify(name: &str) -> Option<Family> {
    let tokens = tokens(name);
    if tokens.is_empty() {
        return None;
    }

    if let Some(side) = side(&tokens) {
        let kind = if tokens.iter().any(|t| t == "sd" || t == "sc") {
            AmountKind::Closing
        } else {
            amount_kind(&tokens)
        };
        return Some(Family::Amount(side, kind));
    }
    if has_any(&tokens, BALANCE_TOKENS) {
        return Some(Family::Balance);
    }
    if has_any(&tokens, LABEL_TOKENS) {
        return Some(Family::Label);
    }
    if has_any(&tokens, ACCOUNT_TOKENS) {
        return Some(Family::Account);
    }
    None
}

/// Resolves column roles from header names.
///
/// Returns `None` if no account column can be identified. Amount roles may be
/// left unassigned; the caller then falls back to [`positional_layout`].
#[must_use]
pub fn resolve_named(names: &[String]) -> Option<ColumnMap> {
    let mut account = None;
    let mut label = None;
    let mut balance = None;
    let mut debit: Option<(usize, AmountKind)> = None;
    let mut credit: Option<(usize, AmountKind)> = None;

    for (index, name) in names.iter().enumerate() {
        match classify(name) {
            Some(Family::Account) => {
                account.get_or_insert(index);
            }
            Some(Family::Label) => {
                label.get_or_insert(index);
            }
            Some(Family::Balance) => {
                balance.get_or_insert(index);
            }
            Some(Family::Amount(side, kind)) => {
                let slot = match side {
                    Side::Debit => &mut debit,
                    Side::Credit => &mut credit,
                };
                if slot.is_none_or(|(_, best)| kind > best) {
                    *slot = Some((index, kind));
                }
            }
            None => {}
        }
    }

    Some(ColumnMap {
        account: account?,
        label,
        debit: debit.map(|(i, _)| i),
        credit: credit.map(|(i, _)| i),
        balance,
    })
}

/// Column roles for a header-less table of `width` columns.
///
/// | Width | Layout |
/// |-------|--------|
/// | 1 | account |
/// | 2 | account, balance |
/// | 3 | account, label, balance |
/// | 4 | account, label, solde debit, solde credit |
/// | 6 | account, label, mvt debit, mvt credit, solde debit, solde credit |
/// | 5, 7, 8+ | account, label, ..., solde debit, solde credit |
///
/// Returns `None` for an empty table.
#[must_use]
pub fn positional_layout(width: usize) -> Option<ColumnMap> {
    let map = match width {
        0 => return None,
        1 => ColumnMap {
            account: 0,
            ..ColumnMap::default()
        },
        2 => ColumnMap {
            account: 0,
            balance: Some(1),
            ..ColumnMap::default()
        },
        3 => ColumnMap {
            account: 0,
            label: Some(1),
            balance: Some(2),
            ..ColumnMap::default()
        },
        n => ColumnMap {
            account: 0,
            label: Some(1),
            debit: Some(n - 2),
            credit: Some(n - 1),
            balance: None,
        },
    };
    Some(map)
}
