//! Helpers that shape wallet lists against the user's enabled-wallet set.

use std::collections::HashMap;

use super::Wallet;

/// Keeps the wallets whose currency id appears in `currency_ids`
/// (case-insensitive), preserving the input order.
pub fn filter_by_currency_ids(wallets: Vec<Wallet>, currency_ids: &[String]) -> Vec<Wallet> {
    wallets
        .into_iter()
        .filter(|wallet| currency_ids.iter().any(|id| wallet.currency.matches_id(id)))
        .collect()
}

/// Orders wallets by the position of their currency id in `currency_ids`.
///
/// Wallets without a position keep their relative order after the listed ones.
pub fn apply_display_order(wallets: Vec<Wallet>, currency_ids: &[String]) -> Vec<Wallet> {
    let positions: HashMap<String, usize> = currency_ids
        .iter()
        .enumerate()
        .map(|(index, id)| (id.to_ascii_lowercase(), index))
        .collect();

    let mut ordered: Vec<(usize, Wallet)> = wallets
        .into_iter()
        .map(|wallet| {
            let position = positions
                .get(&wallet.currency.id.to_ascii_lowercase())
                .copied()
                .unwrap_or(usize::MAX);
            (position, wallet)
        })
        .collect();
    // stable sort keeps unlisted wallets in input order
    ordered.sort_by_key(|(position, _)| *position);
    ordered.into_iter().map(|(_, wallet)| wallet).collect()
}
