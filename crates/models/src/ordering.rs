//! Position bookkeeping for [`Ordered`] records.
//!
//! Orders are only meaningful inside a sibling group; every rewrite leaves
//! the touched group numbered `0..n-1`.

use crate::entity::Ordered;
use crate::errors::ModelError;

/// Indices of the records in `group`, sorted by their current order.
/// Ties keep their position in `items`.
fn group_indices<E: Ordered>(items: &[E], group: Option<&str>) -> Vec<usize> {
    let mut idx: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, e)| e.group_key() == group)
        .map(|(i, _)| i)
        .collect();
    idx.sort_by_key(|&i| items[i].order());
    idx
}

/// Records of one group in display order.
pub fn siblings<'a, E: Ordered>(items: &'a [E], group: Option<&str>) -> Vec<&'a E> {
    group_indices(items, group).into_iter().map(|i| &items[i]).collect()
}

/// Order value that places a new record last in its group.
pub fn next_order<E: Ordered>(items: &[E], group: Option<&str>) -> u32 {
    items
        .iter()
        .filter(|e| e.group_key() == group)
        .map(|e| e.order() + 1)
        .max()
        .unwrap_or(0)
}

/// Move record `id` to `index` within its sibling group and renumber the group.
/// An index past the end moves the record last.
pub fn move_to<E: Ordered>(items: &mut [E], id: &str, index: usize) -> Result<(), ModelError> {
    let at = items
        .iter()
        .position(|e| e.id() == id)
        .ok_or_else(|| ModelError::NotFound(E::KIND.to_string()))?;
    let group = items[at].group_key().map(str::to_owned);

    let mut idx = group_indices(items, group.as_deref());
    idx.retain(|&i| i != at);
    let index = index.min(idx.len());
    idx.insert(index, at);

    for (pos, i) in idx.into_iter().enumerate() {
        items[i].set_order(pos as u32);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    fn cat(id: &str, parent: Option<&str>, order: u32) -> Category {
        Category {
            id: id.into(),
            name: id.to_uppercase(),
            slug: id.into(),
            parent_id: parent.map(Into::into),
            order,
            active: true,
            ..Category::default()
        }
    }

    fn orders(items: &[Category], group: Option<&str>) -> Vec<(String, u32)> {
        siblings(items, group).into_iter().map(|c| (c.id.clone(), c.order)).collect()
    }

    #[test]
    fn move_to_renumbers_only_the_sibling_group() {
        let mut items = vec![
            cat("a", None, 0),
            cat("b", None, 5),
            cat("c", None, 9),
            cat("x", Some("a"), 7),
            cat("y", Some("a"), 3),
        ];
        move_to(&mut items, "c", 0).unwrap();
        assert_eq!(
            orders(&items, None),
            vec![("c".into(), 0), ("a".into(), 1), ("b".into(), 2)]
        );
        // children of "a" untouched
        assert_eq!(orders(&items, Some("a")), vec![("y".into(), 3), ("x".into(), 7)]);
    }

    #[test]
    fn move_past_end_goes_last_and_keeps_ids() {
        let mut items = vec![cat("a", None, 0), cat("b", None, 1), cat("c", None, 2)];
        move_to(&mut items, "a", 99).unwrap();
        assert_eq!(
            orders(&items, None),
            vec![("b".into(), 0), ("c".into(), 1), ("a".into(), 2)]
        );
        let mut ids: Vec<_> = items.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn move_unknown_id_is_not_found() {
        let mut items = vec![cat("a", None, 0)];
        assert!(matches!(move_to(&mut items, "zz", 0), Err(ModelError::NotFound(_))));
    }

    #[test]
    fn next_order_per_group() {
        let items = vec![cat("a", None, 4), cat("b", None, 10), cat("x", Some("a"), 0)];
        assert_eq!(next_order(&items, None), 11);
        assert_eq!(next_order(&items, Some("a")), 1);
        assert_eq!(next_order(&items, Some("nope")), 0);
    }
}
