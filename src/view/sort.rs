use std::cmp::Ordering;

use tracing::trace;

use crate::record::Record;
use crate::view::{Direction, SortState};

/// Orders `rows` by the active sort column.
///
/// The sort is stable in both directions, rows with equal values keep the
/// order they came in with. Without an active sort the rows are returned
/// unchanged.
pub fn apply(records: &[Record], mut rows: Vec<usize>, sort: &SortState) -> Vec<usize> {
    let field = match (sort.column, sort.direction) {
        (Some(field), Direction::Ascending | Direction::Descending) => field,
        _ => return rows,
    };

    rows.sort_by(|&a, &b| {
        let ordering = records[a].value(field).compare(&records[b].value(field));
        match sort.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
            Direction::None => Ordering::Equal,
        }
    });
    trace!("Sorted {} rows by {} {:?}", rows.len(), field, sort.direction);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;

    fn records() -> Vec<Record> {
        vec![
            Record::new(1, "b", "C", "beauty", 4.5, 10.0),
            Record::new(2, "a", "A", "beauty", 3.0, 9.5),
            Record::new(3, "b", "D", "groceries", 4.5, 100.0),
            Record::new(4, "a", "B", "furniture", 1.0, 9.5),
        ]
    }

    #[test]
    fn inactive_sort_keeps_order() {
        let rows = apply(&records(), vec![3, 1, 2, 0], &SortState::default());
        assert_eq!(rows, vec![3, 1, 2, 0]);
    }

    #[test]
    fn sorts_text_ascending_and_descending() {
        let data = records();
        let asc = apply(&data, vec![0, 1, 2, 3], &SortState::new(Field::Title, Direction::Ascending));
        assert_eq!(asc, vec![1, 3, 0, 2]);
        let desc = apply(&data, vec![0, 1, 2, 3], &SortState::new(Field::Title, Direction::Descending));
        assert_eq!(desc, vec![2, 0, 3, 1]);
    }

    #[test]
    fn sorts_numbers_numerically() {
        let rows = apply(
            &records(),
            vec![0, 1, 2, 3],
            &SortState::new(Field::Price, Direction::Descending),
        );
        // 9.5 twice, the tie keeps the input order
        assert_eq!(rows, vec![2, 0, 1, 3]);
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let data = records();
        for direction in [Direction::Ascending, Direction::Descending] {
            let rows = apply(&data, vec![2, 0, 3, 1], &SortState::new(Field::Brand, direction));
            let (a, b): (Vec<usize>, Vec<usize>) = match direction {
                Direction::Ascending => (rows[..2].to_vec(), rows[2..].to_vec()),
                _ => (rows[2..].to_vec(), rows[..2].to_vec()),
            };
            assert_eq!(a, vec![3, 1]);
            assert_eq!(b, vec![2, 0]);
        }
    }
}
