//! End to end behaviour of the table engine on small product sets.

use catalog_tv::column::ColumnSet;
use catalog_tv::engine::TableEngine;
use catalog_tv::record::{Field, Record};
use catalog_tv::view::Direction;

fn engine_with(records: Vec<Record>) -> TableEngine {
    let mut engine = TableEngine::new(ColumnSet::products());
    engine.replace_records(records);
    engine
}

fn titles(engine: &TableEngine) -> Vec<String> {
    engine.page_records().iter().map(|r| r.title.clone()).collect()
}

fn products() -> Vec<Record> {
    vec![
        Record::new(1, "Essence", "Essence Mascara Lash Princess", "beauty", 4.94, 9.99),
        Record::new(2, "Glamour Beauty", "Eyeshadow Palette with Mirror", "beauty", 3.28, 19.99),
        Record::new(3, "Velvet Touch", "Powder Canister", "beauty", 3.82, 14.99),
        Record::new(4, "Chanel", "Coco Noir Eau De", "fragrances", 4.26, 129.99),
        Record::new(5, "Annibale Colombo", "Annibale Colombo Bed", "furniture", 4.14, 1899.99),
        Record::new(6, "", "Apple", "groceries", 4.19, 1.99),
    ]
}

#[test]
fn title_sort_toggles_through_directions() {
    let mut engine = engine_with(vec![
        Record::new(1, "x", "C", "beauty", 1.0, 1.0),
        Record::new(2, "x", "A", "beauty", 1.0, 1.0),
        Record::new(3, "x", "D", "beauty", 1.0, 1.0),
        Record::new(4, "x", "B", "beauty", 1.0, 1.0),
    ]);

    assert_eq!(engine.toggle_sort(Field::Title), Direction::Ascending);
    assert_eq!(titles(&engine), ["A", "B", "C", "D"]);

    assert_eq!(engine.toggle_sort(Field::Title), Direction::Descending);
    assert_eq!(titles(&engine), ["D", "C", "B", "A"]);

    assert_eq!(engine.toggle_sort(Field::Title), Direction::None);
    assert_eq!(titles(&engine), ["C", "A", "D", "B"]);
}

#[test]
fn global_filter_finds_brand_and_title_matches() {
    let mut engine = engine_with(products());
    engine.set_global_filter("Essence");
    assert_eq!(engine.filtered_count(), 1);
    assert_eq!(engine.page_records()[0].id, 1);

    engine.set_global_filter("essence");
    assert_eq!(engine.filtered_count(), 1);

    engine.set_global_filter("");
    assert_eq!(engine.filtered_count(), 6);
}

#[test]
fn category_select_combines_with_global_filter() {
    let mut engine = engine_with(products());
    assert!(engine.set_column_filter(Field::Category, "beauty"));
    assert_eq!(engine.filtered_count(), 3);

    engine.set_global_filter("p");
    let ids: Vec<u64> = engine.filtered_records().map(|r| r.id).collect();
    // "Princess", "Palette", "Powder": every beauty product contains a p
    assert_eq!(ids, [1, 2, 3]);

    engine.set_global_filter("mirror");
    let ids: Vec<u64> = engine.filtered_records().map(|r| r.id).collect();
    assert_eq!(ids, [2]);

    engine.set_column_filter(Field::Category, "");
    assert_eq!(engine.filtered_count(), 1);
    assert!(engine.state().column_filters.is_empty());
}

#[test]
fn numeric_columns_can_not_be_filtered() {
    let mut engine = engine_with(products());
    assert!(!engine.set_column_filter(Field::Price, "9.99"));
    assert_eq!(engine.filtered_count(), 6);
}

#[test]
fn small_result_fits_a_single_page() {
    let mut engine = engine_with(products().into_iter().take(4).collect());
    engine.set_page_size(10);

    let page = engine.page();
    assert_eq!(page.total, 4);
    assert_eq!(page.len(), 4);
    assert_eq!(page.page_count, 1);
    assert_eq!(page.page_index, 0);
    assert!(!page.can_previous);
    assert!(!page.can_next);

    engine.next_page();
    assert_eq!(engine.page().page_index, 0);
}

#[test]
fn filtering_clamps_the_page_index() {
    let records = (1..=25)
        .map(|id| Record::new(id, "b", format!("item {id}"), "beauty", 4.0, id as f64))
        .collect();
    let mut engine = engine_with(records);
    engine.last_page();
    assert_eq!(engine.page().page_index, 2);
    assert_eq!(engine.page().len(), 5);

    engine.set_global_filter("item 1");
    // item 1, item 10 ... item 19
    assert_eq!(engine.filtered_count(), 11);
    assert_eq!(engine.page().page_index, 1);
    assert_eq!(engine.page().len(), 1);
}

#[test]
fn export_contains_all_filtered_rows() {
    let mut engine = engine_with(products());
    engine.set_column_filter(Field::Category, "beauty");
    engine.set_sort(Field::Price, Direction::Descending);
    engine.set_page_size(10);

    let csv = String::from_utf8(engine.export_csv().unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "id,brand,title,category,rating,price");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("2,Glamour Beauty,"));
    assert!(lines[3].starts_with("1,Essence,"));
}

#[test]
fn new_records_keep_filters_and_sort() {
    let mut engine = engine_with(products());
    engine.set_global_filter("a");
    engine.set_sort(Field::Rating, Direction::Ascending);
    let before = engine.filtered_count();

    engine.replace_records(products().into_iter().rev().collect());
    assert_eq!(engine.filtered_count(), before);
    let ratings: Vec<f64> = engine.filtered_records().map(|r| r.rating).collect();
    assert!(ratings.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(engine.state().global_filter, "a");
}
