#[cfg(test)]
mod tests {
    use inventory_manager::{
        Column, ProductDraft, ProductQuery, ProductStore, SortDirection, SortOrder, StorageError,
    };
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct StoreContext {
        _temp_dir: TempDir,
        store: ProductStore,
    }

    impl TestContext for StoreContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let store = ProductStore::new(temp_dir.path().join("data").join("inventory.db"));
            store.ensure_schema().unwrap();
            StoreContext {
                _temp_dir: temp_dir,
                store,
            }
        }
    }

    fn seed(store: &ProductStore, rows: &[(&str, i64, f64)]) -> Vec<i64> {
        rows.iter()
            .map(|(name, quantity, price)| {
                store
                    .insert(&ProductDraft::new(*name, *quantity, *price))
                    .unwrap()
            })
            .collect()
    }

    fn names(store: &ProductStore, query: &ProductQuery) -> Vec<String> {
        store
            .fetch(query)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect()
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_schema_creation_is_idempotent(ctx: &mut StoreContext) {
        ctx.store.ensure_schema().unwrap();
        ctx.store.ensure_schema().unwrap();

        let types = ctx.store.column_types().unwrap();
        assert_eq!(types.len(), 4);
        assert_eq!(types["id"], "INTEGER");
        assert_eq!(types["name"], "TEXT");
        assert_eq!(types["quantity"], "INTEGER");
        assert_eq!(types["price"], "REAL");
        ctx.store.verify_schema().unwrap();
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_insert_reads_back_exactly(ctx: &mut StoreContext) {
        let id = ctx
            .store
            .insert(&ProductDraft::new("Widget", 10, 2.50))
            .unwrap();

        let rows = ctx.store.fetch(&ProductQuery::all()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(id, 1);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].name, "Widget");
        assert_eq!(rows[0].quantity, 10);
        assert_eq!(rows[0].price, 2.5);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_inserted_ids_are_unique(ctx: &mut StoreContext) {
        let ids = seed(&ctx.store, &[("A", 1, 1.0), ("A", 1, 1.0), ("A", 1, 1.0)]);
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(ctx.store.fetch(&ProductQuery::all()).unwrap().len(), 3);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_update_replaces_only_the_target_row(ctx: &mut StoreContext) {
        let ids = seed(&ctx.store, &[("Widget", 10, 2.5), ("Gadget", 3, 9.99)]);

        let draft = ProductDraft::new("Widget", 5, 3.0);
        assert!(ctx.store.update(ids[0], &draft).unwrap());
        assert!(ctx.store.update(ids[0], &draft).unwrap());

        let rows = ctx.store.fetch(&ProductQuery::all()).unwrap();
        assert_eq!(rows[0].to_draft(), draft);
        assert_eq!(rows[1].to_draft(), ProductDraft::new("Gadget", 3, 9.99));
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_update_of_missing_id_is_not_an_error(ctx: &mut StoreContext) {
        seed(&ctx.store, &[("Widget", 10, 2.5)]);
        let matched = ctx
            .store
            .update(42, &ProductDraft::new("Ghost", 0, 0.0))
            .unwrap();
        assert!(!matched);
        assert_eq!(names(&ctx.store, &ProductQuery::all()), vec!["Widget"]);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_delete_removes_exactly_the_given_ids(ctx: &mut StoreContext) {
        seed(&ctx.store, &[("A", 1, 1.0), ("B", 2, 2.0), ("C", 3, 3.0)]);

        let deleted = ctx.store.delete(&[1, 3, 99]).unwrap();
        assert_eq!(deleted, 2);

        let rows = ctx.store.fetch(&ProductQuery::all()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 2);
        assert_eq!(rows[0].name, "B");
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_delete_with_no_ids_is_a_no_op(ctx: &mut StoreContext) {
        seed(&ctx.store, &[("A", 1, 1.0)]);
        assert_eq!(ctx.store.delete(&[]).unwrap(), 0);
        assert_eq!(ctx.store.fetch(&ProductQuery::all()).unwrap().len(), 1);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_numeric_search_matches_price_exactly(ctx: &mut StoreContext) {
        seed(&ctx.store, &[("Bolt", 100, 0.05), ("Nut", 50, 0.10)]);
        let query = ProductQuery::all().with_search("0.05");
        assert_eq!(names(&ctx.store, &query), vec!["Bolt"]);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_numeric_search_matches_values_not_written_the_same_way(ctx: &mut StoreContext) {
        seed(&ctx.store, &[("Widget", 10, 2.5), ("Gadget", 3, 9.99)]);

        let query = ProductQuery::all().with_search("2.50");
        assert_eq!(names(&ctx.store, &query), vec!["Widget"]);

        let query = ProductQuery::all().with_search("10.0");
        assert_eq!(names(&ctx.store, &query), vec!["Widget"]);

        let query = ProductQuery::all().with_search("nan");
        assert!(names(&ctx.store, &query).is_empty());
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_search_matches_name_substring_case_sensitively(ctx: &mut StoreContext) {
        seed(&ctx.store, &[("Hex Bolt", 10, 1.0), ("bolt cutter", 1, 30.0)]);

        let query = ProductQuery::all().with_search("Bolt");
        assert_eq!(names(&ctx.store, &query), vec!["Hex Bolt"]);

        let query = ProductQuery::all().with_search("bolt");
        assert_eq!(names(&ctx.store, &query), vec!["bolt cutter"]);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_search_matches_numbers_rendered_as_text(ctx: &mut StoreContext) {
        seed(&ctx.store, &[("Washer", 7, 12.50), ("Screw", 312, 0.2), ("Nail", 5, 1.0)]);

        let query = ProductQuery::all().with_search("12");
        assert_eq!(names(&ctx.store, &query), vec!["Washer", "Screw"]);

        let query = ProductQuery::all().with_search("5");
        assert_eq!(names(&ctx.store, &query), vec!["Washer", "Nail"]);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_search_terms_are_trimmed_and_wildcards_are_literal(ctx: &mut StoreContext) {
        seed(&ctx.store, &[("100% cotton", 1, 1.0), ("Cotton_Bud", 2, 2.0)]);

        let query = ProductQuery::all().with_search("  cotton  ");
        assert_eq!(names(&ctx.store, &query), vec!["100% cotton"]);

        let query = ProductQuery::all().with_search("%");
        assert_eq!(names(&ctx.store, &query), vec!["100% cotton"]);

        let query = ProductQuery::all().with_search("_");
        assert_eq!(names(&ctx.store, &query), vec!["Cotton_Bud"]);

        let query = ProductQuery::all().with_search("   ");
        assert_eq!(names(&ctx.store, &query).len(), 2);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_sort_direction_strings(ctx: &mut StoreContext) {
        seed(&ctx.store, &[("B", 20, 1.5), ("A", 5, 9.0), ("C", 12, 0.5)]);

        for asc in ["asc", "ASC", "Asc"] {
            let query = ProductQuery::all().with_sort(SortOrder::parse("quantity", asc));
            let quantities: Vec<i64> = ctx
                .store
                .fetch(&query)
                .unwrap()
                .iter()
                .map(|p| p.quantity)
                .collect();
            assert_eq!(quantities, vec![5, 12, 20]);
        }

        for desc in ["desc", "DESC", "down", ""] {
            let query = ProductQuery::all().with_sort(SortOrder::parse("price", desc));
            let prices: Vec<f64> = ctx
                .store
                .fetch(&query)
                .unwrap()
                .iter()
                .map(|p| p.price)
                .collect();
            assert_eq!(prices, vec![9.0, 1.5, 0.5]);
        }
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_sort_by_name_and_unknown_columns(ctx: &mut StoreContext) {
        seed(&ctx.store, &[("Pliers", 1, 1.0), ("Hammer", 1, 1.0), ("Saw", 1, 1.0)]);

        let query = ProductQuery::all().with_sort(Some(SortOrder {
            column: Column::Name,
            direction: SortDirection::Ascending,
        }));
        assert_eq!(names(&ctx.store, &query), vec!["Hammer", "Pliers", "Saw"]);

        let query = ProductQuery::all().with_sort(SortOrder::parse("colour", "asc"));
        assert_eq!(names(&ctx.store, &query), vec!["Pliers", "Hammer", "Saw"]);
    }

    #[test_context(StoreContext)]
    #[test]
    fn test_search_and_sort_combine(ctx: &mut StoreContext) {
        seed(&ctx.store, &[("Bolt M4", 30, 0.1), ("Nut", 10, 0.1), ("Bolt M6", 20, 0.2)]);

        let query = ProductQuery::all()
            .with_search("Bolt")
            .with_sort(SortOrder::parse("quantity", "asc"));
        assert_eq!(names(&ctx.store, &query), vec!["Bolt M6", "Bolt M4"]);
    }

    #[test]
    fn test_missing_table_is_a_query_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ProductStore::new(temp_dir.path().join("empty.db"));

        match store.fetch(&ProductQuery::all()) {
            Err(StorageError::Query(message)) => assert!(message.contains("products")),
            other => panic!("expected a query error, got {other:?}"),
        }
        assert!(matches!(
            store.verify_schema(),
            Err(StorageError::Introspect(_))
        ));
    }

    #[test]
    fn test_unopenable_file_surfaces_as_operation_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file.
        let store = ProductStore::new(temp_dir.path());

        assert!(matches!(
            store.insert(&ProductDraft::new("Widget", 1, 1.0)),
            Err(StorageError::Insert(_))
        ));
        assert!(matches!(store.delete(&[1]), Err(StorageError::Delete(_))));
    }

    #[test]
    fn test_schema_drift_is_detected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("legacy.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute(
            "CREATE TABLE products (id INTEGER PRIMARY KEY, name TEXT, quantity TEXT, price REAL)",
            [],
        )
        .unwrap();
        drop(conn);

        let store = ProductStore::new(&path);
        store.ensure_schema().unwrap();
        match store.verify_schema() {
            Err(StorageError::Introspect(message)) => assert!(message.contains("quantity")),
            other => panic!("expected schema drift, got {other:?}"),
        }
    }
}
