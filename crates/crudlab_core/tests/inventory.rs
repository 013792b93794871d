mod common;

use crudlab_core::model::inventory::{
    CategoryPatch, NewCategory, NewProduct, NewSupplier, ProductPatch, ProductQuery,
    SupplierPatch,
};
use crudlab_core::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crudlab_core::repo::product_repo::{ProductRepository, SqliteProductRepository};
use crudlab_core::repo::supplier_repo::{SqliteSupplierRepository, SupplierRepository};
use crudlab_core::{Database, RepoError, RowId};

fn supplier(db: &Database, name: &str) -> RowId {
    SqliteSupplierRepository::new(db)
        .create(&NewSupplier::new(name).contact_email("sales@example.com"))
        .unwrap()
}

#[test]
fn product_round_trip_and_validation() {
    let (_dir, db) = common::open_temp_db();
    let acme = supplier(&db, "Acme");
    let products = SqliteProductRepository::new(&db);

    let id = products
        .create(&NewProduct::new("Widget", 9.99, 12, acme).description("Blue"))
        .unwrap();
    let product = products.get_by_id(id).unwrap().unwrap();
    assert_eq!(product.name, "Widget");
    assert_eq!(product.description, "Blue");
    assert_eq!(product.price, 9.99);
    assert_eq!(product.stock_quantity, 12);
    assert_eq!(product.supplier_id, acme);

    for bad in [
        NewProduct::new("", 1.0, 0, acme),
        NewProduct::new("Gadget", -1.0, 0, acme),
        NewProduct::new("Gadget", 1.0, -5, acme),
    ] {
        assert!(matches!(
            products.create(&bad),
            Err(RepoError::Validation(_))
        ));
    }

    let err = products
        .create(&NewProduct::new("Gadget", 1.0, 0, acme + 50))
        .unwrap_err();
    assert!(matches!(err, RepoError::Referential(_)));
}

#[test]
fn update_stock_never_goes_negative() {
    let (_dir, db) = common::open_temp_db();
    let acme = supplier(&db, "Acme");
    let products = SqliteProductRepository::new(&db);
    let id = products
        .create(&NewProduct::new("Widget", 2.5, 5, acme))
        .unwrap();

    assert!(products.update_stock(id, 10).unwrap());
    assert!(products.update_stock(id, -15).unwrap());
    assert_eq!(products.get_by_id(id).unwrap().unwrap().stock_quantity, 0);

    let err = products.update_stock(id, -1).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(err.to_string().contains("Current: 0"));
    assert_eq!(products.get_by_id(id).unwrap().unwrap().stock_quantity, 0);

    assert!(!products.update_stock(id + 1, 3).unwrap());
}

#[test]
fn low_stock_lists_lowest_first_with_supplier() {
    let (_dir, db) = common::open_temp_db();
    let acme = supplier(&db, "Acme");
    let products = SqliteProductRepository::new(&db);
    let few = products
        .create(&NewProduct::new("Few", 1.0, 3, acme))
        .unwrap();
    let none = products
        .create(&NewProduct::new("None", 1.0, 0, acme))
        .unwrap();
    products
        .create(&NewProduct::new("Plenty", 1.0, 10, acme))
        .unwrap();

    let low = products.get_low_stock(10).unwrap();
    assert_eq!(
        low.iter().map(|p| p.product.id).collect::<Vec<_>>(),
        vec![none, few]
    );
    assert_eq!(low[0].supplier_name, "Acme");
    assert_eq!(low[0].supplier_email, "sales@example.com");
}

#[test]
fn category_links_filter_products() {
    let (_dir, db) = common::open_temp_db();
    let acme = supplier(&db, "Acme");
    let products = SqliteProductRepository::new(&db);
    let categories = SqliteCategoryRepository::new(&db);

    let tools = categories
        .create(&NewCategory::new("Tools", "Hand tools"))
        .unwrap();
    let garden = categories.create(&NewCategory::new("Garden", "")).unwrap();
    assert!(matches!(
        categories.create(&NewCategory::new("Tools", "again")),
        Err(RepoError::Duplicate(_))
    ));

    let hammer = products
        .create(&NewProduct::new("Hammer", 15.0, 4, acme))
        .unwrap();
    let rake = products
        .create(&NewProduct::new("Rake", 20.0, 0, acme))
        .unwrap();

    assert!(products.add_category(hammer, tools).unwrap());
    assert!(products.add_category(rake, tools).unwrap());
    assert!(products.add_category(rake, garden).unwrap());
    assert!(matches!(
        products.add_category(hammer, tools),
        Err(RepoError::Duplicate(_))
    ));
    assert!(matches!(
        products.add_category(hammer, garden + 10),
        Err(RepoError::NotFound { entity: "Category", .. })
    ));
    assert!(matches!(
        products.add_category(rake + 10, garden),
        Err(RepoError::NotFound { entity: "Product", .. })
    ));

    let in_tools = products
        .get_all(&ProductQuery {
            category_id: Some(tools),
            in_stock_only: false,
        })
        .unwrap();
    assert_eq!(
        in_tools.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![hammer, rake]
    );
    let stocked_tools = products
        .get_all(&ProductQuery {
            category_id: Some(tools),
            in_stock_only: true,
        })
        .unwrap();
    assert_eq!(stocked_tools.len(), 1);

    let rake_categories: Vec<_> = products
        .get_categories(rake)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(rake_categories, vec!["Garden", "Tools"]);
    assert_eq!(categories.get_products(garden).unwrap().len(), 1);

    assert!(products.remove_category(rake, garden).unwrap());
    assert!(!products.remove_category(rake, garden).unwrap());

    assert!(categories.delete(tools).unwrap());
    assert!(products.get_categories(hammer).unwrap().is_empty());
    assert!(products.get_by_id(hammer).unwrap().is_some());
}

#[test]
fn supplier_with_products_cannot_be_deleted() {
    let (_dir, db) = common::open_temp_db();
    let suppliers = SqliteSupplierRepository::new(&db);
    let products = SqliteProductRepository::new(&db);
    let acme = supplier(&db, "Acme");
    let globex = supplier(&db, "Globex");
    let widget = products
        .create(&NewProduct::new("Widget", 1.0, 1, acme))
        .unwrap();

    assert_eq!(suppliers.get_products(acme).unwrap().len(), 1);
    assert_eq!(products.get_by_supplier(globex).unwrap().len(), 0);
    assert!(matches!(
        suppliers.delete(acme),
        Err(RepoError::Referential(_))
    ));

    let patch = ProductPatch {
        supplier_id: Some(globex),
        price: Some(1.5),
        ..ProductPatch::default()
    };
    assert!(products.update(widget, &patch).unwrap());
    assert!(suppliers.delete(acme).unwrap());
    assert_eq!(products.get_by_id(widget).unwrap().unwrap().price, 1.5);
}

#[test]
fn supplier_and_category_patches() {
    let (_dir, db) = common::open_temp_db();
    let suppliers = SqliteSupplierRepository::new(&db);
    let categories = SqliteCategoryRepository::new(&db);
    let acme = supplier(&db, "Acme");

    let bad_email = SupplierPatch {
        contact_email: Some("nope".to_string()),
        ..SupplierPatch::default()
    };
    assert!(matches!(
        suppliers.update(acme, &bad_email),
        Err(RepoError::Validation(_))
    ));

    let phone = SupplierPatch {
        contact_phone: Some("555-0100".to_string()),
        ..SupplierPatch::default()
    };
    assert!(suppliers.update(acme, &phone).unwrap());
    let row = suppliers.get_by_id(acme).unwrap().unwrap();
    assert_eq!(row.contact_phone, "555-0100");
    assert_eq!(row.contact_email, "sales@example.com");
    assert_eq!(suppliers.get_all().unwrap().len(), 1);

    let tools = categories.create(&NewCategory::new("Tools", "")).unwrap();
    let rename = CategoryPatch {
        name: Some("Hardware".to_string()),
        ..CategoryPatch::default()
    };
    assert!(categories.update(tools, &rename).unwrap());
    assert!(!categories.update(tools + 1, &rename).unwrap());
    assert_eq!(categories.get_all().unwrap()[0].name, "Hardware");
}
