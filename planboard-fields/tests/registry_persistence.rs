//! Integration tests for the on-disk property registry

use planboard_fields::{
    FieldsError, NewProperty, PropertyPatch, PropertyRegistry, PropertyType, Scope,
};
use tempfile::TempDir;

#[test_log::test(tokio::test)]
async fn definitions_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("properties");
    let scope = Scope::project("apollo");

    let (estimate_id, stage_id) = {
        let mut registry = PropertyRegistry::open(&root).build().await.unwrap();
        let estimate = registry
            .create(scope.clone(), NewProperty::new("Estimate", PropertyType::Number))
            .await
            .unwrap();
        let stage = registry
            .create(
                scope.clone(),
                NewProperty::new("Stage", PropertyType::Dropdown)
                    .with_options(["Draft", "Review", "Done"])
                    .required(),
            )
            .await
            .unwrap();
        (estimate.id, stage.id)
    };

    assert!(root.join(format!("{estimate_id}.yaml")).exists());

    let registry = PropertyRegistry::open(&root).build().await.unwrap();
    assert_eq!(registry.len(), 2);
    let listed: Vec<_> = registry.list(&scope).iter().map(|d| d.id).collect();
    assert_eq!(listed, vec![estimate_id, stage_id]);
    let stage = registry.get(&stage_id).unwrap();
    assert!(stage.required);
    assert_eq!(stage.options, vec!["Draft", "Review", "Done"]);
}

#[tokio::test]
async fn removing_a_definition_deletes_its_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("properties");
    let mut registry = PropertyRegistry::open(&root).build().await.unwrap();

    let def = registry
        .create(Scope::Global, NewProperty::new("Billable", PropertyType::Boolean))
        .await
        .unwrap();
    let path = root.join(format!("{}.yaml", def.id));
    assert!(path.exists());

    registry.remove(&def.id).await.unwrap();
    assert!(!path.exists());

    let reopened = PropertyRegistry::open(&root).build().await.unwrap();
    assert!(reopened.is_empty());
}

#[tokio::test]
async fn renames_are_persisted_in_place() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("properties");
    let mut registry = PropertyRegistry::open(&root).build().await.unwrap();
    let def = registry
        .create(Scope::Global, NewProperty::new("Cost", PropertyType::Number))
        .await
        .unwrap();
    registry
        .update(&def.id, PropertyPatch::new().rename("Budget"))
        .await
        .unwrap();
    drop(registry);

    let reopened = PropertyRegistry::open(&root).build().await.unwrap();
    assert_eq!(reopened.get(&def.id).unwrap().name, "Budget");
    assert!(reopened.get_by_name(&Scope::Global, "Cost").is_none());
}

#[tokio::test]
async fn invalid_files_are_skipped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("properties");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("garbage.yaml"), "name: [unterminated").unwrap();
    std::fs::write(root.join("notes.txt"), "ignored").unwrap();

    let registry = PropertyRegistry::open(&root).build().await.unwrap();
    assert!(registry.is_empty());
}

#[tokio::test]
async fn opening_a_file_path_fails() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("not-a-dir");
    std::fs::write(&file, "x").unwrap();

    let result = PropertyRegistry::open(&file).build().await;
    assert!(matches!(result, Err(FieldsError::NotInitialized { .. })));
}
