use biolink_lib::engine::store::{Client, SortDirection};
use serde_json::{json, Value};

#[tokio::test]
async fn test_role_change_flow() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    let client = Client::open(root.path().join("local_db.json"));
    let users = client.database("my_local_db").collection("users");

    users.insert_one(json!({"id": "u1", "role": "user"})).await?;

    let result = users
        .update_one(&json!({"id": "u1"}), &json!({"set": {"role": "owner"}}))
        .await?;
    assert_eq!(result.matched_count, 1);
    assert_eq!(result.modified_count, 1);

    let found = users.find_one(&json!({"id": "u1"}), None).await?;
    assert_eq!(found.map(Value::Object), Some(json!({"id": "u1", "role": "owner"})));

    let again = users
        .update_one(&json!({"id": "u1"}), &json!({"$set": {"role": "owner"}}))
        .await?;
    assert_eq!((again.matched_count, again.modified_count), (1, 0));

    Ok(())
}

#[tokio::test]
async fn test_membership_count() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    let client = Client::open(root.path().join("local_db.json"));
    let pages = client.database("my_local_db").collection("pages");

    pages
        .insert_many(vec![json!({"id": "a", "tags": ["x"]}), json!({"id": "b", "tags": ["y"]})])
        .await?;

    assert_eq!(pages.count_documents(&json!({"id": {"in": ["a", "b", "c"]}})).await?, 2);
    assert_eq!(pages.count_documents(&json!({"id": {"$in": ["c"]}})).await?, 0);
    assert_eq!(pages.count_documents(&json!({"_id": "whatever"})).await?, 2);

    Ok(())
}

#[tokio::test]
async fn test_page_blocks_survive_restart() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    let path = root.path().join("local_db.json");

    {
        let client = Client::open(&path);
        let db = client.database("my_local_db");
        db.collection("pages")
            .insert_one(json!({"id": "p1", "username": "zoë", "blocks": []}))
            .await?;
        db.collection("blocks")
            .insert_many(vec![
                json!({"id": "b2", "page_id": "p1", "order": 2, "type": "link"}),
                json!({"id": "b1", "page_id": "p1", "order": 1, "type": "text"}),
                json!({"id": "b3", "page_id": "p2", "order": 0, "type": "link"}),
            ])
            .await?;
        db.collection("pages")
            .update_one(&json!({"id": "p1"}), &json!({"$push": {"blocks": {"id": "b1", "order": 1}}}))
            .await?;
        client.close();
    }

    let client = Client::open(&path);
    let db = client.database("my_local_db");

    let blocks = db
        .collection("blocks")
        .find(&json!({"page_id": "p1"}), Some(&json!({"_id": 0, "page_id": 0})))
        .await?
        .sort("order", SortDirection::Ascending)
        .to_list(Some(100));
    let blocks: Vec<Value> = blocks.into_iter().map(Value::Object).collect();
    assert_eq!(
        blocks,
        vec![
            json!({"id": "b1", "order": 1, "type": "text"}),
            json!({"id": "b2", "order": 2, "type": "link"}),
        ]
    );

    let page = db
        .collection("pages")
        .find_one(&json!({"username": "zoë"}), Some(&json!({"blocks": 1})))
        .await?;
    assert_eq!(page.map(Value::Object), Some(json!({"blocks": [{"id": "b1", "order": 1}]})));

    let removed = db.collection("blocks").delete_many(&json!({"page_id": "p1"})).await?;
    assert_eq!(removed, 2);
    assert_eq!(db.collection("blocks").count_documents(&json!({})).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_delete_many_without_matches_keeps_data() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    let path = root.path().join("local_db.json");

    let client = Client::open(&path);
    let events = client.database("my_local_db").collection("events");
    events.insert_one(json!({"id": "e1", "page_id": "p1"})).await?;

    assert_eq!(events.delete_many(&json!({"page_id": "nope"})).await?, 0);

    let reopened = Client::open(&path);
    let count = reopened
        .database("my_local_db")
        .collection("events")
        .count_documents(&json!({}))
        .await?;
    assert_eq!(count, 1);

    Ok(())
}
