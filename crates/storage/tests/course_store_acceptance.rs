use shared::domain::NewCourse;
use storage::Storage;

#[tokio::test]
async fn courses_survive_reopening_a_file_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("data.sqlite");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    let created = storage
        .insert_course(&NewCourse {
            nome: "Math".into(),
            descricao: "Intro to math".into(),
        })
        .await
        .expect("insert");
    storage.pool().close().await;
    drop(storage);

    let reopened = Storage::new(&database_url).await.expect("reopen");
    let listed = reopened.list_courses_by_name().await.expect("list");
    assert_eq!(listed, vec![created]);

    reopened
        .insert_course(&NewCourse {
            nome: "Algebra".into(),
            descricao: "Groups and rings".into(),
        })
        .await
        .expect("second insert");
    let names: Vec<_> = reopened
        .list_courses_by_name()
        .await
        .expect("list")
        .into_iter()
        .map(|course| course.nome)
        .collect();
    assert_eq!(names, ["Algebra", "Math"]);
}
