use sqlx::PgPool;

/// Connect, migrate, verify the tables exist.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    sources_db::health_check(&pool).await.unwrap();

    for table in [
        "users",
        "datasets",
        "sources",
        "source_owners",
        "thumbnail_jobs",
        "source_thumbnails",
    ] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}
