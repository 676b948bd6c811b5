use anyhow::Result;
use rusqlite::{params, Row};

use crate::db::{
    helpers::{decode_polygons, encode_polygons, parse_datetime},
    models::PolygonSet,
    Database,
};

fn row_to_polygon_set(row: &Row) -> Result<PolygonSet> {
    let polygons_json: String = row.get("polygons_json")?;
    let created_at: String = row.get("created_at")?;

    Ok(PolygonSet {
        name: row.get("name")?,
        description: row.get("description")?,
        polygons: decode_polygons(&polygons_json, "polygons_json")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn list_polygon_sets(&self) -> Result<Vec<PolygonSet>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name, description, polygons_json, created_at
                 FROM polygon_sets
                 ORDER BY name ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut sets = Vec::new();
            while let Some(row) = rows.next()? {
                sets.push(row_to_polygon_set(row)?);
            }

            Ok(sets)
        })
        .await
    }

    pub async fn get_polygon_set(&self, name: String) -> Result<Option<PolygonSet>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT name, description, polygons_json, created_at
                 FROM polygon_sets
                 WHERE name = ?1",
            )?;

            let mut rows = stmt.query(params![name])?;
            let set = match rows.next()? {
                Some(row) => Some(row_to_polygon_set(row)?),
                None => None,
            };
            Ok(set)
        })
        .await
    }

    /// Create or overwrite the snapshot stored under `set.name`.
    pub async fn upsert_polygon_set(&self, set: PolygonSet) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO polygon_sets (name, description, polygons_json, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(name) DO UPDATE SET
                     description = excluded.description,
                     polygons_json = excluded.polygons_json,
                     created_at = excluded.created_at",
                params![
                    set.name,
                    set.description,
                    encode_polygons(&set.polygons)?,
                    set.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// Returns false when no snapshot had the given name.
    pub async fn delete_polygon_set(&self, name: String) -> Result<bool> {
        self.execute(move |conn| {
            let rows_affected =
                conn.execute("DELETE FROM polygon_sets WHERE name = ?1", params![name])?;
            Ok(rows_affected > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::db::{
        models::{Point, PolygonSet, StoredCoordinate},
        Database,
    };

    async fn open_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db = Database::new(dir.path().join("test.sqlite3")).expect("failed to open database");
        (db, dir)
    }

    fn sample_set(name: &str, label: &str) -> PolygonSet {
        PolygonSet {
            name: name.into(),
            description: Some("pilot layout".into()),
            polygons: vec![StoredCoordinate {
                id: 1,
                label: label.into(),
                points: vec![Point { x: 3.0, y: 4.0 }, Point { x: 5.0, y: 6.0 }],
            }],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_under_existing_name_overwrites() {
        let (db, _dir) = open_test_db().await;

        db.upsert_polygon_set(sample_set("baseline", "mug"))
            .await
            .unwrap();
        db.upsert_polygon_set(sample_set("baseline", "keyboard"))
            .await
            .unwrap();

        let sets = db.list_polygon_sets().await.unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "baseline");
        assert_eq!(sets[0].polygons[0].label, "keyboard");
    }

    #[tokio::test]
    async fn snapshot_is_isolated_from_live_edits() {
        let (db, _dir) = open_test_db().await;

        let snapshot = sample_set("frozen", "mug");
        db.upsert_polygon_set(snapshot.clone()).await.unwrap();

        // Loading the snapshot into the live collection, then clearing the
        // live collection, must leave the stored snapshot untouched.
        db.replace_coordinates(snapshot.polygons.clone())
            .await
            .unwrap();
        assert_eq!(db.list_coordinates().await.unwrap(), snapshot.polygons);

        db.clear_coordinates().await.unwrap();
        let stored = db.get_polygon_set("frozen".into()).await.unwrap().unwrap();
        assert_eq!(stored.polygons, snapshot.polygons);
    }

    #[tokio::test]
    async fn get_unknown_name_returns_none() {
        let (db, _dir) = open_test_db().await;
        assert!(db.get_polygon_set("ghost".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_existed() {
        let (db, _dir) = open_test_db().await;

        db.upsert_polygon_set(sample_set("doomed", "mug"))
            .await
            .unwrap();
        assert!(db.delete_polygon_set("doomed".into()).await.unwrap());
        assert!(!db.delete_polygon_set("doomed".into()).await.unwrap());
    }
}
