use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{
    helpers::{decode_points, encode_points},
    models::{Point, StoredCoordinate},
    Database,
};

fn row_to_coordinate(row: &Row) -> Result<StoredCoordinate> {
    let points_json: String = row.get("points_json")?;

    Ok(StoredCoordinate {
        id: row.get("id")?,
        label: row.get("label")?,
        points: decode_points(&points_json, "points_json")?,
    })
}

impl Database {
    pub async fn list_coordinates(&self) -> Result<Vec<StoredCoordinate>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, label, points_json
                 FROM stored_coordinates
                 ORDER BY id ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut coordinates = Vec::new();
            while let Some(row) = rows.next()? {
                coordinates.push(row_to_coordinate(row)?);
            }

            Ok(coordinates)
        })
        .await
    }

    /// Insert a single region; the store assigns the id.
    pub async fn insert_coordinate(
        &self,
        label: String,
        points: Vec<Point>,
    ) -> Result<StoredCoordinate> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO stored_coordinates (label, points_json, created_at)
                 VALUES (?1, ?2, ?3)",
                params![label, encode_points(&points)?, Utc::now().to_rfc3339()],
            )?;

            let id = conn.last_insert_rowid();
            Ok(StoredCoordinate { id, label, points })
        })
        .await
    }

    /// Replace the whole working set. The admin editor saves the collection
    /// as a unit, so this clears and reinserts inside one transaction;
    /// submitted ids are preserved.
    pub async fn replace_coordinates(&self, coordinates: Vec<StoredCoordinate>) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let now = Utc::now().to_rfc3339();

            tx.execute("DELETE FROM stored_coordinates", [])?;
            for coordinate in &coordinates {
                tx.execute(
                    "INSERT INTO stored_coordinates (id, label, points_json, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        coordinate.id,
                        coordinate.label,
                        encode_points(&coordinate.points)?,
                        now,
                    ],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Returns false when no region had the given id.
    pub async fn delete_coordinate(&self, id: i64) -> Result<bool> {
        self.execute(move |conn| {
            let rows_affected =
                conn.execute("DELETE FROM stored_coordinates WHERE id = ?1", params![id])?;
            Ok(rows_affected > 0)
        })
        .await
    }

    pub async fn clear_coordinates(&self) -> Result<()> {
        self.execute(|conn| {
            conn.execute("DELETE FROM stored_coordinates", [])?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{
        models::{Point, StoredCoordinate},
        Database,
    };

    async fn open_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db = Database::new(dir.path().join("test.sqlite3")).expect("failed to open database");
        (db, dir)
    }

    fn square(x: f64, y: f64) -> Vec<Point> {
        vec![
            Point { x, y },
            Point { x: x + 10.0, y },
            Point { x: x + 10.0, y: y + 10.0 },
            Point { x, y: y + 10.0 },
        ]
    }

    #[tokio::test]
    async fn insert_round_trips_label_and_points() {
        let (db, _dir) = open_test_db().await;

        let inserted = db
            .insert_coordinate("desk lamp".into(), square(5.0, 7.0))
            .await
            .unwrap();

        let listed = db.list_coordinates().await.unwrap();
        assert_eq!(listed, vec![inserted.clone()]);
        assert_eq!(listed[0].label, "desk lamp");
        assert_eq!(listed[0].points, square(5.0, 7.0));
    }

    #[tokio::test]
    async fn inserts_assign_distinct_stable_ids() {
        let (db, _dir) = open_test_db().await;

        let first = db.insert_coordinate("a".into(), vec![]).await.unwrap();
        let second = db.insert_coordinate("b".into(), vec![]).await.unwrap();
        assert_ne!(first.id, second.id);

        // Deleting the first must not renumber the second.
        assert!(db.delete_coordinate(first.id).await.unwrap());
        let listed = db.list_coordinates().await.unwrap();
        assert_eq!(listed, vec![second]);
    }

    #[tokio::test]
    async fn replace_with_empty_list_clears_the_collection() {
        let (db, _dir) = open_test_db().await;

        db.insert_coordinate("a".into(), square(0.0, 0.0))
            .await
            .unwrap();
        db.replace_coordinates(Vec::new()).await.unwrap();

        assert!(db.list_coordinates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_preserves_submitted_ids() {
        let (db, _dir) = open_test_db().await;

        let replacement = vec![
            StoredCoordinate {
                id: 40,
                label: "window".into(),
                points: square(1.0, 2.0),
            },
            StoredCoordinate {
                id: 7,
                label: "chair".into(),
                points: vec![],
            },
        ];
        db.replace_coordinates(replacement.clone()).await.unwrap();

        let mut expected = replacement;
        expected.sort_by_key(|c| c.id);
        assert_eq!(db.list_coordinates().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn delete_unknown_id_reports_not_found() {
        let (db, _dir) = open_test_db().await;
        assert!(!db.delete_coordinate(99).await.unwrap());
    }

    #[tokio::test]
    async fn empty_points_are_accepted() {
        let (db, _dir) = open_test_db().await;

        db.insert_coordinate("bare".into(), vec![]).await.unwrap();
        let listed = db.list_coordinates().await.unwrap();
        assert!(listed[0].points.is_empty());
    }
}
