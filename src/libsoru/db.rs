use crate::libsoru::question::{
    default_category, pad_options, NewQuestion, QuestionRecord, OPTION_COUNT,
};
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// File name of the question bank, relative to the working directory.
pub const DB_NAME: &str = "soru_bankasi.db";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot open question bank at {path:?}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("question was not saved")]
    WriteFailed(#[source] rusqlite::Error),
    #[error("questions could not be read")]
    ReadFailed(#[source] rusqlite::Error),
    #[error("at most {max} options can be stored, got {0}", max = OPTION_COUNT)]
    TooManyOptions(usize),
    #[error("correct option index {0} is out of range")]
    CorrectIndexOutOfRange(usize),
}

/// Handle to the question table. Holds only the file location: every
/// operation opens its own connection and closes it before returning.
#[derive(Debug, Clone)]
pub struct QuestionStore {
    path: PathBuf,
}

impl QuestionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the question table if it does not exist yet. Safe to call on
    /// every startup.
    pub fn initialize(&self) -> Result<(), StoreError> {
        let unavailable = |source| StoreError::StorageUnavailable {
            path: self.path.clone(),
            source,
        };
        let conn = open_db(&self.path).map_err(unavailable)?;
        let created = init_db(&conn);
        close_db(conn).map_err(unavailable)?;
        created.map_err(unavailable)
    }

    /// Stores a question and reports whether it was committed. Failures are
    /// logged here; callers decide what to tell the user.
    pub fn add_question<S: AsRef<str>>(
        &self,
        text: &str,
        options: &[S],
        correct_index: Option<usize>,
        category: Option<&str>,
    ) -> bool {
        let Some(options) = pad_options(options) else {
            error!("[DB] {}", StoreError::TooManyOptions(options.len()));
            return false;
        };
        let question = NewQuestion {
            text: text.to_string(),
            options,
            correct_index,
            category: default_category(category),
        };
        match self.try_add_question(&question) {
            Ok(_) => true,
            Err(err) => {
                error!("[DB] Error while creating new Question: {:?}", err);
                false
            }
        }
    }

    /// Inserts `question` and returns the id assigned to it.
    pub fn try_add_question(&self, question: &NewQuestion) -> Result<i64, StoreError> {
        if let Some(idx) = question.correct_index.filter(|i| *i >= OPTION_COUNT) {
            return Err(StoreError::CorrectIndexOutOfRange(idx));
        }
        let category = default_category(Some(&question.category));
        let correct = question.correct_index.map(|i| i as i64);

        self.with_connection(|conn| {
            let [a, b, c, d, e] = &question.options;
            conn.execute(
                "INSERT INTO \
                Question(text, optionA, optionB, optionC, optionD, optionE, correctOptionIndex, category) \
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![question.text, a, b, c, d, e, correct, category],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .map(|id| {
            debug!(
                "[DB] Created new Question {} in Category '{}'",
                id, category
            );
            id
        })
        .map_err(StoreError::WriteFailed)
    }

    /// Every stored question, ascending by id. A read error is logged and
    /// yields an empty list; use [`Self::try_get_all_questions`] to tell the
    /// two apart.
    pub fn get_all_questions(&self) -> Vec<QuestionRecord> {
        match self.try_get_all_questions() {
            Ok(questions) => questions,
            Err(err) => {
                error!("[DB] Error while reading Questions: {:?}", err);
                Vec::new()
            }
        }
    }

    pub fn try_get_all_questions(&self) -> Result<Vec<QuestionRecord>, StoreError> {
        let now = Instant::now();
        let questions = self
            .with_connection(|conn| {
                let mut statement = conn.prepare(
                    "SELECT id, text, optionA, optionB, optionC, optionD, optionE, \
                    correctOptionIndex, category FROM Question ORDER BY id ASC",
                )?;
                let rows = statement.query_map([], from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .map_err(StoreError::ReadFailed)?;
        debug!(
            "[DB] Read {} Questions in {} ms.",
            questions.len(),
            now.elapsed().as_millis()
        );
        Ok(questions)
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> rusqlite::Result<T> {
        let conn = open_db(&self.path)?;
        let result = op(&conn);
        if let Err(err) = close_db(conn) {
            warn!("[DB] Connection left open after the operation finished: {}", err);
        }
        result
    }
}

fn from_row(row: &Row) -> rusqlite::Result<QuestionRecord> {
    let id: i64 = row.get(0)?;
    let correct: Option<i64> = row.get(7)?;
    let correct_index = match correct {
        Some(i) if (0..OPTION_COUNT as i64).contains(&i) => Some(i as usize),
        Some(i) => {
            warn!("[DB] Question {} has invalid correct option index {}", id, i);
            None
        }
        None => None,
    };
    let option = |idx: usize| -> rusqlite::Result<String> {
        Ok(row.get::<usize, Option<String>>(idx)?.unwrap_or_default())
    };
    let category: Option<String> = row.get(8)?;

    Ok(QuestionRecord {
        id,
        text: row.get(1)?,
        options: [option(2)?, option(3)?, option(4)?, option(5)?, option(6)?],
        correct_index,
        category: default_category(category.as_deref()),
    })
}

pub(crate) fn open_db(src: &Path) -> rusqlite::Result<Connection> {
    let now = Instant::now();
    let db = Connection::open(src)?;
    debug!("[DB] Opening took {} ms.", now.elapsed().as_millis());
    Ok(db)
}

pub(crate) fn close_db(connection: Connection) -> rusqlite::Result<()> {
    match connection.close() {
        Ok(_) => Ok(()),
        Err((conn, _)) => {
            warn!("[DB] Cannot close connection. Retrying 1/1...");
            conn.close().map_err(|(_, err)| {
                error!("[DB] Cannot close connection: {}", err);
                err
            })
        }
    }
}

fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    let now = Instant::now();
    conn.execute(
        "CREATE TABLE IF NOT EXISTS Question (
              id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
              text TEXT NOT NULL,
              optionA TEXT NOT NULL DEFAULT '',
              optionB TEXT NOT NULL DEFAULT '',
              optionC TEXT NOT NULL DEFAULT '',
              optionD TEXT NOT NULL DEFAULT '',
              optionE TEXT NOT NULL DEFAULT '',
              correctOptionIndex INTEGER,
              category TEXT NOT NULL DEFAULT 'General'
            )",
        (),
    )?;
    info!(
        "[DB INIT] Table Question ready ({} ms)",
        now.elapsed().as_millis()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, QuestionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = QuestionStore::new(dir.path().join(DB_NAME));
        store.initialize().unwrap();
        (dir, store)
    }

    #[test]
    fn round_trip_keeps_every_field() {
        let (_dir, store) = store();
        assert!(store.add_question("What is 2+2?", &["3", "4", "5", "", ""], Some(1), Some("Math")));

        let all = store.get_all_questions();
        let last = all.last().unwrap();
        assert_eq!(last.text, "What is 2+2?");
        assert_eq!(last.options, ["3", "4", "5", "", ""].map(String::from));
        assert_eq!(last.correct_index, Some(1));
        assert_eq!(last.category, "Math");
    }

    #[test]
    fn sequential_ids_step_by_one_in_insertion_order() {
        let (_dir, store) = store();
        assert!(store.add_question("first", &["a"], Some(0), None));
        assert!(store.add_question("second", &["b"], Some(0), None));

        let all = store.get_all_questions();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "first");
        assert_eq!(all[1].text, "second");
        assert_eq!(all[1].id - all[0].id, 1);
    }

    #[test]
    fn new_ids_exceed_all_previous() {
        let (_dir, store) = store();
        let mut last = 0;
        for i in 0..5 {
            let q = NewQuestion::from_input(&format!("q{i}"), &["x"], Some(0), None).unwrap();
            let id = store.try_add_question(&q).unwrap();
            assert!(id > last);
            last = id;
        }
        let ids: Vec<i64> = store.get_all_questions().iter().map(|q| q.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn options_are_always_five() {
        let (_dir, store) = store();
        assert!(store.add_question("one option", &["only"], Some(0), None));
        assert!(store.add_question::<&str>("no options", &[], None, None));
        for q in store.get_all_questions() {
            assert_eq!(q.options.len(), OPTION_COUNT);
        }
        assert!(!store.add_question("six", &["1", "2", "3", "4", "5", "6"], Some(0), None));
    }

    #[test]
    fn missing_category_is_general() {
        let (_dir, store) = store();
        assert!(store.add_question("a", &["x"], Some(0), None));
        assert!(store.add_question("b", &["x"], Some(0), Some("")));
        assert!(store
            .get_all_questions()
            .iter()
            .all(|q| q.category == "General"));
    }

    #[test]
    fn category_is_stored_verbatim() {
        let (_dir, store) = store();
        assert!(store.add_question("a", &["x"], Some(0), Some(" Math ")));
        let q = NewQuestion {
            text: "b".into(),
            options: ["x", "", "", "", ""].map(String::from),
            correct_index: Some(0),
            category: "  ".into(),
        };
        store.try_add_question(&q).unwrap();

        let all = store.get_all_questions();
        assert_eq!(all[0].category, " Math ");
        assert_eq!(all[1].category, "General");
    }

    #[test]
    fn every_call_reopens_the_file() {
        let (_dir, store) = store();
        for i in 0..3 {
            assert!(store.add_question(&format!("q{i}"), &["x"], Some(0), None));
            assert_eq!(store.get_all_questions().len(), i + 1);
        }
        assert!(std::fs::metadata(store.path()).unwrap().len() > 0);
    }

    #[test]
    fn null_correct_index_survives() {
        let (_dir, store) = store();
        assert!(store.add_question("a", &["x"], None, None));
        assert_eq!(store.get_all_questions()[0].correct_index, None);
        assert!(!store.add_question("b", &["x"], Some(5), None));
    }

    #[test]
    fn initialize_is_idempotent() {
        let (_dir, store) = store();
        assert!(store.add_question("kept", &["x"], Some(0), None));
        store.initialize().unwrap();
        store.initialize().unwrap();
        assert_eq!(store.get_all_questions().len(), 1);
    }

    #[test]
    fn empty_table_reads_as_empty() {
        let (_dir, store) = store();
        assert!(store.try_get_all_questions().unwrap().is_empty());
    }

    #[test]
    fn unopenable_path_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuestionStore::new(dir.path().join("missing").join("nested").join(DB_NAME));
        assert!(matches!(
            store.initialize(),
            Err(StoreError::StorageUnavailable { .. })
        ));
        assert!(!store.add_question("a", &["x"], Some(0), None));
    }

    #[test]
    fn corrupt_file_reads_empty_with_error_side_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_NAME);
        std::fs::write(&path, "this is not a database file ".repeat(64)).unwrap();
        let store = QuestionStore::new(&path);

        assert!(matches!(
            store.initialize(),
            Err(StoreError::StorageUnavailable { .. })
        ));
        assert!(store.get_all_questions().is_empty());
        assert!(matches!(
            store.try_get_all_questions(),
            Err(StoreError::ReadFailed(_))
        ));
    }
}
