use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use toks_core::{IdKind, IdSubKind, IndexSink, OutputEntry, SinkError};

use crate::error::{IndexError, Result};

const INDEX_VERSION: i64 = 1;

/// The cross-reference store: a `Files` table keyed by digest plus one
/// entry table per sub-kind.
#[derive(Debug)]
pub struct Index {
    conn: Connection,
}

/// One query match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub file: String,
    pub line: i64,
    pub col: i64,
    pub scope: String,
    pub kind: IdKind,
    pub sub_kind: IdSubKind,
    pub identifier: String,
}

/// Which entry tables a query reads.
#[derive(Debug, Clone, Copy)]
pub struct QuerySelect {
    pub refs: bool,
    pub defs: bool,
    pub decls: bool,
}

impl Index {
    /// Open or create the index. A fresh database gets the schema; an
    /// existing one must carry the expected version.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;

        let version: Option<i64> = conn
            .query_row("SELECT Version FROM Version", [], |r| r.get(0))
            .optional()
            .unwrap_or(None);

        match version {
            Some(v) if v == INDEX_VERSION => {}
            Some(v) => {
                return Err(IndexError::VersionMismatch {
                    found: v,
                    need: INDEX_VERSION,
                })
            }
            None => {
                conn.execute_batch(&format!(
                    "CREATE TABLE Version(Version INTEGER);
                     INSERT INTO Version VALUES({INDEX_VERSION});
                     CREATE TABLE Files(Digest TEXT, Filename TEXT UNIQUE);
                     CREATE TABLE Refs(Filerow INTEGER, Line INTEGER, ColumnStart INTEGER,
                                       Scope TEXT, Type INTEGER, Identifier TEXT);
                     CREATE TABLE Defs(Filerow INTEGER, Line INTEGER, ColumnStart INTEGER,
                                       Scope TEXT, Type INTEGER, Identifier TEXT);
                     CREATE TABLE Decls(Filerow INTEGER, Line INTEGER, ColumnStart INTEGER,
                                        Scope TEXT, Type INTEGER, Identifier TEXT);"
                ))?;
            }
        }
        Ok(Self { conn })
    }

    /// Remove files that no longer exist on disk, along with their
    /// entries. Returns how many were pruned.
    pub fn prune_missing(&mut self) -> Result<usize> {
        let mut gone: Vec<i64> = Vec::new();
        {
            let mut stmt = self.conn.prepare("SELECT rowid, Filename FROM Files")?;
            let rows = stmt.query_map([], |r| {
                Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (rowid, filename) = row?;
                if !Path::new(&filename).exists() {
                    log::info!("Pruning missing file {filename} from index");
                    gone.push(rowid);
                }
            }
        }
        for rowid in &gone {
            self.delete_entries(*rowid)?;
            self.conn
                .execute("DELETE FROM Files WHERE rowid=?1", params![rowid])?;
        }
        Ok(gone.len())
    }

    fn delete_entries(&self, filerow: i64) -> Result<()> {
        for table in ["Refs", "Defs", "Decls"] {
            self.conn.execute(
                &format!("DELETE FROM {table} WHERE Filerow=?1"),
                params![filerow],
            )?;
        }
        Ok(())
    }

    /// Register a file for analysis. Returns `None` when the stored
    /// digest matches (nothing to do); otherwise the `Files` rowid to
    /// write entries under, with any stale entries already removed.
    pub fn prepare_for_file(&mut self, digest: &str, filename: &str) -> Result<Option<i64>> {
        let existing: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT rowid, Digest FROM Files WHERE Filename=?1",
                params![filename],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;

        match existing {
            Some((rowid, ref stored)) if stored == digest => {
                log::info!("File {filename}({digest}) unchanged at filerow {rowid}");
                Ok(None)
            }
            Some((rowid, stored)) => {
                log::info!(
                    "File {filename}({digest}) changed (was {stored}), re-analyzing"
                );
                self.conn.execute(
                    "UPDATE Files SET Digest=?1 WHERE Filename=?2",
                    params![digest, filename],
                )?;
                self.delete_entries(rowid)?;
                Ok(Some(rowid))
            }
            None => {
                log::info!("File {filename}({digest}) is new to the index");
                self.conn.execute(
                    "INSERT INTO Files VALUES(?1, ?2)",
                    params![digest, filename],
                )?;
                Ok(Some(self.conn.last_insert_rowid()))
            }
        }
    }

    /// Sink for one file's entries. All inserts land in one
    /// transaction.
    pub fn file_session(&mut self, filerow: i64) -> FileSession<'_> {
        FileSession {
            conn: &mut self.conn,
            filerow,
        }
    }

    /// Look up an identifier. `?` and `*` wildcards map onto SQL LIKE.
    pub fn query(&self, identifier: &str, select: QuerySelect) -> Result<Vec<Hit>> {
        let pattern: String = identifier
            .chars()
            .map(|c| match c {
                '?' => '_',
                '*' => '%',
                c => c,
            })
            .collect();

        let mut hits = Vec::new();
        let tables: &[(&str, bool)] = &[
            ("Decls", select.decls),
            ("Defs", select.defs),
            ("Refs", select.refs),
        ];
        for (table, wanted) in tables {
            if !wanted {
                continue;
            }
            let sub = match *table {
                "Defs" => IdSubKind::Definition,
                "Decls" => IdSubKind::Declaration,
                _ => IdSubKind::Reference,
            };
            let mut stmt = self.conn.prepare(&format!(
                "SELECT Files.Filename, Line, ColumnStart, Scope, Type, Identifier
                 FROM {table} JOIN Files ON Files.rowid = {table}.Filerow
                 WHERE Identifier LIKE ?1
                 ORDER BY Files.Filename, Line, ColumnStart"
            ))?;
            let rows = stmt.query_map(params![pattern], |r| {
                Ok(Hit {
                    file: r.get(0)?,
                    line: r.get(1)?,
                    col: r.get(2)?,
                    scope: r.get(3)?,
                    kind: IdKind::from_i64(r.get(4)?),
                    sub_kind: sub,
                    identifier: r.get(5)?,
                })
            })?;
            for row in rows {
                hits.push(row?);
            }
        }
        Ok(hits)
    }
}

/// Writes one file's entries under a BEGIN/COMMIT bracket.
pub struct FileSession<'a> {
    conn: &'a mut Connection,
    filerow: i64,
}

impl IndexSink for FileSession<'_> {
    fn begin(&mut self) -> std::result::Result<(), SinkError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn insert_entry(&mut self, e: &OutputEntry<'_>) -> std::result::Result<(), SinkError> {
        let table = match e.sub_kind {
            IdSubKind::Definition => "Defs",
            IdSubKind::Declaration => "Decls",
            IdSubKind::Reference | IdSubKind::Unknown => "Refs",
        };
        let mut stmt = self.conn.prepare_cached(&format!(
            "INSERT INTO {table} VALUES(?1, ?2, ?3, ?4, ?5, ?6)"
        ))?;
        stmt.execute(params![
            self.filerow,
            e.line as i64,
            e.col as i64,
            e.scope,
            e.kind as i64,
            e.identifier,
        ])?;
        Ok(())
    }

    fn commit(&mut self) -> std::result::Result<(), SinkError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry<'a>(
        line: u32,
        scope: &'a str,
        kind: IdKind,
        sub: IdSubKind,
        ident: &'a str,
    ) -> OutputEntry<'a> {
        OutputEntry {
            line,
            col: 1,
            scope,
            kind,
            sub_kind: sub,
            identifier: ident,
        }
    }

    fn temp_index() -> (tempfile::TempDir, Index) {
        let dir = tempfile::tempdir().unwrap();
        let index = Index::open(dir.path().join("TOKS")).unwrap();
        (dir, index)
    }

    #[test]
    fn test_schema_create_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TOKS");
        drop(Index::open(&path).unwrap());
        // second open sees a valid version
        drop(Index::open(&path).unwrap());
    }

    #[test]
    fn test_version_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TOKS");
        drop(Index::open(&path).unwrap());
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute("UPDATE Version SET Version=99", []).unwrap();
        }
        let err = Index::open(&path).unwrap_err();
        assert!(matches!(err, IndexError::VersionMismatch { found: 99, .. }));
    }

    #[test]
    fn test_prepare_insert_and_query() {
        let (_dir, mut index) = temp_index();
        let filerow = index.prepare_for_file("d1", "/tmp/does-not-matter.c").unwrap();
        let filerow = filerow.expect("new file needs analysis");

        {
            let mut session = index.file_session(filerow);
            session.begin().unwrap();
            session
                .insert_entry(&entry(3, "<global>", IdKind::Function, IdSubKind::Definition, "main"))
                .unwrap();
            session
                .insert_entry(&entry(9, "<global>:main{}", IdKind::Var, IdSubKind::Reference, "x"))
                .unwrap();
            session.commit().unwrap();
        }

        let hits = index
            .query("main", QuerySelect { refs: true, defs: true, decls: true })
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, IdKind::Function);
        assert_eq!(hits[0].sub_kind, IdSubKind::Definition);
        assert_eq!(hits[0].line, 3);

        // restricting to refs hides the definition
        let hits = index
            .query("main", QuerySelect { refs: true, defs: false, decls: false })
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_digest_skip_and_replace() {
        let (_dir, mut index) = temp_index();
        let row1 = index.prepare_for_file("aaa", "/x/f.c").unwrap().unwrap();
        {
            let mut s = index.file_session(row1);
            s.begin().unwrap();
            s.insert_entry(&entry(1, "<global>", IdKind::Var, IdSubKind::Definition, "v"))
                .unwrap();
            s.commit().unwrap();
        }
        // same digest: skip
        assert!(index.prepare_for_file("aaa", "/x/f.c").unwrap().is_none());
        // new digest: same rowid, old entries dropped
        let row2 = index.prepare_for_file("bbb", "/x/f.c").unwrap().unwrap();
        assert_eq!(row1, row2);
        let hits = index
            .query("v", QuerySelect { refs: true, defs: true, decls: true })
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_wildcard_query() {
        let (_dir, mut index) = temp_index();
        let row = index.prepare_for_file("d", "/x/g.c").unwrap().unwrap();
        {
            let mut s = index.file_session(row);
            s.begin().unwrap();
            for name in ["alpha", "alphabet", "beta"] {
                s.insert_entry(&entry(1, "<global>", IdKind::Var, IdSubKind::Definition, name))
                    .unwrap();
            }
            s.commit().unwrap();
        }
        let all = QuerySelect { refs: true, defs: true, decls: true };
        assert_eq!(index.query("alpha*", all).unwrap().len(), 2);
        assert_eq!(index.query("bet?", all).unwrap().len(), 1);
        assert_eq!(index.query("alpha", all).unwrap().len(), 1);
    }

    #[test]
    fn test_prune_missing() {
        let (_dir, mut index) = temp_index();
        // a real file and a phantom one
        let real = tempfile::NamedTempFile::new().unwrap();
        let real_path = real.path().to_string_lossy().to_string();
        index.prepare_for_file("d1", &real_path).unwrap().unwrap();
        let row = index.prepare_for_file("d2", "/no/such/file.c").unwrap().unwrap();
        {
            let mut s = index.file_session(row);
            s.begin().unwrap();
            s.insert_entry(&entry(1, "<global>", IdKind::Var, IdSubKind::Definition, "ghost"))
                .unwrap();
            s.commit().unwrap();
        }

        assert_eq!(index.prune_missing().unwrap(), 1);
        let hits = index
            .query("ghost", QuerySelect { refs: true, defs: true, decls: true })
            .unwrap();
        assert!(hits.is_empty());
        // unchanged real file is still known
        assert!(index.prepare_for_file("d1", &real_path).unwrap().is_none());
    }
}
