//! The SQLite catalog the indexer writes.
//!
//! All rows of a run land between one `BEGIN` and one `COMMIT`, the unique
//! indexes are created only after bulk insertion, and synchronous writes
//! are off for the duration. Everything a run needs — the open connection
//! and the interning maps for namespace and importable ids — lives in one
//! [`IndexSession`] value.

use std::{collections::HashMap, fs, io, path::Path};

use rusqlite::{Connection, ErrorCode, params};

use crate::{DEFAULT_PACKAGE, class::ClassView, names};

/// File name of the catalog created in the indexed directory.
pub const DB_FILE: &str = "javaindex.db";

const DDL: &str = "
CREATE TABLE namespaces (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    name VARCHAR NOT NULL
);
CREATE TABLE importables (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    name VARCHAR NOT NULL
);
CREATE TABLE importables_namespaces (
    importable_id INTEGER,
    namespace_id INTEGER,
    parent_importable_id INTEGER,
    parent_namespace_id INTEGER,
    done BOOLEAN,
    ispublic BOOLEAN,
    isfinal BOOLEAN,
    isinterface BOOLEAN,
    isabstract BOOLEAN,
    isannotation BOOLEAN,
    isenum BOOLEAN,
    signature VARCHAR,
    PRIMARY KEY (importable_id, namespace_id)
);
CREATE TABLE fields (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    name VARCHAR NOT NULL,
    descriptor VARCHAR NOT NULL,
    signature VARCHAR,
    importable_id INTEGER,
    namespace_id INTEGER,
    ispublic BOOLEAN,
    isprotected BOOLEAN,
    isprivate BOOLEAN,
    isstatic BOOLEAN,
    isfinal BOOLEAN,
    isenum BOOLEAN
);
CREATE TABLE methods (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    name VARCHAR NOT NULL,
    descriptor VARCHAR NOT NULL,
    signature VARCHAR,
    importable_id INTEGER,
    namespace_id INTEGER,
    ispublic BOOLEAN,
    isprotected BOOLEAN,
    isprivate BOOLEAN,
    isstatic BOOLEAN,
    isfinal BOOLEAN,
    issynchronized BOOLEAN,
    isabstract BOOLEAN
);
CREATE TABLE interfaces (
    importable_id INTEGER,
    namespace_id INTEGER,
    interface_importable_id INTEGER,
    interface_namespace_id INTEGER,
    PRIMARY KEY (importable_id, namespace_id, interface_importable_id,
    interface_namespace_id)
);
CREATE TABLE exceptions (
    method_id INTEGER,
    importable_id INTEGER,
    namespace_id INTEGER,
    PRIMARY KEY (method_id, importable_id, namespace_id)
);
CREATE TABLE files (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    path VARCHAR,
    filename VARCHAR
);
";

// SQLite bulk-inserts faster when the indexes are created once at the end
// instead of being updated on every INSERT.
const INDEXES: &str = "
CREATE UNIQUE INDEX IDX_UNIQUE_NAMESPACES ON namespaces (name);
CREATE UNIQUE INDEX IDX_IMPORTABLES ON importables (name);
CREATE UNIQUE INDEX IDX_UNIQUE_FIELDS ON fields
    (name, importable_id, namespace_id);
CREATE UNIQUE INDEX IDX_UNIQUE_METHODS ON methods
    (name, signature, importable_id, namespace_id);
";

/// An error raised while building the index database.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The database rejected a statement.
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    /// The database file could not be replaced.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One indexing run over an open catalog database.
#[derive(Debug)]
pub struct IndexSession {
    conn: Connection,
    namespaces: HashMap<String, i64>,
    importables: HashMap<String, i64>,
}

impl IndexSession {
    /// Creates the catalog from scratch, replacing any previous run's file,
    /// and opens the bulk transaction.
    ///
    /// # Errors
    /// See [`IndexError`].
    pub fn create(path: &Path) -> Result<Self, IndexError> {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        let conn = Connection::open(path)?;
        Self::start(conn)
    }

    /// Opens a session on an in-memory database. Mainly for tests.
    ///
    /// # Errors
    /// See [`IndexError`].
    pub fn in_memory() -> Result<Self, IndexError> {
        Self::start(Connection::open_in_memory()?)
    }

    fn start(conn: Connection) -> Result<Self, IndexError> {
        conn.execute_batch("PRAGMA synchronous = OFF;")?;
        conn.execute_batch(DDL)?;
        conn.execute_batch("BEGIN TRANSACTION;")?;
        Ok(Self {
            conn,
            namespaces: HashMap::new(),
            importables: HashMap::new(),
        })
    }

    /// Creates the unique indexes and commits the run.
    ///
    /// # Errors
    /// See [`IndexError`].
    pub fn finish(self) -> Result<(), IndexError> {
        self.conn.execute_batch(INDEXES)?;
        self.conn.execute_batch("COMMIT;")?;
        Ok(())
    }

    /// Records one regular file in the `files` table.
    ///
    /// # Errors
    /// See [`IndexError`].
    pub fn add_file(&self, path: &Path, filename: &str) -> Result<(), IndexError> {
        self.conn
            .prepare_cached("INSERT INTO files (path, filename) VALUES (?1, ?2)")?
            .execute(params![path.to_string_lossy(), filename])?;
        Ok(())
    }

    /// Records one decoded class with its fields, methods, thrown
    /// exceptions and interfaces.
    ///
    /// Returns `false` when the class collides with an already indexed
    /// definition of the same name and package; the first fully-indexed
    /// definition wins and the new one is dropped.
    ///
    /// # Errors
    /// See [`IndexError`].
    pub fn add_class(&mut self, class: &ClassView) -> Result<bool, IndexError> {
        let namespace = class
            .package()
            .filter(|it| !it.is_empty())
            .unwrap_or(DEFAULT_PACKAGE);
        let namespace_id = self.namespace_id(namespace)?;
        let class_id = self.importable_id(class.name())?;

        if !self.associate(class_id, namespace_id, true)? {
            return Ok(false);
        }

        let (parent_class_id, parent_namespace_id) = match class.fq_parent() {
            Some(parent) => {
                let package = names::extract_package(parent);
                let namespace_id =
                    self.namespace_id(package.as_deref().unwrap_or(DEFAULT_PACKAGE))?;
                let class_id = self.importable_id(names::extract_classname(parent))?;
                (class_id, namespace_id)
            }
            None => (0, 0),
        };

        self.conn
            .prepare_cached(
                "UPDATE importables_namespaces SET parent_importable_id = ?1,
                 parent_namespace_id = ?2, ispublic = ?3, isfinal = ?4,
                 isinterface = ?5, isabstract = ?6, isannotation = ?7,
                 isenum = ?8, signature = ?9
                 WHERE importable_id = ?10 AND namespace_id = ?11",
            )?
            .execute(params![
                parent_class_id,
                parent_namespace_id,
                class.is_public(),
                class.is_final(),
                class.is_interface(),
                class.is_abstract(),
                class.is_annotation(),
                class.is_enum(),
                class.signature(),
                class_id,
                namespace_id,
            ])?;

        self.add_fields(class, class_id, namespace_id)?;
        self.add_methods(class, class_id, namespace_id)?;
        self.add_interfaces(class, class_id, namespace_id)?;
        Ok(true)
    }

    /// Looks up or inserts a namespace row, memoizing its id.
    fn namespace_id(&mut self, name: &str) -> Result<i64, IndexError> {
        if let Some(&id) = self.namespaces.get(name) {
            return Ok(id);
        }
        self.conn
            .prepare_cached("INSERT INTO namespaces (name) VALUES (?1)")?
            .execute(params![name])?;
        let id = self.conn.last_insert_rowid();
        self.namespaces.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Looks up or inserts an importable row, memoizing its id.
    fn importable_id(&mut self, name: &str) -> Result<i64, IndexError> {
        if let Some(&id) = self.importables.get(name) {
            return Ok(id);
        }
        self.conn
            .prepare_cached("INSERT INTO importables (name) VALUES (?1)")?
            .execute(params![name])?;
        let id = self.conn.last_insert_rowid();
        self.importables.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Associates an importable with its namespace.
    ///
    /// `done` marks a fully-indexed class (as opposed to one merely seen as
    /// a parent, interface, or thrown exception). Returns `false` on a
    /// genuine collision: the pair was already fully indexed.
    fn associate(&self, class_id: i64, namespace_id: i64, done: bool) -> Result<bool, IndexError> {
        let inserted = self
            .conn
            .prepare_cached(
                "INSERT INTO importables_namespaces (importable_id, namespace_id, done)
                 VALUES (?1, ?2, ?3)",
            )?
            .execute(params![class_id, namespace_id, done]);
        match inserted {
            Ok(_) => Ok(true),
            Err(err) if is_constraint_violation(&err) => {
                if !done {
                    return Ok(true);
                }
                let already_done: Option<bool> = self
                    .conn
                    .prepare_cached(
                        "SELECT done FROM importables_namespaces
                         WHERE importable_id = ?1 AND namespace_id = ?2",
                    )?
                    .query_row(params![class_id, namespace_id], |row| row.get(0))?;
                if already_done.unwrap_or(false) {
                    Ok(false)
                } else {
                    self.conn
                        .prepare_cached(
                            "UPDATE importables_namespaces SET done = 1
                             WHERE importable_id = ?1 AND namespace_id = ?2",
                        )?
                        .execute(params![class_id, namespace_id])?;
                    Ok(true)
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    fn add_fields(
        &self,
        class: &ClassView,
        class_id: i64,
        namespace_id: i64,
    ) -> Result<(), IndexError> {
        for field in class.fields() {
            self.conn
                .prepare_cached(
                    "INSERT INTO fields
                     (name, descriptor, signature, importable_id, namespace_id,
                     ispublic, isprotected, isprivate, isstatic, isfinal, isenum)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                )?
                .execute(params![
                    field.name(),
                    field.descriptor(),
                    field.signature(),
                    class_id,
                    namespace_id,
                    field.is_public(),
                    field.is_protected(),
                    field.is_private(),
                    field.is_static(),
                    field.is_final(),
                    field.is_enum(),
                ])?;
        }
        Ok(())
    }

    fn add_methods(
        &mut self,
        class: &ClassView,
        class_id: i64,
        namespace_id: i64,
    ) -> Result<(), IndexError> {
        for method in class.methods() {
            self.conn
                .prepare_cached(
                    "INSERT INTO methods
                     (name, descriptor, signature, importable_id, namespace_id,
                     ispublic, isprotected, isprivate, isstatic, isfinal,
                     issynchronized, isabstract)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                )?
                .execute(params![
                    method.name(),
                    method.descriptor(),
                    method.signature(),
                    class_id,
                    namespace_id,
                    method.is_public(),
                    method.is_protected(),
                    method.is_private(),
                    method.is_static(),
                    method.is_final(),
                    method.is_synchronized(),
                    method.is_abstract(),
                ])?;
            let method_id = self.conn.last_insert_rowid();

            for exception in method.exceptions() {
                let namespace = names::extract_package(exception);
                let exception_namespace_id =
                    self.namespace_id(namespace.as_deref().unwrap_or(DEFAULT_PACKAGE))?;
                let exception_class_id = self.importable_id(names::extract_classname(exception))?;
                self.associate(exception_class_id, exception_namespace_id, false)?;
                self.conn
                    .prepare_cached(
                        "INSERT INTO exceptions (method_id, importable_id, namespace_id)
                         VALUES (?1, ?2, ?3)",
                    )?
                    .execute(params![method_id, exception_class_id, exception_namespace_id])?;
            }
        }
        Ok(())
    }

    fn add_interfaces(
        &mut self,
        class: &ClassView,
        class_id: i64,
        namespace_id: i64,
    ) -> Result<(), IndexError> {
        for interface in class.interfaces() {
            // nested interfaces are not importable on their own
            if interface.contains('$') {
                continue;
            }
            let package = names::extract_package(interface);
            let interface_namespace_id =
                self.namespace_id(package.as_deref().unwrap_or(DEFAULT_PACKAGE))?;
            let interface_class_id = self.importable_id(names::extract_classname(interface))?;
            self.associate(interface_class_id, interface_namespace_id, false)?;
            self.conn
                .prepare_cached(
                    "INSERT INTO interfaces
                     (importable_id, namespace_id, interface_importable_id,
                     interface_namespace_id)
                     VALUES (?1, ?2, ?3, ?4)",
                )?
                .execute(params![
                    class_id,
                    namespace_id,
                    interface_class_id,
                    interface_namespace_id,
                ])?;
        }
        Ok(())
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::class::{AccessFlags, FieldRecord, MethodRecord};

    fn sample_class() -> ClassView {
        ClassView {
            minor_version: 0,
            major_version: 52,
            access_flags: AccessFlags::PUBLIC | AccessFlags::SUPER,
            internal_name: "com/example/Widget".to_owned(),
            package: Some("com.example".to_owned()),
            simple_name: "Widget".to_owned(),
            super_name: Some("java.lang.Object".to_owned()),
            interfaces: vec!["java/io/Closeable".to_owned()],
            fields: vec![FieldRecord {
                name: "count".to_owned(),
                descriptor: "I".to_owned(),
                signature: None,
                access_flags: AccessFlags::PRIVATE,
            }],
            methods: vec![MethodRecord {
                name: "close".to_owned(),
                descriptor: "()V".to_owned(),
                signature: None,
                exceptions: vec!["java/io/IOException".to_owned()],
                access_flags: AccessFlags::PUBLIC,
            }],
            signature: None,
        }
    }

    fn count(session: &IndexSession, sql: &str) -> i64 {
        session.conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn one_class_produces_all_its_rows() {
        let mut session = IndexSession::in_memory().unwrap();
        assert!(session.add_class(&sample_class()).unwrap());

        // com.example, java.lang, java.io
        assert_eq!(3, count(&session, "SELECT count(*) FROM namespaces"));
        // Widget, Object, Closeable, IOException
        assert_eq!(4, count(&session, "SELECT count(*) FROM importables"));
        assert_eq!(1, count(&session, "SELECT count(*) FROM fields"));
        assert_eq!(1, count(&session, "SELECT count(*) FROM methods"));
        assert_eq!(1, count(&session, "SELECT count(*) FROM exceptions"));
        assert_eq!(1, count(&session, "SELECT count(*) FROM interfaces"));

        let (is_public, done): (bool, bool) = session
            .conn
            .query_row(
                "SELECT isn.ispublic, isn.done FROM importables_namespaces isn
                 JOIN importables i ON i.id = isn.importable_id
                 WHERE i.name = 'Widget'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(is_public);
        assert!(done);

        session.finish().unwrap();
    }

    #[test]
    fn the_first_fully_indexed_definition_wins() {
        let mut session = IndexSession::in_memory().unwrap();
        assert!(session.add_class(&sample_class()).unwrap());
        assert!(!session.add_class(&sample_class()).unwrap());
        // the collision must not have duplicated the member rows
        assert_eq!(1, count(&session, "SELECT count(*) FROM fields"));
        assert_eq!(1, count(&session, "SELECT count(*) FROM methods"));
    }

    #[test]
    fn a_merely_referenced_class_can_still_be_fully_indexed() {
        let mut session = IndexSession::in_memory().unwrap();
        assert!(session.add_class(&sample_class()).unwrap());

        let closeable = ClassView {
            minor_version: 0,
            major_version: 52,
            access_flags: AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT,
            internal_name: "java/io/Closeable".to_owned(),
            package: Some("java.io".to_owned()),
            simple_name: "Closeable".to_owned(),
            super_name: Some("java.lang.Object".to_owned()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            signature: None,
        };
        assert!(session.add_class(&closeable).unwrap());
    }

    #[test]
    fn files_are_recorded_verbatim() {
        let session = IndexSession::in_memory().unwrap();
        session.add_file(Path::new("src"), "Widget.java").unwrap();
        assert_eq!(1, count(&session, "SELECT count(*) FROM files"));
    }
}
