use crate::DbError;
use chrono::Utc;
use core_types::{
    Book, BookAuthor, BookBorrow, BookDetail, BookInput, LinkInput, Role, User, UserDetail,
    UserInput,
};
use sqlx::sqlite::SqlitePool;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
///
/// Every call borrows a pooled connection (or opens a transaction) for its
/// own duration only; nothing is held between calls.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ==========================================================================
    // Users
    // ==========================================================================

    /// Fetches every user. An empty table yields an empty vec.
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, role_id, created_at, updated_at FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, DbError> {
        tracing::debug!(user_id = id, "Looking up user.");
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, role_id, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound { resource: "user", id })
    }

    /// Fetches a user together with the books they authored and borrowed.
    ///
    /// The two book lists come from two separate join queries rather than one
    /// outer join, so they never multiply into authored x borrowed rows. A
    /// book that is both authored and borrowed appears in both lists.
    pub async fn get_user_detail(&self, id: i64) -> Result<UserDetail, DbError> {
        let user = self.get_user(id).await?;

        let authored_future = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.description, b.year, b.created_at, b.updated_at
            FROM books AS b
            JOIN book_authors AS ba ON ba.book_id = b.id
            WHERE ba.user_id = ?
            ORDER BY ba.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool);

        let borrowed_future = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.description, b.year, b.created_at, b.updated_at
            FROM books AS b
            JOIN book_borrows AS bb ON bb.book_id = b.id
            WHERE bb.user_id = ?
            ORDER BY bb.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool);

        let (authored_res, borrowed_res) = tokio::join!(authored_future, borrowed_future);

        Ok(UserDetail {
            user,
            authored_books: authored_res?,
            borrowed_books: borrowed_res?,
        })
    }

    /// Inserts a user in its own transaction.
    ///
    /// A duplicate email yields `Conflict`, an unknown role `InvalidReference`;
    /// either way the transaction is rolled back and nothing is written.
    pub async fn create_user(&self, input: &UserInput) -> Result<User, DbError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, role_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, username, email, password, role_id, created_at, updated_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password)
        .bind(input.role_id())
        .bind(input.created_at.unwrap_or(now))
        .bind(input.updated_at.unwrap_or(now))
        .fetch_one(&mut *tx)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(e) => {
                tx.rollback().await?;
                let err = DbError::from_insert("user", e);
                tracing::warn!(error = %err, "User insert rolled back.");
                return Err(err);
            }
        };

        tx.commit().await?;
        tracing::info!(user_id = user.id, "Created user.");
        Ok(user)
    }

    /// Removes a user row. Link rows that pointed at it keep existing with a
    /// NULL `user_id`.
    pub async fn delete_user(&self, id: i64) -> Result<(), DbError> {
        self.delete_by_id("users", "user", id).await
    }

    // ==========================================================================
    // Books
    // ==========================================================================

    pub async fn list_books(&self) -> Result<Vec<Book>, DbError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, description, year, created_at, updated_at FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    pub async fn get_book(&self, id: i64) -> Result<Book, DbError> {
        tracing::debug!(book_id = id, "Looking up book.");
        sqlx::query_as::<_, Book>(
            "SELECT id, title, description, year, created_at, updated_at FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound { resource: "book", id })
    }

    /// Fetches a book together with its authors and borrowers, mirroring
    /// [`get_user_detail`](Self::get_user_detail) from the other side.
    pub async fn get_book_detail(&self, id: i64) -> Result<BookDetail, DbError> {
        let book = self.get_book(id).await?;

        let authors_future = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password, u.role_id, u.created_at, u.updated_at
            FROM users AS u
            JOIN book_authors AS ba ON ba.user_id = u.id
            WHERE ba.book_id = ?
            ORDER BY ba.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool);

        let borrowers_future = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password, u.role_id, u.created_at, u.updated_at
            FROM users AS u
            JOIN book_borrows AS bb ON bb.user_id = u.id
            WHERE bb.book_id = ?
            ORDER BY bb.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool);

        let (authors_res, borrowers_res) = tokio::join!(authors_future, borrowers_future);

        Ok(BookDetail {
            book,
            authors: authors_res?,
            borrowers: borrowers_res?,
        })
    }

    pub async fn create_book(&self, input: &BookInput) -> Result<Book, DbError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, description, year, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, title, description, year, created_at, updated_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.year)
        .bind(input.created_at.unwrap_or(now))
        .bind(input.updated_at.unwrap_or(now))
        .fetch_one(&mut *tx)
        .await;

        let book = match inserted {
            Ok(book) => book,
            Err(e) => {
                tx.rollback().await?;
                let err = DbError::from_insert("book", e);
                tracing::warn!(error = %err, "Book insert rolled back.");
                return Err(err);
            }
        };

        tx.commit().await?;
        tracing::info!(book_id = book.id, "Created book.");
        Ok(book)
    }

    /// Removes a book row. Link rows that pointed at it keep existing with a
    /// NULL `book_id`.
    pub async fn delete_book(&self, id: i64) -> Result<(), DbError> {
        self.delete_by_id("books", "book", id).await
    }

    // ==========================================================================
    // Links
    // ==========================================================================

    /// Records that `input.user_id` authored `input.book_id`.
    pub async fn create_book_author(&self, input: &LinkInput) -> Result<BookAuthor, DbError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, BookAuthor>(
            r#"
            INSERT INTO book_authors (book_id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, book_id, user_id, created_at, updated_at
            "#,
        )
        .bind(input.book_id)
        .bind(input.user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await;

        let link = match inserted {
            Ok(link) => link,
            Err(e) => {
                tx.rollback().await?;
                return Err(DbError::from_insert("book author", e));
            }
        };

        tx.commit().await?;
        tracing::info!(link_id = link.id, book_id = input.book_id, user_id = input.user_id, "Recorded authorship.");
        Ok(link)
    }

    /// Records that `input.user_id` borrowed `input.book_id`.
    pub async fn create_book_borrow(&self, input: &LinkInput) -> Result<BookBorrow, DbError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, BookBorrow>(
            r#"
            INSERT INTO book_borrows (book_id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, book_id, user_id, created_at, updated_at
            "#,
        )
        .bind(input.book_id)
        .bind(input.user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await;

        let link = match inserted {
            Ok(link) => link,
            Err(e) => {
                tx.rollback().await?;
                return Err(DbError::from_insert("book borrow", e));
            }
        };

        tx.commit().await?;
        tracing::info!(link_id = link.id, book_id = input.book_id, user_id = input.user_id, "Recorded borrow.");
        Ok(link)
    }

    /// Every authorship row, including ones whose user or book is gone.
    pub async fn list_book_authors(&self) -> Result<Vec<BookAuthor>, DbError> {
        let links = sqlx::query_as::<_, BookAuthor>(
            "SELECT id, book_id, user_id, created_at, updated_at FROM book_authors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    /// Every borrow row, including ones whose user or book is gone.
    pub async fn list_book_borrows(&self) -> Result<Vec<BookBorrow>, DbError> {
        let links = sqlx::query_as::<_, BookBorrow>(
            "SELECT id, book_id, user_id, created_at, updated_at FROM book_borrows ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    // ==========================================================================
    // Roles
    // ==========================================================================

    pub async fn list_roles(&self) -> Result<Vec<Role>, DbError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT id, name, created_at, updated_at FROM roles ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    /// Deletes one row by primary key inside a transaction.
    /// `table` is always one of our own literals, never caller input.
    async fn delete_by_id(&self, table: &'static str, resource: &'static str, id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = ?"))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::NotFound { resource, id });
        }

        tx.commit().await?;
        tracing::info!(id, resource, "Deleted row.");
        Ok(())
    }
}
