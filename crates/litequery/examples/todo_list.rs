//! A small to-do list: categories that own items.
//!
//! Run with `RUST_LOG=litequery=debug cargo run --example todo_list [db-path]`
//! to watch the SQL go by. Without a path the lists live in memory.

use litequery::{Database, Expression, Query, SqlError, SqlResult, TracingSqlHook, Values, ValuesExt};
use tracing_subscriber::EnvFilter;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS categories (
        category_id INTEGER PRIMARY KEY,
        category_name TEXT NOT NULL,
        category_content TEXT
    );
    CREATE TABLE IF NOT EXISTS items (
        item_id INTEGER PRIMARY KEY,
        item_name TEXT NOT NULL,
        item_content TEXT,
        category_id INTEGER NOT NULL REFERENCES categories (category_id)
            ON DELETE CASCADE ON UPDATE CASCADE
    );
";

struct TodoList {
    db: Database,
    categories: Query,
    items: Query,
    category_id: Expression<i64>,
    category_name: Expression<String>,
    item_name: Expression<String>,
    item_category: Expression<i64>,
}

impl TodoList {
    fn open(path: Option<&str>) -> SqlResult<Self> {
        let db = match path {
            Some(path) => Database::open(path)?,
            None => Database::open_in_memory()?,
        }
        .with_hook(TracingSqlHook::new());
        db.execute(SCHEMA)?;

        Ok(Self {
            categories: db.table("categories"),
            items: db.table("items"),
            db,
            category_id: Expression::new("categories.category_id"),
            category_name: Expression::new("category_name"),
            item_name: Expression::new("item_name"),
            item_category: Expression::new("items.category_id"),
        })
    }

    fn add_category(&self, name: &str) -> SqlResult<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SqlError::Other("a list needs a name".to_string()));
        }
        let (id, statement) = self
            .categories
            .insert_with_statement(&self.db, &[self.category_name.set(name)]);
        match (id, statement.error()) {
            (Some(id), _) => Ok(id),
            (None, Some(err)) => Err(SqlError::Other(err.to_string())),
            (None, None) => Err(SqlError::Other("insert produced no row id".to_string())),
        }
    }

    fn add_item(&self, category: i64, name: &str) -> Option<i64> {
        self.items.insert(
            &self.db,
            &[self.item_name.set(name), Expression::<i64>::new("category_id").set(category)],
        )
    }

    fn rename_category(&self, category: i64, name: &str) -> u64 {
        self.categories
            .filter(self.category_id.eq(category))
            .update(&self.db, &[self.category_name.set(name)])
    }

    fn delete_category(&self, category: i64) -> u64 {
        self.categories.filter(self.category_id.eq(category)).delete(&self.db)
    }

    /// One row per category, with its item count.
    ///
    /// Rendering works from this snapshot; re-running the query for every
    /// rendered row would cost one statement per row.
    fn snapshot(&self) -> Vec<Values> {
        let item_count = litequery::func::count(&self.item_name);
        self.categories
            .join_with(
                litequery::JoinType::LeftOuter,
                &self.items,
                self.item_category.eq(&self.category_id),
            )
            .select(&[&self.category_id, &self.category_name, &item_count])
            .group(&[&self.category_id])
            .order(&[&self.category_id.asc()])
            .iter(&self.db)
            .collect()
    }

    fn render(&self, title: &str) {
        let rows = self.snapshot();
        println!("== {title} ({} lists) ==", rows.len());
        for row in &rows {
            let id: i64 = row.column(&self.category_id).unwrap_or_default();
            let name = row.column(&self.category_name).unwrap_or_default();
            let items = row.value("count(item_name)").map(ToString::to_string).unwrap_or_default();
            println!("  #{id} {name} [{items} items]");
        }
    }
}

fn main() -> SqlResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let path = std::env::args().nth(1);
    let todo = TodoList::open(path.as_deref())?;

    let home = todo.add_category("Home")?;
    let work = todo.add_category("Work")?;
    todo.add_category("Errands")?;
    if let Err(err) = todo.add_category("   ") {
        println!("skipped empty list: {err}");
    }

    for item in ["dishes", "laundry", "water plants"] {
        todo.add_item(home, item);
    }
    todo.add_item(work, "quarterly report");
    todo.render("after adding");

    todo.rename_category(work, "Office");
    todo.render("after renaming");

    let removed = todo.delete_category(home);
    println!("removed {removed} list(s); {} item(s) left", todo.items.count(&todo.db).unwrap_or_default());
    todo.render("after deleting");

    Ok(())
}
