//! Demo 01: Basic CRUD Operations
//!
//! Walks through adding, listing, completing, editing and deleting tasks
//! with a throwaway database.
//!
//! Run with: cargo run --example 01_basic_crud

use eyre::Result;
use tasktracker::{TaskStatus, TaskStore, display};

fn main() -> Result<()> {
    // Create a temporary directory for this demo
    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("tasks.db");

    println!("TaskTracker Basic CRUD Demo");
    println!("===========================\n");
    println!("Database: {}\n", db_path.display());

    let store = TaskStore::open(&db_path)?;

    // CREATE
    println!("1. CREATE - Adding tasks...");
    store.add("Write report", "Q3 summary")?;
    store.add("Buy milk", "")?;
    let rejected = !store.add("   ", "blank titles are refused")?;
    println!("   Blank title rejected: {}\n", rejected);

    // READ
    println!("2. READ - Listing tasks (newest first)...");
    let tasks = store.list_all()?;
    for task in &tasks {
        println!("   {}  (created {})", display::format_row(task), task.created_date);
    }
    println!();

    // UPDATE status
    let report_id = tasks
        .iter()
        .find(|t| t.title == "Write report")
        .map(|t| t.id)
        .ok_or_else(|| eyre::eyre!("report task missing"))?;

    println!("3. UPDATE - Completing task {}...", report_id);
    store.set_status(report_id, TaskStatus::Completed)?;

    // UPDATE fields
    println!("4. UPDATE - Renaming task {}...", report_id);
    store.update_fields(report_id, "Write report v2", "Q3 summary final")?;
    if let Some(task) = store.get(report_id)? {
        println!("   {}\n", display::format_row(&task));
    }

    // DELETE
    println!("5. DELETE - Removing task {}...", report_id);
    store.delete(report_id)?;
    println!("   Task exists = {}\n", store.get(report_id)?.is_some());

    for line in display::render_list(&store.list_all()?) {
        println!("   {}", line);
    }

    println!("\nDemo complete!");
    Ok(())
}
