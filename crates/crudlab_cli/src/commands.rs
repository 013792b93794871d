//! Command execution and plain-text output.

use crate::{AddBookArgs, AddTaskArgs, Command};
use chrono::NaiveDate;
use crudlab_core::model::book::{Book, NewBook};
use crudlab_core::model::loan::Loan;
use crudlab_core::model::member::NewMember;
use crudlab_core::model::task::{NewTask, Task};
use crudlab_core::repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
use crudlab_core::repo::loan_repo::{LoanRepository, SqliteLoanRepository};
use crudlab_core::repo::member_repo::{MemberRepository, SqliteMemberRepository};
use crudlab_core::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crudlab_core::{
    seed, today, Database, DbConfig, DbError, LibraryService, RepoError, RowId,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

type CliResult<T = ()> = Result<T, CliError>;

pub(crate) fn run(command: Command, config: DbConfig) -> CliResult {
    log::info!(
        "event=cli_command module=cli status=start db={}",
        config.path().display()
    );
    if let Command::Setup { force } = command {
        return setup(config, force);
    }

    let db = Database::open(config)?;
    match command {
        Command::Setup { .. } => Ok(()),
        Command::Seed => {
            let summary = seed(&db)?;
            println!(
                "Seeded {} books, {} members, {} active loans ({} overdue), {} returned loans",
                summary.books,
                summary.members,
                summary.active_loans,
                summary.overdue_loans,
                summary.returned_loans
            );
            Ok(())
        }
        Command::AddBook(args) => add_book(&db, args),
        Command::ListBooks { available, sort } => {
            let query = BookListQuery {
                available_only: available,
                sort,
            };
            print_books(&SqliteBookRepository::new(&db).get_all(&query)?);
            Ok(())
        }
        Command::SearchBooks { term, field } => {
            print_books(&SqliteBookRepository::new(&db).search(&term, field)?);
            Ok(())
        }
        Command::DeleteBook { id } => {
            require(SqliteBookRepository::new(&db).delete(id)?, "Book", id)?;
            println!("Deleted book {id}");
            Ok(())
        }
        Command::AddMember { name, email } => {
            let id = SqliteMemberRepository::new(&db).create(&NewMember::new(name, email))?;
            println!("Added member {id}");
            Ok(())
        }
        Command::ListMembers { sort } => {
            let members = SqliteMemberRepository::new(&db).get_all(sort)?;
            if members.is_empty() {
                println!("No members.");
            }
            for member in members {
                println!(
                    "{:>4}  {:<24} {:<32} joined {}",
                    member.id, member.name, member.email, member.join_date
                );
            }
            Ok(())
        }
        Command::Borrow { book, member, days } => {
            let loan_id = LibraryService::new(&db).borrow_book(book, member, days)?;
            match SqliteLoanRepository::new(&db).get_by_id(loan_id)? {
                Some(loan) => println!("Loan {loan_id} created, due {}", loan.due_date),
                None => println!("Loan {loan_id} created"),
            }
            Ok(())
        }
        Command::Return { loan } => {
            require(LibraryService::new(&db).return_book(loan)?, "Loan", loan)?;
            println!("Returned loan {loan}");
            Ok(())
        }
        Command::Loans { member, overdue } => show_loans(&db, member, overdue),
        Command::AddTask(args) => add_task(&db, args),
        Command::ListTasks { status } => {
            let tasks = SqliteTaskRepository::new(&db).get_all(status)?;
            if tasks.is_empty() {
                println!("No tasks.");
            }
            for task in &tasks {
                print_task(task);
            }
            Ok(())
        }
        Command::UpdateTask { id, status } => {
            require(
                SqliteTaskRepository::new(&db).update_status(id, status)?,
                "Task",
                id,
            )?;
            println!("Task {id} is now {status}");
            Ok(())
        }
        Command::DeleteTask { id } => {
            require(SqliteTaskRepository::new(&db).delete(id)?, "Task", id)?;
            println!("Deleted task {id}");
            Ok(())
        }
    }
}

fn setup(config: DbConfig, force: bool) -> CliResult {
    let db = if force {
        Database::reset(config)?
    } else {
        Database::open(config)?
    };
    println!("Database ready at {}", db.config().path().display());
    for table in db.table_names()? {
        println!("  {table}");
    }
    Ok(())
}

fn add_book(db: &Database, args: AddBookArgs) -> CliResult {
    let mut book = NewBook::new(args.title, args.author, args.isbn);
    if let Some(year) = args.year {
        book = book.published(year);
    }
    let id = SqliteBookRepository::new(db).create(&book)?;
    println!("Added book {id}");
    Ok(())
}

fn add_task(db: &Database, args: AddTaskArgs) -> CliResult {
    let mut task = NewTask::new(args.title).priority(args.priority);
    if let Some(description) = args.description {
        task = task.description(description);
    }
    if let Some(due) = args.due {
        task = task.due(due);
    }
    let id = SqliteTaskRepository::new(db).create(&task)?;
    println!("Added task {id}");
    Ok(())
}

fn show_loans(db: &Database, member: Option<RowId>, overdue: bool) -> CliResult {
    let loans = SqliteLoanRepository::new(db);
    if overdue {
        let today = today();
        let rows = loans.get_overdue(today)?;
        if rows.is_empty() {
            println!("No overdue loans.");
        }
        for row in rows {
            println!(
                "{:>4}  {:<36} {:<24} due {} ({} days overdue)",
                row.loan.id,
                row.book_title,
                row.member_name,
                row.loan.due_date,
                row.days_overdue(today)
            );
        }
        return Ok(());
    }

    if let Some(member_id) = member {
        let rows = loans.get_by_member(member_id, false)?;
        if rows.is_empty() {
            println!("No loans for member {member_id}.");
        }
        for row in rows {
            println!(
                "{:>4}  {:<36} {:<24} {}",
                row.loan.id,
                row.book_title,
                row.book_author,
                loan_window(&row.loan)
            );
        }
        return Ok(());
    }

    let active = loans.get_active()?;
    if active.is_empty() {
        println!("No active loans.");
    }
    for loan in active {
        println!(
            "{:>4}  book {:>4}  member {:>4}  {}",
            loan.id,
            loan.book_id,
            loan.member_id,
            loan_window(&loan)
        );
    }
    Ok(())
}

fn require(found: bool, entity: &'static str, id: RowId) -> CliResult {
    if found {
        Ok(())
    } else {
        Err(RepoError::NotFound { entity, id }.into())
    }
}

fn print_books(books: &[Book]) {
    if books.is_empty() {
        println!("No books found.");
    }
    for book in books {
        let year = book
            .published_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        let state = if book.available { "available" } else { "on loan" };
        println!(
            "{:>4}  {:<36} {:<24} {:<14} {:>5}  {state}",
            book.id, book.title, book.author, book.isbn, year
        );
    }
}

fn print_task(task: &Task) {
    let due = task
        .due_date
        .as_ref()
        .map(NaiveDate::to_string)
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:>4}  [{:<11}] {:<6} due {:<10}  {}",
        task.id,
        task.status.as_str(),
        task.priority.as_str(),
        due,
        task.title
    );
}

fn loan_window(loan: &Loan) -> String {
    match loan.return_date {
        Some(returned) => format!("{} -> returned {}", loan.loan_date, returned),
        None => format!("{} -> due {}", loan.loan_date, loan.due_date),
    }
}
