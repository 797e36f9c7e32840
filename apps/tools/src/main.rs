use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use server_api::forms::validate_course;
use shared::{
    domain::CourseId,
    protocol::{CourseSubmission, CourseSummary},
};
use storage::Storage;

#[derive(Parser, Debug)]
#[command(name = "cursos-tools", about = "Administrative access to the course store")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/data.sqlite")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Open the store and apply pending migrations.
    Migrate,
    /// Print every course in name order.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Validate and insert one course.
    Add { nome: String, descricao: String },
    /// Print one course by id.
    Show { course_id: i64 },
    Count,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Migrate => {
            println!("migrations applied to {}", cli.database_url);
        }
        Command::List { json } => {
            let courses = storage.list_courses_by_name().await?;
            if json {
                let summaries: Vec<CourseSummary> =
                    courses.into_iter().map(CourseSummary::from).collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for course in courses {
                    println!("{}\t{}\t{}", course.id.0, course.nome, course.descricao);
                }
            }
        }
        Command::Add { nome, descricao } => {
            let submission = CourseSubmission {
                nome,
                descricao,
                csrf_token: String::new(),
            };
            let course = match validate_course(&submission) {
                Ok(course) => course,
                Err(errors) => {
                    for (field, messages) in errors.iter() {
                        for message in messages {
                            eprintln!("{field}: {message}");
                        }
                    }
                    bail!("course rejected");
                }
            };
            let created = storage.insert_course(&course).await?;
            println!("created course_id={} {}", created.id.0, created);
        }
        Command::Show { course_id } => {
            let Some(course) = storage.load_course(CourseId(course_id)).await? else {
                bail!("course {course_id} not found");
            };
            println!("{}\t{}\t{}", course.id.0, course.nome, course.descricao);
        }
        Command::Count => {
            println!("{}", storage.count_courses().await?);
        }
    }

    Ok(())
}
