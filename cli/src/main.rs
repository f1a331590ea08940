use clap::{Parser, Subcommand, ValueEnum};
use learnhub::auth::hash_password;
use learnhub::model::entity::{
    Course, CourseCreate, Enrollment, EnrollmentCreate, Lesson, LessonCreate, PasswordResetToken,
    UserEntity, UserEntityCreateUpdate,
};
use learnhub::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use learnhub::utils::{money, slug::generate_slug};
use learnhub::web::{AuthenticatedUser, UserRole};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the learnhub DB", long_about = None)]
pub struct Cli {
    /// Overrides `database_uri` from config.toml
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Enroll a user in a course without an order
    Enroll {
        #[arg(long)]
        email: String,
        #[arg(long)]
        course_slug: String,
    },

    /// Insert demo users, courses and lessons. Existing rows are kept.
    Seed,

    /// Delete expired password reset tokens
    CleanupTokens,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RoleArg {
    Admin,
    Student,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => UserRole::Admin,
            RoleArg::Student => UserRole::Student,
        }
    }
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_enum, default_value_t = RoleArg::Student)]
        role: RoleArg,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Price in baht
        #[arg(long, default_value_t = 0.0)]
        price: f64,
        #[arg(long)]
        thumbnail: Option<String>,
        #[arg(long, default_value_t = false)]
        published: bool,
    },
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        /// Slug of the course to append the lesson to
        #[arg(long)]
        course_slug: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        video_url: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = false)]
        free: bool,
    },
}

struct SeedCourse {
    title: &'static str,
    description: &'static str,
    price: f64,
    lessons: &'static [&'static str],
}

const SEED_VIDEO: &str = "https://www.youtube.com/watch?v=ZVnjOPwW4ZA";

const SEED_COURSES: [SeedCourse; 3] = [
    SeedCourse {
        title: "Next.js Fundamentals",
        description: "App Router, Server Components and API routes with a real project.",
        price: 1290.0,
        lessons: &[
            "Introduction and project setup",
            "App Router and file-based routing",
            "Server and client components",
            "Data fetching and caching",
        ],
    },
    SeedCourse {
        title: "React + TypeScript Complete Guide",
        description: "Hooks, context and state management with TypeScript.",
        price: 1590.0,
        lessons: &[
            "Why TypeScript",
            "Typing components and props",
            "Hooks with generics",
        ],
    },
    SeedCourse {
        title: "HTML & CSS Basics",
        description: "Build your first web page in one day.",
        price: 0.0,
        lessons: &["Your first page", "Styling with CSS"],
    },
];

async fn course_id_by_slug(mm: &ModelManager, slug: &str) -> Result<Option<uuid::Uuid>, DatabaseError> {
    sqlx::query_scalar("SELECT id FROM courses WHERE slug = $1")
        .bind(slug)
        .fetch_optional(mm.executor())
        .await
        .map_err(DatabaseError::SqlxError)
}

async fn course_id_by_title(mm: &ModelManager, title: &str) -> Result<Option<uuid::Uuid>, DatabaseError> {
    sqlx::query_scalar("SELECT id FROM courses WHERE title = $1")
        .bind(title)
        .fetch_optional(mm.executor())
        .await
        .map_err(DatabaseError::SqlxError)
}

async fn ensure_user(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    name: &str,
    email: &str,
    password: &str,
    role: UserRole,
) -> learnhub::error::AppResult<()> {
    if UserEntity::find_by_email(mm, actor, email).await?.is_some() {
        println!("User exists: {email}");
        return Ok(());
    }

    UserEntity::create(
        mm,
        actor,
        UserEntityCreateUpdate {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            role,
        },
    )
    .await?;
    println!("User created: {email}");
    Ok(())
}

async fn seed(mm: &ModelManager, actor: &AuthenticatedUser) -> learnhub::error::AppResult<()> {
    ensure_user(mm, actor, "Admin User", "admin@test.com", "admin123", UserRole::Admin).await?;
    ensure_user(mm, actor, "Test Student", "student@test.com", "student123", UserRole::Student)
        .await?;

    for (i, seed) in SEED_COURSES.iter().enumerate() {
        if course_id_by_title(mm, seed.title).await?.is_some() {
            println!("Course exists: {}", seed.title);
            continue;
        }

        let course = Course::create(
            mm,
            actor,
            CourseCreate {
                title: seed.title.to_string(),
                slug: generate_slug(seed.title, i as i64),
                description: seed.description.to_string(),
                price: money::to_minor(seed.price),
                thumbnail: None,
                is_published: true,
            },
        )
        .await?;

        for (position, title) in seed.lessons.iter().enumerate() {
            Lesson::create(
                mm,
                actor,
                LessonCreate {
                    course_id: course.id(),
                    title: title.to_string(),
                    description: None,
                    video_url: SEED_VIDEO.to_string(),
                    position: Some(position as i32),
                    is_free: position == 0,
                },
            )
            .await?;
        }
        println!("Course created: {} ({} lessons)", course.slug(), seed.lessons.len());
    }

    Ok(())
}

async fn run(args: Cli) -> learnhub::error::AppResult<()> {
    let database_url = match args.database_url {
        Some(url) => url,
        None => {
            let config = learnhub::Config::get_or_init(cfg!(debug_assertions)).await;
            config.app().database_uri().to_string()
        }
    };

    let db_con = DbConnection::connect(&database_url)?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { name, email, password, role } => {
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        name,
                        email,
                        password_hash: hash_password(&password)?,
                        role: role.into(),
                    },
                )
                .await?;
                println!("User created: {} ({})", user.email(), user.role());
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add { title, description, price, thumbnail, published } => {
                let slug = generate_slug(&title, std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_millis() as i64)
                    .unwrap_or_default());
                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        title,
                        slug,
                        description,
                        price: money::to_minor(price),
                        thumbnail,
                        is_published: published,
                    },
                )
                .await?;
                println!("Course created: {} ({})", course.title(), course.slug());
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add { course_slug, title, video_url, description, free } => {
                let Some(course_id) = course_id_by_slug(&mm, &course_slug).await? else {
                    eprintln!("No course with slug {course_slug}");
                    std::process::exit(1);
                };

                let lesson = Lesson::create(
                    &mm,
                    &actor,
                    LessonCreate {
                        course_id,
                        title,
                        description,
                        video_url,
                        position: None,
                        is_free: free,
                    },
                )
                .await?;
                println!("Lesson created: {} at position {}", lesson.title(), lesson.position());
            }
        },

        Commands::Enroll { email, course_slug } => {
            let Some(user) = UserEntity::find_by_email(&mm, &actor, &email).await? else {
                eprintln!("No user with email {email}");
                std::process::exit(1);
            };
            let Some(course_id) = course_id_by_slug(&mm, &course_slug).await? else {
                eprintln!("No course with slug {course_slug}");
                std::process::exit(1);
            };

            match Enrollment::create(&mm, &actor, EnrollmentCreate { user_id: user.id(), course_id }).await {
                Ok(enrollment) => println!("Enrollment created: {}", enrollment.id()),
                Err(DatabaseError::Conflict(_)) => println!("{email} is already enrolled in {course_slug}"),
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Seed => seed(&mm, &actor).await?,

        Commands::CleanupTokens => {
            let removed = PasswordResetToken::cleanup_expired(&mm, &actor).await?;
            println!("Removed {removed} expired reset tokens");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> learnhub::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    run(Cli::parse()).await
}
