use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobspark::applications::{submit_application, ApplyRequest};
use jobspark::config::Config;
use jobspark::dashboard::{AdminDashboard, Dashboard, UserDashboard};
use jobspark::errors::ClientError;
use jobspark::jobs::{JobBrowser, JobFeed, JobFilter, JobListing, LoadState, Lookup, SortOrder};
use jobspark::models::job::{Job, JobType};
use jobspark::profile::completeness::compute_profile_completeness;
use jobspark::profile::{validate_profile, Feedback, SubmitOutcome};
use jobspark::recommendations::{match_label, recommend, JobView, SkillMatchScorer};
use jobspark::{ApiClient, AuthUser, JobSource, Session};

#[derive(Parser)]
#[command(name = "jobspark", version, about = "Browse and apply to jobs on a JobSpark backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List jobs, optionally filtered
    Jobs {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long = "type")]
        job_type: Option<JobType>,
        #[arg(long)]
        remote: Option<bool>,
        /// Repeat for several skills; every one must match
        #[arg(long = "skill")]
        skills: Vec<String>,
        #[arg(long, default_value = "newest")]
        sort: SortOrder,
    },
    /// Show one job in full
    Job { id: String },
    /// Jobs recommended for a user, best match first
    Recommend {
        #[arg(long)]
        email: String,
    },
    /// Apply to a job
    Apply {
        #[arg(long)]
        email: String,
        #[arg(long)]
        job: String,
        #[arg(long)]
        motivation: String,
    },
    /// Dashboard for the user's role
    Dashboard {
        #[arg(long)]
        email: String,
    },
    /// Profile completeness and validation; any edit flag saves the profile
    Profile {
        #[arg(long)]
        email: String,
        #[arg(long)]
        headline: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Repeat to add several skills
        #[arg(long = "add-skill")]
        add_skills: Vec<String>,
        #[arg(long = "remove-skill")]
        remove_skills: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!("JobSpark v{} against {}", env!("CARGO_PKG_VERSION"), config.api_url);

    let api = ApiClient::new(&config.api_url, config.timeout)?;

    if let Err(failure) = run(cli.command, &api, &config).await {
        eprintln!("{}", failure.message);
        if failure.retryable {
            eprintln!("Run the command again to try again.");
        }
        std::process::exit(1);
    }
    Ok(())
}

/// What the user sees when a command fails.
struct Failure {
    message: String,
    retryable: bool,
}

impl From<ClientError> for Failure {
    fn from(e: ClientError) -> Self {
        Failure {
            message: e.user_message(),
            retryable: e.is_retryable(),
        }
    }
}

async fn run(command: Command, api: &ApiClient, config: &Config) -> Result<(), Failure> {
    match command {
        Command::Jobs {
            search,
            location,
            job_type,
            remote,
            skills,
            sort,
        } => {
            let mut browser = JobBrowser::new(load_jobs(api).await?);
            browser.set_filter(JobFilter {
                location,
                job_type,
                remote,
                skills,
                search_query: search,
            });
            browser.set_sort(sort);
            match browser.search_after_delay(config.search_delay).await {
                JobListing::NoMatches => println!("No jobs match your filters."),
                JobListing::Results(jobs) => {
                    for job in &jobs {
                        print_card(job, None);
                    }
                    println!("{} job(s)", jobs.len());
                }
            }
        }
        Command::Job { id } => {
            let browser = JobBrowser::new(load_jobs(api).await?);
            match browser.find(&id) {
                Lookup::Found(job) => print_details(job),
                Lookup::NotFound(id) => println!("Job {id} not found."),
            }
        }
        Command::Recommend { email } => {
            let session = signed_in(api, &email).await?;
            let views = recommend(api, &session, &SkillMatchScorer).await?;
            if views.is_empty() {
                println!("No recommendations yet.");
            }
            for view in &views {
                print_card(&view.job, Some(view));
            }
        }
        Command::Apply {
            email,
            job,
            motivation,
        } => {
            signed_in(api, &email).await?;
            let request = ApplyRequest {
                job_id: job,
                motivation,
            };
            let applications = submit_application(api, &email, &request).await?;
            for application in applications {
                println!(
                    "{:<24} {:<12} applied {}",
                    application.job_id, application.status, application.applied_date
                );
            }
        }
        Command::Dashboard { email } => {
            let session = signed_in(api, &email).await?;
            let jobs = load_jobs(api).await?;
            match Dashboard::for_session(&session, &jobs, &[]) {
                Some(Dashboard::User(dash)) => print_user_dashboard(&dash),
                Some(Dashboard::Admin(dash)) => print_admin_dashboard(&dash),
                None => println!("No profile found for {email}."),
            }
        }
        Command::Profile {
            email,
            headline,
            bio,
            location,
            add_skills,
            remove_skills,
        } => {
            let mut session = signed_in(api, &email).await?;
            let edited = headline.is_some()
                || bio.is_some()
                || location.is_some()
                || !add_skills.is_empty()
                || !remove_skills.is_empty();
            if edited {
                let mut form = session.profile_form(config.feedback_duration)?;
                if let Some(headline) = headline {
                    form.set_headline(headline);
                }
                if let Some(bio) = bio {
                    form.set_bio(bio);
                }
                if let Some(location) = location {
                    form.set_location(location);
                }
                for skill in &add_skills {
                    form.add_skill(skill);
                }
                for skill in &remove_skills {
                    form.remove_skill(skill);
                }
                match session.save_profile(&mut form, api).await {
                    SubmitOutcome::Saved => {}
                    SubmitOutcome::Invalid(report) => {
                        for message in report.errors.values() {
                            println!("  ! {message}");
                        }
                        return Err(Failure {
                            message: "Profile not saved.".to_string(),
                            retryable: false,
                        });
                    }
                    SubmitOutcome::Failed(message) => {
                        return Err(Failure {
                            message,
                            retryable: true,
                        })
                    }
                }
                if let Some(Feedback::Success(message)) = form.feedback() {
                    println!("{message}");
                }
            }

            let profile = session.profile().cloned().unwrap_or_default();
            let report = compute_profile_completeness(&profile);
            println!("Profile {}% complete", report.percent());
            for section in &report.sections {
                if let Some(hint) = &section.recommendation {
                    println!("  {:<12} {}", section.section, hint);
                }
            }
            for message in validate_profile(&profile).errors.values() {
                println!("  ! {message}");
            }
        }
    }
    Ok(())
}

async fn load_jobs(api: &ApiClient) -> Result<Arc<[Job]>, Failure> {
    let feed = JobFeed::new();
    let source: Arc<dyn JobSource> = Arc::new(api.clone());
    match feed.spawn_load(source).wait().await {
        LoadState::Loaded(jobs) => Ok(jobs),
        LoadState::Failed { message, retryable } => Err(Failure { message, retryable }),
        LoadState::Idle | LoadState::Loading => Err(Failure {
            message: "Loading jobs was interrupted.".to_string(),
            retryable: true,
        }),
    }
}

async fn signed_in(api: &ApiClient, email: &str) -> Result<Session, ClientError> {
    let mut session = Session::anonymous();
    session
        .establish(
            api,
            AuthUser {
                uid: email.to_string(),
                email: email.to_string(),
                display_name: None,
                photo_url: None,
            },
        )
        .await?;
    Ok(session)
}

fn print_card(job: &Job, view: Option<&JobView>) {
    let remote = if job.remote { " · Remote" } else { "" };
    println!("{}  [{}]", job.title, job.id);
    println!("  {} · {} · {}{}", job.company, job.location, job.job_type, remote);
    if !job.salary.is_empty() {
        println!("  {}", job.salary);
    }
    if !job.skills.is_empty() {
        println!("  {}", job.skills.join(", "));
    }
    if let Some(view) = view {
        let applied = if view.is_applied { " · Applied" } else { "" };
        println!(
            "  {}% {}{}",
            view.match_score,
            match_label(view.match_score),
            applied
        );
    }
}

fn print_details(job: &Job) {
    print_card(job, None);
    if let Some(date) = job.posted_date {
        println!("  Posted {date}");
    }
    if !job.description.is_empty() {
        println!("\n{}", job.description);
    }
    for (heading, items) in [
        ("Responsibilities", &job.responsibilities),
        ("Requirements", &job.requirements),
    ] {
        if !items.is_empty() {
            println!("\n{heading}:");
            for item in items {
                println!("  - {item}");
            }
        }
    }
}

fn print_user_dashboard(dash: &UserDashboard) {
    println!("{}", dash.email);
    println!(
        "{} application(s), {} active",
        dash.total_applications, dash.active_applications
    );
    for (status, count) in &dash.by_status {
        println!("  {:<12} {}", status, count);
    }
    if !dash.upcoming.is_empty() {
        println!("Upcoming:");
        for step in &dash.upcoming {
            let when = step
                .date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "unscheduled".to_string());
            println!("  {when:<12} {} ({})", step.label, step.job_title);
        }
    }
    println!("Profile {}% complete", dash.completeness.percent());
}

fn print_admin_dashboard(dash: &AdminDashboard) {
    println!("{} job(s), {} remote", dash.total_jobs, dash.remote_jobs);
    for (job_type, count) in &dash.jobs_by_type {
        println!("  {:<12} {}", job_type, count);
    }
    if !dash.top_skills.is_empty() {
        println!("Top skills:");
        for (skill, count) in &dash.top_skills {
            println!("  {skill:<16} {count}");
        }
    }
}
