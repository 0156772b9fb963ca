use crate::cli::{JobsAction, JobsCommand};
use crate::config::Settings;
use crate::{logging, output};
use jobly::{GenericClient, Job, JoblyError, NewJob, TracedClient, UpdateData};

pub async fn run(cmd: JobsCommand) -> anyhow::Result<()> {
    let settings = Settings::resolve(&cmd.db)?;
    logging::init(&settings.log_level, cmd.db.verbose);

    let pool = jobly::create_pool_with_config(&settings.database_url, settings.pool_size)?;
    let client = pool.get().await.map_err(JoblyError::from)?;
    tracing::debug!(pool_size = settings.pool_size, "connected");

    execute(&TracedClient::new(client), cmd.action)
        .await
        .map_err(report)
}

/// Attach the status class a `JoblyError` maps to.
fn report(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<JoblyError>().map(JoblyError::status_code) {
        Some(status @ (400 | 404)) => err.context(format!("request failed ({status})")),
        _ => err,
    }
}

async fn execute(client: &impl GenericClient, action: JobsAction) -> anyhow::Result<()> {
    match action {
        JobsAction::List(args) => {
            let filter = args.filter.to_filter();
            let jobs = Job::find_all(client, Some(&filter)).await?;
            if args.json {
                output::print_json(&jobs)?;
            } else {
                output::print_jobs(&jobs);
            }
        }
        JobsAction::Get(args) => {
            let job = Job::get(client, args.id).await?;
            show(&job, args.json)?;
        }
        JobsAction::Create(args) => {
            let new_job = NewJob {
                title: args.title,
                salary: args.salary,
                equity: args.equity,
                company_handle: args.company,
            };
            let job = Job::create(client, &new_job).await?;
            tracing::info!(id = job.id, "created job");
            show(&job, args.json)?;
        }
        JobsAction::Update(args) => {
            let value: serde_json::Value = serde_json::from_str(&args.data)
                .map_err(|e| JoblyError::bad_request(format!("--data is not valid JSON: {e}")))?;
            let data = UpdateData::from_json(&value)?;
            let job = Job::update(client, args.id, &data).await?;
            tracing::info!(id = job.id, fields = data.len(), "updated job");
            show(&job, args.json)?;
        }
        JobsAction::Remove(args) => {
            let id = Job::remove(client, args.id).await?;
            println!("removed job {id}");
        }
    }
    Ok(())
}

fn show(job: &Job, json: bool) -> anyhow::Result<()> {
    if json {
        output::print_json(job)
    } else {
        output::print_jobs(std::slice::from_ref(job));
        Ok(())
    }
}
