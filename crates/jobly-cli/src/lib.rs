mod cli;
mod config;
mod init;
mod jobs_cmd;
mod logging;
mod output;
mod preview_cmd;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Init(args) => init::run(args),
        cli::Command::Preview(cmd) => match cmd {
            cli::PreviewCommand::Update(args) => preview_cmd::update(args),
            cli::PreviewCommand::Filter(args) => preview_cmd::filter(args),
        },
        cli::Command::Jobs(cmd) => jobs_cmd::run(cmd).await,
    }
}
